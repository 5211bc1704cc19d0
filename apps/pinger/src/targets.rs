//! Loading the list of hosts to monitor.
//!
//! The list is a headerless CSV file with one `label,address,osc_path` row
//! per host, e.g.
//!
//! ```text
//! Stage left projector,192.168.1.21,/stage/projector_left
//! ```

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;
use crate::monitoring::ProbeTask;

#[derive(Debug, Deserialize)]
struct TaskRecord {
    label: String,
    address: String,
    status_path: String,
}

pub fn load_tasks(path: &Path) -> Result<Vec<Arc<ProbeTask>>, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::ReadFailed { path: path.to_path_buf(), source })?;
    read_tasks(file)
}

/// Parse rows in file order. The first invalid row fails the whole list.
pub fn read_tasks(reader: impl io::Read) -> Result<Vec<Arc<ProbeTask>>, ConfigError> {
    let mut csv = ReaderBuilder::new().has_headers(false).trim(Trim::All).from_reader(reader);

    let mut tasks = Vec::new();
    for record in csv.deserialize::<TaskRecord>() {
        let record = record?;
        let task = ProbeTask::parse(&record.label, &record.address, &record.status_path)?;
        tasks.push(Arc::new(task));
    }

    if tasks.is_empty() {
        warn!("Target list is empty, rounds will not probe anything");
    }

    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::IpAddr;

    use super::*;

    #[test]
    fn test_rows_load_in_order() {
        let input = "\
Projector,192.168.1.21,/stage/projector
 Console , 10.0.0.4 , /foh/console
Router,fe80::1,/net/router
";
        let tasks = read_tasks(input.as_bytes()).unwrap();

        let labels: Vec<&str> = tasks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Projector", "Console", "Router"]);
        assert_eq!(tasks[1].address, "10.0.0.4".parse::<IpAddr>().unwrap());
        assert_eq!(tasks[1].status_path.as_str(), "/foh/console");
        assert!(tasks[2].address.is_ipv6());
    }

    #[test]
    fn test_invalid_address_names_row() {
        let input = "Good,10.0.0.1,/a/b\nBad,10.0.0.999,/a/c\n";
        let err = read_tasks(input.as_bytes()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddress { ref label, ref value } if label == "Bad" && value == "10.0.0.999"));
    }

    #[test]
    fn test_invalid_status_path_names_row() {
        let input = "Wild,10.0.0.1,/lights/*\n";
        let err = read_tasks(input.as_bytes()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStatusPath { ref label, .. } if label == "Wild"));
    }

    #[test]
    fn test_missing_column_is_csv_error() {
        let err = read_tasks("OnlyLabel,10.0.0.1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ConfigError::Csv(_)));
    }

    #[test]
    fn test_empty_list_is_allowed() {
        assert!(read_tasks("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "Desk,127.0.0.1,/desk")?;

        let tasks = load_tasks(file.path())?;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].label, "Desk");

        let missing = load_tasks(Path::new("/nonexistent/hosts.csv")).unwrap_err();
        assert!(matches!(missing, ConfigError::ReadFailed { .. }));
        Ok(())
    }
}
