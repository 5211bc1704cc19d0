/// Round-level tests
///
/// These exercise a full probe-then-report round with scripted probes and
/// real loopback UDP listeners:
/// - Outcome order and OSC message sequence per listener
/// - Independence of consecutive rounds
/// - Observer ordering and round state transitions
/// - Fixed-delay scheduling
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout};

use crate::monitoring::dispatcher::testing::{Script, ScriptedProber};
use crate::monitoring::scheduler::RoundState;
use crate::monitoring::types::ProbeOutcome;
use crate::monitoring::{ProbeDispatcher, ProbeTask, RoundScheduler};
use crate::osc::message::OscMessage;
use crate::osc::{ListenerSet, StatusNotifier};

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn task(label: &str, address: &str, path: &str) -> Arc<ProbeTask> {
    Arc::new(ProbeTask::parse(label, address, path).unwrap())
}

fn scenario_tasks() -> Vec<Arc<ProbeTask>> {
    vec![
        task("A", "10.0.0.1", "/room1/a"),
        task("B", "10.0.0.2", "/room1/b"),
        task("C", "10.0.0.3", "/room1/c"),
    ]
}

async fn listener() -> Result<(UdpSocket, u16)> {
    let socket = UdpSocket::bind("127.0.0.1:0").await?;
    let port = socket.local_addr()?.port();
    Ok((socket, port))
}

async fn scheduler_for(
    prober: Arc<ScriptedProber>,
    tasks: Vec<Arc<ProbeTask>>,
    port: u16,
    interval: Duration,
) -> Result<RoundScheduler> {
    let dispatcher = ProbeDispatcher::new(prober, Duration::from_millis(100))?;
    let notifier = StatusNotifier::bind(&ListenerSet::new(vec![ip("127.0.0.1")], port)?).await?;
    Ok(RoundScheduler::new(dispatcher, notifier, tasks, interval))
}

/// Read `count` datagrams and return their raw bytes.
async fn receive(socket: &UdpSocket, count: usize) -> Result<Vec<Vec<u8>>> {
    let mut packets = Vec::with_capacity(count);
    let mut buf = [0u8; 512];
    for _ in 0..count {
        let (len, _) = timeout(Duration::from_secs(2), socket.recv_from(&mut buf)).await??;
        packets.push(buf[..len].to_vec());
    }
    Ok(packets)
}

fn encoded(messages: &[(&str, i32)]) -> Vec<Vec<u8>> {
    messages.iter().map(|(address, value)| OscMessage::new(*address, *value).encode().to_vec()).collect()
}

#[tokio::test]
async fn test_scenario_round_outcomes_and_messages() -> Result<()> {
    let prober = Arc::new(ScriptedProber::default());
    prober.set(ip("10.0.0.1"), Script::Reply(Duration::from_millis(10)));
    prober.set(ip("10.0.0.2"), Script::Hang);
    prober.set(ip("10.0.0.3"), Script::Reply(Duration::from_millis(25)));

    let (socket, port) = listener().await?;
    let scheduler = scheduler_for(prober, scenario_tasks(), port, Duration::from_secs(1)).await?;

    let outcomes = scheduler.run_round().await;

    let latencies: Vec<i32> = outcomes.iter().map(ProbeOutcome::latency_millis).collect();
    assert_eq!(latencies.len(), 3);
    assert!(latencies[0] >= 10);
    assert_eq!(latencies[1], -1);
    assert!(latencies[2] >= 25);

    let packets = receive(&socket, 5).await?;
    assert_eq!(
        packets,
        encoded(&[
            ("/room1/a/available", 1),
            ("/room1/a/pingtime", latencies[0]),
            ("/room1/b/available", 0),
            ("/room1/c/available", 1),
            ("/room1/c/pingtime", latencies[2]),
        ])
    );
    Ok(())
}

#[tokio::test]
async fn test_consecutive_rounds_are_independent() -> Result<()> {
    let prober = Arc::new(ScriptedProber::default());
    prober.set(ip("10.0.0.1"), Script::Reply(Duration::from_millis(5)));
    prober.set(ip("10.0.0.2"), Script::Fail(Duration::from_millis(1)));
    prober.set(ip("10.0.0.3"), Script::Reply(Duration::from_millis(5)));

    let (socket, port) = listener().await?;
    let scheduler = scheduler_for(prober.clone(), scenario_tasks(), port, Duration::from_secs(1)).await?;

    let first = scheduler.run_round().await;
    assert_eq!(first.iter().filter(|o| o.is_reachable()).count(), 2);
    let first_packets = receive(&socket, 5).await?;
    assert_eq!(first_packets[2], encoded(&[("/room1/b/available", 0)])[0]);

    prober.set(ip("10.0.0.1"), Script::Fail(Duration::from_millis(1)));
    prober.set(ip("10.0.0.2"), Script::Reply(Duration::from_millis(5)));
    prober.set(ip("10.0.0.3"), Script::Hang);

    let second = scheduler.run_round().await;
    let reachable: Vec<bool> = second.iter().map(ProbeOutcome::is_reachable).collect();
    assert_eq!(reachable, vec![false, true, false]);

    let second_packets = receive(&socket, 4).await?;
    assert_eq!(
        second_packets,
        encoded(&[
            ("/room1/a/available", 0),
            ("/room1/b/available", 1),
            ("/room1/b/pingtime", second[1].latency_millis()),
            ("/room1/c/available", 0),
        ])
    );
    assert_eq!(prober.calls().len(), 6);
    Ok(())
}

#[tokio::test]
async fn test_observer_sees_outcomes_in_order_while_running() -> Result<()> {
    let prober = Arc::new(ScriptedProber::default());
    prober.set(ip("10.0.0.1"), Script::Reply(Duration::from_millis(30)));
    prober.set(ip("10.0.0.2"), Script::Reply(Duration::from_millis(1)));
    prober.set(ip("10.0.0.3"), Script::Fail(Duration::from_millis(1)));

    let (_socket, port) = listener().await?;
    let scheduler = scheduler_for(prober, scenario_tasks(), port, Duration::from_secs(1)).await?;
    let state = scheduler.subscribe_state();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = {
        let seen = seen.clone();
        let state = state.clone();
        move |outcome: &ProbeOutcome| {
            seen.lock().unwrap().push((outcome.task.label.clone(), *state.borrow()));
        }
    };
    let scheduler = scheduler.with_observer(recorder);

    assert_eq!(*state.borrow(), RoundState::Idle);
    scheduler.run_round().await;
    assert_eq!(*state.borrow(), RoundState::Idle);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            ("A".to_string(), RoundState::Running),
            ("B".to_string(), RoundState::Running),
            ("C".to_string(), RoundState::Running),
        ]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_rounds_are_spaced_by_fixed_delay() -> Result<()> {
    let prober = Arc::new(ScriptedProber::default());
    prober.set(ip("10.0.0.1"), Script::Reply(Duration::from_millis(80)));

    let (_socket, port) = listener().await?;
    let scheduler =
        scheduler_for(prober, vec![task("A", "10.0.0.1", "/a/a")], port, Duration::from_millis(50)).await?;

    let observed = Arc::new(Mutex::new(Vec::new()));
    let scheduler = {
        let observed = observed.clone();
        Arc::new(scheduler.with_observer(move |_: &ProbeOutcome| observed.lock().unwrap().push(Instant::now())))
    };

    let handle = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.abort();

    let observed = observed.lock().unwrap().clone();
    assert!(observed.len() >= 3, "expected at least 3 rounds, saw {}", observed.len());
    for pair in observed.windows(2) {
        let gap = pair[1] - pair[0];
        // 80 ms probe + 50 ms delay; the delay does not absorb the probe time
        assert!(gap >= Duration::from_millis(130), "rounds only {gap:?} apart");
        assert!(gap < Duration::from_millis(140), "rounds {gap:?} apart");
    }
    Ok(())
}

fn assert_send<T: Send>(_: &T) {}

#[tokio::test]
async fn test_scheduler_futures_can_be_spawned() -> Result<()> {
    let (_socket, port) = listener().await?;
    let scheduler =
        scheduler_for(Arc::new(ScriptedProber::default()), scenario_tasks(), port, Duration::from_secs(1)).await?;

    assert_send(&scheduler.run_round());
    assert_send(&scheduler.run());
    Ok(())
}
