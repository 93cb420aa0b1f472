//! 多线程共享测试
//!
//! 验证：
//! 1. `Arc<Robot>` 可以在多个线程上同时发送指令
//! 2. 状态读取不阻塞指令发送
//! 3. 指令通道断开不影响状态线程

use aim_sdk::prelude::*;
use aim_sdk::protocol::{WS_COMMAND, WS_STATUS};
use aim_sdk::ws::{MockNetwork, MockReply};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn mock_network() -> MockNetwork {
    let network = MockNetwork::new();
    network.transport(WS_STATUS).set_responder(|msg| {
        (msg.as_bytes() == [1]).then(|| {
            MockReply::Text(r#"{"robot":{"flags":"0x00000400","battery":90,"heading":0}}"#.into())
        })
    });
    network.transport(WS_COMMAND).set_responder(|msg| {
        let value: serde_json::Value = serde_json::from_slice(msg.as_bytes()).ok()?;
        let cmd_id = value["cmd_id"].as_str()?.to_string();
        Some(MockReply::Text(format!(
            r#"{{"cmd_id":"{}","status":"complete"}}"#,
            cmd_id
        )))
    });
    network
}

fn connect(network: &MockNetwork) -> Robot {
    RobotBuilder::new()
        .host("mock-robot")
        .config(PipelineConfig {
            status_interval_ms: 5,
            read_timeout_ms: 50,
            reconnect_interval_ms: 20,
            command_timeout_ms: 1000,
            startup_timeout_ms: 1000,
            ..PipelineConfig::default()
        })
        .transport_factory(network.factory())
        .build()
        .unwrap()
}

#[test]
fn test_robot_shared_across_threads() {
    let network = mock_network();
    let robot = Arc::new(connect(&network));
    let (tx, rx) = crossbeam_channel::unbounded();

    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let robot = Arc::clone(&robot);
            let tx = tx.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    let result = if i % 2 == 0 {
                        robot.led().on(i, Color::GREEN)
                    } else {
                        robot.move_at(0.0, Some(0.0), DriveVelocityUnits::Mmps)
                    };
                    let _ = tx.send(result.is_ok());
                }
            })
        })
        .collect();
    drop(tx);

    for handle in handles {
        handle.join().unwrap();
    }
    let results: Vec<bool> = rx.iter().collect();
    assert_eq!(results.len(), 80);
    assert!(results.iter().all(|ok| *ok));

    // program_init + 80 条
    assert_eq!(network.transport(WS_COMMAND).sent().len(), 81);
    assert_eq!(robot.driver().metrics().commands_sent, 81);
}

#[test]
fn test_status_reads_do_not_block_commands() {
    let network = mock_network();
    let robot = Arc::new(connect(&network));

    let reader = {
        let robot = Arc::clone(&robot);
        thread::spawn(move || {
            let start = Instant::now();
            let mut reads = 0u64;
            while start.elapsed() < Duration::from_millis(300) {
                assert_eq!(robot.get_battery_capacity(), 90.0);
                reads += 1;
            }
            reads
        })
    };

    let start = Instant::now();
    for _ in 0..20 {
        robot.screen().print("tick").unwrap();
    }
    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(reader.join().unwrap() > 0);
}

#[test]
fn test_status_survives_command_channel_loss() {
    let network = mock_network();
    let robot = connect(&network);

    let cmd = network.transport(WS_COMMAND);
    cmd.set_reconnect_fails(true);
    cmd.disconnect();

    assert!(matches!(
        robot.kicker().kick(KickType::Soft),
        Err(RobotError::Disconnected(_))
    ));
    robot
        .driver()
        .wait_for_status_updates(3, Duration::from_secs(1))
        .unwrap();
    assert_eq!(robot.inertial().get_heading(), 0.0);
}
