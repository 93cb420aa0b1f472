//! 使用 MockNetwork 的 Robot 集成测试

use aim_client::{
    Color, DriveVelocityUnits, LightType, Robot, RobotBuilder, RobotError, TurnType,
    TurnVelocityUnits, VisionObject,
};
use aim_driver::PipelineConfig;
use aim_protocol::{StatusFlags, WS_AUDIO, WS_COMMAND, WS_IMAGE, WS_STATUS};
use aim_ws::{MockNetwork, MockReply};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// 模拟机器人
///
/// 状态通道回复 `body`（`robot.flags` 取自 `flags`）；指令通道全部回复 complete。
/// `hold_motion` 为 true 时，收到定距运动指令后机器人一直上报“运动中”。
struct MockRobot {
    network: MockNetwork,
    flags: Arc<AtomicU32>,
    body: Arc<Mutex<Value>>,
    hold_motion: Arc<AtomicBool>,
}

impl MockRobot {
    fn new(body: Value) -> Self {
        let network = MockNetwork::new();
        let flags = Arc::new(AtomicU32::new(StatusFlags::PROG_ACTIVE.bits()));
        let body = Arc::new(Mutex::new(body));
        let hold_motion = Arc::new(AtomicBool::new(false));

        let status_flags = Arc::clone(&flags);
        let status_body = Arc::clone(&body);
        network.transport(WS_STATUS).set_responder(move |msg| {
            if msg.as_bytes() != [1] {
                return None;
            }
            let mut doc = status_body.lock().clone();
            doc["robot"]["flags"] =
                Value::String(format!("0x{:08X}", status_flags.load(Ordering::SeqCst)));
            Some(MockReply::Text(doc.to_string()))
        });

        let cmd_flags = Arc::clone(&flags);
        let cmd_hold = Arc::clone(&hold_motion);
        network.transport(WS_COMMAND).set_responder(move |msg| {
            let value: Value = serde_json::from_slice(msg.as_bytes()).ok()?;
            let cmd_id = value["cmd_id"].as_str()?.to_string();
            if cmd_hold.load(Ordering::SeqCst) {
                let motion = match cmd_id.as_str() {
                    "drive_for" => StatusFlags::IS_MOVE_ACTIVE | StatusFlags::IS_MOVING,
                    "turn_for" | "turn_to" => StatusFlags::IS_TURN_ACTIVE | StatusFlags::IS_MOVING,
                    _ => StatusFlags::empty(),
                };
                cmd_flags.fetch_or(motion.bits(), Ordering::SeqCst);
            }
            Some(MockReply::Text(format!(
                r#"{{"cmd_id":"{}","status":"complete"}}"#,
                cmd_id
            )))
        });

        Self {
            network,
            flags,
            body,
            hold_motion,
        }
    }

    fn connect(&self, config: PipelineConfig) -> Robot {
        self.builder(config).build().unwrap()
    }

    fn builder(&self, config: PipelineConfig) -> RobotBuilder {
        RobotBuilder::new()
            .host("mock-robot")
            .config(config)
            .transport_factory(self.network.factory())
    }

    fn set_flags(&self, flags: StatusFlags) {
        self.flags.store(flags.bits(), Ordering::SeqCst);
    }

    /// 指令通道上发出的、`cmd_id` 匹配的全部指令
    fn commands(&self, cmd_id: &str) -> Vec<Value> {
        self.network
            .transport(WS_COMMAND)
            .sent_text()
            .iter()
            .filter_map(|s| serde_json::from_str::<Value>(s).ok())
            .filter(|v| v["cmd_id"] == cmd_id)
            .collect()
    }

    fn last_command(&self, cmd_id: &str) -> Value {
        self.commands(cmd_id)
            .pop()
            .unwrap_or_else(|| panic!("no {} command sent", cmd_id))
    }
}

fn fast_config() -> PipelineConfig {
    PipelineConfig {
        status_interval_ms: 5,
        read_timeout_ms: 50,
        reconnect_interval_ms: 20,
        command_timeout_ms: 1000,
        startup_timeout_ms: 1000,
        image_wait_ms: 300,
        ..PipelineConfig::default()
    }
}

fn default_body() -> Value {
    json!({
        "robot": {
            "battery": 80,
            "heading": 90.0,
            "rotation": 10.0,
            "robot_x": 100.0,
            "robot_y": 0.0,
        }
    })
}

fn default_robot() -> (MockRobot, Robot) {
    let mock = MockRobot::new(default_body());
    let robot = mock.connect(fast_config());
    (mock, robot)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

// ==================== 启动 ====================

#[test]
fn test_build_resets_heading() {
    let (_mock, robot) = default_robot();

    assert_eq!(robot.inertial().heading_offset(), 90.0);
    assert_eq!(robot.inertial().get_heading(), 0.0);
    assert_eq!(robot.inertial().get_heading_raw(), 90.0);
    assert_eq!(robot.get_battery_capacity(), 80.0);
    assert_eq!(robot.drive_speed(), 100);
    assert_eq!(robot.turn_speed(), 75);
    assert!(robot.is_connected());
}

// ==================== 平移 ====================

#[test]
fn test_move_at_speed_resolution() {
    let (mock, robot) = default_robot();

    robot.move_at(45.0, Some(50.0), DriveVelocityUnits::Percent).unwrap();
    let cmd = mock.last_command("drive");
    assert_eq!(cmd["angle"], 45.0);
    assert_eq!(cmd["speed"], 100);
    assert_eq!(cmd["stacking_type"], 0);

    robot.move_at(0.0, None, DriveVelocityUnits::Percent).unwrap();
    assert_eq!(mock.last_command("drive")["speed"], 100);

    robot.set_move_velocity(150.0, DriveVelocityUnits::Mmps).unwrap();
    robot.move_at(0.0, None, DriveVelocityUnits::Percent).unwrap();
    assert_eq!(mock.last_command("drive")["speed"], 150);
}

#[test]
fn test_negative_velocity_rejected() {
    let (_mock, robot) = default_robot();

    assert!(matches!(
        robot.set_move_velocity(-1.0, DriveVelocityUnits::Percent),
        Err(RobotError::InvalidInput(_))
    ));
    assert!(matches!(
        robot.set_turn_velocity(-1.0, TurnVelocityUnits::Dps),
        Err(RobotError::InvalidInput(_))
    ));
    assert_eq!(robot.drive_speed(), 100);
}

#[test]
fn test_move_for_negative_velocity_flips_distance() {
    let (mock, robot) = default_robot();

    robot
        .move_for(200.0, 0.0, Some(-50.0), DriveVelocityUnits::Percent, false)
        .unwrap();
    let cmd = mock.last_command("drive_for");
    assert_eq!(cmd["distance"], -200.0);
    assert_eq!(cmd["drive_speed"], 100);
    assert_eq!(cmd["turn_speed"], 75);
    assert_eq!(cmd["final_heading"], 0.0);
}

#[test]
fn test_move_for_waits_until_motion_ends() {
    let (mock, robot) = default_robot();
    mock.hold_motion.store(true, Ordering::SeqCst);

    let flags = Arc::clone(&mock.flags);
    let releaser = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(300));
        flags.store(StatusFlags::PROG_ACTIVE.bits(), Ordering::SeqCst);
    });

    let start = Instant::now();
    robot
        .move_for(100.0, 0.0, None, DriveVelocityUnits::Percent, true)
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(250));
    assert!(!robot.is_move_active());
    releaser.join().unwrap();
}

#[test]
fn test_move_with_vectors_wheel_speeds() {
    let (mock, robot) = default_robot();

    robot.move_with_vectors(100.0, 0.0, 0.0).unwrap();
    let cmd = mock.last_command("spin_wheels");
    assert_eq!(cmd["vel1"], 173);
    assert_eq!(cmd["vel2"], -173);
    assert_eq!(cmd["vel3"], 0);

    // 超出范围按 100% 处理
    robot.move_with_vectors(500.0, 0.0, 0.0).unwrap();
    assert_eq!(mock.last_command("spin_wheels")["vel1"], 173);

    robot.move_with_vectors(0.0, 0.0, 50.0).unwrap();
    let cmd = mock.last_command("spin_wheels");
    assert_eq!(cmd["vel1"], 90);
    assert_eq!(cmd["vel2"], 90);
    assert_eq!(cmd["vel3"], 90);

    robot.move_with_vectors(0.0, 50.0, 0.0).unwrap();
    let cmd = mock.last_command("spin_wheels");
    assert_eq!(cmd["vel1"], 50);
    assert_eq!(cmd["vel2"], 50);
    assert_eq!(cmd["vel3"], -100);
}

// ==================== 旋转 ====================

#[test]
fn test_turn_direction_signs() {
    let (mock, robot) = default_robot();

    robot.turn(TurnType::Left, Some(50.0), TurnVelocityUnits::Percent).unwrap();
    assert_eq!(mock.last_command("turn")["turn_rate"], -90);

    robot.turn(TurnType::Right, None, TurnVelocityUnits::Percent).unwrap();
    assert_eq!(mock.last_command("turn")["turn_rate"], 75);

    robot
        .turn_for(TurnType::Left, 90.0, None, TurnVelocityUnits::Percent, false)
        .unwrap();
    let cmd = mock.last_command("turn_for");
    assert_eq!(cmd["angle"], -90.0);
    assert_eq!(cmd["turn_rate"], 75);
}

#[test]
fn test_turn_to_applies_heading_offset() {
    let (mock, robot) = default_robot();

    robot.turn_to(45.0, None, TurnVelocityUnits::Percent, false).unwrap();
    let cmd = mock.last_command("turn_to");
    assert_eq!(cmd["heading"], 135.0);
    assert_eq!(cmd["turn_rate"], 75);

    robot
        .turn_to(-30.0, Some(-50.0), TurnVelocityUnits::Percent, false)
        .unwrap();
    let cmd = mock.last_command("turn_to");
    assert_eq!(cmd["heading"], 60.0);
    assert_eq!(cmd["turn_rate"], 90);

    assert!(matches!(
        robot.turn_to(360.0, None, TurnVelocityUnits::Percent, false),
        Err(RobotError::InvalidInput(_))
    ));
    assert_eq!(mock.commands("turn_to").len(), 2);
}

#[test]
fn test_motion_timeout_stops_robot() {
    let mock = MockRobot::new(default_body());
    mock.hold_motion.store(true, Ordering::SeqCst);
    let robot = mock
        .builder(fast_config())
        .motion_timeout(Duration::from_millis(300))
        .build()
        .unwrap();

    let start = Instant::now();
    let err = robot
        .turn_for(TurnType::Right, 90.0, None, TurnVelocityUnits::Percent, true)
        .unwrap_err();
    assert!(matches!(err, RobotError::Timeout(_)));
    assert!(err.is_retryable());
    assert!(start.elapsed() < Duration::from_secs(2));

    assert_eq!(mock.last_command("drive")["speed"], 0);
    assert_eq!(mock.last_command("turn")["turn_rate"], 0);
}

#[test]
fn test_stop_all_movement_reports_stopped() {
    let mock = MockRobot::new(default_body());
    mock.set_flags(StatusFlags::PROG_ACTIVE | StatusFlags::IS_MOVING);
    let robot = mock.connect(PipelineConfig {
        status_interval_ms: 100,
        ..fast_config()
    });
    assert!(!robot.is_stopped());

    robot.stop_all_movement().unwrap();
    assert!(robot.is_stopped());
}

// ==================== 位置 ====================

#[test]
fn test_position_follows_heading_offset() {
    let (mock, robot) = default_robot();

    // 航向零点 90 度：机器人坐标系的 x 轴变为用户坐标系的 y 轴
    assert!(robot.get_x_position().abs() < 1e-9);
    assert_close(robot.get_y_position(), 100.0);

    robot.set_xy_position(10.0, 20.0).unwrap();
    let cmd = mock.last_command("set_pose");
    assert_close(cmd["x"].as_f64().unwrap(), 20.0);
    assert_close(cmd["y"].as_f64().unwrap(), -10.0);
}

#[test]
fn test_heading_and_rotation_offsets() {
    let (_mock, robot) = default_robot();
    let inertial = robot.inertial();

    inertial.set_heading(30.0);
    assert_eq!(inertial.get_heading(), 30.0);
    inertial.set_heading(-30.0);
    assert_eq!(inertial.get_heading(), 330.0);

    // 舍入到 360 时回绕为 0
    inertial.set_heading(359.996);
    let heading = inertial.get_heading();
    assert!((0.0..360.0).contains(&heading), "heading {}", heading);
    assert_eq!(heading, 0.0);

    assert_eq!(inertial.get_rotation(), 10.0);
    inertial.reset_rotation();
    assert_eq!(inertial.get_rotation(), 0.0);
}

// ==================== 屏幕与 LED ====================

#[test]
fn test_show_file_checks_extension() {
    let (mock, robot) = default_robot();

    assert!(matches!(
        robot.screen().show_file("logo.jpg", 0, 0),
        Err(RobotError::InvalidImageFile(_))
    ));
    assert!(mock.commands("lcd_draw_image_from_file").is_empty());

    robot.screen().show_file("logo.png", 10, 20).unwrap();
    let cmd = mock.last_command("lcd_draw_image_from_file");
    assert_eq!(cmd["filename"], "logo.png");
    assert_eq!(cmd["x"], 10);
}

#[test]
fn test_draw_rectangle_uses_fill_color() {
    let (mock, robot) = default_robot();

    robot.screen().set_fill_color(Color::RED).unwrap();
    robot.screen().draw_rectangle(0, 0, 50, 20, None).unwrap();
    let cmd = mock.last_command("lcd_draw_rectangle");
    assert_eq!(cmd["r"], 255);
    assert_eq!(cmd["g"], 0);
    assert_eq!(cmd["b"], 0);
    assert_eq!(cmd["b_transparency"], false);

    robot.screen().draw_rectangle(0, 0, 50, 20, Some(Color::GREEN)).unwrap();
    let cmd = mock.last_command("lcd_draw_rectangle");
    assert_eq!(cmd["g"], 255);
    assert_eq!(robot.screen().fill_color(), Color::RED);
}

#[test]
fn test_led_targets_and_colors() {
    let (mock, robot) = default_robot();

    robot.led().on(1, Color::RED).unwrap();
    assert_eq!(mock.last_command("light_set")["light2"], json!({"r": 255, "g": 0, "b": 0}));

    robot.led().on(LightType::All, true).unwrap();
    assert_eq!(
        mock.last_command("light_set")["all"],
        json!({"r": 128, "g": 128, "b": 128})
    );

    robot.led().off(LightType::Led3).unwrap();
    assert_eq!(mock.last_command("light_set")["light3"], json!({"r": 0, "g": 0, "b": 0}));
}

// ==================== 声音 ====================

#[test]
fn test_play_note_clamps_and_marks_active() {
    let mock = MockRobot::new(default_body());
    let robot = mock.connect(PipelineConfig {
        status_interval_ms: 200,
        ..fast_config()
    });
    assert!(!robot.sound().is_active());

    robot.sound().play_note("C5", 9000, 150).unwrap();
    assert!(robot.sound().is_active());

    let cmd = mock.last_command("play_note");
    assert_eq!(cmd["note"], 0);
    assert_eq!(cmd["octave"], 0);
    assert_eq!(cmd["duration"], 4000);
    assert_eq!(cmd["volume"], 100);

    assert!(matches!(
        robot.sound().play_note("H5", 500, 50),
        Err(RobotError::Protocol(_))
    ));
}

#[test]
fn test_play_local_file_uploads_wav() {
    let (mock, robot) = default_robot();
    let dir = tempfile::tempdir().unwrap();

    let mut wav = Vec::new();
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&136u32.to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.resize(144, 0);
    let path = dir.path().join("beep.wav");
    std::fs::write(&path, &wav).unwrap();

    robot.sound().play_local_file(&path, 80).unwrap();
    let sent = mock.network.transport(WS_AUDIO).sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].len(), 64 + wav.len());

    let text = dir.path().join("notes.txt");
    std::fs::write(&text, b"hello").unwrap();
    assert!(matches!(
        robot.sound().play_local_file(&text, 80),
        Err(RobotError::InvalidSoundFile(_))
    ));

    assert!(matches!(
        robot.sound().play_local_file(dir.path().join("missing.wav"), 80),
        Err(RobotError::Io(_))
    ));
}

// ==================== AI 视觉 ====================

fn vision_body() -> Value {
    let mut body = default_body();
    body["aivision"] = json!({
        "objects": {
            "count": 2,
            "items": [
                {"type": 4, "id": 1, "originx": 140, "originy": 170, "width": 40, "height": 40, "score": 90},
                {"type": 4, "id": 0, "originx": 0, "originy": 0, "width": 10, "height": 10, "score": 80},
                {"type": 4, "id": 2, "originx": 140, "originy": 170, "width": 40, "height": 40, "score": 80},
            ]
        }
    });
    body
}

#[test]
fn test_held_objects() {
    let mock = MockRobot::new(vision_body());
    let robot = mock.connect(fast_config());

    assert!(robot.has_blue_barrel());
    assert!(robot.has_any_barrel());
    // 第三个对象超出 count，不参与
    assert!(!robot.has_orange_barrel());
    // 球不在踢球器前方
    assert!(!robot.has_sports_ball());
}

#[test]
fn test_vision_get_data_records_last_query() {
    let mock = MockRobot::new(vision_body());
    let robot = mock.connect(fast_config());
    let vision = robot.vision();

    let all = vision.get_data(&VisionObject::ALL_AIOBJS, 8);
    assert_eq!(all.len(), 2);
    assert_eq!(vision.object_count(), 2);
    let largest = vision.largest_object().unwrap();
    assert_eq!(largest.classname, "BlueBarrel");
    assert_eq!(largest.area, 1600);

    let balls = vision.get_data(&VisionObject::SPORTS_BALL, 8);
    assert_eq!(balls.len(), 1);
    assert_eq!(vision.object_count(), 1);

    assert!(vision.get_data(&VisionObject::ALL_TAGS, 8).is_empty());
    assert_eq!(vision.object_count(), 0);
    assert!(vision.largest_object().is_none());
}

#[test]
fn test_camera_image_without_frames() {
    let (_mock, robot) = default_robot();

    assert!(matches!(
        robot.vision().get_camera_image(),
        Err(RobotError::NoImage)
    ));
    assert!(robot.vision().is_streaming());
}

#[test]
fn test_camera_image_starts_stream() {
    let mock = MockRobot::new(default_body());
    mock.network.transport(WS_IMAGE).set_responder(|msg| {
        (msg.as_bytes() == [1]).then(|| MockReply::Binary(vec![0xFF, 0xD8, 0xFF, 0xD9]))
    });
    let robot = mock.connect(PipelineConfig {
        read_timeout_ms: 500,
        image_wait_ms: 1000,
        ..fast_config()
    });

    assert!(!robot.vision().is_streaming());
    let image = robot.vision().get_camera_image().unwrap();
    assert_eq!(*image, vec![0xFF, 0xD8, 0xFF, 0xD9]);

    // 已在推流，直接返回最新图像
    let again = robot.vision().get_camera_image().unwrap();
    assert_eq!(*again, *image);
}

// ==================== 生命周期 ====================

#[test]
fn test_wait_for_shutdown() {
    let (mock, robot) = default_robot();

    assert!(!robot.wait_for_shutdown(Some(Duration::from_millis(100))));

    mock.set_flags(StatusFlags::PROG_ACTIVE | StatusFlags::PWR_BUTTON);
    assert!(robot.wait_for_shutdown(Some(Duration::from_secs(2))));
    assert!(robot.shutdown_requested());
}

#[test]
fn test_disconnected_command_channel() {
    let (mock, robot) = default_robot();
    let cmd = mock.network.transport(WS_COMMAND);
    cmd.set_reconnect_fails(true);
    cmd.disconnect();

    let err = robot
        .move_at(0.0, None, DriveVelocityUnits::Percent)
        .unwrap_err();
    assert!(matches!(err, RobotError::Disconnected(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_controller_and_status_passthrough() {
    let (mock, robot) = default_robot();
    *mock.body.lock() = json!({
        "robot": {"battery": 55, "heading": 90.0},
        "controller": {"stick_x": 12, "stick_y": -40, "battery": 70},
    });
    robot
        .driver()
        .wait_for_status_updates(2, Duration::from_secs(1))
        .unwrap();

    assert_eq!(robot.get_battery_capacity(), 55.0);
    let controller = robot.controller();
    assert_eq!(controller.stick_x, 12);
    assert_eq!(controller.stick_y, -40);
    assert_eq!(robot.status().controller.battery, 70.0);
}
