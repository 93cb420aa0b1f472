//! 状态解析与视觉过滤基准测试
//!
//! 状态线程每 50ms 解析一次完整状态文档，这里测量解析与 get_data 的开销。

use aim_protocol::vision::get_data;
use aim_protocol::{Command, RobotStatus, VisionObject};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn sample_status() -> String {
    let objects: Vec<String> = (0..24)
        .map(|i| {
            format!(
                r#"{{"type": {}, "id": {}, "type_str": "x", "originx": {}, "originy": {},
                    "width": {}, "height": {}, "score": "{}", "name": "obj", "angle": 1200,
                    "x0": 1, "x1": 2, "x2": 3, "x3": 4, "y0": 5, "y1": 6, "y2": 7, "y3": 8}}"#,
                1 << (i % 4),
                i % 4,
                i * 10,
                i * 5,
                10 + i,
                20 + i,
                50 + i
            )
        })
        .collect();

    format!(
        r#"{{
            "controller": {{"flags": "0x0000", "stick_x": 0, "stick_y": 0, "battery": 0}},
            "robot": {{
                "flags": "0x00000422", "battery": 87, "touch_flags": "0x0000",
                "touch_x": 0, "touch_y": 0, "robot_x": "105.5", "robot_y": "-20.25",
                "roll": "1.2", "pitch": "-0.5", "yaw": "12.0", "heading": "270.5",
                "rotation": "-450.25",
                "acceleration": {{"x": "0.01", "y": "0.02", "z": "-1.0"}},
                "gyro_rate": {{"x": "0", "y": "0", "z": "35.5"}},
                "screen": {{"row": "1", "column": "1"}}
            }},
            "aivision": {{
                "classnames": {{"count": 4, "items": [
                    {{"index": 0, "name": "SportsBall"}}, {{"index": 1, "name": "BlueBarrel"}},
                    {{"index": 2, "name": "OrangeBarrel"}}, {{"index": 3, "name": "Robot"}}
                ]}},
                "objects": {{"count": 24, "items": [{}]}}
            }}
        }}"#,
        objects.join(",")
    )
}

fn bench_parse_status(c: &mut Criterion) {
    let json = sample_status();
    c.bench_function("parse_status_24_objects", |b| {
        b.iter(|| RobotStatus::parse(black_box(&json)))
    });
}

fn bench_get_data(c: &mut Criterion) {
    let status = RobotStatus::parse(&sample_status()).expect("sample status must parse");
    let desc = VisionObject::ALL_VISION;
    c.bench_function("get_data_all_vision", |b| {
        b.iter(|| get_data(black_box(&status.aivision), &desc, 24))
    });
}

fn bench_command_json(c: &mut Criterion) {
    let cmd = Command::DriveFor {
        distance: 200.0,
        angle: 45.0,
        final_heading: 0.0,
        drive_speed: 100,
        turn_speed: 75,
        stacking_type: 0,
    };
    c.bench_function("command_to_json", |b| b.iter(|| black_box(&cmd).to_json()));
}

criterion_group!(benches, bench_parse_status, bench_get_data, bench_command_json);
criterion_main!(benches);
