//! 客户端接口模块
//!
//! 本模块提供 VEX AIM 机器人的用户友好接口，包括：
//! - 运动：平移、旋转、定距运动与阻塞等待
//! - 惯性传感器：航向、旋转量、加速度、碰撞检测
//! - 屏幕、声音、LED、踢球器
//! - AI 视觉：AprilTag、颜色、颜色码与模型对象
//!
//! # 使用场景
//!
//! 这是大多数用户应该使用的模块。
//! 如果需要直接发送协议指令，可以使用 `aim-driver`。
//!
//! # 示例
//!
//! ```rust,no_run
//! use aim_client::{Color, DriveVelocityUnits, LightType, RobotBuilder, TurnType, TurnVelocityUnits};
//!
//! let robot = RobotBuilder::new().host("192.168.4.1").build()?;
//! robot.led().on(LightType::All, Color::GREEN)?;
//! robot.move_for(300.0, 0.0, None, DriveVelocityUnits::Percent, true)?;
//! robot.turn_for(TurnType::Right, 90.0, None, TurnVelocityUnits::Percent, true)?;
//! println!("heading {}", robot.inertial().get_heading());
//! # Ok::<(), aim_client::RobotError>(())
//! ```

pub mod builder;
pub mod error;
pub mod inertial;
pub mod kicker;
pub mod led;
pub(crate) mod raw_commander;
pub mod robot;
pub mod screen;
pub mod settings;
pub mod sound;
pub mod timer;
pub mod types;
pub mod vision;

// 重新导出常用类型
pub use builder::RobotBuilder;
pub use error::{Result, RobotError};
pub use inertial::Inertial;
pub use kicker::Kicker;
pub use led::Led;
pub use robot::{DEFAULT_MOTION_TIMEOUT, Robot};
pub use screen::Screen;
pub use settings::{ConnectionSettings, Settings};
pub use sound::Sound;
pub use timer::{Timer, sleep, spawn, wait};
pub use types::*;
pub use vision::AiVision;

// 用户代码常用的协议类型
pub use aim_protocol::{
    AiVisionObject, CodeDesc, Color, ColorDesc, EmojiLookType, EmojiType, FontType, KickType,
    LightType, SensitivityType, SoundType, VisionDescriptor, VisionObject,
};
