//! AIM SDK - VEX AIM 机器人 Rust SDK
//!
//! 通过 WebSocket 控制 VEX AIM 机器人：运动、惯性传感器、屏幕、声音、LED、
//! 踢球器与 AI 视觉。
//!
//! # 分层
//!
//! - [`protocol`]: 状态文档、指令与音频帧的编解码
//! - [`ws`]: WebSocket 传输（tungstenite 与测试用 mock）
//! - [`driver`]: 四个通道的 IO 线程、状态同步与事件钩子
//! - [`client`]: 面向用户的 [`Robot`] 接口
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use aim_sdk::prelude::*;
//!
//! aim_sdk::init_logger();
//! let robot = RobotBuilder::new().host("192.168.4.1").build()?;
//! robot.screen().print("hello")?;
//! robot.move_for(200.0, 0.0, None, DriveVelocityUnits::Percent, true)?;
//! # Ok::<(), aim_sdk::RobotError>(())
//! ```

pub use aim_client as client;
pub use aim_driver as driver;
pub use aim_protocol as protocol;
pub use aim_ws as ws;

mod logging;
pub mod prelude;

pub use logging::{DEFAULT_LOG_FILTER, init_logger, try_init_logger};

// --- 用户以此为界 ---

// 客户端层（推荐使用）
pub use client::{Robot, RobotBuilder, RobotError, Settings};

// 驱动层（高级用户使用）
pub use driver::{AimDriver, AimDriverBuilder, DriverError, PipelineConfig};

// 协议与传输层错误
pub use protocol::ProtocolError;
pub use ws::WsError;
