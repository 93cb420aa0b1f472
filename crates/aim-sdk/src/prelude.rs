//! Prelude - 常用类型的便捷导入
//!
//! 大多数用户应该使用这个模块来导入常用类型：
//!
//! ```rust
//! use aim_sdk::prelude::*;
//! ```

// 客户端层（推荐使用）
pub use crate::client::{
    AiVision, Inertial, Kicker, Led, Robot, RobotBuilder, Screen, Settings, Sound, Timer,
};
pub use crate::client::{sleep, spawn, wait};
// 单位与参数类型
pub use crate::client::types::*;

// 常用协议类型
pub use crate::protocol::{
    AiVisionObject, CodeDesc, Color, ColorDesc, EmojiLookType, EmojiType, FontType, KickType,
    LightType, RobotStatus, SensitivityType, SoundType, StatusFlags, VisionDescriptor,
    VisionObject,
};

// 驱动层（高级用户使用）
pub use crate::driver::{CallbackKind, PipelineConfig, RobotEvent};

// 错误类型
pub use crate::client::RobotError;
pub use crate::driver::DriverError;
pub use crate::protocol::ProtocolError;
