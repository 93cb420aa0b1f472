//! 命令定义和实现

pub mod config;
pub mod emoji;
pub mod led;
pub mod r#move;
pub mod play;
pub mod snapshot;
pub mod status;
pub mod stop;
pub mod turn;

pub use config::ConfigCommand;
pub use emoji::EmojiCommand;
pub use led::LedCommand;
pub use r#move::MoveCommand;
pub use play::PlayCommand;
pub use snapshot::SnapshotCommand;
pub use status::StatusCommand;
pub use stop::StopCommand;
pub use turn::TurnCommand;
