//! One-shot 模式
//!
//! 每个命令独立执行：
//! 1. 读取配置
//! 2. 连接机器人
//! 3. 执行操作
//! 4. 断开连接

use crate::commands::config::CliConfig;
use crate::safety::SafetyChecker;
use aim_sdk::prelude::*;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

/// One-shot 模式
pub struct OneShotMode {
    config: CliConfig,
    /// 命令行 `--host`，优先于配置文件
    host: Option<String>,
}

impl OneShotMode {
    pub fn new(host: Option<String>) -> Result<Self> {
        let config = CliConfig::load()?;
        Ok(Self { config, host })
    }

    /// 目标机器人：`--host` > cli.toml > settings.json
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref().or(self.config.host.as_deref())
    }

    pub fn safety(&self) -> SafetyChecker {
        SafetyChecker::new(self.config.confirm_distance_mm)
    }

    /// 连接机器人
    pub fn connect(&self) -> Result<Robot> {
        let mut builder = RobotBuilder::new();
        if let Some(host) = self.host() {
            builder = builder.host(host);
        }
        if let Some(ms) = self.config.motion_timeout_ms {
            builder = builder.motion_timeout(Duration::from_millis(ms));
        }

        println!("⏳ 连接到机器人{}...", self.host().map(|h| format!(" {}", h)).unwrap_or_default());
        let robot = builder.build().context("连接机器人失败")?;
        debug!("connected, battery {}%", robot.get_battery_capacity());
        println!("✅ 已连接（电量 {}%）", robot.get_battery_capacity());
        Ok(robot)
    }
}
