//! 连接设置（`settings.json`）
//!
//! 未显式指定主机时，从 `settings.json` 读取：
//!
//! ```json
//! { "connection": { "host": "192.168.4.1" } }
//! ```
//!
//! 查找顺序：
//! 1. 环境变量 `AIM_SETTINGS` 指向的文件
//! 2. 当前目录下的 `settings.json`
//! 3. 用户配置目录下的 `aim/settings.json`
//!
//! 都不存在时使用默认值（`localhost`）。

use crate::error::{Result, RobotError};
use aim_protocol::DEFAULT_HOST;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 指定设置文件路径的环境变量
pub const SETTINGS_ENV: &str = "AIM_SETTINGS";

/// 设置文件名
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// 连接配置段
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// 机器人主机名或 IP
    pub host: Option<String>,
}

/// `settings.json` 内容
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub connection: ConnectionSettings,
}

impl Settings {
    /// 按查找顺序加载设置；文件不存在时返回默认值
    pub fn load() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No {} found, using default settings", SETTINGS_FILE_NAME);
                Ok(Self::default())
            },
        }
    }

    /// 从指定文件加载
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            RobotError::Settings(format!("could not read {}: {}", path.display(), e))
        })?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            RobotError::Settings(format!("could not parse {}: {}", path.display(), e))
        })?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// 查找第一个存在的设置文件
    pub fn find() -> Option<PathBuf> {
        Self::candidates().into_iter().find(|p| p.is_file())
    }

    /// 按优先级排列的候选路径
    pub fn candidates() -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(3);
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from(SETTINGS_FILE_NAME));
        if let Some(mut dir) = dirs::config_dir() {
            dir.push("aim");
            dir.push(SETTINGS_FILE_NAME);
            paths.push(dir);
        }
        paths
    }

    /// 机器人主机（默认 `localhost`）
    pub fn host(&self) -> &str {
        self.connection.host.as_deref().unwrap_or(DEFAULT_HOST)
    }
}
