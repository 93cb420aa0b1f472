//! 配置管理命令
//!
//! CLI 配置保存在 `<config_dir>/aim/cli.toml`，`AIM_CLI_CONFIG` 可以指定其他路径。

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// 配置文件路径的环境变量
pub const CONFIG_ENV: &str = "AIM_CLI_CONFIG";

/// 配置文件路径
pub fn config_file() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("aim");
    path.push("cli.toml");
    Ok(path)
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 默认机器人地址
    pub host: Option<String>,

    /// 阻塞式运动的超时（毫秒）
    pub motion_timeout_ms: Option<u64>,

    /// 平移距离超过该值（毫米）时需要确认
    pub confirm_distance_mm: Option<f64>,
}

impl CliConfig {
    /// 加载配置，文件不存在时返回默认值
    pub fn load() -> Result<Self> {
        let path = config_file()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    /// 保存配置
    pub fn save(&self) -> Result<()> {
        let path = config_file()?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("创建配置目录失败")?;
        }

        let body = toml::to_string_pretty(self).context("序列化配置失败")?;
        let content = format!("# AIM CLI Configuration\n\n{}", body);
        fs::write(&path, content).context("写入配置文件失败")?;
        Ok(())
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 默认机器人地址（如 192.168.4.1）
        #[arg(long)]
        host: Option<String>,

        /// 阻塞式运动的超时（毫秒）
        #[arg(long)]
        motion_timeout_ms: Option<u64>,

        /// 平移距离超过该值（毫米）时需要确认
        #[arg(long)]
        confirm_distance_mm: Option<f64>,
    },

    /// 获取配置项
    Get {
        /// 配置项名称（host / motion_timeout_ms / confirm_distance_mm / all）
        #[arg(default_value = "all")]
        key: String,
    },

    /// 检查配置文件
    Check,

    /// 打印配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Set {
                host,
                motion_timeout_ms,
                confirm_distance_mm,
            } => Self::set_(host, motion_timeout_ms, confirm_distance_mm),

            ConfigCommand::Get { key } => Self::get_(&key),

            ConfigCommand::Check => Self::check_(),

            ConfigCommand::Path => {
                println!("{}", config_file()?.display());
                Ok(())
            },
        }
    }

    fn set_(
        host: Option<String>,
        motion_timeout_ms: Option<u64>,
        confirm_distance_mm: Option<f64>,
    ) -> Result<()> {
        if host.is_none() && motion_timeout_ms.is_none() && confirm_distance_mm.is_none() {
            bail!("未指定任何配置项，请使用 --host / --motion-timeout-ms / --confirm-distance-mm");
        }

        let mut config = CliConfig::load()?;

        if let Some(host) = host {
            if host.trim().is_empty() {
                bail!("host 不能为空");
            }
            println!("✅ 设置默认机器人: {}", host);
            config.host = Some(host);
        }

        if let Some(ms) = motion_timeout_ms {
            println!("✅ 设置运动超时: {} ms", ms);
            config.motion_timeout_ms = Some(ms);
        }

        if let Some(mm) = confirm_distance_mm {
            if !mm.is_finite() || mm < 0.0 {
                bail!("confirm_distance_mm 必须是非负数");
            }
            println!("✅ 设置确认阈值: {} mm", mm);
            config.confirm_distance_mm = Some(mm);
        }

        config.save()
    }

    fn get_(key: &str) -> Result<()> {
        let config = CliConfig::load()?;
        let unset = || "(未设置)".to_string();

        match key {
            "host" => println!("{}", config.host.unwrap_or_else(unset)),
            "motion_timeout_ms" => println!(
                "{}",
                config.motion_timeout_ms.map_or_else(unset, |v| v.to_string())
            ),
            "confirm_distance_mm" => println!(
                "{}",
                config.confirm_distance_mm.map_or_else(unset, |v| v.to_string())
            ),
            "all" => {
                println!("AIM CLI 配置:");
                println!("  host: {:?}", config.host);
                println!("  motion_timeout_ms: {:?}", config.motion_timeout_ms);
                println!("  confirm_distance_mm: {:?}", config.confirm_distance_mm);
            },
            other => bail!("未知配置项: {}", other),
        }

        Ok(())
    }

    fn check_() -> Result<()> {
        let path = config_file()?;
        println!("配置文件: {}", path.display());
        if !path.exists() {
            println!("  (不存在，使用默认值)");
            return Ok(());
        }

        let config = CliConfig::load()?;
        println!("  ✅ 格式正确");
        println!("  host: {:?}", config.host);
        println!("  motion_timeout_ms: {:?}", config.motion_timeout_ms);
        println!("  confirm_distance_mm: {:?}", config.confirm_distance_mm);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_toml_roundtrip() {
        let config = CliConfig {
            host: Some("192.168.4.1".to_string()),
            motion_timeout_ms: Some(5000),
            confirm_distance_mm: None,
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("host = \"192.168.4.1\""));
        assert_eq!(toml::from_str::<CliConfig>(&text).unwrap(), config);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(toml::from_str::<CliConfig>("").unwrap(), CliConfig::default());
    }
}
