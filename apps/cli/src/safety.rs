//! 安全检查模块
//!
//! 长距离平移在执行前需要用户确认。

use anyhow::Result;

/// 默认确认阈值（毫米）
pub const DEFAULT_CONFIRM_DISTANCE_MM: f64 = 1000.0;

/// 安全检查器
pub struct SafetyChecker {
    confirm_distance_mm: f64,
}

impl SafetyChecker {
    pub fn new(confirm_distance_mm: Option<f64>) -> Self {
        Self {
            confirm_distance_mm: confirm_distance_mm.unwrap_or(DEFAULT_CONFIRM_DISTANCE_MM),
        }
    }

    /// 平移距离是否需要确认
    pub fn requires_confirmation(&self, distance_mm: f64) -> bool {
        distance_mm.abs() > self.confirm_distance_mm
    }

    /// 显示确认提示，默认为 No
    pub fn confirm_distance(&self, distance_mm: f64) -> Result<bool> {
        println!("⚠️  长距离移动");
        println!("  距离: {:.0} mm（阈值 {:.0} mm）", distance_mm, self.confirm_distance_mm);

        let confirmed = inquire::Confirm::new("确定要继续吗？")
            .with_default(false)
            .prompt()
            .map_err(|e| anyhow::anyhow!("用户交互失败: {}", e))?;

        Ok(confirmed)
    }
}

impl Default for SafetyChecker {
    fn default() -> Self {
        Self::new(None)
    }
}
