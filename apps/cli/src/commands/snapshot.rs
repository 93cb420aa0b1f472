//! 相机截图命令

use crate::modes::oneshot::OneShotMode;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// 截图命令参数
#[derive(Args, Debug)]
pub struct SnapshotCommand {
    /// 输出文件
    #[arg(short, long, default_value = "aim_img.jpg")]
    pub output: PathBuf,
}

impl SnapshotCommand {
    pub fn execute(&self, mode: &OneShotMode) -> Result<()> {
        let robot = mode.connect()?;

        println!("📷 获取图像...");
        let image = robot.vision().get_camera_image()?;
        std::fs::write(&self.output, image.as_slice())
            .with_context(|| format!("写入 {} 失败", self.output.display()))?;
        robot.vision().stop_stream()?;

        println!("✅ 已保存 {}（{} 字节）", self.output.display(), image.len());
        Ok(())
    }
}
