//! 保存相机图像
//!
//! 开启图像流，取一帧 JPEG 写入文件。

use aim_sdk::RobotError;
use aim_sdk::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "save_jpg")]
#[command(about = "保存一帧相机图像")]
struct Args {
    /// 机器人主机名或 IP（默认取 settings.json）
    #[arg(long)]
    host: Option<String>,

    /// 输出文件
    #[arg(long, default_value = "aim_img.jpg")]
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    aim_sdk::init_logger();
    let args = Args::parse();

    let mut builder = RobotBuilder::new();
    if let Some(host) = &args.host {
        builder = builder.host(host);
    }
    let robot = builder.build()?;

    let start = Instant::now();
    let image = match robot.vision().get_camera_image() {
        Ok(image) => image,
        Err(RobotError::NoImage) => {
            println!("❌ no image received after {:?}", start.elapsed());
            return Ok(());
        },
        Err(e) => return Err(e.into()),
    };
    println!("📷 get_camera_image took {:?} ({} bytes)", start.elapsed(), image.len());

    std::fs::write(&args.file, image.as_slice())?;
    println!("✅ saved {}", args.file.display());
    robot.vision().stop_stream()?;
    Ok(())
}
