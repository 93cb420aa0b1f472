//! AI 视觉
//!
//! `get_data` 在最新状态包的对象列表上按描述符过滤（面积从大到小），
//! 并记住本次的数量与最大对象，供 `object_count()` / `largest_object()` 查询。

use crate::error::{Result, RobotError};
use crate::raw_commander::RawCommander;
use aim_protocol::vision;
use aim_protocol::{AiVisionObject, CodeDesc, ColorDesc, Command, VisionDescriptor};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 模型类别名：球
pub const CLASS_SPORTS_BALL: &str = "SportsBall";
/// 模型类别名：蓝桶
pub const CLASS_BLUE_BARREL: &str = "BlueBarrel";
/// 模型类别名：橙桶
pub const CLASS_ORANGE_BARREL: &str = "OrangeBarrel";

#[derive(Default)]
struct LastQuery {
    count: usize,
    largest: Option<AiVisionObject>,
}

/// AI 视觉传感器
pub struct AiVision {
    commander: RawCommander,
    last: Mutex<LastQuery>,
    image_wait: Duration,
}

impl AiVision {
    pub(crate) fn new(commander: RawCommander) -> Self {
        let image_wait = commander.driver().config().image_wait();
        Self {
            commander,
            last: Mutex::new(LastQuery::default()),
            image_wait,
        }
    }

    // ==================== 对象 ====================

    /// 返回最多 `count`（上限 24）个匹配对象，面积从大到小
    ///
    /// # 示例
    ///
    /// ```rust,no_run
    /// # use aim_client::RobotBuilder;
    /// use aim_client::VisionObject;
    /// # let robot = RobotBuilder::new().build()?;
    /// let tags = robot.vision().get_data(&VisionObject::ALL_TAGS, 8);
    /// for tag in &tags {
    ///     println!("tag {} at ({}, {})", tag.id, tag.center_x, tag.center_y);
    /// }
    /// # Ok::<(), aim_client::RobotError>(())
    /// ```
    pub fn get_data(&self, desc: &VisionDescriptor, count: usize) -> Vec<AiVisionObject> {
        let status = self.commander.status();
        let snapshot = vision::get_data(&status.aivision, desc, count);

        let mut last = self.last.lock();
        last.count = snapshot.objects.len();
        last.largest = snapshot.largest;
        snapshot.objects
    }

    /// 上一次 `get_data` 中面积最大的对象
    pub fn largest_object(&self) -> Option<AiVisionObject> {
        self.last.lock().largest.clone()
    }

    /// 上一次 `get_data` 返回的对象数
    pub fn object_count(&self) -> usize {
        self.last.lock().count
    }

    // ==================== 检测开关 ====================

    /// 开关 AprilTag 检测
    pub fn tag_detection(&self, enable: bool) -> Result<()> {
        self.commander.send(Command::TagDetection { b_enable: enable })?;
        Ok(())
    }

    /// 开关颜色与颜色码检测；`merge` 合并相邻的同色区域
    pub fn color_detection(&self, enable: bool, merge: bool) -> Result<()> {
        self.commander.send(Command::ColorDetection {
            b_enable: enable,
            b_merge: merge,
        })?;
        Ok(())
    }

    /// 开关 AI 模型检测
    pub fn model_detection(&self, enable: bool) -> Result<()> {
        self.commander.send(Command::ModelDetection { b_enable: enable })?;
        Ok(())
    }

    /// 下发颜色描述
    pub fn color_description(&self, desc: &ColorDesc) -> Result<()> {
        self.commander.send(Command::color_description(desc))?;
        Ok(())
    }

    /// 下发颜色码描述（未使用的槽位为 -1）
    pub fn code_description(&self, desc: &CodeDesc) -> Result<()> {
        self.commander.send(Command::code_description(desc))?;
        Ok(())
    }

    // ==================== 相机 ====================

    /// 获取最新的相机图像（JPEG）
    ///
    /// 首次调用时开启图像流并最多等待 `image_wait_ms`；之后图像持续推送，
    /// 可以立即返回。
    ///
    /// # 错误
    /// 等待后仍没有图像时返回 `RobotError::NoImage`。
    pub fn get_camera_image(&self) -> Result<Arc<Vec<u8>>> {
        let driver = self.commander.driver();
        if !driver.is_streaming() {
            debug!("starting camera stream");
            driver.start_stream()?;
            if let Some(image) = driver.wait_for_image(self.image_wait) {
                return Ok(image);
            }
        }
        driver.latest_image().ok_or(RobotError::NoImage)
    }

    pub fn start_stream(&self) -> Result<()> {
        self.commander.driver().start_stream()?;
        Ok(())
    }

    pub fn stop_stream(&self) -> Result<()> {
        self.commander.driver().stop_stream()?;
        Ok(())
    }

    pub fn is_streaming(&self) -> bool {
        self.commander.driver().is_streaming()
    }
}
