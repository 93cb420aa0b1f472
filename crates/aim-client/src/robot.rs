//! 机器人主接口
//!
//! [`Robot`] 持有驱动与各子系统（惯性传感器、屏幕、踢球器、声音、LED、AI 视觉）。
//! 所有方法只需 `&self`，可以在多个线程间共享（`Arc<Robot>`）。
//!
//! # 速度单位
//!
//! 平移速度以毫米/秒下发（100% = 200 mm/s），旋转速度以度/秒下发（100% = 180 dps）。
//! 默认速度为 100 mm/s 与 75 dps。
//!
//! # 阻塞行为
//!
//! `move_for`、`turn_for`、`turn_to` 在 `wait = true` 时阻塞，直到机器人报告运动结束。
//! 超过运动超时（默认 10 秒）时发送停止指令并返回 [`RobotError::Timeout`]。

use crate::error::{Result, RobotError};
use crate::inertial::Inertial;
use crate::kicker::Kicker;
use crate::led::Led;
use crate::raw_commander::RawCommander;
use crate::screen::Screen;
use crate::sound::Sound;
use crate::timer::Timer;
use crate::types::{DriveVelocityUnits, TurnType, TurnVelocityUnits};
use crate::vision::{AiVision, CLASS_BLUE_BARREL, CLASS_ORANGE_BARREL, CLASS_SPORTS_BALL};
use aim_driver::AimDriver;
use aim_protocol::{
    AIVISION_DEFAULT_SNAPSHOT_OBJECTS, AiVisionObject, Command, ControllerInfo,
    DEFAULT_DRIVE_SPEED_MMPS, DEFAULT_TURN_SPEED_DPS, RobotStatus, StackingType, StatusFlags,
    VisionObject, client_version_string,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// 等待运动结束时的轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 去抖：两次读到“已结束”之间的间隔
const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(50);

/// 默认运动超时
pub const DEFAULT_MOTION_TIMEOUT: Duration = Duration::from_secs(10);

/// `move_with_vectors` 中三个轮子的 `cos(30°)` 系数
const WHEEL_COS_30: f64 = 0.866;

/// VEX AIM 机器人
pub struct Robot {
    commander: RawCommander,
    drive_speed: AtomicI32,
    turn_speed: AtomicI32,
    motion_timeout: Duration,
    timer: Timer,
    inertial: Inertial,
    screen: Screen,
    kicker: Kicker,
    sound: Sound,
    led: Led,
    vision: AiVision,
}

impl Robot {
    /// 用已启动的驱动构造机器人，并把当前航向设为 0
    ///
    /// 驱动必须已经收到过状态（[`AimDriverBuilder::build`](aim_driver::AimDriverBuilder::build)
    /// 会等待第一个状态包）。
    pub fn from_driver(driver: AimDriver, motion_timeout: Duration) -> Self {
        let commander = RawCommander::new(Arc::new(driver));
        let robot = Self {
            drive_speed: AtomicI32::new(DEFAULT_DRIVE_SPEED_MMPS),
            turn_speed: AtomicI32::new(DEFAULT_TURN_SPEED_DPS),
            motion_timeout,
            timer: Timer::new(),
            inertial: Inertial::new(commander.clone()),
            screen: Screen::new(commander.clone()),
            kicker: Kicker::new(commander.clone()),
            sound: Sound::new(commander.clone()),
            led: Led::new(commander.clone()),
            vision: AiVision::new(commander.clone()),
            commander,
        };

        robot.inertial.reset_heading();
        info!(
            "AIM client {} ready, robot at {} (battery {}%)",
            client_version_string(),
            robot.commander.driver().host(),
            robot.get_battery_capacity()
        );
        robot
    }

    // ==================== 子系统 ====================

    pub fn inertial(&self) -> &Inertial {
        &self.inertial
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn kicker(&self) -> &Kicker {
        &self.kicker
    }

    pub fn sound(&self) -> &Sound {
        &self.sound
    }

    pub fn led(&self) -> &Led {
        &self.led
    }

    pub fn vision(&self) -> &AiVision {
        &self.vision
    }

    /// 机器人创建时启动的计时器
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// 底层驱动（高级用法）
    pub fn driver(&self) -> &AimDriver {
        self.commander.driver()
    }

    // ==================== 状态 ====================

    /// 最新状态快照
    pub fn status(&self) -> Arc<RobotStatus> {
        self.commander.status()
    }

    /// 遥控器状态
    pub fn controller(&self) -> ControllerInfo {
        self.commander.status().controller.clone()
    }

    /// 电池剩余电量（百分比）
    pub fn get_battery_capacity(&self) -> f64 {
        self.commander.status().robot.battery
    }

    /// x 坐标（毫米），以 `set_heading` 设定的零点为参考系
    pub fn get_x_position(&self) -> f64 {
        let robot = &self.commander.status().robot;
        let offset = -self.inertial.heading_offset().to_radians();
        robot.robot_x * offset.cos() + robot.robot_y * offset.sin()
    }

    /// y 坐标（毫米），以 `set_heading` 设定的零点为参考系
    pub fn get_y_position(&self) -> f64 {
        let robot = &self.commander.status().robot;
        let offset = -self.inertial.heading_offset().to_radians();
        robot.robot_y * offset.cos() - robot.robot_x * offset.sin()
    }

    /// `move_at` / `move_for` 正在以非零速度执行
    pub fn is_move_active(&self) -> bool {
        self.commander.flag_or_pending(StatusFlags::IS_MOVE_ACTIVE)
    }

    /// `turn` / `turn_for` / `turn_to` 正在以非零速度执行
    pub fn is_turn_active(&self) -> bool {
        self.commander.flag_or_pending(StatusFlags::IS_TURN_ACTIVE)
    }

    /// 没有任何轮子在转动
    pub fn is_stopped(&self) -> bool {
        let (set, clear) = self.commander.driver().pending();
        if clear.contains(StatusFlags::IS_MOVING) {
            return true;
        }
        if set.contains(StatusFlags::IS_MOVING) {
            return false;
        }
        !self.commander.flags().contains(StatusFlags::IS_MOVING)
    }

    // ==================== 速度 ====================

    /// 设置后续运动的默认平移速度
    ///
    /// # 错误
    /// 负值返回 `RobotError::InvalidInput`。
    pub fn set_move_velocity(&self, velocity: f64, units: DriveVelocityUnits) -> Result<()> {
        if velocity < 0.0 {
            return Err(RobotError::invalid_input("velocity must be a positive number"));
        }
        self.drive_speed.store(units.to_mmps(velocity), Ordering::Relaxed);
        Ok(())
    }

    /// 设置后续旋转的默认速度
    ///
    /// # 错误
    /// 负值返回 `RobotError::InvalidInput`。
    pub fn set_turn_velocity(&self, velocity: f64, units: TurnVelocityUnits) -> Result<()> {
        if velocity < 0.0 {
            return Err(RobotError::invalid_input("velocity must be a positive number"));
        }
        self.turn_speed.store(units.to_dps(velocity), Ordering::Relaxed);
        Ok(())
    }

    /// 当前默认平移速度（毫米/秒）
    pub fn drive_speed(&self) -> i32 {
        self.drive_speed.load(Ordering::Relaxed)
    }

    /// 当前默认旋转速度（度/秒）
    pub fn turn_speed(&self) -> i32 {
        self.turn_speed.load(Ordering::Relaxed)
    }

    fn resolve_drive(&self, velocity: Option<f64>, units: DriveVelocityUnits) -> i32 {
        velocity.map_or_else(|| self.drive_speed(), |v| units.to_mmps(v))
    }

    fn resolve_turn(&self, velocity: Option<f64>, units: TurnVelocityUnits) -> i32 {
        velocity.map_or_else(|| self.turn_speed(), |v| units.to_dps(v))
    }

    // ==================== 运动 ====================

    /// 沿 `angle` 方向持续平移
    ///
    /// # 参数
    /// - `angle`: 相对车头的方向（度），-360 到 360
    /// - `velocity`: 速度，None 时使用 `set_move_velocity` 的设置；负值反向
    /// - `units`: 速度单位
    pub fn move_at(
        &self,
        angle: f64,
        velocity: Option<f64>,
        units: DriveVelocityUnits,
    ) -> Result<()> {
        let speed = self.resolve_drive(velocity, units);
        self.commander.send(Command::Drive {
            angle,
            speed,
            stacking_type: StackingType::Off.into(),
        })?;
        Ok(())
    }

    /// 沿 `angle` 方向平移 `distance` 毫米
    ///
    /// 负速度等价于反向平移同样的距离。`wait` 为 true 时阻塞直到平移结束。
    ///
    /// # 示例
    ///
    /// ```rust,no_run
    /// # use aim_client::RobotBuilder;
    /// use aim_client::DriveVelocityUnits;
    /// # let robot = RobotBuilder::new().build()?;
    /// // 以 50% 速度向前 200 毫米
    /// robot.move_for(200.0, 0.0, Some(50.0), DriveVelocityUnits::Percent, true)?;
    /// # Ok::<(), aim_client::RobotError>(())
    /// ```
    pub fn move_for(
        &self,
        distance: f64,
        angle: f64,
        velocity: Option<f64>,
        units: DriveVelocityUnits,
        wait: bool,
    ) -> Result<()> {
        let mut speed = self.resolve_drive(velocity, units);
        let mut distance = distance;
        if speed < 0 {
            speed = -speed;
            distance = -distance;
        }

        self.commander.send(Command::DriveFor {
            distance,
            angle,
            final_heading: 0.0,
            drive_speed: speed,
            turn_speed: self.turn_speed(),
            stacking_type: StackingType::Off.into(),
        })?;

        if wait {
            self.block_on_state("is_move_active", Self::is_move_active)?;
        }
        Ok(())
    }

    /// 同时平移与旋转
    ///
    /// # 参数
    /// - `forwards`: 前后速度（%），负值后退
    /// - `rightwards`: 左右速度（%），负值向左
    /// - `rotation`: 旋转速度（%），负值逆时针
    pub fn move_with_vectors(&self, forwards: f64, rightwards: f64, rotation: f64) -> Result<()> {
        let x = rightwards.clamp(-100.0, 100.0) * 2.0;
        let y = forwards.clamp(-100.0, 100.0) * 2.0;
        let r = rotation.clamp(-100.0, 100.0) * 1.8;

        let w1 = 0.5 * x + WHEEL_COS_30 * y + r;
        let w2 = 0.5 * x - WHEEL_COS_30 * y + r;
        let w3 = r - x;
        self.spin_wheels(w1 as i32, w2 as i32, w3 as i32)
    }

    /// 持续旋转
    pub fn turn(
        &self,
        direction: TurnType,
        velocity: Option<f64>,
        units: TurnVelocityUnits,
    ) -> Result<()> {
        let mut turn_rate = self.resolve_turn(velocity, units);
        if direction == TurnType::Left {
            turn_rate = -turn_rate;
        }
        self.commander.send(Command::Turn {
            turn_rate,
            stacking_type: StackingType::Off.into(),
        })?;
        Ok(())
    }

    /// 相对旋转 `angle` 度；`wait` 为 true 时阻塞直到旋转结束
    pub fn turn_for(
        &self,
        direction: TurnType,
        angle: f64,
        velocity: Option<f64>,
        units: TurnVelocityUnits,
        wait: bool,
    ) -> Result<()> {
        let turn_rate = self.resolve_turn(velocity, units);
        let angle = if direction == TurnType::Left { -angle } else { angle };

        self.commander.send(Command::TurnFor {
            angle,
            turn_rate,
            stacking_type: StackingType::Off.into(),
        })?;

        if wait {
            self.block_on_state("is_turn_active", Self::is_turn_active)?;
        }
        Ok(())
    }

    /// 旋转到航向 `heading`（以 `set_heading` 的零点为参考）
    ///
    /// # 错误
    /// `heading` 不在 (-360, 360) 内时返回 `RobotError::InvalidInput`。
    pub fn turn_to(
        &self,
        heading: f64,
        velocity: Option<f64>,
        units: TurnVelocityUnits,
        wait: bool,
    ) -> Result<()> {
        if !(-360.0 < heading && heading < 360.0) {
            return Err(RobotError::invalid_input(
                "heading must be between -360 and 360",
            ));
        }
        let turn_rate = self.resolve_turn(velocity, units).abs();
        let heading = (self.inertial.heading_offset() + heading) % 360.0;

        self.commander.send(Command::TurnTo {
            heading,
            turn_rate,
            stacking_type: StackingType::Off.into(),
        })?;

        if wait {
            self.block_on_state("is_turn_active", Self::is_turn_active)?;
        }
        Ok(())
    }

    /// 停止所有运动
    ///
    /// 立即清除本地 `IS_MOVING`，并在下一个状态包上再次清除，
    /// 之后的 `is_stopped()` 立刻返回 true。
    pub fn stop_all_movement(&self) -> Result<()> {
        self.move_at(0.0, Some(0.0), DriveVelocityUnits::Mmps)?;
        self.turn(TurnType::Right, Some(0.0), TurnVelocityUnits::Dps)?;

        let driver = self.commander.driver();
        driver.context().pending.cancel_set(StatusFlags::IS_MOVING);
        driver.set_local_flags(StatusFlags::empty(), StatusFlags::IS_MOVING);
        Ok(())
    }

    /// 直接设定三个轮子的速度（毫米/秒）
    pub fn spin_wheels(&self, velocity1: i32, velocity2: i32, velocity3: i32) -> Result<()> {
        self.commander.send(Command::SpinWheels {
            vel1: velocity1,
            vel2: velocity2,
            vel3: velocity3,
        })?;
        Ok(())
    }

    /// 把当前位置设为 (x, y)（以 `set_heading` 的零点为参考系）
    ///
    /// 返回前等待两个新状态包，之后的 `get_x_position` / `get_y_position` 反映新位置。
    pub fn set_xy_position(&self, x: f64, y: f64) -> Result<()> {
        let offset = -self.inertial.heading_offset().to_radians();
        let (sin, cos) = offset.sin_cos();
        let origin_x = x * cos - y * sin;
        let origin_y = y * cos + x * sin;

        self.commander.send(Command::SetPose {
            x: origin_x,
            y: origin_y,
        })?;

        let driver = self.commander.driver();
        driver.wait_for_status_updates(2, driver.config().command_timeout())?;
        Ok(())
    }

    // ==================== 踢球器前方的物体 ====================

    fn held_objects(&self) -> Vec<AiVisionObject> {
        self.vision.get_data(&VisionObject::ALL_AIOBJS, AIVISION_DEFAULT_SNAPSHOT_OBJECTS)
    }

    /// 踢球器前方有任意颜色的桶
    pub fn has_any_barrel(&self) -> bool {
        self.held_objects().iter().any(|o| {
            (o.classname == CLASS_BLUE_BARREL || o.classname == CLASS_ORANGE_BARREL)
                && o.is_barrel_held()
        })
    }

    /// 踢球器前方有蓝桶
    pub fn has_blue_barrel(&self) -> bool {
        self.held_objects()
            .iter()
            .any(|o| o.classname == CLASS_BLUE_BARREL && o.is_barrel_held())
    }

    /// 踢球器前方有橙桶
    pub fn has_orange_barrel(&self) -> bool {
        self.held_objects()
            .iter()
            .any(|o| o.classname == CLASS_ORANGE_BARREL && o.is_barrel_held())
    }

    /// 踢球器前方有球
    pub fn has_sports_ball(&self) -> bool {
        self.held_objects()
            .iter()
            .any(|o| o.classname == CLASS_SPORTS_BALL && o.is_ball_held())
    }

    // ==================== 连接与生命周期 ====================

    /// 指令通道是否已连接
    pub fn is_connected(&self) -> bool {
        self.commander.driver().is_connected()
    }

    /// 电源键按下或机器人程序结束
    pub fn shutdown_requested(&self) -> bool {
        self.commander.driver().shutdown_requested()
    }

    /// 阻塞直到请求关机；`timeout` 为 None 时一直等待
    ///
    /// 返回是否收到了关机请求。
    ///
    /// # 示例
    ///
    /// ```rust,no_run
    /// # use aim_client::RobotBuilder;
    /// # let robot = RobotBuilder::new().build()?;
    /// robot.screen().pressed(|x, y| println!("pressed at ({}, {})", x, y));
    /// // 直到按下电源键
    /// robot.wait_for_shutdown(None);
    /// # Ok::<(), aim_client::RobotError>(())
    /// ```
    pub fn wait_for_shutdown(&self, timeout: Option<Duration>) -> bool {
        let start = Instant::now();
        loop {
            if self.shutdown_requested() {
                return true;
            }
            if timeout.is_some_and(|t| start.elapsed() >= t) {
                return false;
            }
            spin_sleep::sleep(DEBOUNCE_INTERVAL);
        }
    }

    // ==================== 内部 ====================

    /// 阻塞直到 `state` 连续两次为 false
    ///
    /// 超时后停止所有运动并返回 `RobotError::Timeout`。
    fn block_on_state(&self, name: &str, state: fn(&Self) -> bool) -> Result<()> {
        let start = Instant::now();
        loop {
            if !state(self) {
                spin_sleep::sleep(DEBOUNCE_INTERVAL);
                if !state(self) {
                    return Ok(());
                }
            }

            spin_sleep::sleep(POLL_INTERVAL);
            if start.elapsed() > self.motion_timeout {
                warn!("{} wait timed out, stopping", name);
                self.stop_all_movement()?;
                return Err(RobotError::Timeout(format!(
                    "{} still true after {:?}",
                    name, self.motion_timeout
                )));
            }
        }
    }
}
