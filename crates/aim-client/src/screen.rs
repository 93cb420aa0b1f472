//! 屏幕
//!
//! 画笔颜色与填充颜色在本地跟踪（默认均为 [`Color::BLUE`]）：
//! `draw_rectangle` / `draw_circle` 不指定颜色时使用当前填充颜色及其透明标记。

use crate::error::{Result, RobotError};
use crate::raw_commander::RawCommander;
use aim_driver::{CallbackKind, RobotEvent};
use aim_protocol::{Color, Command, EmojiLookType, EmojiType, FontType};
use parking_lot::Mutex;

/// `show_file` 接受的图片扩展名
const IMAGE_EXTENSIONS: [&str; 2] = ["bmp", "png"];

/// 机器人屏幕
pub struct Screen {
    commander: RawCommander,
    pen_color: Mutex<Color>,
    fill_color: Mutex<Color>,
}

impl Screen {
    pub(crate) fn new(commander: RawCommander) -> Self {
        Self {
            commander,
            pen_color: Mutex::new(Color::BLUE),
            fill_color: Mutex::new(Color::BLUE),
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commander.send(command)?;
        Ok(())
    }

    // ==================== 光标打印 ====================

    /// 在当前光标位置以当前字体显示文本
    pub fn print(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::LcdPrint {
            string: text.into(),
        })
    }

    /// 设置光标的 (行, 列)
    pub fn set_cursor(&self, row: i32, column: i32) -> Result<()> {
        self.send(Command::LcdSetCursor { row, col: column })
    }

    pub fn next_row(&self) -> Result<()> {
        self.send(Command::LcdNextRow)
    }

    /// 清除一行文本，默认以蓝色填充
    pub fn clear_row(&self, row: i32, color: Option<Color>) -> Result<()> {
        let (r, g, b) = color.unwrap_or(Color::BLUE).rgb();
        self.send(Command::LcdClearRow { number: row, r, g, b })
    }

    /// 当前光标行
    pub fn get_row(&self) -> i32 {
        self.commander.status().robot.screen.row
    }

    /// 当前光标列
    pub fn get_column(&self) -> i32 {
        self.commander.status().robot.screen.column
    }

    // ==================== 坐标打印 ====================

    /// 在 (x, y) 处显示文本（不透明背景），不影响光标
    pub fn print_at(&self, text: impl Into<String>, x: i32, y: i32) -> Result<()> {
        self.send(Command::LcdPrintAt {
            x,
            y,
            string: text.into(),
            b_opaque: true,
        })
    }

    /// 设置绘图原点
    pub fn set_origin(&self, x: i32, y: i32) -> Result<()> {
        self.send(Command::LcdSetOrigin { x, y })
    }

    // ==================== 设置 ====================

    /// 清屏，默认以蓝色填充
    pub fn clear_screen(&self, color: Option<Color>) -> Result<()> {
        let (r, g, b) = color.unwrap_or(Color::BLUE).rgb();
        self.send(Command::LcdClearScreen { r, g, b })
    }

    pub fn set_font(&self, font: FontType) -> Result<()> {
        self.send(Command::LcdSetFont { fontname: font })
    }

    pub fn set_pen_width(&self, width: u32) -> Result<()> {
        self.send(Command::LcdSetPenWidth { width })
    }

    /// 设置线条、形状轮廓与文本的颜色
    pub fn set_pen_color(&self, color: Color) -> Result<()> {
        *self.pen_color.lock() = color;
        let (r, g, b) = color.rgb();
        self.send(Command::LcdSetPenColor { r, g, b })
    }

    /// 设置形状内部的填充颜色（保留透明标记）
    pub fn set_fill_color(&self, color: Color) -> Result<()> {
        *self.fill_color.lock() = color;
        let (r, g, b) = color.rgb();
        self.send(Command::LcdSetFillColor {
            r,
            g,
            b,
            b_transparency: color.is_transparent(),
        })
    }

    pub fn pen_color(&self) -> Color {
        *self.pen_color.lock()
    }

    pub fn fill_color(&self) -> Color {
        *self.fill_color.lock()
    }

    // ==================== 绘图 ====================

    pub fn draw_pixel(&self, x: i32, y: i32) -> Result<()> {
        self.send(Command::LcdDrawPixel { x, y })
    }

    /// 以当前画笔宽度和颜色从 (x1, y1) 画线到 (x2, y2)
    pub fn draw_line(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> Result<()> {
        self.send(Command::LcdDrawLine { x1, y1, x2, y2 })
    }

    /// 画矩形；`color` 为 None 时使用当前填充颜色
    pub fn draw_rectangle(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Option<Color>,
    ) -> Result<()> {
        let fill = color.unwrap_or_else(|| self.fill_color());
        let (r, g, b) = fill.rgb();
        self.send(Command::LcdDrawRectangle {
            x,
            y,
            width,
            height,
            r,
            g,
            b,
            b_transparency: fill.is_transparent(),
        })
    }

    /// 画圆；`color` 为 None 时使用当前填充颜色
    pub fn draw_circle(&self, x: i32, y: i32, radius: i32, color: Option<Color>) -> Result<()> {
        let fill = color.unwrap_or_else(|| self.fill_color());
        let (r, g, b) = fill.rgb();
        self.send(Command::LcdDrawCircle {
            x,
            y,
            radius,
            r,
            g,
            b,
            b_transparency: fill.is_transparent(),
        })
    }

    /// 在 (x, y) 处显示机器人上已有的图片（仅 bmp / png）
    pub fn show_file(&self, filename: &str, x: i32, y: i32) -> Result<()> {
        let extension = filename
            .char_indices()
            .rev()
            .nth(2)
            .map_or(filename, |(i, _)| &filename[i..]);
        if !IMAGE_EXTENSIONS.contains(&extension) {
            return Err(RobotError::InvalidImageFile(format!(
                "extension is {}; expected extension to be bmp or png",
                extension
            )));
        }
        self.send(Command::LcdDrawImageFromFile {
            filename: filename.to_string(),
            x,
            y,
        })
    }

    /// 限定绘图区域，区域外的内容不显示
    pub fn set_clip_region(&self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.send(Command::LcdSetClipRegion {
            x,
            y,
            width,
            height,
        })
    }

    // ==================== 表情与视觉 ====================

    pub fn show_emoji(&self, emoji: EmojiType, look: EmojiLookType) -> Result<()> {
        self.send(Command::ShowEmoji {
            name: emoji.into(),
            look: look.into(),
        })
    }

    /// 隐藏表情，显示下层图形
    pub fn hide_emoji(&self) -> Result<()> {
        self.send(Command::HideEmoji)
    }

    /// 在屏幕上显示 AI 视觉画面
    pub fn show_aivision(&self) -> Result<()> {
        self.send(Command::ShowAivision)
    }

    pub fn hide_aivision(&self) -> Result<()> {
        self.send(Command::HideAivision)
    }

    // ==================== 触摸 ====================

    /// 屏幕是否正被按下
    pub fn pressing(&self) -> bool {
        self.commander.status().robot.is_screen_pressed()
    }

    /// 最近一次触摸的 x 坐标
    pub fn x_position(&self) -> f64 {
        self.commander.status().robot.touch_x as f64
    }

    /// 最近一次触摸的 y 坐标
    pub fn y_position(&self) -> f64 {
        self.commander.status().robot.touch_y as f64
    }

    /// 屏幕按下时调用 `callback(x, y)`（在状态线程上执行）
    pub fn pressed<F>(&self, callback: F)
    where
        F: Fn(i32, i32) + Send + Sync + 'static,
    {
        self.commander
            .driver()
            .on(CallbackKind::ScreenPressed, move |event: &RobotEvent| {
                if let RobotEvent::ScreenPressed { x, y } = *event {
                    callback(x, y);
                }
            });
    }

    /// 屏幕松开时调用 `callback(x, y)`（在状态线程上执行）
    pub fn released<F>(&self, callback: F)
    where
        F: Fn(i32, i32) + Send + Sync + 'static,
    {
        self.commander
            .driver()
            .on(CallbackKind::ScreenReleased, move |event: &RobotEvent| {
                if let RobotEvent::ScreenReleased { x, y } = *event {
                    callback(x, y);
                }
            });
    }
}
