//! 协议常量定义

// ============================================================================
// 版本
// ============================================================================

/// 客户端版本号（major, minor, build, beta）
pub const CLIENT_VERSION: (u8, u8, u8, u8) = (1, 0, 1, 0);

/// 格式化后的客户端版本号
pub fn client_version_string() -> String {
    let (major, minor, build, beta) = CLIENT_VERSION;
    format!("{}.{}.{}.{}", major, minor, build, beta)
}

// ============================================================================
// 连接
// ============================================================================

/// 状态通道
pub const WS_STATUS: &str = "ws_status";
/// 图像通道
pub const WS_IMAGE: &str = "ws_img";
/// 指令通道
pub const WS_COMMAND: &str = "ws_cmd";
/// 音频通道
pub const WS_AUDIO: &str = "ws_audio";

/// 全部通道（按驱动打开顺序）
pub const WS_CHANNELS: [&str; 4] = [WS_STATUS, WS_IMAGE, WS_COMMAND, WS_AUDIO];

/// 机器人处于 WiFi AP 模式时的地址
pub const AP_MODE_HOST: &str = "192.168.4.1";

/// 配置文件缺省的主机名
pub const DEFAULT_HOST: &str = "localhost";

/// 构造通道 URL：`ws://{host}/{channel}`
pub fn channel_url(host: &str, channel: &str) -> String {
    format!("ws://{}/{}", host, channel)
}

// ============================================================================
// 运动
// ============================================================================

/// 最大平移速度（毫米/秒）
pub const DRIVE_VELOCITY_MAX_MMPS: f64 = 200.0;
/// 最大旋转速度（度/秒）
pub const TURN_VELOCITY_MAX_DPS: f64 = 180.0;
/// 默认平移速度（50%，毫米/秒）
pub const DEFAULT_DRIVE_SPEED_MMPS: i32 = 100;
/// 默认旋转速度（度/秒）
pub const DEFAULT_TURN_SPEED_DPS: i32 = 75;

// ============================================================================
// 声音
// ============================================================================

/// 本地音频文件上传上限（字节）
pub const SOUND_SIZE_MAX_BYTES: usize = 255 * 1024;
/// 音频上传帧头长度
pub const AUDIO_HEADER_LEN: usize = 64;
/// 音频帧头中文件名字段的最大长度
pub const AUDIO_FILENAME_MAX: usize = 32;
/// play_note 最长时长（毫秒）
pub const NOTE_DURATION_MAX_MS: u32 = 4000;

// ============================================================================
// AI 视觉
// ============================================================================

/// 单次 get_data 返回对象上限
pub const AIVISION_MAX_OBJECTS: usize = 24;
/// get_data 默认返回对象数
pub const AIVISION_DEFAULT_SNAPSHOT_OBJECTS: usize = 8;
/// 匹配任意 id
pub const MATCH_ALL_ID: u32 = 0xFFFF;

/// 桶被踢球器持有的判定窗口：最小 origin_y
pub const BARREL_MIN_Y: i32 = 160;
/// 桶判定窗口：中心 x 下界（不含）
pub const BARREL_MIN_CX: f64 = 120.0;
/// 桶判定窗口：中心 x 上界（不含）
pub const BARREL_MAX_CX: f64 = 200.0;
/// 球判定窗口：最小 origin_y
pub const BALL_MIN_Y: i32 = 170;
/// 球判定窗口：中心 x 下界（不含）
pub const BALL_MIN_CX: f64 = 120.0;
/// 球判定窗口：中心 x 上界（不含）
pub const BALL_MAX_CX: f64 = 200.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_url() {
        assert_eq!(channel_url("192.168.4.1", WS_COMMAND), "ws://192.168.4.1/ws_cmd");
        assert_eq!(channel_url(AP_MODE_HOST, WS_IMAGE), "ws://192.168.4.1/ws_img");
    }

    #[test]
    fn test_client_version_string() {
        assert_eq!(client_version_string(), "1.0.1.0");
    }
}
