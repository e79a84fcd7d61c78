//! 时间类型模块
//!
//! 服务端以两种形式给出文件修改时间：
//! - `modified`: Unix 纪元秒（浮点，带小数部分）
//! - `modified_iso`: RFC 3339 字符串
//!
//! 这里统一转换为 `chrono::DateTime<Utc>`。

use chrono::{DateTime, TimeZone, Utc};

/// 从浮点纪元秒构造 UTC 时间
///
/// 返回 None 如果值不是有限数或超出范围
pub fn from_epoch_secs(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1_000_000_000.0).round() as u32;
    Utc.timestamp_opt(whole as i64, nanos.min(999_999_999))
        .single()
}

/// 解析 RFC 3339 字符串
pub fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
