//! 时间工具函数: 业务时区转换
//!
//! 所有日期→时间戳转换统一在 service / handler 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::{DateTime, Months, NaiveDate, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Current time as Unix millis
#[inline]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 解析日期字符串: `YYYY-MM-DD` 或 RFC 3339 (取业务时区下的日期)
pub fn parse_date(date: &str, tz: Tz) -> AppResult<NaiveDate> {
    let date = date.trim();
    if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Ok(d);
    }
    DateTime::parse_from_rfc3339(date)
        .map(|dt| dt.with_timezone(&tz).date_naive())
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 日期开始 (00:00:00) → Unix millis (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期结束 → 次日 00:00:00 的 Unix millis (业务时区)
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义，
/// 等价于包含当日 23:59:59.999。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// `millis + months` in calendar months (clamped to month end, e.g. Jan 31 + 1 → Feb 28)
pub fn add_months_millis(millis: i64, months: u32) -> AppResult<i64> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .and_then(|dt| dt.checked_add_months(Months::new(months)))
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| AppError::internal(format!("Timestamp out of range: {millis} + {months} months")))
}

/// Parse an IANA time zone name, falling back to UTC
pub fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!("Unknown time zone '{}', falling back to UTC", name);
        Tz::UTC
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        let tz = Tz::UTC;
        let d = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("2024-03-15", tz).unwrap(), d);
        assert_eq!(parse_date("2024-03-15T22:10:00Z", tz).unwrap(), d);
        assert!(parse_date("15/03/2024", tz).is_err());
    }

    #[test]
    fn rfc3339_date_follows_business_timezone() {
        let tz: Tz = "Asia/Kolkata".parse().unwrap();
        // 20:00 UTC is already the next day in IST
        let d = parse_date("2024-03-15T20:00:00Z", tz).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    }

    #[test]
    fn day_bounds_cover_whole_day() {
        let tz = Tz::UTC;
        let d = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let start = day_start_millis(d, tz);
        let end = day_end_millis(d, tz);
        assert_eq!(end - start, 24 * 60 * 60 * 1000);
        assert_eq!(start, 1_710_460_800_000);
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        let jan31 = DateTime::parse_from_rfc3339("2024-01-31T10:00:00Z")
            .unwrap()
            .timestamp_millis();
        let feb29 = DateTime::parse_from_rfc3339("2024-02-29T10:00:00Z")
            .unwrap()
            .timestamp_millis();
        assert_eq!(add_months_millis(jan31, 1).unwrap(), feb29);
    }

    #[test]
    fn unknown_timezone_falls_back_to_utc() {
        assert_eq!(parse_timezone("Mars/Olympus"), Tz::UTC);
        assert_eq!(parse_timezone("Asia/Kolkata"), Tz::Asia__Kolkata);
    }
}
