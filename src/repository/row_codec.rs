// ==========================================
// 大学周课表排课系统 - 行字段编解码
// ==========================================
// 职责: 领域值类型与 SQLite TEXT/INTEGER 列之间的转换
// ==========================================

use crate::domain::types::{RoomType, SchoolDay};
use chrono::NaiveTime;
use rusqlite::types::Type;

/// 时间列存储格式
pub const TIME_FORMAT: &str = "%H:%M:%S";

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

pub fn room_type_from_db(idx: usize, raw: &str) -> rusqlite::Result<RoomType> {
    RoomType::parse(raw).ok_or_else(|| conversion_error(idx, format!("未知教室类型: {}", raw)))
}

pub fn school_day_from_db(idx: usize, raw: &str) -> rusqlite::Result<SchoolDay> {
    SchoolDay::parse(raw).ok_or_else(|| conversion_error(idx, format!("未知教学日: {}", raw)))
}

pub fn time_to_db(time: &NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn time_from_db(idx: usize, raw: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|e| conversion_error(idx, format!("时间格式错误 {}: {}", raw, e)))
}
