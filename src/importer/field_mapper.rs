// ==========================================
// 大学周课表排课系统 - 字段映射
// ==========================================
// 职责: RawRecord → 专业/教室/科目导入记录
// 红线: 只做格式转换与必填校验，不访问数据库
// ==========================================

use crate::domain::subject::DEFAULT_PRIORITY;
use crate::domain::types::{RoomType, Semester};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;
use std::str::FromStr;

/// 专业导入记录
#[derive(Debug, Clone, PartialEq)]
pub struct CourseRecord {
    pub row: usize,
    pub name: String,
    pub code: String,
    pub faculty: Option<String>,
}

/// 教室导入记录
#[derive(Debug, Clone, PartialEq)]
pub struct ClassroomRecord {
    pub row: usize,
    pub room_number: String,
    pub room_type: RoomType,
    pub capacity: u32,
    pub is_active: bool,
}

/// 科目导入记录（专业按 code 引用）
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRecord {
    pub row: usize,
    pub name: String,
    pub code: String,
    pub course_code: String,
    pub semester: Semester,
    pub weekly_hours: u32,
    pub room_type: RoomType,
    pub lecturer_id: Option<i64>,
    pub priority: i32,
}

// ==========================================
// FieldMapper - 字段映射器
// ==========================================
pub struct FieldMapper;

impl FieldMapper {
    pub fn map_course(&self, raw: &RawRecord) -> ImportResult<CourseRecord> {
        Ok(CourseRecord {
            row: raw.row,
            name: required(raw, &["name", "course_name"])?,
            code: required(raw, &["code", "course_code"])?,
            faculty: optional(raw, &["faculty"]),
        })
    }

    pub fn map_classroom(&self, raw: &RawRecord) -> ImportResult<ClassroomRecord> {
        let capacity: u32 = parse_number(raw, "capacity", &required(raw, &["capacity"])?)?;
        if capacity < 1 {
            return Err(conversion(raw, "capacity", "容量必须 >= 1"));
        }

        let is_active = match optional(raw, &["is_active", "active"]) {
            Some(v) => parse_bool(&v).ok_or_else(|| conversion(raw, "is_active", &format!("无法识别的布尔值: {}", v)))?,
            None => true,
        };

        Ok(ClassroomRecord {
            row: raw.row,
            room_number: required(raw, &["room_number", "room"])?,
            room_type: parse_room_type(raw, &required(raw, &["room_type"])?)?,
            capacity,
            is_active,
        })
    }

    pub fn map_subject(&self, raw: &RawRecord) -> ImportResult<SubjectRecord> {
        let semester_raw = required(raw, &["semester"])?;
        let semester_value: i64 = parse_number(raw, "semester", &semester_raw)?;
        let semester = Semester::from_value(semester_value)
            .ok_or_else(|| conversion(raw, "semester", "学期只能是 1 或 2"))?;

        let weekly_hours: u32 = parse_number(raw, "weekly_hours", &required(raw, &["weekly_hours", "hours"])?)?;
        if weekly_hours == 0 {
            return Err(conversion(raw, "weekly_hours", "周课时必须 > 0"));
        }

        let lecturer_id = optional(raw, &["lecturer_id", "lecturer"])
            .map(|v| parse_number::<i64>(raw, "lecturer_id", &v))
            .transpose()?;
        let priority = optional(raw, &["priority"])
            .map(|v| parse_number::<i32>(raw, "priority", &v))
            .transpose()?
            .unwrap_or(DEFAULT_PRIORITY);

        Ok(SubjectRecord {
            row: raw.row,
            name: required(raw, &["name", "subject_name"])?,
            code: required(raw, &["code", "subject_code"])?,
            course_code: required(raw, &["course_code", "course"])?,
            semester,
            weekly_hours,
            room_type: parse_room_type(raw, &required(raw, &["room_type", "room_type_preference"])?)?,
            lecturer_id,
            priority,
        })
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn optional(raw: &RawRecord, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|a| raw.get(a)).map(str::to_string)
}

fn required(raw: &RawRecord, aliases: &[&str]) -> ImportResult<String> {
    optional(raw, aliases).ok_or_else(|| ImportError::MissingField {
        row: raw.row,
        field: aliases[0].to_string(),
    })
}

fn conversion(raw: &RawRecord, field: &str, message: &str) -> ImportError {
    ImportError::TypeConversionError {
        row: raw.row,
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// 解析整数（兼容 Excel 导出的 "3.0" 形式）
fn parse_number<T: FromStr>(raw: &RawRecord, field: &str, value: &str) -> ImportResult<T> {
    let trimmed = value.trim();
    let normalized = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    normalized
        .parse::<T>()
        .map_err(|_| conversion(raw, field, &format!("无法解析为整数: {}", value)))
}

fn parse_room_type(raw: &RawRecord, value: &str) -> ImportResult<RoomType> {
    RoomType::parse(value).ok_or_else(|| conversion(raw, "room_type", &format!("未知教室类型: {}", value)))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn raw(row: usize, pairs: &[(&str, &str)]) -> RawRecord {
        RawRecord {
            row,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_map_subject_with_optional_fields() {
        let record = FieldMapper
            .map_subject(&raw(
                2,
                &[
                    ("name", "Databases"),
                    ("code", "CST202"),
                    ("course_code", "CS"),
                    ("semester", "2"),
                    ("weekly_hours", "3.0"),
                    ("room_type", "lab"),
                    ("lecturer_id", ""),
                ],
            ))
            .unwrap();

        assert_eq!(record.semester, Semester::Second);
        assert_eq!(record.weekly_hours, 3);
        assert_eq!(record.room_type, RoomType::ComputerLab);
        assert_eq!(record.lecturer_id, None);
        assert_eq!(record.priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_map_subject_errors_carry_row() {
        let err = FieldMapper
            .map_subject(&raw(
                7,
                &[
                    ("name", "Databases"),
                    ("code", "CST202"),
                    ("course_code", "CS"),
                    ("semester", "3"),
                    ("weekly_hours", "3"),
                    ("room_type", "Lecture Hall"),
                ],
            ))
            .unwrap_err();
        assert_eq!(err.row(), Some(7));

        let err = FieldMapper.map_subject(&raw(9, &[("name", "X")])).unwrap_err();
        assert!(matches!(err, ImportError::MissingField { row: 9, .. }));
    }

    #[test]
    fn test_map_classroom_defaults_active() {
        let record = FieldMapper
            .map_classroom(&raw(3, &[("room_number", "LAB-1"), ("room_type", "Computer Lab"), ("capacity", "35")]))
            .unwrap();
        assert!(record.is_active);
        assert_eq!(record.capacity, 35);

        let err = FieldMapper
            .map_classroom(&raw(4, &[("room_number", "LAB-2"), ("room_type", "Computer Lab"), ("capacity", "0")]))
            .unwrap_err();
        assert_eq!(err.row(), Some(4));
    }
}
