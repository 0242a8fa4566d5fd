// ==========================================
// 大学周课表排课系统 - 课程科目领域模型
// ==========================================
// 职责: Subject 实体 + 年级推导规则
// 红线: 年级由科目代码第4位推导，不依赖存储字段
// ==========================================

use crate::domain::types::{RoomType, Semester};
use serde::{Deserialize, Serialize};

/// 年级推导失败时的默认年级
pub const DEFAULT_YEAR_LEVEL: u8 = 1;

/// 默认排课优先级（数字越小越优先）
pub const DEFAULT_PRIORITY: i32 = 1;

// ==========================================
// Subject - 科目
// ==========================================
// 代码格式: 3位字母 + 1位年级 + 2位序号，例如 CST101
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub course_id: i64,
    pub semester: Semester,
    pub weekly_hours: u32,
    pub room_type: RoomType,
    pub lecturer_id: Option<i64>,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl Subject {
    /// 年级（由科目代码推导）
    pub fn year_level(&self) -> u8 {
        derive_year_level(&self.code)
    }

    /// 学生组（同专业、同学期、同年级的学生不能同时上两门课）
    pub fn cohort(&self) -> Cohort {
        Cohort {
            course_id: self.course_id,
            semester: self.semester,
            year_level: self.year_level(),
        }
    }
}

/// 学生组标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cohort {
    pub course_id: i64,
    pub semester: Semester,
    pub year_level: u8,
}

/// 从科目代码推导年级
///
/// 规则:
/// - 第4个字符为 `1`..=`9` 时取其数值
/// - 代码不足4位、第4位非数字或为 `0` 时回退到 1 年级
pub fn derive_year_level(code: &str) -> u8 {
    code.chars()
        .nth(3)
        .and_then(|c| c.to_digit(10))
        .filter(|d| *d >= 1)
        .map(|d| d as u8)
        .unwrap_or(DEFAULT_YEAR_LEVEL)
}
