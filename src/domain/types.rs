// ==========================================
// 大学周课表排课系统 - 领域类型定义
// ==========================================
// 职责: 教学日、教室类型、学期等值类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 教学日 (School Day)
// ==========================================
// 仅周一至周五参与排课，顺序即排课扫描顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchoolDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl SchoolDay {
    /// 全部教学日（按扫描顺序）
    pub const ALL: [SchoolDay; 5] = [
        SchoolDay::Monday,
        SchoolDay::Tuesday,
        SchoolDay::Wednesday,
        SchoolDay::Thursday,
        SchoolDay::Friday,
    ];

    /// 数据库/展示用名称
    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolDay::Monday => "Monday",
            SchoolDay::Tuesday => "Tuesday",
            SchoolDay::Wednesday => "Wednesday",
            SchoolDay::Thursday => "Thursday",
            SchoolDay::Friday => "Friday",
        }
    }

    /// 从名称解析（大小写不敏感，支持 Mon/Tue 等缩写）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Some(SchoolDay::Monday),
            "tuesday" | "tue" => Some(SchoolDay::Tuesday),
            "wednesday" | "wed" => Some(SchoolDay::Wednesday),
            "thursday" | "thu" => Some(SchoolDay::Thursday),
            "friday" | "fri" => Some(SchoolDay::Friday),
            _ => None,
        }
    }

    /// 排序序号（0 = 周一），用于 SQL 排序
    pub fn ordinal(&self) -> i64 {
        match self {
            SchoolDay::Monday => 0,
            SchoolDay::Tuesday => 1,
            SchoolDay::Wednesday => 2,
            SchoolDay::Thursday => 3,
            SchoolDay::Friday => 4,
        }
    }
}

impl fmt::Display for SchoolDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 教室类型 (Room Type)
// ==========================================
// 序列化格式与前端展示一致: "Lecture Hall" / "Computer Lab"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    #[serde(rename = "Lecture Hall")]
    LectureHall,
    #[serde(rename = "Computer Lab")]
    ComputerLab,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::LectureHall => "Lecture Hall",
            RoomType::ComputerLab => "Computer Lab",
        }
    }

    /// 从字符串解析
    ///
    /// 兼容旧数据中的短格式 `lecture` / `lab`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lecture hall" | "lecture" | "lecture_hall" => Some(RoomType::LectureHall),
            "computer lab" | "lab" | "computer_lab" | "laboratory" => Some(RoomType::ComputerLab),
            _ => None,
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 学期 (Semester)
// ==========================================
// 序列化为数字 1 / 2
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Semester {
    #[default]
    First,
    Second,
}

impl Semester {
    /// 严格解析：仅接受 1 / 2
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Semester::First),
            2 => Some(Semester::Second),
            _ => None,
        }
    }

    /// 宽松解析：非法值回退到第一学期
    pub fn from_value_or_default(value: i64) -> Self {
        match Self::from_value(value) {
            Some(semester) => semester,
            None => {
                tracing::warn!(value, "学期值非法，回退到第1学期");
                Semester::First
            }
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Semester::First => 1,
            Semester::Second => 2,
        }
    }
}

impl TryFrom<i64> for Semester {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Semester::from_value(value).ok_or_else(|| format!("invalid semester: {}", value))
    }
}

impl From<Semester> for i64 {
    fn from(semester: Semester) -> Self {
        semester.as_i64()
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}
