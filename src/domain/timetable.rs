// ==========================================
// 大学周课表排课系统 - 课表时段领域模型
// ==========================================
// 红线: (classroom, day, start_time) 唯一，教室不可重复占用
// ==========================================

use crate::domain::types::{RoomType, SchoolDay, Semester};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

// ==========================================
// TimetableSlot - 课表时段
// ==========================================
// end_time 恒等于 start_time + 1 小时
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableSlot {
    pub subject_id: i64,
    pub classroom_id: i64,
    pub day: SchoolDay,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl TimetableSlot {
    /// 创建一小时时段
    ///
    /// # 返回
    /// - None: hour 超出 0..=22（结束时间无法表示）
    pub fn one_hour(subject_id: i64, classroom_id: i64, day: SchoolDay, hour: u32) -> Option<Self> {
        let start_time = NaiveTime::from_hms_opt(hour, 0, 0)?;
        let end_time = NaiveTime::from_hms_opt(hour + 1, 0, 0)?;
        Some(Self {
            subject_id,
            classroom_id,
            day,
            start_time,
            end_time,
        })
    }

    /// 开始小时
    pub fn start_hour(&self) -> u32 {
        self.start_time.hour()
    }
}

// ==========================================
// TimetableEntry - 课表展示行（已关联科目/教室/专业）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub slot_id: i64,
    pub day: SchoolDay,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_code: String,
    pub course_id: i64,
    pub course_name: Option<String>,
    pub semester: Semester,
    pub year: u8,
    pub lecturer_id: Option<i64>,
    pub classroom_id: i64,
    pub room_number: String,
    pub room_type: RoomType,
}

// ==========================================
// SlotFilter - 课表查询过滤条件
// ==========================================
// 所有条件为 AND 关系，None 表示不过滤
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotFilter {
    pub course_id: Option<i64>,
    pub year: Option<u8>,
    pub semester: Option<Semester>,
    pub lecturer_id: Option<i64>,
}

impl SlotFilter {
    pub fn matches(&self, entry: &TimetableEntry) -> bool {
        self.course_id.map_or(true, |id| entry.course_id == id)
            && self.year.map_or(true, |y| entry.year == y)
            && self.semester.map_or(true, |s| entry.semester == s)
            && self.lecturer_id.map_or(true, |id| entry.lecturer_id == Some(id))
    }
}

// ==========================================
// 按天分组的课表视图
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: SchoolDay,
    pub classes: Vec<TimetableEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedTimetable {
    pub days_data: Vec<DaySchedule>,
}

impl FormattedTimetable {
    /// 按教学日分组（五天全部输出，空天 classes 为空）
    pub fn group_by_day(mut entries: Vec<TimetableEntry>) -> Self {
        entries.sort_by(|a, b| {
            (a.day, a.start_time, &a.room_number).cmp(&(b.day, b.start_time, &b.room_number))
        });

        let days_data = SchoolDay::ALL
            .iter()
            .map(|day| DaySchedule {
                day: *day,
                classes: entries.iter().filter(|e| e.day == *day).cloned().collect(),
            })
            .collect();

        Self { days_data }
    }
}
