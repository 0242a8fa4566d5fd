// ==========================================
// 大学周课表排课系统 - 占用索引
// ==========================================
// 职责: 按 (教学日, 小时) 记录已占用的讲师/教室/学生组
// 红线: 冲突判定全部为 O(1) 点查，不做线性扫描
// ==========================================

use crate::domain::subject::{Cohort, Subject};
use crate::domain::timetable::TimetableSlot;
use crate::domain::types::SchoolDay;
use std::collections::{HashMap, HashSet};

/// 时段键
pub type TimeKey = (SchoolDay, u32);

/// 单个时段的占用情况
#[derive(Debug, Default, Clone)]
struct SlotOccupancy {
    lecturers: HashSet<i64>,
    rooms: HashSet<i64>,
    cohorts: HashSet<Cohort>,
}

// ==========================================
// OccupancyIndex - 占用索引
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct OccupancyIndex {
    by_time: HashMap<TimeKey, SlotOccupancy>,
}

impl OccupancyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 讲师在该时段是否已有课
    pub fn lecturer_busy(&self, day: SchoolDay, hour: u32, lecturer_id: i64) -> bool {
        self.by_time
            .get(&(day, hour))
            .map_or(false, |o| o.lecturers.contains(&lecturer_id))
    }

    /// 教室在该时段是否已被占用
    pub fn room_busy(&self, day: SchoolDay, hour: u32, classroom_id: i64) -> bool {
        self.by_time
            .get(&(day, hour))
            .map_or(false, |o| o.rooms.contains(&classroom_id))
    }

    /// 学生组在该时段是否已有课
    pub fn cohort_busy(&self, day: SchoolDay, hour: u32, cohort: &Cohort) -> bool {
        self.by_time
            .get(&(day, hour))
            .map_or(false, |o| o.cohorts.contains(cohort))
    }

    /// 科目在该时段是否与讲师/学生组冲突（不含教室）
    pub fn subject_blocked(&self, day: SchoolDay, hour: u32, subject: &Subject) -> bool {
        if let Some(lecturer_id) = subject.lecturer_id {
            if self.lecturer_busy(day, hour, lecturer_id) {
                return true;
            }
        }
        self.cohort_busy(day, hour, &subject.cohort())
    }

    /// 登记一个已排时段
    ///
    /// # 返回
    /// - false: 教室在该时段已被占用，未登记
    pub fn book(&mut self, slot: &TimetableSlot, subject: &Subject) -> bool {
        let occupancy = self
            .by_time
            .entry((slot.day, slot.start_hour()))
            .or_default();

        if !occupancy.rooms.insert(slot.classroom_id) {
            return false;
        }
        if let Some(lecturer_id) = subject.lecturer_id {
            occupancy.lecturers.insert(lecturer_id);
        }
        occupancy.cohorts.insert(subject.cohort());
        true
    }

}
