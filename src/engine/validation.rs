// ==========================================
// 大学周课表排课系统 - 课表校验
// ==========================================
// 职责: 对已生成（或已持久化）的课表做不变量检查
// 检查项:
// - 教室/讲师/学生组同一时段不重复
// - 教室类型、容量、启用状态
// - 午休小时、学期、时段长度
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::classroom::Classroom;
use crate::domain::subject::{Cohort, Subject};
use crate::domain::timetable::TimetableSlot;
use crate::domain::types::{SchoolDay, Semester};
use chrono::Duration;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// 违规类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    RoomDoubleBooked,
    LecturerClash,
    CohortClash,
    RoomTypeMismatch,
    RoomTooSmall,
    InactiveRoom,
    BreakHour,
    OutsideTeachingHours,
    WrongSemester,
    BadDuration,
    UnknownReference,
}

/// 单条违规
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotViolation {
    pub kind: ViolationKind,
    pub message: String,
}

impl SlotViolation {
    fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SlotViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

// ==========================================
// TimetableValidator - 课表校验器
// ==========================================
pub struct TimetableValidator<'a> {
    config: &'a SchedulerConfig,
}

impl<'a> TimetableValidator<'a> {
    pub fn new(config: &'a SchedulerConfig) -> Self {
        Self { config }
    }

    /// 校验课表，返回全部违规（空表示通过）
    pub fn validate(
        &self,
        slots: &[TimetableSlot],
        subjects: &[Subject],
        classrooms: &[Classroom],
        current_semester: Semester,
    ) -> Vec<SlotViolation> {
        let subject_by_id: HashMap<i64, &Subject> = subjects.iter().map(|s| (s.id, s)).collect();
        let room_by_id: HashMap<i64, &Classroom> = classrooms.iter().map(|c| (c.id, c)).collect();

        let mut violations = Vec::new();
        let mut rooms_seen: HashSet<(SchoolDay, u32, i64)> = HashSet::new();
        let mut lecturers_seen: HashSet<(SchoolDay, u32, i64)> = HashSet::new();
        let mut cohorts_seen: HashSet<(SchoolDay, u32, Cohort)> = HashSet::new();

        for slot in slots {
            let hour = slot.start_hour();
            let at = format!("{} {}", slot.day, slot.start_time.format("%H:%M"));

            if slot.end_time.signed_duration_since(slot.start_time) != Duration::hours(1) {
                violations.push(SlotViolation::new(
                    ViolationKind::BadDuration,
                    format!("{}: 时段长度不是 1 小时", at),
                ));
            }

            if !self.config.candidate_hours().contains(&hour) {
                violations.push(SlotViolation::new(
                    ViolationKind::OutsideTeachingHours,
                    format!("{}: 超出教学时间窗口", at),
                ));
            }

            if !rooms_seen.insert((slot.day, hour, slot.classroom_id)) {
                violations.push(SlotViolation::new(
                    ViolationKind::RoomDoubleBooked,
                    format!("{}: 教室 {} 重复占用", at, slot.classroom_id),
                ));
            }

            let (Some(subject), Some(room)) = (
                subject_by_id.get(&slot.subject_id),
                room_by_id.get(&slot.classroom_id),
            ) else {
                violations.push(SlotViolation::new(
                    ViolationKind::UnknownReference,
                    format!(
                        "{}: 科目 {} 或教室 {} 不存在",
                        at, slot.subject_id, slot.classroom_id
                    ),
                ));
                continue;
            };

            if subject.semester != current_semester {
                violations.push(SlotViolation::new(
                    ViolationKind::WrongSemester,
                    format!("{}: 科目 {} 不属于当前学期", at, subject.code),
                ));
            }

            if hour == self.config.break_hour_for(subject.year_level()) {
                violations.push(SlotViolation::new(
                    ViolationKind::BreakHour,
                    format!("{}: 科目 {} 占用午休", at, subject.code),
                ));
            }

            if let Some(lecturer_id) = subject.lecturer_id {
                if !lecturers_seen.insert((slot.day, hour, lecturer_id)) {
                    violations.push(SlotViolation::new(
                        ViolationKind::LecturerClash,
                        format!("{}: 讲师 {} 同时段多门课", at, lecturer_id),
                    ));
                }
            }

            if !cohorts_seen.insert((slot.day, hour, subject.cohort())) {
                violations.push(SlotViolation::new(
                    ViolationKind::CohortClash,
                    format!("{}: 学生组冲突 ({})", at, subject.code),
                ));
            }

            if room.room_type != subject.room_type {
                violations.push(SlotViolation::new(
                    ViolationKind::RoomTypeMismatch,
                    format!(
                        "{}: 教室 {} 类型 {} 不满足 {}",
                        at, room.room_number, room.room_type, subject.room_type
                    ),
                ));
            }

            if room.capacity < self.config.assumed_batch_size {
                violations.push(SlotViolation::new(
                    ViolationKind::RoomTooSmall,
                    format!("{}: 教室 {} 容量不足", at, room.room_number),
                ));
            }

            if !room.is_active {
                violations.push(SlotViolation::new(
                    ViolationKind::InactiveRoom,
                    format!("{}: 教室 {} 未启用", at, room.room_number),
                ));
            }
        }

        violations
    }
}
