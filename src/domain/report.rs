// ==========================================
// 大学周课表排课系统 - 排课报告
// ==========================================
// 红线: 字段名为下游契约 (unscheduled / total_subjects /
//       fully_scheduled / total_slots_created)，不可随意改名
// ==========================================

use crate::domain::types::{RoomType, Semester};
use crate::i18n::t_with_args;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// UnscheduledReason - 未排满原因（诊断结论）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnscheduledReason {
    /// 没有类型/容量匹配的启用教室
    NoSuitableRoom { room_type: RoomType, min_capacity: u32 },
    /// 未分配讲师
    NoLecturer,
    /// 讲师周课时超过阈值
    LecturerOverloaded { lecturer_id: i64, weekly_hours: u32 },
    /// 讲师、教室、学生组没有共同空闲时段
    NoCommonFreeSlot,
}

impl UnscheduledReason {
    /// 稳定的机器可读代码
    pub fn code(&self) -> &'static str {
        match self {
            UnscheduledReason::NoSuitableRoom { .. } => "NO_SUITABLE_ROOM",
            UnscheduledReason::NoLecturer => "NO_LECTURER",
            UnscheduledReason::LecturerOverloaded { .. } => "LECTURER_OVERLOADED",
            UnscheduledReason::NoCommonFreeSlot => "NO_COMMON_FREE_SLOT",
        }
    }

    /// 当前语言下的可读描述
    pub fn message(&self) -> String {
        match self {
            UnscheduledReason::NoSuitableRoom {
                room_type,
                min_capacity,
            } => t_with_args(
                "diagnosis.no_suitable_room",
                &[
                    ("room_type", room_type.as_str()),
                    ("capacity", &min_capacity.to_string()),
                ],
            ),
            UnscheduledReason::NoLecturer => t_with_args("diagnosis.no_lecturer", &[]),
            UnscheduledReason::LecturerOverloaded { weekly_hours, .. } => t_with_args(
                "diagnosis.lecturer_overloaded",
                &[("hours", &weekly_hours.to_string())],
            ),
            UnscheduledReason::NoCommonFreeSlot => t_with_args("diagnosis.no_common_free_slot", &[]),
        }
    }
}

impl fmt::Display for UnscheduledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

// ==========================================
// UnscheduledSubject - 未排满科目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnscheduledSubject {
    pub subject: String,
    pub code: String,
    pub course: i64,
    pub year: u8,
    pub semester: Semester,
    pub needed: u32,
    pub scheduled: u32,
    pub missing: u32,
    pub reason: String,
    pub reason_code: String,
}

// ==========================================
// SchedulingReport - 排课汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulingReport {
    pub unscheduled: Vec<UnscheduledSubject>,
    pub total_subjects: usize,
    pub fully_scheduled: usize,
    pub total_slots_created: usize,
}

impl SchedulingReport {
    /// 是否全部排满
    pub fn is_complete(&self) -> bool {
        self.unscheduled.is_empty()
    }
}

// ==========================================
// GenerationStatus / GenerationLog - 排课运行记录
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Success,
    CompletedWithConflicts,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Success => "success",
            GenerationStatus::CompletedWithConflicts => "completed_with_conflicts",
            GenerationStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(GenerationStatus::Success),
            "completed_with_conflicts" => Some(GenerationStatus::CompletedWithConflicts),
            "failed" => Some(GenerationStatus::Failed),
            _ => None,
        }
    }

    /// 由报告推导运行状态
    pub fn from_report(report: &SchedulingReport) -> Self {
        if report.is_complete() {
            GenerationStatus::Success
        } else {
            GenerationStatus::CompletedWithConflicts
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationLog {
    pub run_id: String,
    pub semester: Semester,
    pub status: GenerationStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_subjects: usize,
    pub fully_scheduled: usize,
    pub total_slots_created: usize,
    /// 报告快照（JSON）；失败运行为 None
    pub report_json: Option<String>,
    /// 当次使用的排课参数（JSON）；失败运行为 None
    pub config_snapshot: Option<String>,
    pub error_message: Option<String>,
}
