// ==========================================
// 大学周课表排课系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值类型、排课报告
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod classroom;
pub mod report;
pub mod settings;
pub mod subject;
pub mod timetable;
pub mod types;

// 重导出核心类型
pub use classroom::{Classroom, Course};
pub use report::{
    GenerationLog, GenerationStatus, SchedulingReport, UnscheduledReason, UnscheduledSubject,
};
pub use settings::SystemSettings;
pub use subject::{derive_year_level, Cohort, Subject};
pub use timetable::{DaySchedule, FormattedTimetable, SlotFilter, TimetableEntry, TimetableSlot};
pub use types::{RoomType, SchoolDay, Semester};
