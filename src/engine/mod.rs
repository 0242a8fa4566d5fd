// ==========================================
// 大学周课表排课系统 - 引擎层
// ==========================================
// 职责: 实现排课规则，不拼 SQL
// 红线: Engine 不访问数据库，未排满必须输出 reason
// ==========================================

pub mod diagnosis;
pub mod occupancy;
pub mod priority;
pub mod timetable_scheduler;
pub mod validation;

// 重导出核心引擎
pub use diagnosis::FailureDiagnoser;
pub use occupancy::{OccupancyIndex, TimeKey};
pub use priority::SubjectPrioritySorter;
pub use timetable_scheduler::{TimetableResult, TimetableScheduler};
pub use validation::{SlotViolation, TimetableValidator, ViolationKind};
