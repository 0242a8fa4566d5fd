// ==========================================
// 大学周课表排课系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod classroom_repo;
pub mod course_repo;
pub mod error;
pub mod generation_log_repo;
pub mod row_codec;
pub mod settings_repo;
pub mod subject_repo;
pub mod timetable_repo;

// 重导出核心仓储
pub use classroom_repo::ClassroomRepository;
pub use course_repo::CourseRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use generation_log_repo::GenerationLogRepository;
pub use settings_repo::SystemSettingsRepository;
pub use subject_repo::{NewSubject, SubjectRepository};
pub use timetable_repo::TimetableSlotRepository;
