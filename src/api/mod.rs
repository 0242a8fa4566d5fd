// ==========================================
// 大学周课表排课系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行入口调用
// ==========================================

pub mod error;
pub mod import_api;
pub mod timetable_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse, ImportEntity};
pub use timetable_api::{GenerateResponse, TimetableApi};
