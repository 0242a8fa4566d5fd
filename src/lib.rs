// ==========================================
// 大学周课表排课系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 贪心约束排课（优先级排序 + 首次适配）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排课规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 排课参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{RoomType, SchoolDay, Semester};

// 领域实体
pub use domain::{
    Classroom, Course, GenerationLog, GenerationStatus, SchedulingReport, Subject,
    SystemSettings, TimetableEntry, TimetableSlot, UnscheduledSubject,
};

// 引擎
pub use engine::{TimetableResult, TimetableScheduler, TimetableValidator};

// 配置
pub use config::{ConfigManager, SchedulerConfig};

// API
pub use api::{ApiError, ApiResult, GenerateResponse, ImportApi, TimetableApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "大学周课表排课系统";
