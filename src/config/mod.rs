// ==========================================
// 大学周课表排课系统 - 配置层
// ==========================================
// 职责: 排课参数管理,支持 config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod config_reader;
pub mod scheduler_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use config_reader::{SchedulerConfigReader, StaticConfigReader};
pub use scheduler_config::{ConfigError, SchedulerConfig};
