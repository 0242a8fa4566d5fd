// ==========================================
// 大学周课表排课系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ApiError, ApiResult, ImportApi, TimetableApi};
use crate::config::{ConfigManager, SchedulerConfigReader};
use crate::db::{init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "TIMETABLE_SCHEDULER_DB_PATH";

/// 应用状态
///
/// 所有仓储共享同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 课表API
    pub timetable_api: Arc<TimetableApi>,

    /// 基础数据导入API
    pub import_api: Arc<ImportApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 打开数据库、建表（幂等）、组装 API
    pub fn new(db_path: String) -> ApiResult<Self> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(format!("无法打开数据库: {}", e)))?;
        init_schema(&conn)?;

        // 拒绝由更新版本程序写入的数据库
        let schema_version = read_schema_version(&conn)?.unwrap_or(0);
        if schema_version > CURRENT_SCHEMA_VERSION {
            return Err(ApiError::DatabaseError(format!(
                "数据库 schema 版本 {} 高于程序支持的版本 {}",
                schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        tracing::info!(schema_version, "数据库 schema 已就绪");
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));
        let config_reader: Arc<dyn SchedulerConfigReader> = config_manager.clone();
        let timetable_api = Arc::new(TimetableApi::new(conn.clone(), config_reader));
        let import_api = Arc::new(ImportApi::new(conn));

        Ok(Self {
            db_path,
            config_manager,
            timetable_api,
            import_api,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./timetable_scheduler.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("timetable-scheduler");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("timetable_scheduler.db");
        }
    }

    path.to_string_lossy().to_string()
}
