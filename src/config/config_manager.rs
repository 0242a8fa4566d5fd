// ==========================================
// 大学周课表排课系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value, scope_id='global')
// ==========================================

use crate::config::config_reader::SchedulerConfigReader;
use crate::config::scheduler_config::{ConfigError, SchedulerConfig};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> Result<MutexGuard<'_, Connection>, ConfigError> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::Lock(e.to_string()))
    }

    /// 读取 global scope 的配置值
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 读取数值配置，缺失时取默认值，格式错误时告警并取默认值
    fn get_u32_or_default(&self, key: &str, default: u32) -> Result<u32, ConfigError> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(config_key = key, raw_value = %raw, default, "配置值格式错误，使用默认值");
                    Ok(default)
                }
            },
        }
    }

    /// 读取排课参数（同步版本）
    pub fn load_scheduler_config(&self) -> Result<SchedulerConfig, ConfigError> {
        let defaults = SchedulerConfig::default();
        let config = SchedulerConfig {
            day_start_hour: self.get_u32_or_default(config_keys::DAY_START_HOUR, defaults.day_start_hour)?,
            day_end_hour: self.get_u32_or_default(config_keys::DAY_END_HOUR, defaults.day_end_hour)?,
            first_year_break_hour: self
                .get_u32_or_default(config_keys::FIRST_YEAR_BREAK_HOUR, defaults.first_year_break_hour)?,
            upper_year_break_hour: self
                .get_u32_or_default(config_keys::UPPER_YEAR_BREAK_HOUR, defaults.upper_year_break_hour)?,
            assumed_batch_size: self
                .get_u32_or_default(config_keys::ASSUMED_BATCH_SIZE, defaults.assumed_batch_size)?,
            lecturer_overload_hours: self.get_u32_or_default(
                config_keys::LECTURER_OVERLOAD_HOURS,
                defaults.lecturer_overload_hours,
            )?,
        };
        config.validate()?;
        Ok(config)
    }
}

// ==========================================
// SchedulerConfigReader Trait 实现
// ==========================================
#[async_trait]
impl SchedulerConfigReader for ConfigManager {
    async fn get_scheduler_config(&self) -> Result<SchedulerConfig, ConfigError> {
        self.load_scheduler_config()
    }
}

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 作息窗口
    pub const DAY_START_HOUR: &str = "day_start_hour";
    pub const DAY_END_HOUR: &str = "day_end_hour";

    // 午休
    pub const FIRST_YEAR_BREAK_HOUR: &str = "first_year_break_hour";
    pub const UPPER_YEAR_BREAK_HOUR: &str = "upper_year_break_hour";

    // 教室容量
    pub const ASSUMED_BATCH_SIZE: &str = "assumed_batch_size";

    // 讲师负荷
    pub const LECTURER_OVERLOAD_HOURS: &str = "lecturer_overload_hours";
}
