// ==========================================
// 大学周课表排课系统 - 排课配置读取 Trait
// ==========================================
// 职责: 定义排课所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::scheduler_config::{ConfigError, SchedulerConfig};
use async_trait::async_trait;

// ==========================================
// SchedulerConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait SchedulerConfigReader: Send + Sync {
    /// 获取排课参数（缺失项取默认值，返回前已校验）
    async fn get_scheduler_config(&self) -> Result<SchedulerConfig, ConfigError>;
}

/// 固定配置（测试/嵌入场景使用）
#[derive(Debug, Clone, Default)]
pub struct StaticConfigReader {
    pub config: SchedulerConfig,
}

impl StaticConfigReader {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SchedulerConfigReader for StaticConfigReader {
    async fn get_scheduler_config(&self) -> Result<SchedulerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}
