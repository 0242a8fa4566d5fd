// ==========================================
// 大学周课表排课系统 - 排课参数
// ==========================================
// 职责: 作息时间窗口、午休规则、批次人数、讲师超载阈值
// ==========================================

use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置校验失败: {0}")]
    Validation(String),

    #[error("配置读取失败: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("配置锁获取失败: {0}")]
    Lock(String),
}

// ==========================================
// SchedulerConfig - 排课参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// 每日第一节课开始小时（含）
    pub day_start_hour: u32,
    /// 每日教学结束小时（不含，最后一节课开始于 end-1）
    pub day_end_hour: u32,
    /// 一年级午休开始小时
    pub first_year_break_hour: u32,
    /// 二年级及以上午休开始小时
    pub upper_year_break_hour: u32,
    /// 假定批次人数（教室容量下限）
    pub assumed_batch_size: u32,
    /// 讲师周课时超载阈值（严格大于时视为超载）
    pub lecturer_overload_hours: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            day_start_hour: 8,
            day_end_hour: 17,
            first_year_break_hour: 12,
            upper_year_break_hour: 13,
            assumed_batch_size: 30,
            lecturer_overload_hours: 20,
        }
    }
}

impl SchedulerConfig {
    /// 候选开始小时（按扫描顺序）
    pub fn candidate_hours(&self) -> Range<u32> {
        self.day_start_hour..self.day_end_hour
    }

    /// 指定年级的午休小时
    pub fn break_hour_for(&self, year_level: u8) -> u32 {
        if year_level <= 1 {
            self.first_year_break_hour
        } else {
            self.upper_year_break_hour
        }
    }

    /// 校验参数一致性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.day_start_hour >= self.day_end_hour {
            return Err(ConfigError::Validation(format!(
                "day_start_hour({}) 必须小于 day_end_hour({})",
                self.day_start_hour, self.day_end_hour
            )));
        }
        // 最后一节课的结束时间必须可表示
        if self.day_end_hour > 23 {
            return Err(ConfigError::Validation(format!(
                "day_end_hour({}) 不能超过 23",
                self.day_end_hour
            )));
        }
        if self.assumed_batch_size == 0 {
            return Err(ConfigError::Validation(
                "assumed_batch_size 必须 >= 1".to_string(),
            ));
        }
        Ok(())
    }
}
