// ==========================================
// 大学周课表排课系统 - 系统设置
// ==========================================
// 单行表，排课时作为只读输入显式传入，不做全局懒加载
// ==========================================

use crate::domain::types::Semester;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 默认学年
pub const DEFAULT_ACADEMIC_YEAR: &str = "2024/2025";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    pub current_semester: Semester,
    pub academic_year: String,
    pub updated_at: DateTime<Utc>,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            current_semester: Semester::First,
            academic_year: DEFAULT_ACADEMIC_YEAR.to_string(),
            updated_at: Utc::now(),
        }
    }
}
