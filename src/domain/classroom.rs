// ==========================================
// 大学周课表排课系统 - 教室与专业领域模型
// ==========================================

use crate::domain::types::RoomType;
use serde::{Deserialize, Serialize};

// ==========================================
// Classroom - 教室
// ==========================================
// 只有 is_active = true 的教室参与排课
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: i64,
    pub room_number: String,
    pub room_type: RoomType,
    pub capacity: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Classroom {
    /// 是否满足科目的教室要求（类型 + 容量 + 启用）
    pub fn is_suitable_for(&self, room_type: RoomType, min_capacity: u32) -> bool {
        self.is_active && self.room_type == room_type && self.capacity >= min_capacity
    }
}

// ==========================================
// Course - 专业
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub faculty: String,
}
