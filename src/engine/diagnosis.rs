// ==========================================
// 大学周课表排课系统 - 未排满诊断
// ==========================================
// 职责: 为未排满科目给出一条最可能的原因（启发式，非穷举）
// 判定顺序:
// 1) 无类型/容量匹配的启用教室
// 2) 未分配讲师
// 3) 讲师全部科目周课时之和超过阈值
// 4) 兜底: 讲师/教室/学生组无共同空闲时段
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::classroom::Classroom;
use crate::domain::report::UnscheduledReason;
use crate::domain::subject::Subject;
use std::collections::HashMap;

// ==========================================
// FailureDiagnoser - 未排满诊断器
// ==========================================
pub struct FailureDiagnoser {
    min_capacity: u32,
    overload_hours: u32,
    /// lecturer_id → 全部科目（不分学期）周课时之和
    lecturer_load: HashMap<i64, u32>,
}

impl FailureDiagnoser {
    /// 创建诊断器
    ///
    /// # 参数
    /// - config: 排课参数（容量下限、超载阈值）
    /// - all_subjects: 全部科目（含非本学期，用于统计讲师负荷）
    pub fn new(config: &SchedulerConfig, all_subjects: &[Subject]) -> Self {
        let mut lecturer_load: HashMap<i64, u32> = HashMap::new();
        for subject in all_subjects {
            if let Some(lecturer_id) = subject.lecturer_id {
                *lecturer_load.entry(lecturer_id).or_insert(0) += subject.weekly_hours;
            }
        }

        Self {
            min_capacity: config.assumed_batch_size,
            overload_hours: config.lecturer_overload_hours,
            lecturer_load,
        }
    }

    /// 讲师周课时
    pub fn lecturer_hours(&self, lecturer_id: i64) -> u32 {
        self.lecturer_load.get(&lecturer_id).copied().unwrap_or(0)
    }

    /// 诊断单个科目
    pub fn diagnose(&self, subject: &Subject, classrooms: &[Classroom]) -> UnscheduledReason {
        let has_suitable_room = classrooms
            .iter()
            .any(|room| room.is_suitable_for(subject.room_type, self.min_capacity));
        if !has_suitable_room {
            return UnscheduledReason::NoSuitableRoom {
                room_type: subject.room_type,
                min_capacity: self.min_capacity,
            };
        }

        let lecturer_id = match subject.lecturer_id {
            Some(id) => id,
            None => return UnscheduledReason::NoLecturer,
        };

        let weekly_hours = self.lecturer_hours(lecturer_id);
        if weekly_hours > self.overload_hours {
            return UnscheduledReason::LecturerOverloaded {
                lecturer_id,
                weekly_hours,
            };
        }

        UnscheduledReason::NoCommonFreeSlot
    }
}
