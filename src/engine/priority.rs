// ==========================================
// 大学周课表排课系统 - 科目排序引擎
// ==========================================
// 职责: 选出本学期科目并决定排课顺序
// 输入: 全部科目 + 当前学期
// 输出: 排序后的本学期科目引用
// ==========================================

use crate::domain::subject::Subject;
use crate::domain::types::Semester;
use std::cmp::Ordering;

// ==========================================
// SubjectPrioritySorter - 科目排序引擎
// ==========================================
pub struct SubjectPrioritySorter {
    // 无状态引擎,不需要注入依赖
}

impl SubjectPrioritySorter {
    pub fn new() -> Self {
        Self {}
    }

    /// 过滤本学期科目并排序
    ///
    /// 排序键:
    /// 1) priority 升序（数字越小越优先）
    /// 2) weekly_hours 降序（课时多的先占稀缺时段）
    /// 3) 输入顺序（稳定排序）
    ///
    /// 非本学期科目直接丢弃，不进入统计
    pub fn select_and_sort<'a>(
        &self,
        subjects: &'a [Subject],
        current_semester: Semester,
    ) -> Vec<&'a Subject> {
        let mut selected: Vec<&Subject> = subjects
            .iter()
            .filter(|s| s.semester == current_semester)
            .collect();
        selected.sort_by(|a, b| self.compare(a, b));
        selected
    }

    /// 比较两个科目的排课先后
    pub fn compare(&self, a: &Subject, b: &Subject) -> Ordering {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.weekly_hours.cmp(&a.weekly_hours))
    }
}

impl Default for SubjectPrioritySorter {
    fn default() -> Self {
        Self::new()
    }
}
