// ==========================================
// 大学周课表排课系统 - 排课引擎
// ==========================================
// 算法: 按优先级排序 + 首次适配的贪心放置（不做回溯、不做全局优化）
// 红线:
// - 教室、讲师、学生组在同一 (教学日, 小时) 不可重复占用
// - 教室类型必须匹配、容量不小于批次人数、只用启用教室
// - 按年级避开午休小时
// ==========================================
// 输入: 全部科目 + 全部教室 + 当前学期
// 输出: 新的课表时段集合 + 排课报告
// 说明: 引擎每次从空占用索引开始；旧课表的清除由调用方在同一事务内完成
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::classroom::Classroom;
use crate::domain::report::{SchedulingReport, UnscheduledSubject};
use crate::domain::subject::Subject;
use crate::domain::timetable::TimetableSlot;
use crate::domain::types::{SchoolDay, Semester};
use crate::engine::diagnosis::FailureDiagnoser;
use crate::engine::occupancy::OccupancyIndex;
use crate::engine::priority::SubjectPrioritySorter;
use tracing::{debug, info, instrument, warn};

// ==========================================
// TimetableResult - 排课结果
// ==========================================
#[derive(Debug, Clone)]
pub struct TimetableResult {
    pub slots: Vec<TimetableSlot>,
    pub report: SchedulingReport,
}

// ==========================================
// TimetableScheduler - 排课引擎
// ==========================================
pub struct TimetableScheduler {
    config: SchedulerConfig,
    sorter: SubjectPrioritySorter,
}

impl TimetableScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            sorter: SubjectPrioritySorter::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 生成整周课表
    ///
    /// 步骤:
    /// 1) 选出本学期科目，按 priority 升序、weekly_hours 降序排序
    /// 2) 只保留启用教室（保持输入顺序）
    /// 3) 每个科目逐小时放置：每小时独立从周一 08:00 重新扫描
    /// 4) 未排满科目写入报告并诊断原因
    ///
    /// # 参数
    /// - `subjects`: 全部科目（不会被修改）
    /// - `classrooms`: 全部教室（不会被修改）
    /// - `current_semester`: 当前学期
    #[instrument(skip(self, subjects, classrooms), fields(
        subjects_count = subjects.len(),
        classrooms_count = classrooms.len(),
        semester = %current_semester
    ))]
    pub fn generate(
        &self,
        subjects: &[Subject],
        classrooms: &[Classroom],
        current_semester: Semester,
    ) -> TimetableResult {
        let ordered = self.sorter.select_and_sort(subjects, current_semester);
        let active_rooms: Vec<&Classroom> = classrooms.iter().filter(|c| c.is_active).collect();
        let diagnoser = FailureDiagnoser::new(&self.config, subjects);

        debug!(
            semester_subjects = ordered.len(),
            active_rooms = active_rooms.len(),
            "开始排课"
        );

        let mut index = OccupancyIndex::new();
        let mut slots: Vec<TimetableSlot> = Vec::new();
        let mut unscheduled: Vec<UnscheduledSubject> = Vec::new();

        for subject in ordered.iter().copied() {
            let needed = subject.weekly_hours;
            let mut scheduled = 0u32;

            for _ in 0..needed {
                // 找不到位置时占用索引未变化，后续小时必然同样失败
                let Some(slot) = self.find_placement(subject, &active_rooms, &index) else {
                    break;
                };
                if !index.book(&slot, subject) {
                    warn!(subject_code = %subject.code, "教室占用登记失败，放弃该科目剩余课时");
                    break;
                }
                slots.push(slot);
                scheduled += 1;
            }

            if scheduled < needed {
                let reason = diagnoser.diagnose(subject, classrooms);
                warn!(
                    subject_code = %subject.code,
                    needed,
                    scheduled,
                    reason_code = reason.code(),
                    "科目未排满"
                );
                unscheduled.push(UnscheduledSubject {
                    subject: subject.name.clone(),
                    code: subject.code.clone(),
                    course: subject.course_id,
                    year: subject.year_level(),
                    semester: subject.semester,
                    needed,
                    scheduled,
                    missing: needed - scheduled,
                    reason: reason.message(),
                    reason_code: reason.code().to_string(),
                });
            }
        }

        let total_subjects = ordered.len();
        let report = SchedulingReport {
            total_subjects,
            fully_scheduled: total_subjects - unscheduled.len(),
            total_slots_created: slots.len(),
            unscheduled,
        };

        info!(
            total_subjects = report.total_subjects,
            fully_scheduled = report.fully_scheduled,
            total_slots_created = report.total_slots_created,
            "排课完成"
        );

        TimetableResult { slots, report }
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 为科目寻找下一个可用 (教学日, 小时, 教室)
    ///
    /// 扫描顺序: 周一→周五，每天 day_start_hour..day_end_hour，跳过该年级午休
    fn find_placement(
        &self,
        subject: &Subject,
        active_rooms: &[&Classroom],
        index: &OccupancyIndex,
    ) -> Option<TimetableSlot> {
        let break_hour = self.config.break_hour_for(subject.year_level());

        for day in SchoolDay::ALL {
            for hour in self.config.candidate_hours() {
                if hour == break_hour {
                    continue;
                }
                if index.subject_blocked(day, hour, subject) {
                    continue;
                }
                let Some(room) = self.first_free_room(subject, active_rooms, index, day, hour) else {
                    continue;
                };
                if let Some(slot) = TimetableSlot::one_hour(subject.id, room.id, day, hour) {
                    return Some(slot);
                }
            }
        }

        None
    }

    /// 按教室输入顺序取第一个类型匹配、容量足够且空闲的教室
    fn first_free_room<'a>(
        &self,
        subject: &Subject,
        active_rooms: &[&'a Classroom],
        index: &OccupancyIndex,
        day: SchoolDay,
        hour: u32,
    ) -> Option<&'a Classroom> {
        active_rooms.iter().copied().find(|room| {
            room.is_suitable_for(subject.room_type, self.config.assumed_batch_size)
                && !index.room_busy(day, hour, room.id)
        })
    }
}

impl Default for TimetableScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RoomType;
    use crate::engine::validation::TimetableValidator;
    use chrono::Timelike;
    use std::collections::HashSet;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn create_test_subject(
        id: i64,
        code: &str,
        course_id: i64,
        weekly_hours: u32,
        room_type: RoomType,
        lecturer_id: Option<i64>,
    ) -> Subject {
        Subject {
            id,
            name: format!("Subject {}", code),
            code: code.to_string(),
            course_id,
            semester: Semester::First,
            weekly_hours,
            room_type,
            lecturer_id,
            priority: 1,
        }
    }

    fn create_test_room(id: i64, room_type: RoomType, capacity: u32) -> Classroom {
        Classroom {
            id,
            room_number: format!("R-{}", id),
            room_type,
            capacity,
            is_active: true,
        }
    }

    fn hours_of(result: &TimetableResult, subject_id: i64) -> usize {
        result.slots.iter().filter(|s| s.subject_id == subject_id).count()
    }

    // ==========================================
    // 基础场景
    // ==========================================

    #[test]
    fn test_empty_inputs_produce_empty_output() {
        let scheduler = TimetableScheduler::default();
        let result = scheduler.generate(&[], &[], Semester::First);

        assert!(result.slots.is_empty());
        assert_eq!(result.report.total_subjects, 0);
        assert_eq!(result.report.fully_scheduled, 0);
        assert_eq!(result.report.total_slots_created, 0);
        assert!(result.report.unscheduled.is_empty());
    }

    #[test]
    fn test_single_subject_three_hours() {
        let scheduler = TimetableScheduler::default();
        let subjects = vec![create_test_subject(1, "CST101", 1, 3, RoomType::LectureHall, Some(10))];
        let rooms = vec![
            create_test_room(1, RoomType::LectureHall, 30),
            create_test_room(2, RoomType::LectureHall, 30),
        ];

        let result = scheduler.generate(&subjects, &rooms, Semester::First);

        assert_eq!(result.slots.len(), 3);
        let distinct: HashSet<(SchoolDay, u32)> =
            result.slots.iter().map(|s| (s.day, s.start_hour())).collect();
        assert_eq!(distinct.len(), 3);
        assert_eq!(result.report.total_subjects, 1);
        assert_eq!(result.report.fully_scheduled, 1);
        assert!(result.report.unscheduled.is_empty());

        // 首次适配：周一 08:00 / 09:00 / 10:00，均在第一间教室
        let hours: Vec<u32> = result.slots.iter().map(|s| s.start_hour()).collect();
        assert_eq!(hours, vec![8, 9, 10]);
        assert!(result.slots.iter().all(|s| s.day == SchoolDay::Monday && s.classroom_id == 1));
        assert!(result
            .slots
            .iter()
            .all(|s| s.end_time.hour() == s.start_time.hour() + 1));
    }

    #[test]
    fn test_off_semester_subject_is_excluded_from_totals() {
        let scheduler = TimetableScheduler::default();
        let mut off = create_test_subject(2, "CST102", 1, 2, RoomType::LectureHall, Some(11));
        off.semester = Semester::Second;
        let subjects = vec![
            create_test_subject(1, "CST101", 1, 2, RoomType::LectureHall, Some(10)),
            off,
        ];
        let rooms = vec![create_test_room(1, RoomType::LectureHall, 30)];

        let result = scheduler.generate(&subjects, &rooms, Semester::First);

        assert_eq!(hours_of(&result, 2), 0);
        assert_eq!(result.report.total_subjects, 1);
        assert!(result.report.unscheduled.iter().all(|u| u.code != "CST102"));
    }

    // ==========================================
    // 午休规则
    // ==========================================

    #[test]
    fn test_break_hour_depends_on_year() {
        let scheduler = TimetableScheduler::default();
        // 一年级 9 小时（周一 8..17 除去 12 点刚好 8 个，第9个落到周二）
        let first_year = create_test_subject(1, "CST101", 1, 9, RoomType::LectureHall, Some(10));
        let second_year = create_test_subject(2, "CST201", 1, 9, RoomType::LectureHall, Some(11));
        let rooms = vec![
            create_test_room(1, RoomType::LectureHall, 30),
            create_test_room(2, RoomType::LectureHall, 30),
        ];

        let result = scheduler.generate(&[first_year, second_year], &rooms, Semester::First);

        assert!(result
            .slots
            .iter()
            .filter(|s| s.subject_id == 1)
            .all(|s| s.start_hour() != 12));
        assert!(result
            .slots
            .iter()
            .filter(|s| s.subject_id == 2)
            .all(|s| s.start_hour() != 13));
        // 二年级可以在 12 点上课
        assert!(result
            .slots
            .iter()
            .any(|s| s.subject_id == 2 && s.start_hour() == 12));
    }

    // ==========================================
    // 冲突规则
    // ==========================================

    #[test]
    fn test_lecturer_conflict_across_courses() {
        let scheduler = TimetableScheduler::default();
        let subjects = vec![
            create_test_subject(1, "CST101", 1, 2, RoomType::LectureHall, Some(10)),
            create_test_subject(2, "SCT101", 2, 2, RoomType::LectureHall, Some(10)),
        ];
        let rooms = vec![
            create_test_room(1, RoomType::LectureHall, 30),
            create_test_room(2, RoomType::LectureHall, 30),
        ];

        let result = scheduler.generate(&subjects, &rooms, Semester::First);

        assert_eq!(result.slots.len(), 4);
        let times: HashSet<(SchoolDay, u32)> =
            result.slots.iter().map(|s| (s.day, s.start_hour())).collect();
        assert_eq!(times.len(), 4, "同一讲师不能同时上两门课");
    }

    #[test]
    fn test_different_cohorts_share_time_in_different_rooms() {
        let scheduler = TimetableScheduler::default();
        let subjects = vec![
            create_test_subject(1, "CST101", 1, 1, RoomType::LectureHall, Some(10)),
            create_test_subject(2, "SCT101", 2, 1, RoomType::LectureHall, Some(11)),
        ];
        let rooms = vec![
            create_test_room(1, RoomType::LectureHall, 30),
            create_test_room(2, RoomType::LectureHall, 30),
        ];

        let result = scheduler.generate(&subjects, &rooms, Semester::First);

        assert_eq!(result.slots.len(), 2);
        assert!(result.slots.iter().all(|s| s.day == SchoolDay::Monday && s.start_hour() == 8));
        let room_ids: HashSet<i64> = result.slots.iter().map(|s| s.classroom_id).collect();
        assert_eq!(room_ids.len(), 2);
    }

    #[test]
    fn test_room_exhaustion_defers_second_subject() {
        let scheduler = TimetableScheduler::default();
        // 同专业同年级，两门课，只有一间合适教室
        let subjects = vec![
            create_test_subject(1, "CST101", 1, 1, RoomType::LectureHall, Some(10)),
            create_test_subject(2, "CST102", 1, 1, RoomType::LectureHall, Some(11)),
        ];
        let rooms = vec![create_test_room(1, RoomType::LectureHall, 30)];

        let result = scheduler.generate(&subjects, &rooms, Semester::First);

        assert_eq!(result.slots.len(), 2);
        let first = result.slots.iter().find(|s| s.subject_id == 1).unwrap();
        let second = result.slots.iter().find(|s| s.subject_id == 2).unwrap();
        assert_eq!((first.day, first.start_hour()), (SchoolDay::Monday, 8));
        assert_eq!((second.day, second.start_hour()), (SchoolDay::Monday, 9));
    }

    #[test]
    fn test_room_type_and_capacity_are_respected() {
        let scheduler = TimetableScheduler::default();
        let subjects = vec![create_test_subject(1, "CST101", 1, 2, RoomType::ComputerLab, Some(10))];
        let rooms = vec![
            create_test_room(1, RoomType::LectureHall, 200),
            create_test_room(2, RoomType::ComputerLab, 25),
            create_test_room(3, RoomType::ComputerLab, 35),
        ];

        let result = scheduler.generate(&subjects, &rooms, Semester::First);

        assert_eq!(result.slots.len(), 2);
        assert!(result.slots.iter().all(|s| s.classroom_id == 3));
    }

    #[test]
    fn test_inactive_rooms_are_never_used() {
        let scheduler = TimetableScheduler::default();
        let subjects = vec![create_test_subject(1, "CST101", 1, 2, RoomType::LectureHall, Some(10))];
        let mut inactive = create_test_room(1, RoomType::LectureHall, 100);
        inactive.is_active = false;
        let rooms = vec![inactive, create_test_room(2, RoomType::LectureHall, 30)];

        let result = scheduler.generate(&subjects, &rooms, Semester::First);

        assert!(result.slots.iter().all(|s| s.classroom_id == 2));
    }

    // ==========================================
    // 排序与诊断
    // ==========================================

    #[test]
    fn test_higher_priority_subject_gets_first_slot() {
        let scheduler = TimetableScheduler::default();
        let mut low = create_test_subject(1, "CST101", 1, 1, RoomType::LectureHall, Some(10));
        low.priority = 2;
        let high = create_test_subject(2, "CST102", 1, 1, RoomType::LectureHall, Some(11));
        let rooms = vec![create_test_room(1, RoomType::LectureHall, 30)];

        let result = scheduler.generate(&[low, high], &rooms, Semester::First);

        let high_slot = result.slots.iter().find(|s| s.subject_id == 2).unwrap();
        assert_eq!((high_slot.day, high_slot.start_hour()), (SchoolDay::Monday, 8));
    }

    #[test]
    fn test_unscheduled_report_when_no_lab_exists() {
        let scheduler = TimetableScheduler::default();
        let subjects = vec![create_test_subject(1, "CST201", 4, 3, RoomType::ComputerLab, Some(10))];
        let rooms = vec![create_test_room(1, RoomType::LectureHall, 30)];

        let result = scheduler.generate(&subjects, &rooms, Semester::First);

        assert!(result.slots.is_empty());
        assert_eq!(result.report.fully_scheduled, 0);
        assert_eq!(result.report.unscheduled.len(), 1);
        let entry = &result.report.unscheduled[0];
        assert_eq!(entry.code, "CST201");
        assert_eq!(entry.course, 4);
        assert_eq!(entry.year, 2);
        assert_eq!(entry.needed, 3);
        assert_eq!(entry.scheduled, 0);
        assert_eq!(entry.missing, 3);
        assert_eq!(entry.reason_code, "NO_SUITABLE_ROOM");
        assert!(!entry.reason.is_empty());
    }

    #[test]
    fn test_partial_placement_when_week_is_full() {
        let scheduler = TimetableScheduler::default();
        // 一年级每周最多 5 天 × 8 小时 = 40 小时
        let subjects = vec![create_test_subject(1, "CST101", 1, 42, RoomType::LectureHall, Some(10))];
        let rooms = vec![create_test_room(1, RoomType::LectureHall, 30)];

        let result = scheduler.generate(&subjects, &rooms, Semester::First);

        assert_eq!(result.slots.len(), 40);
        let entry = &result.report.unscheduled[0];
        assert_eq!(entry.scheduled, 40);
        assert_eq!(entry.missing, 2);
        // 讲师总课时 42 > 20
        assert_eq!(entry.reason_code, "LECTURER_OVERLOADED");
    }

    #[test]
    fn test_huge_weekly_hours_stops_after_week_is_full() {
        let scheduler = TimetableScheduler::default();
        let subjects = vec![create_test_subject(1, "CST101", 1, 5_000_000, RoomType::LectureHall, Some(10))];
        let rooms = vec![create_test_room(1, RoomType::LectureHall, 30)];

        let started = std::time::Instant::now();
        let result = scheduler.generate(&subjects, &rooms, Semester::First);

        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert_eq!(result.slots.len(), 40);
        let entry = &result.report.unscheduled[0];
        assert_eq!(entry.scheduled, 40);
        assert_eq!(entry.missing, 5_000_000 - 40);
    }

    #[test]
    fn test_room_exhaustion_leaves_same_cohort_subject_partial() {
        let scheduler = TimetableScheduler::default();
        // 唯一教室每周 40 个可用小时：CST101 占 39 个，CST102 只剩 1 个
        let subjects = vec![
            create_test_subject(1, "CST101", 1, 39, RoomType::LectureHall, Some(10)),
            create_test_subject(2, "CST102", 1, 2, RoomType::LectureHall, Some(11)),
        ];
        let rooms = vec![create_test_room(1, RoomType::LectureHall, 30)];

        let result = scheduler.generate(&subjects, &rooms, Semester::First);

        assert_eq!(result.slots.len(), 40);
        assert_eq!(hours_of(&result, 1), 39);
        assert_eq!(hours_of(&result, 2), 1);
        assert_eq!(result.report.fully_scheduled, 1);

        let entry = &result.report.unscheduled[0];
        assert_eq!(entry.code, "CST102");
        assert_eq!(entry.scheduled, 1);
        assert_eq!(entry.missing, 1);
        assert_eq!(entry.reason_code, "NO_COMMON_FREE_SLOT");
    }

    #[test]
    fn test_generated_slots_pass_validation_and_are_deterministic() {
        let scheduler = TimetableScheduler::default();
        let mut subjects = Vec::new();
        for i in 0..12i64 {
            let year = (i % 3) + 1;
            let code = format!("CST{}{:02}", year, i);
            let room_type = if i % 4 == 0 { RoomType::ComputerLab } else { RoomType::LectureHall };
            subjects.push(create_test_subject(i + 1, &code, 1 + i % 2, 3 + (i % 3) as u32, room_type, Some(100 + i % 5)));
        }
        let rooms = vec![
            create_test_room(1, RoomType::LectureHall, 60),
            create_test_room(2, RoomType::ComputerLab, 40),
            create_test_room(3, RoomType::LectureHall, 30),
        ];

        let first = scheduler.generate(&subjects, &rooms, Semester::First);
        let second = scheduler.generate(&subjects, &rooms, Semester::First);

        let violations = TimetableValidator::new(scheduler.config())
            .validate(&first.slots, &subjects, &rooms, Semester::First);
        assert!(violations.is_empty(), "violations: {:?}", violations);
        assert_eq!(first.slots, second.slots);
        assert_eq!(first.report.total_slots_created, second.report.total_slots_created);
        assert_eq!(first.report.fully_scheduled, second.report.fully_scheduled);
        assert_eq!(first.report.total_slots_created, first.slots.len());
    }
}
