// ==========================================
// 课表 API 集成测试
// ==========================================
// 职责: 验证排课触发、整体替换、查询过滤、学期切换、并发闸门
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Timelike;
use timetable_scheduler::api::{ApiError, TimetableApi};
use timetable_scheduler::config::{ConfigError, SchedulerConfig, SchedulerConfigReader, StaticConfigReader};
use timetable_scheduler::domain::types::{RoomType, SchoolDay, Semester};
use timetable_scheduler::domain::{GenerationStatus, SlotFilter};
use timetable_scheduler::logging;
use timetable_scheduler::repository::TimetableSlotRepository;

use crate::test_helpers::{create_test_db, open_shared, Seeder};

// ==========================================
// 测试辅助
// ==========================================

/// 读取配置前先等待，用于制造并发窗口
struct SlowConfigReader {
    delay: Duration,
}

#[async_trait]
impl SchedulerConfigReader for SlowConfigReader {
    async fn get_scheduler_config(&self) -> Result<SchedulerConfig, ConfigError> {
        tokio::time::sleep(self.delay).await;
        Ok(SchedulerConfig::default())
    }
}

/// 始终失败的配置读取器
struct BrokenConfigReader;

#[async_trait]
impl SchedulerConfigReader for BrokenConfigReader {
    async fn get_scheduler_config(&self) -> Result<SchedulerConfig, ConfigError> {
        Err(ConfigError::Validation("day_start_hour must be < day_end_hour".to_string()))
    }
}

fn default_reader() -> Arc<dyn SchedulerConfigReader> {
    Arc::new(StaticConfigReader::new(SchedulerConfig::default()))
}

// ==========================================
// 测试用例
// ==========================================

#[tokio::test]
async fn test_generate_single_subject_three_hours() {
    logging::init_test();
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let seeder = Seeder::new(conn.clone());
    let cs = seeder.course("CS");
    seeder.lecture_hall("LH-1", 30);
    seeder.lecture_hall("LH-2", 30);
    seeder.subject("CST101", cs, Semester::First, 3, RoomType::LectureHall, Some(1));

    let api = TimetableApi::new(conn, default_reader());
    let response = api.generate().await.unwrap();

    assert_eq!(response.status, GenerationStatus::Success);
    assert_eq!(response.report.total_subjects, 1);
    assert_eq!(response.report.fully_scheduled, 1);
    assert_eq!(response.report.total_slots_created, 3);
    assert!(response.report.unscheduled.is_empty());

    let entries = api.list_slots(&SlotFilter::default()).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.day == SchoolDay::Monday && e.room_number == "LH-1"));
    let hours: Vec<u32> = entries.iter().map(|e| e.start_time.hour()).collect();
    assert_eq!(hours, vec![8, 9, 10]);

    let latest = api.latest_generation().unwrap().unwrap();
    assert_eq!(latest.run_id, response.run_id);
    assert_eq!(latest.status, GenerationStatus::Success);

    // 运行记录保存当次使用的排课参数
    let snapshot: SchedulerConfig =
        serde_json::from_str(latest.config_snapshot.as_deref().unwrap()).unwrap();
    assert_eq!(snapshot, SchedulerConfig::default());
}

#[tokio::test]
async fn test_regeneration_replaces_instead_of_appending() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let seeder = Seeder::new(conn.clone());
    let cs = seeder.course("CS");
    let st = seeder.course("ST");
    seeder.lecture_hall("LH-1", 40);
    seeder.computer_lab("LAB-1", 30);
    seeder.subject("CST101", cs, Semester::First, 4, RoomType::LectureHall, Some(1));
    seeder.subject("CST102", cs, Semester::First, 2, RoomType::ComputerLab, Some(2));
    seeder.subject("STA201", st, Semester::First, 3, RoomType::LectureHall, Some(1));

    let api = TimetableApi::new(conn.clone(), default_reader());
    let slot_repo = TimetableSlotRepository::from_connection(conn);

    api.generate().await.unwrap();
    let first = slot_repo.list_all().unwrap();
    api.generate().await.unwrap();
    let second = slot_repo.list_all().unwrap();

    assert_eq!(first.len(), 9);
    assert_eq!(first, second);
    assert_eq!(slot_repo.count().unwrap(), 9);
}

#[tokio::test]
async fn test_off_semester_subjects_follow_settings() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let seeder = Seeder::new(conn.clone());
    let cs = seeder.course("CS");
    seeder.lecture_hall("LH-1", 30);
    let first_id = seeder.subject("CST101", cs, Semester::First, 2, RoomType::LectureHall, Some(1));
    let second_id = seeder.subject("CST151", cs, Semester::Second, 2, RoomType::LectureHall, Some(2));

    let api = TimetableApi::new(conn, default_reader());

    let response = api.generate().await.unwrap();
    assert_eq!(response.report.total_subjects, 1);
    let entries = api.list_slots(&SlotFilter::default()).unwrap();
    assert!(entries.iter().all(|e| e.subject_id == first_id));

    api.set_current_semester(2).unwrap();
    let response = api.generate().await.unwrap();
    assert_eq!(response.report.total_subjects, 1);
    let entries = api.list_slots(&SlotFilter::default()).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.subject_id == second_id));
}

#[tokio::test]
async fn test_conflicts_are_reported_not_fatal() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let seeder = Seeder::new(conn.clone());
    let cs = seeder.course("CS");
    seeder.lecture_hall("LH-1", 30);
    seeder.subject("CST201", cs, Semester::First, 3, RoomType::ComputerLab, Some(1));
    seeder.subject("CST202", cs, Semester::First, 2, RoomType::LectureHall, Some(2));

    let api = TimetableApi::new(conn, default_reader());
    let response = api.generate().await.unwrap();

    assert_eq!(response.status, GenerationStatus::CompletedWithConflicts);
    assert_eq!(response.report.total_subjects, 2);
    assert_eq!(response.report.fully_scheduled, 1);
    assert_eq!(response.report.unscheduled.len(), 1);

    let entry = &response.report.unscheduled[0];
    assert_eq!(entry.code, "CST201");
    assert_eq!(entry.year, 2);
    assert_eq!(entry.missing, 3);
    assert_eq!(entry.reason_code, "NO_SUITABLE_ROOM");

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "completed_with_conflicts");
    assert!(json["report"]["unscheduled"].is_array());
}

#[tokio::test]
async fn test_failed_run_keeps_previous_timetable() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let seeder = Seeder::new(conn.clone());
    let cs = seeder.course("CS");
    seeder.lecture_hall("LH-1", 30);
    seeder.subject("CST101", cs, Semester::First, 2, RoomType::LectureHall, Some(1));

    let good = TimetableApi::new(conn.clone(), default_reader());
    good.generate().await.unwrap();

    let broken = TimetableApi::new(conn.clone(), Arc::new(BrokenConfigReader));
    let err = broken.generate().await.unwrap_err();
    assert!(matches!(err, ApiError::ConfigError(_)));

    let slot_repo = TimetableSlotRepository::from_connection(conn);
    assert_eq!(slot_repo.count().unwrap(), 2);

    let latest = broken.latest_generation().unwrap().unwrap();
    assert_eq!(latest.status, GenerationStatus::Failed);
    assert!(latest.error_message.is_some());
    assert!(latest.config_snapshot.is_none());
}

#[tokio::test]
async fn test_unreadable_settings_still_logs_failed_run() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let seeder = Seeder::new(conn.clone());
    let cs = seeder.course("CS");
    seeder.lecture_hall("LH-1", 30);
    seeder.subject("CST101", cs, Semester::First, 2, RoomType::LectureHall, Some(1));

    // updated_at 无法解析为时间戳，设置读取失败
    conn.lock()
        .unwrap()
        .execute(
            "INSERT INTO system_settings (id, current_semester, academic_year, updated_at)
             VALUES (1, 2, '2024/2025', 'not-a-timestamp')",
            [],
        )
        .unwrap();

    let api = TimetableApi::new(conn, default_reader());
    assert!(api.generate().await.is_err());

    let latest = api.latest_generation().unwrap().unwrap();
    assert_eq!(latest.status, GenerationStatus::Failed);
    assert_eq!(latest.semester, Semester::First);
    assert!(latest.error_message.is_some());
    assert!(api.list_slots(&SlotFilter::default()).unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_generate_fails_fast() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let seeder = Seeder::new(conn.clone());
    let cs = seeder.course("CS");
    seeder.lecture_hall("LH-1", 30);
    seeder.subject("CST101", cs, Semester::First, 2, RoomType::LectureHall, Some(1));

    let api = TimetableApi::new(
        conn,
        Arc::new(SlowConfigReader {
            delay: Duration::from_millis(300),
        }),
    );

    let (first, second) = tokio::join!(api.generate(), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        api.generate().await
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(ApiError::GenerationInProgress)));

    // 闸门释放后可以再次排课
    assert!(api.generate().await.is_ok());
}

#[tokio::test]
async fn test_filters_and_formatted_view() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let seeder = Seeder::new(conn.clone());
    let cs = seeder.course("CS");
    let st = seeder.course("ST");
    seeder.lecture_hall("LH-1", 30);
    seeder.lecture_hall("LH-2", 30);
    seeder.subject("CST101", cs, Semester::First, 2, RoomType::LectureHall, Some(7));
    seeder.subject("CST201", cs, Semester::First, 2, RoomType::LectureHall, Some(8));
    seeder.subject("STA101", st, Semester::First, 1, RoomType::LectureHall, Some(7));

    let api = TimetableApi::new(conn, default_reader());
    api.generate().await.unwrap();

    let by_course = api
        .list_slots(&SlotFilter { course_id: Some(st), ..Default::default() })
        .unwrap();
    assert_eq!(by_course.len(), 1);

    let by_year = api
        .list_slots(&SlotFilter { course_id: Some(cs), year: Some(2), ..Default::default() })
        .unwrap();
    assert_eq!(by_year.len(), 2);
    assert!(by_year.iter().all(|e| e.subject_code == "CST201"));

    let by_lecturer = api
        .list_slots(&SlotFilter { lecturer_id: Some(7), ..Default::default() })
        .unwrap();
    assert_eq!(by_lecturer.len(), 3);

    let view = api.formatted_timetable(&SlotFilter::default()).unwrap();
    assert_eq!(view.days_data.len(), 5);
    assert_eq!(view.days_data[0].day, SchoolDay::Monday);
    assert_eq!(view.days_data[0].classes.len(), 5);
    assert!(view.days_data[1..].iter().all(|d| d.classes.is_empty()));

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["days_data"][0]["day"], "Monday");
}

#[tokio::test]
async fn test_set_current_semester_rejects_invalid_values() {
    let (_temp, db_path) = create_test_db().unwrap();
    let api = TimetableApi::new(open_shared(&db_path), default_reader());

    assert!(matches!(api.set_current_semester(3), Err(ApiError::InvalidInput(_))));
    assert_eq!(api.get_settings().unwrap().current_semester, Semester::First);

    api.set_current_semester(2).unwrap();
    assert_eq!(api.get_settings().unwrap().current_semester, Semester::Second);
}

#[tokio::test]
async fn test_validate_stored_after_generation() {
    let (_temp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let seeder = Seeder::new(conn.clone());
    let cs = seeder.course("CS");
    seeder.lecture_hall("LH-1", 30);
    seeder.subject("CST101", cs, Semester::First, 3, RoomType::LectureHall, Some(1));

    let api = TimetableApi::new(conn, default_reader());
    api.generate().await.unwrap();
    assert!(api.validate_stored().await.unwrap().is_empty());

    // 切换学期后旧课表不再属于当前学期
    api.set_current_semester(2).unwrap();
    assert!(!api.validate_stored().await.unwrap().is_empty());
}
