// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、基础数据写入等功能
// ==========================================
#![allow(dead_code)]

use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use timetable_scheduler::db::{init_schema, open_sqlite_connection};
use timetable_scheduler::domain::types::{RoomType, Semester};
use timetable_scheduler::repository::{
    ClassroomRepository, CourseRepository, NewSubject, SubjectRepository,
};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn open_shared(db_path: &str) -> Arc<Mutex<Connection>> {
    let conn = open_sqlite_connection(db_path).unwrap();
    Arc::new(Mutex::new(conn))
}

/// 基础数据写入器
pub struct Seeder {
    pub courses: CourseRepository,
    pub classrooms: ClassroomRepository,
    pub subjects: SubjectRepository,
}

impl Seeder {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            courses: CourseRepository::from_connection(conn.clone()),
            classrooms: ClassroomRepository::from_connection(conn.clone()),
            subjects: SubjectRepository::from_connection(conn),
        }
    }

    pub fn course(&self, code: &str) -> i64 {
        self.courses
            .upsert(&format!("Course {}", code), code, None)
            .unwrap()
    }

    pub fn lecture_hall(&self, room_number: &str, capacity: u32) -> i64 {
        self.classrooms
            .upsert(room_number, RoomType::LectureHall, capacity, true)
            .unwrap()
    }

    pub fn computer_lab(&self, room_number: &str, capacity: u32) -> i64 {
        self.classrooms
            .upsert(room_number, RoomType::ComputerLab, capacity, true)
            .unwrap()
    }

    pub fn subject(
        &self,
        code: &str,
        course_id: i64,
        semester: Semester,
        weekly_hours: u32,
        room_type: RoomType,
        lecturer_id: Option<i64>,
    ) -> i64 {
        let mut new = NewSubject::new(
            format!("Subject {}", code),
            code,
            course_id,
            semester,
            weekly_hours,
            room_type,
        );
        new.lecturer_id = lecturer_id;
        self.subjects.upsert(&new).unwrap()
    }
}
