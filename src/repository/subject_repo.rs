// ==========================================
// 大学周课表排课系统 - 科目数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: list_all 按 id 返回，作为排序引擎的稳定输入顺序
// ==========================================

use crate::domain::subject::{Subject, DEFAULT_PRIORITY};
use crate::domain::types::{RoomType, Semester};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::room_type_from_db;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

/// 待写入的科目（无 id）
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubject {
    pub name: String,
    pub code: String,
    pub course_id: i64,
    pub semester: Semester,
    pub weekly_hours: u32,
    pub room_type: RoomType,
    pub lecturer_id: Option<i64>,
    pub priority: i32,
}

impl NewSubject {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        course_id: i64,
        semester: Semester,
        weekly_hours: u32,
        room_type: RoomType,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            course_id,
            semester,
            weekly_hours,
            room_type,
            lecturer_id: None,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_lecturer(mut self, lecturer_id: i64) -> Self {
        self.lecturer_id = Some(lecturer_id);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, code, course_id, semester, weekly_hours, room_type, lecturer_id, priority FROM subject";

// ==========================================
// SubjectRepository - 科目仓储
// ==========================================
pub struct SubjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SubjectRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 code 插入或更新科目
    ///
    /// # 错误
    /// - ForeignKeyViolation: course_id 不存在
    pub fn upsert(&self, subject: &NewSubject) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let id = conn.query_row(
            r#"
            INSERT INTO subject (
                name, code, course_id, semester, weekly_hours, room_type, lecturer_id, priority
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(code) DO UPDATE SET
                name = excluded.name,
                course_id = excluded.course_id,
                semester = excluded.semester,
                weekly_hours = excluded.weekly_hours,
                room_type = excluded.room_type,
                lecturer_id = excluded.lecturer_id,
                priority = excluded.priority
            RETURNING id
            "#,
            params![
                subject.name,
                subject.code,
                subject.course_id,
                subject.semester.as_i64(),
                subject.weekly_hours,
                subject.room_type.as_str(),
                subject.lecturer_id,
                subject.priority,
            ],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(id)
    }

    /// 按 code 查询
    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Subject>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE code = ?1", SELECT_COLUMNS);
        let subject = conn.query_row(&sql, params![code], map_subject).optional()?;
        Ok(subject)
    }

    /// 查询全部科目（含非本学期，按 id）
    pub fn list_all(&self) -> RepositoryResult<Vec<Subject>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let subjects = stmt
            .query_map([], map_subject)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(subjects)
    }

    /// 科目总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM subject", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

fn map_subject(row: &Row<'_>) -> SqliteResult<Subject> {
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        course_id: row.get(3)?,
        semester: Semester::from_value_or_default(row.get(4)?),
        weekly_hours: row.get(5)?,
        room_type: room_type_from_db(6, &row.get::<_, String>(6)?)?,
        lecturer_id: row.get(7)?,
        priority: row.get(8)?,
    })
}
