// ==========================================
// 大学周课表排课系统 - 专业数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::classroom::Course;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

/// 专业默认院系
pub const DEFAULT_FACULTY: &str = "General";

// ==========================================
// CourseRepository - 专业仓储
// ==========================================
pub struct CourseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CourseRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 code 插入或更新专业
    ///
    /// # 返回
    /// - Ok(i64): 专业 id
    pub fn upsert(&self, name: &str, code: &str, faculty: Option<&str>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let faculty = faculty
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FACULTY);
        let id = conn.query_row(
            r#"
            INSERT INTO course (name, code, faculty) VALUES (?1, ?2, ?3)
            ON CONFLICT(code) DO UPDATE SET name = excluded.name, faculty = excluded.faculty
            RETURNING id
            "#,
            params![name, code, faculty],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(id)
    }

    /// 按 code 查询
    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Course>> {
        let conn = self.get_conn()?;
        let course = conn
            .query_row(
                "SELECT id, name, code, faculty FROM course WHERE code = ?1",
                params![code],
                map_course,
            )
            .optional()?;
        Ok(course)
    }

    /// 查询全部专业（按 id）
    pub fn list_all(&self) -> RepositoryResult<Vec<Course>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name, code, faculty FROM course ORDER BY id")?;
        let courses = stmt
            .query_map([], map_course)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(courses)
    }
}

fn map_course(row: &Row<'_>) -> SqliteResult<Course> {
    Ok(Course {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        faculty: row.get(3)?,
    })
}
