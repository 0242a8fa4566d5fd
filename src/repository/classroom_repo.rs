// ==========================================
// 大学周课表排课系统 - 教室数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: list_all 的返回顺序即排课引擎的教室扫描顺序（按 id）
// ==========================================

use crate::domain::classroom::Classroom;
use crate::domain::types::RoomType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::room_type_from_db;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ClassroomRepository - 教室仓储
// ==========================================
pub struct ClassroomRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ClassroomRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 room_number 插入或更新教室
    pub fn upsert(
        &self,
        room_number: &str,
        room_type: RoomType,
        capacity: u32,
        is_active: bool,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let id = conn.query_row(
            r#"
            INSERT INTO classroom (room_number, room_type, capacity, is_active)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(room_number) DO UPDATE SET
                room_type = excluded.room_type,
                capacity = excluded.capacity,
                is_active = excluded.is_active
            RETURNING id
            "#,
            params![room_number, room_type.as_str(), capacity, is_active],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(id)
    }

    /// 查询全部教室（含停用，按 id）
    pub fn list_all(&self) -> RepositoryResult<Vec<Classroom>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, room_number, room_type, capacity, is_active FROM classroom ORDER BY id",
        )?;
        let rooms = stmt
            .query_map([], map_classroom)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rooms)
    }
}

fn map_classroom(row: &Row<'_>) -> SqliteResult<Classroom> {
    Ok(Classroom {
        id: row.get(0)?,
        room_number: row.get(1)?,
        room_type: room_type_from_db(2, &row.get::<_, String>(2)?)?,
        capacity: row.get(3)?,
        is_active: row.get(4)?,
    })
}
