// ==========================================
// 大学周课表排课系统 - 课表时段仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 课表只做整体替换（先删后插），必须在调用方提供的事务内完成
// ==========================================

use crate::domain::subject::derive_year_level;
use crate::domain::timetable::{SlotFilter, TimetableEntry, TimetableSlot};
use crate::domain::types::Semester;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{room_type_from_db, school_day_from_db, time_from_db, time_to_db};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult, Row, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

// ==========================================
// TimetableSlotRepository - 课表时段仓储
// ==========================================
pub struct TimetableSlotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TimetableSlotRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务内整体替换课表
    ///
    /// # 参数
    /// - `tx`: 调用方持有的写事务（建议 IMMEDIATE）
    /// - `slots`: 新课表
    ///
    /// # 返回
    /// - Ok((deleted, inserted))
    pub fn replace_all_in_tx(
        tx: &Transaction<'_>,
        slots: &[TimetableSlot],
    ) -> RepositoryResult<(usize, usize)> {
        let deleted = tx.execute("DELETE FROM timetable_slot", [])?;

        let mut stmt = tx.prepare(
            r#"
            INSERT INTO timetable_slot (subject_id, classroom_id, day, day_order, start_time, end_time)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )?;
        let mut inserted = 0;
        for slot in slots {
            inserted += stmt.execute(params![
                slot.subject_id,
                slot.classroom_id,
                slot.day.as_str(),
                slot.day.ordinal(),
                time_to_db(&slot.start_time),
                time_to_db(&slot.end_time),
            ])?;
        }

        debug!(deleted, inserted, "课表已替换（事务未提交）");
        Ok((deleted, inserted))
    }

    /// 查询全部时段（原始形式，按教学日/开始时间/教室）
    pub fn list_all(&self) -> RepositoryResult<Vec<TimetableSlot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT subject_id, classroom_id, day, start_time, end_time
            FROM timetable_slot
            ORDER BY day_order, start_time, classroom_id
            "#,
        )?;
        let slots = stmt
            .query_map([], |row| {
                Ok(TimetableSlot {
                    subject_id: row.get(0)?,
                    classroom_id: row.get(1)?,
                    day: school_day_from_db(2, &row.get::<_, String>(2)?)?,
                    start_time: time_from_db(3, &row.get::<_, String>(3)?)?,
                    end_time: time_from_db(4, &row.get::<_, String>(4)?)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(slots)
    }

    /// 按过滤条件查询课表展示行
    ///
    /// course_id / semester / lecturer_id 下推到 SQL；
    /// year 由科目代码推导，查询后在内存中过滤。
    pub fn list_entries(&self, filter: &SlotFilter) -> RepositoryResult<Vec<TimetableEntry>> {
        let mut sql = String::from(
            r#"
            SELECT
                ts.id, ts.day, ts.start_time, ts.end_time,
                s.id, s.name, s.code, s.course_id, c.name, s.semester, s.lecturer_id,
                r.id, r.room_number, r.room_type
            FROM timetable_slot ts
            JOIN subject s ON s.id = ts.subject_id
            JOIN classroom r ON r.id = ts.classroom_id
            LEFT JOIN course c ON c.id = s.course_id
            WHERE 1 = 1
            "#,
        );
        let mut args: Vec<Value> = Vec::new();
        if let Some(course_id) = filter.course_id {
            args.push(Value::Integer(course_id));
            sql.push_str(&format!(" AND s.course_id = ?{}", args.len()));
        }
        if let Some(semester) = filter.semester {
            args.push(Value::Integer(semester.as_i64()));
            sql.push_str(&format!(" AND s.semester = ?{}", args.len()));
        }
        if let Some(lecturer_id) = filter.lecturer_id {
            args.push(Value::Integer(lecturer_id));
            sql.push_str(&format!(" AND s.lecturer_id = ?{}", args.len()));
        }
        sql.push_str(" ORDER BY ts.day_order, ts.start_time, r.room_number");

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params_from_iter(args), map_entry)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(entries.into_iter().filter(|e| filter.matches(e)).collect())
    }

    /// 时段总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM timetable_slot", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

fn map_entry(row: &Row<'_>) -> SqliteResult<TimetableEntry> {
    let subject_code: String = row.get(6)?;
    Ok(TimetableEntry {
        slot_id: row.get(0)?,
        day: school_day_from_db(1, &row.get::<_, String>(1)?)?,
        start_time: time_from_db(2, &row.get::<_, String>(2)?)?,
        end_time: time_from_db(3, &row.get::<_, String>(3)?)?,
        subject_id: row.get(4)?,
        subject_name: row.get(5)?,
        year: derive_year_level(&subject_code),
        subject_code,
        course_id: row.get(7)?,
        course_name: row.get(8)?,
        semester: Semester::from_value_or_default(row.get(9)?),
        lecturer_id: row.get(10)?,
        classroom_id: row.get(11)?,
        room_number: row.get(12)?,
        room_type: room_type_from_db(13, &row.get::<_, String>(13)?)?,
    })
}
