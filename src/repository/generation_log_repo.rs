// ==========================================
// 大学周课表排课系统 - 排课运行记录仓储
// ==========================================
// 职责: generation_log 表读写
// 说明: 成功运行与课表替换在同一事务内写入；失败运行在事务回滚后单独写入
// ==========================================

use crate::domain::report::{GenerationLog, GenerationStatus};
use crate::domain::types::Semester;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT run_id, semester, status, started_at, finished_at,
           total_subjects, fully_scheduled, total_slots_created, report_json, config_snapshot,
           error_message
    FROM generation_log
"#;

pub struct GenerationLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GenerationLogRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在调用方事务内写入运行记录
    pub fn insert_in_tx(tx: &Transaction<'_>, log: &GenerationLog) -> RepositoryResult<()> {
        insert_log(tx, log)
    }

    /// 独立写入运行记录（失败运行使用）
    pub fn insert(&self, log: &GenerationLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_log(&conn, log)
    }

    /// 最近一次运行
    pub fn latest(&self) -> RepositoryResult<Option<GenerationLog>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY started_at DESC, rowid DESC LIMIT 1", SELECT_COLUMNS);
        let log = conn.query_row(&sql, [], map_log).optional()?;
        Ok(log)
    }
}

fn insert_log(conn: &Connection, log: &GenerationLog) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO generation_log (
            run_id, semester, status, started_at, finished_at,
            total_subjects, fully_scheduled, total_slots_created, report_json, config_snapshot,
            error_message
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
        params![
            log.run_id,
            log.semester.as_i64(),
            log.status.as_str(),
            log.started_at,
            log.finished_at,
            log.total_subjects as i64,
            log.fully_scheduled as i64,
            log.total_slots_created as i64,
            log.report_json,
            log.config_snapshot,
            log.error_message,
        ],
    )?;
    Ok(())
}

fn map_log(row: &Row<'_>) -> SqliteResult<GenerationLog> {
    let status_raw: String = row.get(2)?;
    let status = GenerationStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("未知运行状态: {}", status_raw).into(),
        )
    })?;

    Ok(GenerationLog {
        run_id: row.get(0)?,
        semester: Semester::from_value_or_default(row.get(1)?),
        status,
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
        total_subjects: row.get::<_, i64>(5)? as usize,
        fully_scheduled: row.get::<_, i64>(6)? as usize,
        total_slots_created: row.get::<_, i64>(7)? as usize,
        report_json: row.get(8)?,
        config_snapshot: row.get(9)?,
        error_message: row.get(10)?,
    })
}
