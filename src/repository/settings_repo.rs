// ==========================================
// 大学周课表排课系统 - 系统设置仓储
// ==========================================
// system_settings 为单行表（id = 1），缺失时按默认值返回
// ==========================================

use crate::domain::settings::SystemSettings;
use crate::domain::types::Semester;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct SystemSettingsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SystemSettingsRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取设置（表为空时返回默认值，非法学期回退到 1）
    pub fn get_or_default(&self) -> RepositoryResult<SystemSettings> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                "SELECT current_semester, academic_year, updated_at FROM system_settings WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, DateTime<Utc>>(2)?,
                    ))
                },
            )
            .optional()?;

        Ok(match row {
            Some((semester, academic_year, updated_at)) => SystemSettings {
                current_semester: Semester::from_value_or_default(semester),
                academic_year,
                updated_at,
            },
            None => SystemSettings::default(),
        })
    }

    /// 保存设置（UPSERT 单行）
    pub fn save(&self, settings: &SystemSettings) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO system_settings (id, current_semester, academic_year, updated_at)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                current_semester = excluded.current_semester,
                academic_year = excluded.academic_year,
                updated_at = excluded.updated_at
            "#,
            params![
                settings.current_semester.as_i64(),
                settings.academic_year,
                settings.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 切换当前学期
    pub fn set_current_semester(&self, semester: Semester) -> RepositoryResult<SystemSettings> {
        let mut settings = self.get_or_default()?;
        settings.current_semester = semester;
        settings.updated_at = Utc::now();
        self.save(&settings)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::domain::settings::DEFAULT_ACADEMIC_YEAR;

    fn conn() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_defaults_then_update() {
        let repo = SystemSettingsRepository::from_connection(conn());
        let settings = repo.get_or_default().unwrap();
        assert_eq!(settings.current_semester, Semester::First);
        assert_eq!(settings.academic_year, DEFAULT_ACADEMIC_YEAR);

        repo.set_current_semester(Semester::Second).unwrap();
        assert_eq!(repo.get_or_default().unwrap().current_semester, Semester::Second);
    }

    #[test]
    fn test_invalid_stored_semester_defaults_to_first() {
        let conn = conn();
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO system_settings (id, current_semester, academic_year, updated_at) VALUES (1, 9, '2025/2026', ?1)",
                params![Utc::now()],
            )
            .unwrap();
        let repo = SystemSettingsRepository::from_connection(conn);
        let settings = repo.get_or_default().unwrap();
        assert_eq!(settings.current_semester, Semester::First);
        assert_eq!(settings.academic_year, "2025/2026");
    }
}
