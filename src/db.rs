// ==========================================
// 大学周课表排课系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 统一建表语句，保证测试库与生产库结构一致
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// - v1: 初始表结构
/// - v2: generation_log 增加 config_snapshot 列
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// timetable_slot 上的 UNIQUE(classroom_id, day, start_time) 是教室防重的最后一道防线，
/// 排课引擎本身也会保证该约束。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    configure_sqlite_connection(conn)?;
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS course (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            code TEXT NOT NULL UNIQUE,
            faculty TEXT NOT NULL DEFAULT 'General'
        );

        CREATE TABLE IF NOT EXISTS classroom (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            room_number TEXT NOT NULL UNIQUE,
            room_type TEXT NOT NULL,
            capacity INTEGER NOT NULL CHECK (capacity >= 1),
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS subject (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            code TEXT NOT NULL UNIQUE,
            course_id INTEGER NOT NULL REFERENCES course(id) ON DELETE CASCADE,
            semester INTEGER NOT NULL,
            weekly_hours INTEGER NOT NULL CHECK (weekly_hours > 0),
            room_type TEXT NOT NULL,
            lecturer_id INTEGER,
            priority INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS timetable_slot (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_id INTEGER NOT NULL REFERENCES subject(id) ON DELETE CASCADE,
            classroom_id INTEGER NOT NULL REFERENCES classroom(id) ON DELETE CASCADE,
            day TEXT NOT NULL,
            day_order INTEGER NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            UNIQUE (classroom_id, day, start_time)
        );

        CREATE INDEX IF NOT EXISTS idx_timetable_slot_subject ON timetable_slot(subject_id);

        CREATE TABLE IF NOT EXISTS system_settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            current_semester INTEGER NOT NULL DEFAULT 1,
            academic_year TEXT NOT NULL DEFAULT '2024/2025',
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS generation_log (
            run_id TEXT PRIMARY KEY,
            semester INTEGER NOT NULL,
            status TEXT NOT NULL,
            started_at TEXT NOT NULL,
            finished_at TEXT NOT NULL,
            total_subjects INTEGER NOT NULL DEFAULT 0,
            fully_scheduled INTEGER NOT NULL DEFAULT 0,
            total_slots_created INTEGER NOT NULL DEFAULT 0,
            report_json TEXT,
            config_snapshot TEXT,
            error_message TEXT
        );
        "#,
    )?;

    migrate_generation_log_snapshot(conn)?;

    for version in 1..=CURRENT_SCHEMA_VERSION {
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
    }
    Ok(())
}

/// v2: 旧库的 generation_log 缺少 config_snapshot 列时补齐
fn migrate_generation_log_snapshot(conn: &Connection) -> rusqlite::Result<()> {
    let has_column: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info('generation_log') WHERE name = 'config_snapshot'",
        [],
        |row| row.get(0),
    )?;
    if has_column == 0 {
        conn.execute_batch("ALTER TABLE generation_log ADD COLUMN config_snapshot TEXT;")?;
        tracing::info!("generation_log 已升级到 schema v2");
    }
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
