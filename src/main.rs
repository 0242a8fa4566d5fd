// ==========================================
// 大学周课表排课系统 - 命令行入口
// ==========================================
// 用法:
//   timetable-scheduler [--db <path>] [--locale en|zh-CN] [--log-json] <command> [args]
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use timetable_scheduler::api::ImportEntity;
use timetable_scheduler::app::{get_default_db_path, AppState};
use timetable_scheduler::domain::types::Semester;
use timetable_scheduler::domain::{FormattedTimetable, GenerationLog, SlotFilter};
use timetable_scheduler::{i18n, logging};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite 数据库路径（缺省读取环境变量或数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 未排课原因的语言（en / zh-CN）
    #[arg(long, global = true)]
    locale: Option<String>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 建表（幂等）
    Init,
    /// 导入专业（CSV/Excel）
    ImportCourses { file: String },
    /// 导入教室
    ImportClassrooms { file: String },
    /// 导入科目
    ImportSubjects { file: String },
    /// 切换当前学期（1 或 2）
    SetSemester { semester: i64 },
    /// 覆写排课参数
    SetConfig { key: String, value: String },
    /// 生成整周课表（替换旧课表）
    Generate,
    /// 按条件查看课表
    Show {
        #[arg(long)]
        course: Option<i64>,
        #[arg(long)]
        year: Option<u8>,
        #[arg(long)]
        semester: Option<i64>,
        #[arg(long)]
        lecturer: Option<i64>,
        /// 输出 JSON
        #[arg(long)]
        json: bool,
    },
    /// 校验已存储课表
    Validate,
    /// 最近一次排课运行
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.log_json);
    if let Some(locale) = &cli.locale {
        i18n::set_locale(locale);
    }

    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    tracing::info!(version = timetable_scheduler::VERSION, db_path = %db_path, "{}", timetable_scheduler::APP_NAME);

    let state = AppState::new(db_path).context("初始化失败")?;

    match cli.command {
        Commands::Init => {
            println!("数据库已就绪: {}", state.db_path);
        }
        Commands::ImportCourses { file } => import(&state, ImportEntity::Course, &file)?,
        Commands::ImportClassrooms { file } => import(&state, ImportEntity::Classroom, &file)?,
        Commands::ImportSubjects { file } => import(&state, ImportEntity::Subject, &file)?,
        Commands::SetSemester { semester } => {
            let settings = state.timetable_api.set_current_semester(semester)?;
            println!("当前学期: {}", settings.current_semester);
        }
        Commands::SetConfig { key, value } => {
            state.config_manager.set_config_value(&key, &value)?;
            let config = state.config_manager.load_scheduler_config()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Generate => {
            let response = state.timetable_api.generate().await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Show {
            course,
            year,
            semester,
            lecturer,
            json,
        } => {
            let semester = semester
                .map(|raw| Semester::from_value(raw).ok_or_else(|| anyhow!("学期只能是 1 或 2")))
                .transpose()?;
            let filter = SlotFilter {
                course_id: course,
                year,
                semester,
                lecturer_id: lecturer,
            };
            show(&state, &filter, json)?;
        }
        Commands::Validate => {
            let violations = state.timetable_api.validate_stored().await?;
            if violations.is_empty() {
                println!("课表校验通过");
            } else {
                for v in &violations {
                    println!("{}", v);
                }
                bail!("课表存在 {} 项违规", violations.len());
            }
        }
        Commands::Status => match state.timetable_api.latest_generation()? {
            Some(log) => print_status(&log)?,
            None => println!("尚无排课记录"),
        },
    }

    Ok(())
}

fn import(state: &AppState, entity: ImportEntity, file: &str) -> Result<()> {
    let response = state.import_api.import(entity, file)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn show(state: &AppState, filter: &SlotFilter, json: bool) -> Result<()> {
    let view = state.timetable_api.formatted_timetable(filter)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

fn print_status(log: &GenerationLog) -> Result<()> {
    println!("运行: {}  状态: {}  学期: {}", log.run_id, log.status, log.semester);
    println!("开始: {}  结束: {}", log.started_at, log.finished_at);
    println!(
        "科目: {}  全部排入: {}  课时: {}",
        log.total_subjects, log.fully_scheduled, log.total_slots_created
    );
    if let Some(message) = &log.error_message {
        println!("错误: {}", message);
    }
    match &log.config_snapshot {
        Some(snapshot) => {
            let config: serde_json::Value = serde_json::from_str(snapshot)?;
            println!("排课参数:\n{}", serde_json::to_string_pretty(&config)?);
        }
        None => println!("排课参数: (无)"),
    }
    Ok(())
}

fn print_view(view: &FormattedTimetable) {
    for day in &view.days_data {
        println!("== {} ==", day.day);
        if day.classes.is_empty() {
            println!("  (无课)");
        }
        for class in &day.classes {
            println!(
                "  {}-{}  {:<8} {:<32} {:<10} 年级{} 讲师{}",
                class.start_time.format("%H:%M"),
                class.end_time.format("%H:%M"),
                class.subject_code,
                class.subject_name,
                class.room_number,
                class.year,
                class
                    .lecturer_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            );
        }
    }
}
