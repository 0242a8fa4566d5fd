// ==========================================
// 大学周课表排课系统 - 课表 API
// ==========================================
// 职责: 排课触发、课表查询、学期设置、运行记录查询
// 红线:
// - 同一时刻只允许一次排课（单写者闸门，第二个请求立即失败）
// - 课表替换与运行记录在同一 IMMEDIATE 事务内提交，失败整体回滚
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::config::SchedulerConfigReader;
use crate::domain::report::{GenerationLog, GenerationStatus, SchedulingReport};
use crate::domain::settings::SystemSettings;
use crate::domain::timetable::{FormattedTimetable, SlotFilter, TimetableEntry};
use crate::domain::types::Semester;
use crate::engine::{SlotViolation, TimetableScheduler, TimetableValidator};
use crate::i18n::t_with_args;
use crate::repository::{
    ClassroomRepository, GenerationLogRepository, SubjectRepository, SystemSettingsRepository,
    TimetableSlotRepository,
};

// ==========================================
// GenerateResponse - 排课结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub run_id: String,
    pub status: GenerationStatus,
    pub message: String,
    pub report: SchedulingReport,
}

// ==========================================
// TimetableApi - 课表 API
// ==========================================
pub struct TimetableApi {
    conn: Arc<Mutex<Connection>>,
    config_reader: Arc<dyn SchedulerConfigReader>,
    subject_repo: SubjectRepository,
    classroom_repo: ClassroomRepository,
    settings_repo: SystemSettingsRepository,
    slot_repo: TimetableSlotRepository,
    log_repo: GenerationLogRepository,
    generation_gate: tokio::sync::Mutex<()>,
}

impl TimetableApi {
    /// 创建新的 TimetableApi 实例
    ///
    /// # 参数
    /// - conn: 共享数据库连接（schema 需已初始化）
    /// - config_reader: 排课参数读取器
    pub fn new(conn: Arc<Mutex<Connection>>, config_reader: Arc<dyn SchedulerConfigReader>) -> Self {
        Self {
            subject_repo: SubjectRepository::from_connection(conn.clone()),
            classroom_repo: ClassroomRepository::from_connection(conn.clone()),
            settings_repo: SystemSettingsRepository::from_connection(conn.clone()),
            slot_repo: TimetableSlotRepository::from_connection(conn.clone()),
            log_repo: GenerationLogRepository::from_connection(conn.clone()),
            conn,
            config_reader,
            generation_gate: tokio::sync::Mutex::new(()),
        }
    }

    fn get_conn(&self) -> ApiResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", e)))
    }

    // ==========================================
    // 排课
    // ==========================================

    /// 生成整周课表（整体替换旧课表）
    ///
    /// # 返回
    /// - Ok(GenerateResponse): status 为 success 或 completed_with_conflicts
    /// - Err(ApiError::GenerationInProgress): 已有排课在运行
    /// - Err(ApiError): 存储/配置失败，旧课表保持不变
    #[instrument(skip(self))]
    pub async fn generate(&self) -> ApiResult<GenerateResponse> {
        let _gate = self.generation_gate.try_lock().map_err(|_| {
            warn!("拒绝并发排课请求");
            ApiError::GenerationInProgress
        })?;

        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();

        // 设置读取失败时按默认学期记录失败运行
        let mut semester = Semester::default();
        let outcome = match self.settings_repo.get_or_default() {
            Ok(settings) => {
                semester = settings.current_semester;
                info!(run_id = %run_id, semester = %semester, "开始排课");
                self.run_generation(&run_id, semester, started_at).await
            }
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(response) => Ok(response),
            Err(e) => {
                error!(run_id = %run_id, error = %e, "排课失败，课表未变更");
                self.record_failure(&run_id, semester, started_at, &e);
                Err(e)
            }
        }
    }

    async fn run_generation(
        &self,
        run_id: &str,
        semester: Semester,
        started_at: DateTime<Utc>,
    ) -> ApiResult<GenerateResponse> {
        let config = self.config_reader.get_scheduler_config().await?;
        let subjects = self.subject_repo.list_all()?;
        let classrooms = self.classroom_repo.list_all()?;

        let config_snapshot = serde_json::to_string(&config)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        let scheduler = TimetableScheduler::new(config);
        let result = scheduler.generate(&subjects, &classrooms, semester);

        let violations = TimetableValidator::new(scheduler.config())
            .validate(&result.slots, &subjects, &classrooms, semester);
        if let Some(first) = violations.first() {
            return Err(ApiError::InternalError(format!(
                "排课结果违反约束 ({} 项): {}",
                violations.len(),
                first
            )));
        }

        let status = GenerationStatus::from_report(&result.report);
        let report_json = serde_json::to_string(&result.report)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        let log = GenerationLog {
            run_id: run_id.to_string(),
            semester,
            status,
            started_at,
            finished_at: Utc::now(),
            total_subjects: result.report.total_subjects,
            fully_scheduled: result.report.fully_scheduled,
            total_slots_created: result.report.total_slots_created,
            report_json: Some(report_json),
            config_snapshot: Some(config_snapshot),
            error_message: None,
        };

        {
            let mut conn = self.get_conn()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            TimetableSlotRepository::replace_all_in_tx(&tx, &result.slots)?;
            GenerationLogRepository::insert_in_tx(&tx, &log)?;
            tx.commit()?;
        }

        info!(
            run_id = %run_id,
            status = %status,
            total_slots_created = result.report.total_slots_created,
            unscheduled = result.report.unscheduled.len(),
            "课表已替换"
        );

        Ok(GenerateResponse {
            run_id: run_id.to_string(),
            status,
            message: status_message(status, &result.report),
            report: result.report,
        })
    }

    /// 写入失败运行记录（写入失败只告警）
    fn record_failure(&self, run_id: &str, semester: Semester, started_at: DateTime<Utc>, err: &ApiError) {
        let log = GenerationLog {
            run_id: run_id.to_string(),
            semester,
            status: GenerationStatus::Failed,
            started_at,
            finished_at: Utc::now(),
            total_subjects: 0,
            fully_scheduled: 0,
            total_slots_created: 0,
            report_json: None,
            config_snapshot: None,
            error_message: Some(err.to_string()),
        };
        if let Err(log_err) = self.log_repo.insert(&log) {
            warn!(run_id = %run_id, error = %log_err, "失败运行记录写入失败");
        }
    }

    /// 用当前基础数据与配置校验已存储课表
    pub async fn validate_stored(&self) -> ApiResult<Vec<SlotViolation>> {
        let config = self.config_reader.get_scheduler_config().await?;
        let semester = self.settings_repo.get_or_default()?.current_semester;
        let slots = self.slot_repo.list_all()?;
        let subjects = self.subject_repo.list_all()?;
        let classrooms = self.classroom_repo.list_all()?;

        Ok(TimetableValidator::new(&config).validate(&slots, &subjects, &classrooms, semester))
    }

    // ==========================================
    // 课表查询
    // ==========================================

    /// 按条件查询课表（按教学日、开始时间、教室编号排序）
    pub fn list_slots(&self, filter: &SlotFilter) -> ApiResult<Vec<TimetableEntry>> {
        Ok(self.slot_repo.list_entries(filter)?)
    }

    /// 按天分组的课表视图（五天全部返回）
    pub fn formatted_timetable(&self, filter: &SlotFilter) -> ApiResult<FormattedTimetable> {
        let entries = self.slot_repo.list_entries(filter)?;
        Ok(FormattedTimetable::group_by_day(entries))
    }

    // ==========================================
    // 设置与运行记录
    // ==========================================

    pub fn get_settings(&self) -> ApiResult<SystemSettings> {
        Ok(self.settings_repo.get_or_default()?)
    }

    /// 切换当前学期（只接受 1 / 2）
    pub fn set_current_semester(&self, value: i64) -> ApiResult<SystemSettings> {
        let semester = Semester::from_value(value)
            .ok_or_else(|| ApiError::InvalidInput(format!("学期只能是 1 或 2，实际: {}", value)))?;
        let settings = self.settings_repo.set_current_semester(semester)?;
        info!(semester = %semester, "当前学期已切换");
        Ok(settings)
    }

    /// 最近一次排课运行
    pub fn latest_generation(&self) -> ApiResult<Option<GenerationLog>> {
        Ok(self.log_repo.latest()?)
    }
}

fn status_message(status: GenerationStatus, report: &SchedulingReport) -> String {
    match status {
        GenerationStatus::CompletedWithConflicts => t_with_args(
            "generate.completed_with_conflicts",
            &[("count", &report.unscheduled.len().to_string())],
        ),
        _ => t_with_args("generate.success", &[]),
    }
}
