// ==========================================
// 大学周课表排课系统 - 基础数据导入器
// ==========================================
// 流程: 文件解析 → 字段映射 → 按唯一键 UPSERT
// 策略: 行级错误收集到汇总中，不中断其余行；文件级错误直接返回
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use crate::repository::{ClassroomRepository, CourseRepository, NewSubject, SubjectRepository};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

/// 行级错误
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

/// 导入汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub imported: usize,
    pub errors: Vec<RowError>,
}

impl ImportSummary {
    fn record_error(&mut self, row: usize, err: &ImportError) {
        self.errors.push(RowError {
            row: err.row().unwrap_or(row),
            message: err.to_string(),
        });
    }
}

// ==========================================
// RecordImporter - 专业/教室/科目导入
// ==========================================
pub struct RecordImporter {
    parser: UniversalFileParser,
    mapper: FieldMapper,
    courses: CourseRepository,
    classrooms: ClassroomRepository,
    subjects: SubjectRepository,
}

impl RecordImporter {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            parser: UniversalFileParser,
            mapper: FieldMapper,
            courses: CourseRepository::from_connection(conn.clone()),
            classrooms: ClassroomRepository::from_connection(conn.clone()),
            subjects: SubjectRepository::from_connection(conn),
        }
    }

    /// 导入专业（按 code UPSERT）
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn import_courses<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportSummary> {
        let records = self.parser.parse(file_path.as_ref())?;
        let summary = self.import_each(&records, |raw| {
            let record = self.mapper.map_course(raw)?;
            self.courses
                .upsert(&record.name, &record.code, record.faculty.as_deref())?;
            Ok(())
        });
        log_summary("course", &summary);
        Ok(summary)
    }

    /// 导入教室（按 room_number UPSERT）
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn import_classrooms<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportSummary> {
        let records = self.parser.parse(file_path.as_ref())?;
        let summary = self.import_each(&records, |raw| {
            let record = self.mapper.map_classroom(raw)?;
            self.classrooms.upsert(
                &record.room_number,
                record.room_type,
                record.capacity,
                record.is_active,
            )?;
            Ok(())
        });
        log_summary("classroom", &summary);
        Ok(summary)
    }

    /// 导入科目（按 code UPSERT，专业按 course_code 引用）
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn import_subjects<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportSummary> {
        let records = self.parser.parse(file_path.as_ref())?;
        let summary = self.import_each(&records, |raw| {
            let record = self.mapper.map_subject(raw)?;
            let course = self
                .courses
                .find_by_code(&record.course_code)?
                .ok_or_else(|| ImportError::UnknownReference {
                    row: record.row,
                    field: "course_code".to_string(),
                    value: record.course_code.clone(),
                })?;

            let mut subject = NewSubject::new(
                record.name,
                record.code,
                course.id,
                record.semester,
                record.weekly_hours,
                record.room_type,
            )
            .with_priority(record.priority);
            subject.lecturer_id = record.lecturer_id;
            self.subjects.upsert(&subject)?;
            Ok(())
        });
        log_summary("subject", &summary);
        Ok(summary)
    }

    fn import_each<F>(&self, records: &[RawRecord], mut handle: F) -> ImportSummary
    where
        F: FnMut(&RawRecord) -> ImportResult<()>,
    {
        let mut summary = ImportSummary {
            total_rows: records.len(),
            ..Default::default()
        };
        for raw in records {
            match handle(raw) {
                Ok(()) => summary.imported += 1,
                Err(e) => {
                    warn!(row = raw.row, error = %e, "行导入失败");
                    summary.record_error(raw.row, &e);
                }
            }
        }
        summary
    }
}

fn log_summary(entity: &str, summary: &ImportSummary) {
    info!(
        entity,
        total_rows = summary.total_rows,
        imported = summary.imported,
        errors = summary.errors.len(),
        "导入完成"
    );
}
