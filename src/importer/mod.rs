// ==========================================
// 大学周课表排课系统 - 导入层
// ==========================================
// 职责: 外部基础数据导入（专业、教室、科目）
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod record_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ClassroomRecord, CourseRecord, FieldMapper, SubjectRecord};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use record_importer::{ImportSummary, RecordImporter, RowError};
