// ==========================================
// 大学周课表排课系统 - 基础数据导入 API
// ==========================================
// 职责: 封装专业/教室/科目导入，统一输入校验与耗时统计
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::importer::{ImportSummary, RecordImporter};

/// 导入实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportEntity {
    Course,
    Classroom,
    Subject,
}

/// 导入API响应
#[derive(Debug, Clone, Serialize)]
pub struct ImportApiResponse {
    pub entity: ImportEntity,
    pub summary: ImportSummary,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

pub struct ImportApi {
    importer: RecordImporter,
}

impl ImportApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            importer: RecordImporter::new(conn),
        }
    }

    /// 导入文件
    ///
    /// # 参数
    /// - entity: 导入实体类型
    /// - file_path: CSV / Excel 文件路径
    pub fn import(&self, entity: ImportEntity, file_path: &str) -> ApiResult<ImportApiResponse> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }
        let path = Path::new(file_path);

        let start = Instant::now();
        let summary = match entity {
            ImportEntity::Course => self.importer.import_courses(path)?,
            ImportEntity::Classroom => self.importer.import_classrooms(path)?,
            ImportEntity::Subject => self.importer.import_subjects(path)?,
        };

        Ok(ImportApiResponse {
            entity,
            summary,
            elapsed_ms: start.elapsed().as_millis() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    #[test]
    fn test_empty_path_is_invalid_input() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let api = ImportApi::new(Arc::new(Mutex::new(conn)));

        assert!(matches!(api.import(ImportEntity::Course, "  "), Err(ApiError::InvalidInput(_))));
        assert!(matches!(
            api.import(ImportEntity::Course, "missing.csv"),
            Err(ApiError::ImportError(_))
        ));
    }
}
