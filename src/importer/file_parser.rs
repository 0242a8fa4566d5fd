// ==========================================
// 大学周课表排课系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 带行号的原始记录（表头为第 1 行，数据从第 2 行开始）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 一行原始记录
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 文件中的行号（从 1 开始，含表头）
    pub row: usize,
    /// 规范化表头 → 去空白后的单元格值
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    /// 读取非空字段
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// 表头规范化: 去空白、小写、空格/连字符转下划线
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn build_record(row: usize, headers: &[String], cells: impl Iterator<Item = String>) -> Option<RawRecord> {
    let mut fields = HashMap::new();
    for (col_idx, value) in cells.enumerate() {
        if let Some(header) = headers.get(col_idx) {
            fields.insert(header.clone(), value.trim().to_string());
        }
    }

    // 跳过完全空白的行
    if fields.values().all(|v| v.is_empty()) {
        return None;
    }
    Some(RawRecord { row, fields })
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(records.len() + 2);
            if let Some(raw) = build_record(row, &headers, record.iter().map(str::to_string)) {
                records.push(raw);
            }
        }

        Ok(records)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        ensure_exists(file_path)?;

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| normalize_header(&cell.to_string()))
            .collect();

        let records = rows
            .enumerate()
            .filter_map(|(idx, data_row)| {
                build_record(idx + 2, &headers, data_row.iter().map(|cell| cell.to_string()))
            })
            .collect();

        Ok(records)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRecord>> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_to_raw_records(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_csv_parser_normalizes_headers() {
        let file = csv_file(&["Room Number,Room Type,Capacity", "LH-1,Lecture Hall,60"]);
        let records = UniversalFileParser.parse(file.path()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].row, 2);
        assert_eq!(records[0].get("room_number"), Some("LH-1"));
        assert_eq!(records[0].get("room_type"), Some("Lecture Hall"));
    }

    #[test]
    fn test_csv_parser_skips_blank_rows_and_keeps_line_numbers() {
        let file = csv_file(&["code,name", "CS,Computer Science", ",", "ST,Statistics"]);
        let records = CsvParser.parse_to_raw_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].row, 4);
    }

    #[test]
    fn test_missing_file_and_unsupported_extension() {
        let err = CsvParser.parse_to_raw_records(Path::new("non_existent.csv")).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));

        let err = UniversalFileParser.parse("subjects.json").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }
}
