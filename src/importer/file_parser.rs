// ==========================================
// 项目台账监控 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsb/.xlsx/.xls/.ods) / CSV (.csv)
// 约定: 第一行为列名行, 读取时丢弃; 表头之后的空白行原样保留
//       (杂项行按位置跳过, 空行由导入器在跳过之后过滤)
// ==========================================

use crate::domain::record::{RawCell, RawRow};
use crate::importer::error::{IngestError, IngestResult};
use crate::importer::ingest_trait::TableSource;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::debug;

fn ensure_exists(path: &Path) -> IngestResult<()> {
    if !path.exists() {
        return Err(IngestError::SourceUnavailable {
            path: path.display().to_string(),
            reason: "文件不存在".to_string(),
        });
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl TableSource for CsvParser {
    fn read_table(&self, path: &Path, _sheet_name: &str) -> IngestResult<Vec<RawRow>> {
        ensure_exists(path)?;

        let ext = extension_of(path);
        if ext != "csv" {
            return Err(IngestError::UnsupportedFormat(ext));
        }

        let file = File::open(path).map_err(|e| IngestError::SourceUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        // csv 库本身忽略零长度的文本行; 形如 ",,," 的空白记录保留
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let cells: Vec<RawCell> = record
                .iter()
                .map(|value| {
                    if value.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::text(value)
                    }
                })
                .collect();

            // 行号: 表头为第 1 行; 空白行保留以维持行位置
            rows.push(RawRow::new(idx + 2, cells));
        }

        debug!(path = %path.display(), rows = rows.len(), "CSV 读取完成");
        Ok(rows)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn convert_cell(cell: &Data) -> RawCell {
        match cell {
            Data::Empty => RawCell::Empty,
            Data::String(s) => {
                if s.trim().is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::Text(s.clone())
                }
            }
            Data::Float(n) => RawCell::Number(*n),
            Data::Int(n) => RawCell::Number(*n as f64),
            Data::Bool(b) => RawCell::Bool(*b),
            // 日期单元格保留序列日数值, 由类型转换统一处理
            Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
            Data::DateTimeIso(s) => RawCell::Text(s.chars().take(10).collect()),
            Data::DurationIso(s) => RawCell::Text(s.clone()),
            Data::Error(_) => RawCell::Empty,
        }
    }
}

impl TableSource for ExcelParser {
    fn read_table(&self, path: &Path, sheet_name: &str) -> IngestResult<Vec<RawRow>> {
        ensure_exists(path)?;

        let ext = extension_of(path);
        if !matches!(ext.as_str(), "xlsb" | "xlsx" | "xlsm" | "xls" | "ods") {
            return Err(IngestError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::SourceUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        if !workbook.sheet_names().iter().any(|n| n == sheet_name) {
            return Err(IngestError::SheetNotFound(format!(
                "{} ({})",
                sheet_name,
                path.display()
            )));
        }

        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| IngestError::ExcelParse(e.to_string()))?;

        // 数据区可能不从 A1 开始, 按绝对位置补齐
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        let mut rows = Vec::new();
        let mut header_seen = false;
        for (row_idx, data_row) in range.rows().enumerate() {
            let mut cells = vec![RawCell::Empty; start_col as usize];
            cells.extend(data_row.iter().map(Self::convert_cell));

            let row = RawRow::new(start_row as usize + row_idx + 1, cells);
            // 表头之前的空白行不计; 表头之后的空白行保留
            if !header_seen {
                header_seen = !row.is_blank();
                continue;
            }
            rows.push(row);
        }

        debug!(
            path = %path.display(),
            sheet = sheet_name,
            rows = rows.len(),
            "Excel 读取完成"
        );
        Ok(rows)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl TableSource for UniversalFileParser {
    fn read_table(&self, path: &Path, sheet_name: &str) -> IngestResult<Vec<RawRow>> {
        match extension_of(path).as_str() {
            "csv" => CsvParser.read_table(path, sheet_name),
            "xlsb" | "xlsx" | "xlsm" | "xls" | "ods" => ExcelParser.read_table(path, sheet_name),
            other => {
                ensure_exists(path)?;
                Err(IngestError::UnsupportedFormat(other.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_csv_parser_drops_header_and_keeps_positions() {
        let temp_file = csv_file(&["Type,WO,X", "MP,AAAAAA,", "PR,,12.5"]);

        let rows = CsvParser.read_table(temp_file.path(), "Report").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].cell(1), &RawCell::text("AAAAAA"));
        assert_eq!(rows[0].cell(2), &RawCell::Empty);
        assert_eq!(rows[1].cell(2), &RawCell::text("12.5"));
    }

    #[test]
    fn test_csv_parser_keeps_blank_rows_in_position() {
        let temp_file = csv_file(&["Type,WO", "MP,AAAAAA", ",", "PR,AAAAAA0001"]);

        let rows = CsvParser.read_table(temp_file.path(), "Report").unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows[1].is_blank());
        assert_eq!(rows[1].row_number, 3);
        assert_eq!(rows[2].row_number, 4);
        assert_eq!(rows[2].cell(1), &RawCell::text("AAAAAA0001"));
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let err = UniversalFileParser
            .read_table(Path::new("no_such_pcb012_VN.xlsb"), "Report")
            .unwrap_err();
        assert!(err.is_source_unavailable());

        let err = CsvParser
            .read_table(Path::new("no_such_file.csv"), "Report")
            .unwrap_err();
        assert!(err.is_source_unavailable());
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        let err = UniversalFileParser
            .read_table(temp_file.path(), "Report")
            .unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_convert_excel_cells() {
        assert_eq!(ExcelParser::convert_cell(&Data::Int(7)), RawCell::Number(7.0));
        assert_eq!(
            ExcelParser::convert_cell(&Data::String("  ".to_string())),
            RawCell::Empty
        );
        assert_eq!(
            ExcelParser::convert_cell(&Data::DateTimeIso("2024-01-31T00:00:00".to_string())),
            RawCell::text("2024-01-31")
        );
    }
}
