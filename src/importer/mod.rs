// ==========================================
// 项目台账监控 - 导入层
// ==========================================
// 职责: 实体源表 → 类型化记录
// 支持: Excel (.xlsb/.xlsx/.xls/.ods), CSV
// ==========================================

// 模块声明
pub mod entity_ingestor;
pub mod error;
pub mod file_parser;
pub mod ingest_trait;
pub mod record_schema;
pub mod type_coercion;

// 重导出核心类型
pub use entity_ingestor::{EntityIngestion, EntityIngestor, IngestSummary, DEFAULT_SKIP_ROWS};
pub use error::{IngestError, IngestResult};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use ingest_trait::TableSource;
pub use record_schema::{ColumnSpec, NamedRow, RecordSchema, PCB012_COLUMNS, SCHEMA_WIDTH};
pub use type_coercion::{sentinel_date, serial_to_date, TypeCoercer};
