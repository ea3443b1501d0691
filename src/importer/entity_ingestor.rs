// ==========================================
// 项目台账监控 - 实体导入器实现
// ==========================================
// 职责: 单个实体源表 → 清洗后的记录集 + 统计快照
// 流程: 跳过表头杂项 → 过滤空白行 → 列结构 → 过滤 MPZ → 类型转换 → 实体标记 → 统计
// 杂项行按位置计数, 空白杂项行同样占位
// 红线: 任一金额/比例单元格无法解析 → 整表失败, 不输出部分结果
// ==========================================

use crate::domain::record::{Field, RawRow, Record};
use crate::domain::statistics::StatisticsSnapshot;
use crate::domain::types::{FieldKind, RecordType};
use crate::engine::aggregator::Aggregator;
use crate::importer::error::{IngestError, IngestResult};
use crate::importer::ingest_trait::TableSource;
use crate::importer::record_schema::{NamedRow, RecordSchema};
use crate::importer::type_coercion::TypeCoercer;
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// 报表表头之后的杂项行数
pub const DEFAULT_SKIP_ROWS: usize = 17;

// ==========================================
// EntityIngestion - 单实体导入结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct EntityIngestion {
    pub entity: String,
    /// 实际使用的汇率（实体汇率 / 报告币种汇率）
    pub rate: f64,
    pub records: Vec<Record>,
    pub statistics: StatisticsSnapshot,
    pub summary: IngestSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestSummary {
    pub total_rows: usize,
    pub skipped_header_rows: usize,
    pub blank_rows: usize,
    pub placeholder_rows: usize,
    pub blank_identifier_rows: usize,
    pub retained_rows: usize,
    pub elapsed: Duration,
}

// ==========================================
// EntityIngestor
// ==========================================
pub struct EntityIngestor {
    schema: RecordSchema,
    coercer: TypeCoercer,
    aggregator: Aggregator,
    skip_rows: usize,
}

impl EntityIngestor {
    pub fn new(schema: RecordSchema, skip_rows: usize, aggregator: Aggregator) -> Self {
        Self {
            schema,
            coercer: TypeCoercer,
            aggregator,
            skip_rows,
        }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// 从文件导入一个实体
    #[instrument(skip(self, source, path), fields(path = %path.as_ref().display()))]
    pub fn ingest_file<P: AsRef<Path>>(
        &self,
        source: &dyn TableSource,
        path: P,
        sheet_name: &str,
        entity: &str,
        rate: f64,
    ) -> IngestResult<EntityIngestion> {
        validate_rate(entity, rate)?;
        let rows = source.read_table(path.as_ref(), sheet_name)?;
        self.ingest(rows, entity, rate)
    }

    /// 导入一个实体的原始行
    ///
    /// # 参数
    /// - rows: 表头行之后的原始行（含 17 行杂项, 空白行保留在原位置）
    /// - entity: 实体标记（如 VN / NL）
    /// - rate: 实体币种 → 报告币种的汇率, 必须 > 0
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn ingest(
        &self,
        rows: Vec<RawRow>,
        entity: &str,
        rate: f64,
    ) -> IngestResult<EntityIngestion> {
        let start_time = Instant::now();
        validate_rate(entity, rate)?;

        let mut summary = IngestSummary {
            total_rows: rows.len(),
            skipped_header_rows: rows.len().min(self.skip_rows),
            ..Default::default()
        };

        // === 步骤 1: 跳过表头杂项 ===
        let data_rows = rows.iter().skip(self.skip_rows);

        let mut records = Vec::new();
        for row in data_rows {
            // 空白行只在杂项之后过滤, 不参与杂项计数
            if row.is_blank() {
                summary.blank_rows += 1;
                continue;
            }

            // === 步骤 2: 应用列结构 ===
            let named = self.schema.apply(row)?;

            // === 步骤 3: 过滤 MPZ 空白填充行 ===
            let record_type = named
                .get(Field::Type)
                .and_then(|c| self.coercer.to_category(c))
                .map(|s| RecordType::parse(&s))
                .unwrap_or_else(|| RecordType::Other(String::new()));
            if record_type.is_placeholder() {
                summary.placeholder_rows += 1;
                continue;
            }

            // === 步骤 4: identifier 为空的行不进入记录集 ===
            let identifier = match named.get(Field::Wo).and_then(|c| self.coercer.to_category(c)) {
                Some(id) => id,
                None => {
                    warn!(entity, row = row.row_number, "编号为空, 跳过该行");
                    summary.blank_identifier_rows += 1;
                    continue;
                }
            };

            // === 步骤 5-6: 类型转换 + 实体标记 ===
            let record = self.coerce_row(&named, identifier, record_type, entity, rate)?;
            records.push(record);
        }

        summary.retained_rows = records.len();
        debug!(
            entity,
            retained = summary.retained_rows,
            placeholder = summary.placeholder_rows,
            "行过滤与类型转换完成"
        );

        // === 步骤 7: 实体统计 ===
        let statistics = self.aggregator.summarize(&records);
        summary.elapsed = start_time.elapsed();

        info!(
            entity,
            rate,
            total = summary.total_rows,
            retained = summary.retained_rows,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "实体导入完成"
        );

        Ok(EntityIngestion {
            entity: entity.to_string(),
            rate,
            records,
            statistics,
            summary,
        })
    }

    /// 单行类型转换
    fn coerce_row(
        &self,
        named: &NamedRow<'_>,
        identifier: String,
        record_type: RecordType,
        entity: &str,
        rate: f64,
    ) -> IngestResult<Record> {
        let row = named.row_number;
        let mut record = Record::new(identifier, record_type, entity, row);

        for (spec, cell) in &named.cells {
            match spec.kind() {
                FieldKind::Identifier | FieldKind::RecordType => {}
                FieldKind::Currency => {
                    if let Some(v) = self.coercer.to_currency(cell, rate, row, spec.field)? {
                        record.monetary.insert(spec.field, v);
                    }
                }
                FieldKind::Percentage => {
                    if let Some(v) = self.coercer.to_percentage(cell, row, spec.field)? {
                        record.percentages.insert(spec.field, v);
                    }
                }
                FieldKind::Date => {
                    let date = self.coercer.to_date(cell, row, spec.field);
                    record.dates.insert(spec.field, date);
                }
                FieldKind::Category | FieldKind::Text => {
                    if let Some(v) = self.coercer.to_category(cell) {
                        record.descriptive.insert(spec.field, v);
                    }
                }
            }
        }

        Ok(record)
    }
}

impl Default for EntityIngestor {
    fn default() -> Self {
        Self::new(RecordSchema::pcb012(), DEFAULT_SKIP_ROWS, Aggregator::default())
    }
}

/// 汇率必须为有限正数
pub fn validate_rate(entity: &str, rate: f64) -> IngestResult<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(IngestError::Config(format!(
            "实体 {} 的汇率必须大于 0, 实际为 {}",
            entity, rate
        )));
    }
    Ok(())
}
