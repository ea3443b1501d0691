// ==========================================
// 项目台账监控 - 组合加载编排器
// ==========================================
// 职责: 并发导入所有选中实体 → 合并平表 → 构建层级 → 全局统计
// 流程:
//   1. 每个实体在 blocking 线程池中独立导入 (spawn_blocking + join_all)
//   2. 单实体失败只记录到 failures, 不影响其他实体
//   3. 按配置顺序合并, 输出不可变的 PortfolioSnapshot
// ==========================================

use crate::config::{EntityConfig, MonitorConfig};
use crate::domain::hierarchy::HierarchyForest;
use crate::domain::record::Record;
use crate::domain::statistics::StatisticsSnapshot;
use crate::engine::aggregator::Aggregator;
use crate::engine::hierarchy_builder::HierarchyBuilder;
use crate::importer::entity_ingestor::{EntityIngestion, EntityIngestor, IngestSummary};
use crate::importer::error::{IngestError, IngestResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::ingest_trait::TableSource;
use crate::importer::record_schema::RecordSchema;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

// ==========================================
// EntityFailure - 实体导入失败记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityFailure {
    pub entity: String,
    pub path: String,
    /// 错误类别（IngestError::kind）
    pub kind: String,
    pub message: String,
}

impl EntityFailure {
    fn from_error(entity: &EntityConfig, path: &Path, err: &IngestError) -> Self {
        Self {
            entity: entity.name.clone(),
            path: path.display().to_string(),
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

// ==========================================
// PortfolioSnapshot - 一次加载的完整结果（只读）
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSnapshot {
    pub run_id: Uuid,
    pub loaded_at: DateTime<Utc>,
    /// 合并平表（按配置顺序, 实体内保持源表顺序）
    pub records: Vec<Record>,
    pub forest: HierarchyForest,
    pub entity_statistics: BTreeMap<String, StatisticsSnapshot>,
    pub entity_summaries: BTreeMap<String, IngestSummary>,
    pub unified_statistics: StatisticsSnapshot,
    pub failures: Vec<EntityFailure>,
}

impl PortfolioSnapshot {
    pub fn loaded_entities(&self) -> impl Iterator<Item = &str> {
        self.entity_statistics.keys().map(String::as_str)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 单个实体的导入结果（带配置与路径）
pub struct EntityOutcome {
    pub entity: EntityConfig,
    pub path: PathBuf,
    pub result: IngestResult<EntityIngestion>,
}

// ==========================================
// PortfolioLoader
// ==========================================
pub struct PortfolioLoader {
    config: Arc<MonitorConfig>,
    source: Arc<dyn TableSource>,
}

impl PortfolioLoader {
    /// 使用文件解析器创建加载器
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_source(config, Arc::new(UniversalFileParser))
    }

    /// 注入数据源（测试或其他存储）
    pub fn with_source(config: MonitorConfig, source: Arc<dyn TableSource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// 加载全部选中实体
    #[instrument(skip(self), fields(source_dir = %self.config.source_dir.display()))]
    pub async fn load(&self) -> PortfolioSnapshot {
        let entities: Vec<EntityConfig> = self.config.selected_entities().cloned().collect();
        info!(count = entities.len(), "开始加载实体");

        // === 步骤 1: 每个实体一个 blocking 任务 ===
        let tasks = entities.into_iter().map(|entity| {
            let config = Arc::clone(&self.config);
            let source = Arc::clone(&self.source);
            let path = config.source_path(&entity);
            let task_path = path.clone();
            let task_entity = entity.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let ingestor = EntityIngestor::new(
                    RecordSchema::pcb012(),
                    config.skip_rows,
                    Aggregator::new(config.type_filter.clone()),
                );
                ingestor.ingest_file(
                    source.as_ref(),
                    &task_path,
                    &config.sheet_name,
                    &task_entity.name,
                    config.effective_rate(&task_entity),
                )
            });

            async move {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(IngestError::Internal(format!("导入任务异常终止: {}", e))),
                };
                EntityOutcome {
                    entity,
                    path,
                    result,
                }
            }
        });

        // === 步骤 2: 等待全部完成（join_all 保持输入顺序）===
        let outcomes = join_all(tasks).await;

        // === 步骤 3: 合并 ===
        self.assemble(outcomes)
    }

    /// 合并各实体结果并构建层级与全局统计
    pub fn assemble(&self, outcomes: Vec<EntityOutcome>) -> PortfolioSnapshot {
        let run_id = Uuid::new_v4();
        let mut records = Vec::new();
        let mut entity_statistics = BTreeMap::new();
        let mut entity_summaries = BTreeMap::new();
        let mut failures = Vec::new();

        for outcome in outcomes {
            match outcome.result {
                Ok(ingestion) => {
                    entity_statistics.insert(ingestion.entity.clone(), ingestion.statistics);
                    entity_summaries.insert(ingestion.entity.clone(), ingestion.summary);
                    records.extend(ingestion.records);
                }
                Err(err) => {
                    error!(
                        %run_id,
                        entity = %outcome.entity.name,
                        path = %outcome.path.display(),
                        kind = err.kind(),
                        error = %err,
                        "实体导入失败"
                    );
                    failures.push(EntityFailure::from_error(
                        &outcome.entity,
                        &outcome.path,
                        &err,
                    ));
                }
            }
        }

        let builder = HierarchyBuilder::with_kind(self.config.parent_match);
        let forest = builder.build(&records);
        let unified_statistics = Aggregator::new(self.config.type_filter.clone()).summarize(&records);

        info!(
            %run_id,
            loaded = entity_statistics.len(),
            failed = failures.len(),
            records = records.len(),
            roots = forest.roots.len(),
            strategy = builder.strategy_name(),
            "组合加载完成"
        );

        PortfolioSnapshot {
            run_id,
            loaded_at: Utc::now(),
            records,
            forest,
            entity_statistics,
            entity_summaries,
            unified_statistics,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::{RawCell, RawRow};
    use crate::importer::record_schema::SCHEMA_WIDTH;

    /// 按文件名返回内存数据的数据源
    struct MemorySource {
        tables: BTreeMap<String, Vec<RawRow>>,
    }

    impl TableSource for MemorySource {
        fn read_table(&self, path: &Path, _sheet_name: &str) -> IngestResult<Vec<RawRow>> {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            self.tables
                .get(name)
                .cloned()
                .ok_or_else(|| IngestError::SourceUnavailable {
                    path: path.display().to_string(),
                    reason: "not found".to_string(),
                })
        }
    }

    fn row(record_type: &str, wo: &str, budget: f64) -> RawRow {
        let mut cells = vec![RawCell::Empty; SCHEMA_WIDTH];
        cells[0] = RawCell::text(record_type);
        cells[1] = RawCell::text(wo);
        cells[23] = RawCell::Number(budget);
        RawRow::new(1, cells)
    }

    fn config(entities: Vec<EntityConfig>) -> MonitorConfig {
        MonitorConfig {
            skip_rows: 0,
            entities,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_load_isolates_failed_entity() {
        let mut tables = BTreeMap::new();
        tables.insert(
            "pcb012a_2450_VN.xlsb".to_string(),
            vec![row("MP", "AAAAAA", 26600.0), row("PR", "AAAAAA0001", 100.0)],
        );
        let loader = PortfolioLoader::with_source(
            config(vec![
                EntityConfig::new("VN", 1.0),
                EntityConfig::new("NL", 26600.0),
            ]),
            Arc::new(MemorySource { tables }),
        );

        let snapshot = loader.load().await;

        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.failures.len(), 1);
        assert_eq!(snapshot.failures[0].entity, "NL");
        assert_eq!(snapshot.failures[0].kind, "SOURCE_UNAVAILABLE");
        assert!((snapshot.unified_statistics.contract_budget - 1.0).abs() < 1e-9);
        assert!(snapshot.forest.find_path(&["AAAAAA", "AAAAAA0001"]).is_some());
        assert!(!snapshot.is_complete());
    }

    #[tokio::test]
    async fn test_load_concatenates_in_config_order() {
        let mut tables = BTreeMap::new();
        tables.insert(
            "pcb012a_2450_NL.xlsb".to_string(),
            vec![row("MP", "BBBBBB", 10.0)],
        );
        tables.insert(
            "pcb012a_2450_VN.xlsb".to_string(),
            vec![row("MP", "AAAAAA", 26600.0)],
        );
        let loader = PortfolioLoader::with_source(
            config(vec![
                EntityConfig::new("NL", 26600.0),
                EntityConfig::new("UK", 0.0),
                EntityConfig::new("VN", 1.0),
            ]),
            Arc::new(MemorySource { tables }),
        );

        let snapshot = loader.load().await;

        let order: Vec<_> = snapshot.records.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(order, vec!["NL", "VN"]);
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.loaded_entities().count(), 2);
        assert!((snapshot.unified_statistics.contract_budget - 11.0).abs() < 1e-9);
    }
}
