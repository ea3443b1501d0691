// ==========================================
// 项目台账监控 - 引擎层
// ==========================================
// 职责: 汇总统计、层级构建、组合加载、视图查询
// 红线: 引擎不读文件, 文件读取统一走 importer::TableSource
// ==========================================

pub mod aggregator;
pub mod hierarchy_builder;
pub mod orchestrator;
pub mod views;

// 重导出核心引擎
pub use aggregator::{summarize, Aggregator};
pub use hierarchy_builder::{
    FirstContained, HierarchyBuilder, MatchStrategyKind, ParentMatchStrategy, PrefixPreferred,
};
pub use orchestrator::{EntityFailure, EntityOutcome, PortfolioLoader, PortfolioSnapshot};
pub use views::{invoiced_ratio, records_of_entity, records_of_type, top_n_by, with_positive_budget};
