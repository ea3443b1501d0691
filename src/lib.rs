// ==========================================
// 项目台账监控 - 核心库
// ==========================================
// 数据源: pcb012 项目台账报表（每个实体一个文件）
// 输出: 合并平表 + MasterProject/Project/WorkOrder 层级 + 统计快照
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录、层级、统计
pub mod domain;

// 导入层 - 文件读取与类型转换
pub mod importer;

// 引擎层 - 汇总、层级构建、组合加载
pub mod engine;

// 配置层
pub mod config;

// 日志系统
pub mod logging;

// 控制台报表
pub mod report;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{FieldKind, RecordType, Tier};

// 领域实体
pub use domain::{
    Field, HierarchyAnomaly, HierarchyForest, HierarchyNode, RawCell, RawRow, Record,
    StatisticsSnapshot,
};

// 导入
pub use importer::{EntityIngestion, EntityIngestor, IngestError, IngestResult, TableSource};

// 引擎
pub use engine::{
    Aggregator, EntityFailure, HierarchyBuilder, MatchStrategyKind, PortfolioLoader,
    PortfolioSnapshot,
};

// 配置
pub use config::{ConfigError, EntityConfig, MonitorConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "项目台账监控";
