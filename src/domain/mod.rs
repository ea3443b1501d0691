// ==========================================
// 项目台账监控 - 领域模型层
// ==========================================
// 职责: 定义记录、层级节点、统计快照等领域对象
// 红线: 不含文件读取逻辑, 不含引擎逻辑
// ==========================================

pub mod hierarchy;
pub mod record;
pub mod statistics;
pub mod types;

// 重导出核心类型
pub use hierarchy::{HierarchyAnomaly, HierarchyForest, HierarchyNode};
pub use record::{Field, RawCell, RawRow, Record};
pub use statistics::StatisticsSnapshot;
pub use types::{FieldKind, RecordType, Tier};
