// ==========================================
// 项目台账监控 - 层级构建引擎
// ==========================================
// 职责: 平表记录 → MasterProject / Project / WorkOrder 森林
// 规则:
//   1. 按 identifier 长度分层 (6 / 10 / 14), 其他长度不进入森林
//   2. WorkOrder 挂到包含关系匹配的 Project 下
//   3. Project 挂到包含关系匹配的 MasterProject 下
//   4. 多个候选时由 ParentMatchStrategy 决定; 无候选则记录异常并丢弃
//   5. 同层编号重复: 保留首次出现的位置, 节点数据取最后一条, 并记录异常
// 复杂度: O(P·W + M·P)
// ==========================================

use crate::domain::hierarchy::{HierarchyAnomaly, HierarchyForest, HierarchyNode};
use crate::domain::record::Record;
use crate::domain::types::Tier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

// ==========================================
// ParentMatchStrategy - 父级匹配策略
// ==========================================
// 候选顺序 = 记录在合并平表中的首次出现顺序（稳定）
pub trait ParentMatchStrategy: Send + Sync {
    /// 返回被选中父级在 candidates 中的下标
    fn select(&self, child: &str, candidates: &[&str]) -> Option<usize>;

    fn name(&self) -> &'static str;
}

/// 第一个被子编号包含的候选（与旧报表工具一致）
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstContained;

impl ParentMatchStrategy for FirstContained {
    fn select(&self, child: &str, candidates: &[&str]) -> Option<usize> {
        candidates.iter().position(|parent| child.contains(parent))
    }

    fn name(&self) -> &'static str {
        "FIRST_CONTAINED"
    }
}

/// 优先选择作为前缀的候选, 没有则退回 FirstContained
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixPreferred;

impl ParentMatchStrategy for PrefixPreferred {
    fn select(&self, child: &str, candidates: &[&str]) -> Option<usize> {
        candidates
            .iter()
            .position(|parent| child.starts_with(parent))
            .or_else(|| FirstContained.select(child, candidates))
    }

    fn name(&self) -> &'static str {
        "PREFIX_PREFERRED"
    }
}

/// 可配置的策略选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStrategyKind {
    #[default]
    FirstContained,
    PrefixPreferred,
}

impl MatchStrategyKind {
    pub fn build(&self) -> Box<dyn ParentMatchStrategy> {
        match self {
            MatchStrategyKind::FirstContained => Box::new(FirstContained),
            MatchStrategyKind::PrefixPreferred => Box::new(PrefixPreferred),
        }
    }
}

impl fmt::Display for MatchStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategyKind::FirstContained => write!(f, "FIRST_CONTAINED"),
            MatchStrategyKind::PrefixPreferred => write!(f, "PREFIX_PREFERRED"),
        }
    }
}

// ==========================================
// HierarchyBuilder
// ==========================================
pub struct HierarchyBuilder {
    strategy: Box<dyn ParentMatchStrategy>,
}

/// 同一层级的候选节点（保持出现顺序）
struct TierBucket {
    ids: Vec<String>,
    nodes: BTreeMap<String, HierarchyNode>,
}

impl TierBucket {
    fn new() -> Self {
        Self {
            ids: Vec::new(),
            nodes: BTreeMap::new(),
        }
    }
}

impl HierarchyBuilder {
    pub fn new(strategy: Box<dyn ParentMatchStrategy>) -> Self {
        Self { strategy }
    }

    pub fn with_kind(kind: MatchStrategyKind) -> Self {
        Self::new(kind.build())
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// 构建森林（每次从零开始, 不修改输入）
    pub fn build(&self, records: &[Record]) -> HierarchyForest {
        let mut anomalies = Vec::new();
        let mut unclassified = Vec::new();
        let mut seen_unclassified = HashSet::new();

        let mut masters = TierBucket::new();
        let mut projects = TierBucket::new();
        let mut work_orders = TierBucket::new();

        // === 步骤 1: 按长度分层 ===
        for record in records {
            let bucket = match record.tier {
                Tier::MasterProject => &mut masters,
                Tier::Project => &mut projects,
                Tier::WorkOrder => &mut work_orders,
                Tier::Unclassified => {
                    if seen_unclassified.insert(record.identifier.as_str()) {
                        unclassified.push(record.identifier.clone());
                    }
                    continue;
                }
            };

            if let Some(existing) = bucket.nodes.get_mut(&record.identifier) {
                warn!(
                    identifier = %record.identifier,
                    tier = %record.tier,
                    entity = %record.entity,
                    "层级内编号重复, 保留最后一条的数据"
                );
                anomalies.push(HierarchyAnomaly::DuplicateIdentifier {
                    identifier: record.identifier.clone(),
                    tier: record.tier,
                    entity: record.entity.clone(),
                });
                // 位置沿用首次出现, 数据以后出现的行为准
                existing.record = record.clone();
                continue;
            }

            bucket.ids.push(record.identifier.clone());
            bucket
                .nodes
                .insert(record.identifier.clone(), HierarchyNode::new(record.clone()));
        }

        debug!(
            masters = masters.ids.len(),
            projects = projects.ids.len(),
            work_orders = work_orders.ids.len(),
            unclassified = unclassified.len(),
            "层级分桶完成"
        );

        // === 步骤 2: WorkOrder → Project ===
        self.attach(work_orders, &mut projects, &mut anomalies);

        // === 步骤 3: Project → MasterProject ===
        self.attach(projects, &mut masters, &mut anomalies);

        let forest = HierarchyForest {
            roots: masters.nodes,
            unclassified,
            anomalies,
        };

        info!(
            strategy = self.strategy.name(),
            roots = forest.roots.len(),
            nodes = forest.node_count(),
            anomalies = forest.anomalies.len(),
            "层级构建完成"
        );

        forest
    }

    /// 把 children 中的每个节点挂到 parents 中选出的父级下
    fn attach(
        &self,
        children: TierBucket,
        parents: &mut TierBucket,
        anomalies: &mut Vec<HierarchyAnomaly>,
    ) {
        let candidates: Vec<&str> = parents.ids.iter().map(String::as_str).collect();

        let TierBucket { ids, mut nodes } = children;
        for child_id in ids {
            let Some(child) = nodes.remove(&child_id) else {
                continue;
            };

            let parent = self
                .strategy
                .select(&child_id, &candidates)
                .and_then(|idx| parents.nodes.get_mut(candidates[idx]));

            match parent {
                Some(parent) => {
                    parent.children.insert(child_id, child);
                }
                None => {
                    warn!(
                        identifier = %child_id,
                        tier = %child.tier(),
                        entity = %child.record.entity,
                        "未找到父级, 不进入层级"
                    );
                    anomalies.push(HierarchyAnomaly::UnmatchedChild {
                        identifier: child_id,
                        tier: child.tier(),
                        entity: child.record.entity.clone(),
                    });
                }
            }
        }
    }
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new(Box::new(FirstContained))
    }
}
