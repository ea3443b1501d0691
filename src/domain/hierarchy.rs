// ==========================================
// 项目台账监控 - 层级结构
// ==========================================
// 职责: MasterProject → Project → WorkOrder 森林
// 说明: 每次导入重新构建, 不做增量修改
// ==========================================

use crate::domain::record::Record;
use crate::domain::types::Tier;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// HierarchyNode - 层级节点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    pub record: Record,
    pub children: BTreeMap<String, HierarchyNode>,
}

impl HierarchyNode {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            children: BTreeMap::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.record.identifier
    }

    pub fn tier(&self) -> Tier {
        self.record.tier
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// 本节点及全部后代的数量
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .values()
            .map(HierarchyNode::node_count)
            .sum::<usize>()
    }

    /// 深度优先遍历（先序）
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a HierarchyNode, Option<&'a HierarchyNode>)) {
        self.walk_inner(None, visit);
    }

    fn walk_inner<'a>(
        &'a self,
        parent: Option<&'a HierarchyNode>,
        visit: &mut dyn FnMut(&'a HierarchyNode, Option<&'a HierarchyNode>),
    ) {
        visit(self, parent);
        for child in self.children.values() {
            child.walk_inner(Some(self), visit);
        }
    }
}

// ==========================================
// HierarchyAnomaly - 构建异常（记录, 不中断）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HierarchyAnomaly {
    /// 子记录找不到任何包含关系的父记录
    UnmatchedChild {
        identifier: String,
        tier: Tier,
        entity: String,
    },
    /// 同一层级内重复的 identifier（保留第一条）
    DuplicateIdentifier {
        identifier: String,
        tier: Tier,
        entity: String,
    },
}

impl fmt::Display for HierarchyAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyAnomaly::UnmatchedChild {
                identifier,
                tier,
                entity,
            } => write!(f, "未匹配父级: {} ({}, {})", identifier, tier, entity),
            HierarchyAnomaly::DuplicateIdentifier {
                identifier,
                tier,
                entity,
            } => write!(f, "重复编号: {} ({}, {})", identifier, tier, entity),
        }
    }
}

// ==========================================
// HierarchyForest - 森林（按 MasterProject 编号索引）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HierarchyForest {
    pub roots: BTreeMap<String, HierarchyNode>,
    /// 长度不在 {6,10,14} 的编号, 仅存在于平表
    pub unclassified: Vec<String>,
    pub anomalies: Vec<HierarchyAnomaly>,
}

impl HierarchyForest {
    pub fn root(&self, identifier: &str) -> Option<&HierarchyNode> {
        self.roots.get(identifier)
    }

    pub fn node_count(&self) -> usize {
        self.roots.values().map(HierarchyNode::node_count).sum()
    }

    /// 按路径查找节点, 例如 ["AAAAAA", "AAAAAA0001"]
    pub fn find_path(&self, path: &[&str]) -> Option<&HierarchyNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for id in rest {
            node = node.children.get(*id)?;
        }
        Some(node)
    }

    /// 查找任意层级的节点
    pub fn find(&self, identifier: &str) -> Option<&HierarchyNode> {
        let mut found = None;
        for root in self.roots.values() {
            root.walk(&mut |node, _| {
                if found.is_none() && node.identifier() == identifier {
                    found = Some(node);
                }
            });
            if found.is_some() {
                break;
            }
        }
        found
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &HierarchyAnomaly> {
        self.anomalies
            .iter()
            .filter(|a| matches!(a, HierarchyAnomaly::UnmatchedChild { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RecordType;

    fn node(id: &str) -> HierarchyNode {
        HierarchyNode::new(Record::new(id, RecordType::Other(String::new()), "VN", 0))
    }

    #[test]
    fn test_node_count_and_find() {
        let mut wo_parent = node("AAAAAA0001");
        wo_parent
            .children
            .insert("AAAAAA00010001".to_string(), node("AAAAAA00010001"));
        let mut root = node("AAAAAA");
        root.children.insert("AAAAAA0001".to_string(), wo_parent);

        let mut forest = HierarchyForest::default();
        forest.roots.insert("AAAAAA".to_string(), root);

        assert_eq!(forest.node_count(), 3);
        assert!(forest
            .find_path(&["AAAAAA", "AAAAAA0001", "AAAAAA00010001"])
            .is_some());
        assert!(forest.find_path(&["AAAAAA", "BBBBBB0001"]).is_none());
        assert_eq!(
            forest.find("AAAAAA00010001").map(|n| n.tier()),
            Some(Tier::WorkOrder)
        );
        assert!(forest.find("ZZZZZZ").is_none());
    }
}
