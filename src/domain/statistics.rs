// ==========================================
// 项目台账监控 - 汇总统计快照
// ==========================================
// 派生只读对象, 记录集变化时重新计算
// ==========================================

use serde::Serialize;
use std::collections::BTreeMap;

pub mod metric_names {
    pub const MP_NO: &str = "mp_no";
    pub const PR_NO: &str = "pr_no";
    pub const WO_NO: &str = "wo_no";
    pub const PM_NO: &str = "pm_no";
    pub const CONTRACT_BUDGET: &str = "Contract_budget";
    pub const CONTRACT_2D_INVOICED: &str = "Contract_2d_invoiced";
    pub const CONTRACT_2D_TOTAL: &str = "Contract_2d_total";
    pub const OUTSTANDING_INV: &str = "Outstanding_inv";
    pub const WORKLOAD_FIRM: &str = "Workload_firm";
}

// ==========================================
// StatisticsSnapshot
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub mp_list: Vec<String>,
    pub pr_list: Vec<String>,
    pub wo_list: Vec<String>,
    pub pm_list: Vec<String>,

    // 仅统计 record_type 等于过滤条件的记录
    pub contract_budget: f64,
    pub contract_2d_invoiced: f64,
    pub contract_2d_total: f64,
    pub outstanding_inv: f64,
    pub workload_firm: f64,
}

impl StatisticsSnapshot {
    pub fn mp_no(&self) -> usize {
        self.mp_list.len()
    }

    pub fn pr_no(&self) -> usize {
        self.pr_list.len()
    }

    pub fn wo_no(&self) -> usize {
        self.wo_list.len()
    }

    pub fn pm_no(&self) -> usize {
        self.pm_list.len()
    }

    /// 是否没有任何记录参与统计
    pub fn is_empty(&self) -> bool {
        self.mp_list.is_empty()
            && self.pr_list.is_empty()
            && self.wo_list.is_empty()
            && self.pm_list.is_empty()
            && self.contract_budget == 0.0
            && self.contract_2d_invoiced == 0.0
            && self.contract_2d_total == 0.0
            && self.outstanding_inv == 0.0
            && self.workload_firm == 0.0
    }

    /// 指标名 → 数值
    pub fn metrics(&self) -> BTreeMap<&'static str, f64> {
        use metric_names::*;

        let mut metrics = BTreeMap::new();
        metrics.insert(MP_NO, self.mp_no() as f64);
        metrics.insert(PR_NO, self.pr_no() as f64);
        metrics.insert(WO_NO, self.wo_no() as f64);
        metrics.insert(PM_NO, self.pm_no() as f64);
        metrics.insert(CONTRACT_BUDGET, self.contract_budget);
        metrics.insert(CONTRACT_2D_INVOICED, self.contract_2d_invoiced);
        metrics.insert(CONTRACT_2D_TOTAL, self.contract_2d_total);
        metrics.insert(OUTSTANDING_INV, self.outstanding_inv);
        metrics.insert(WORKLOAD_FIRM, self.workload_firm);
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_empty() {
        let snapshot = StatisticsSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.metrics().get(metric_names::MP_NO), Some(&0.0));
        assert_eq!(snapshot.metrics().len(), 9);
    }

    #[test]
    fn test_metrics_reflect_lists() {
        let snapshot = StatisticsSnapshot {
            mp_list: vec!["AAAAAA".to_string(), "BBBBBB".to_string()],
            contract_budget: 10.0,
            ..Default::default()
        };
        assert!(!snapshot.is_empty());
        assert_eq!(snapshot.mp_no(), 2);
        assert_eq!(
            snapshot.metrics().get(metric_names::CONTRACT_BUDGET),
            Some(&10.0)
        );
    }
}
