// ==========================================
// 项目台账监控 - 汇总统计引擎
// ==========================================
// 职责: 记录集 → StatisticsSnapshot
// 口径: 编号/经理清单覆盖全部记录;
//       金额合计只统计 record_type 等于过滤条件的记录（默认 MP）,
//       避免父子行重复计入
// ==========================================

use crate::domain::record::{Field, Record};
use crate::domain::statistics::StatisticsSnapshot;
use crate::domain::types::{RecordType, Tier};
use std::collections::HashSet;

// ==========================================
// Aggregator
// ==========================================
#[derive(Debug, Clone)]
pub struct Aggregator {
    type_filter: RecordType,
}

impl Aggregator {
    pub fn new(type_filter: RecordType) -> Self {
        Self { type_filter }
    }

    pub fn type_filter(&self) -> &RecordType {
        &self.type_filter
    }

    /// 计算统计快照（纯函数）
    pub fn summarize(&self, records: &[Record]) -> StatisticsSnapshot {
        summarize(records, &self.type_filter)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(RecordType::MasterProject)
    }
}

/// 计算统计快照
///
/// # 参数
/// - records: 记录集（单实体或合并后的全表）
/// - type_filter: 金额合计使用的记录类型
pub fn summarize(records: &[Record], type_filter: &RecordType) -> StatisticsSnapshot {
    let mut snapshot = StatisticsSnapshot {
        mp_list: unique_identifiers(records, Tier::MasterProject),
        pr_list: unique_identifiers(records, Tier::Project),
        wo_list: unique_identifiers(records, Tier::WorkOrder),
        pm_list: unique_in_order(records.iter().filter_map(Record::manager)),
        ..Default::default()
    };

    for record in records.iter().filter(|r| &r.record_type == type_filter) {
        snapshot.contract_budget += record.amount_or_zero(Field::ContractBudget);
        snapshot.contract_2d_invoiced += record.amount_or_zero(Field::Contract2dInvoiced);
        snapshot.contract_2d_total += record.amount_or_zero(Field::Contract2dTotal);
        snapshot.outstanding_inv += record.amount_or_zero(Field::OutstandingInv);
        snapshot.workload_firm += record.amount_or_zero(Field::WorkloadFirm);
    }

    snapshot
}

/// 某层级的去重编号（保持首次出现顺序）
pub fn unique_identifiers(records: &[Record], tier: Tier) -> Vec<String> {
    unique_in_order(
        records
            .iter()
            .filter(|r| r.tier == tier)
            .map(|r| r.identifier.as_str()),
    )
}

/// 某记录类型的金额合计
pub fn sum_field(records: &[Record], type_filter: &RecordType, field: Field) -> f64 {
    records
        .iter()
        .filter(|r| &r.record_type == type_filter)
        .map(|r| r.amount_or_zero(field))
        .sum()
}

fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
