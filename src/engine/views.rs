// ==========================================
// 项目台账监控 - 记录视图查询
// ==========================================
// 职责: 供展示层使用的平表查询（纯函数, 不修改记录）
// ==========================================

use crate::domain::record::{Field, Record};
use crate::domain::types::RecordType;
use std::cmp::Ordering;

/// 指定记录类型的记录（保持原顺序）
pub fn records_of_type<'a>(records: &'a [Record], record_type: &RecordType) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| &r.record_type == record_type)
        .collect()
}

/// 指定实体的记录（保持原顺序）
pub fn records_of_entity<'a>(records: &'a [Record], entity: &str) -> Vec<&'a Record> {
    records.iter().filter(|r| r.entity == entity).collect()
}

/// 按金额降序取前 n 条, 缺失该金额的记录不参与排序
///
/// 金额相同时保持原顺序
pub fn top_n_by(records: &[Record], field: Field, n: usize) -> Vec<&Record> {
    let mut ranked: Vec<(&Record, f64)> = records
        .iter()
        .filter_map(|r| r.amount(field).map(|v| (r, v)))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.into_iter().take(n).map(|(r, _)| r).collect()
}

/// 仅合同预算为正的记录
pub fn with_positive_budget(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .filter(|r| r.amount_or_zero(Field::ContractBudget) > 0.0)
        .cloned()
        .collect()
}

/// 已开票比例（%）: Contract_2d_invoiced / Contract_budget × 100
pub fn invoiced_ratio(record: &Record) -> Option<f64> {
    let budget = record.amount(Field::ContractBudget)?;
    if budget <= 0.0 {
        return None;
    }
    Some(record.amount_or_zero(Field::Contract2dInvoiced) / budget * 100.0)
}
