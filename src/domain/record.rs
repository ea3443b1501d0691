// ==========================================
// 项目台账监控 - 记录实体
// ==========================================
// 职责: 原始行 (RawRow) / 命名字段 (Field) / 清洗后记录 (Record)
// 生命周期: RawRow → Record (构造后不可变)
// ==========================================

use crate::domain::types::{FieldKind, RecordType, Tier};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// RawCell - 原始单元格
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl RawCell {
    pub fn text<S: Into<String>>(value: S) -> Self {
        RawCell::Text(value.into())
    }

    /// 空单元格或仅含空白的文本
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            RawCell::Number(n) => n.is_nan(),
            RawCell::Bool(_) => false,
        }
    }

    /// 文本表示（整数值的数字不带小数部分）
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            RawCell::Number(n) if n.is_nan() => None,
            RawCell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{}", n))
                }
            }
            RawCell::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text().unwrap_or_default())
    }
}

static EMPTY_CELL: RawCell = RawCell::Empty;

// ==========================================
// RawRow - 原始行
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 源表中的行号（1 起）
    pub row_number: usize,
    pub cells: Vec<RawCell>,
}

impl RawRow {
    pub fn new(row_number: usize, cells: Vec<RawCell>) -> Self {
        Self { row_number, cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, position: usize) -> &RawCell {
        self.cells.get(position).unwrap_or(&EMPTY_CELL)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(RawCell::is_blank)
    }
}

// ==========================================
// Field - 有语义的列
// ==========================================
// 名称沿用报表原列名, 便于与旧表格对照
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Type,
    Wo,
    PmMp,
    Description,
    ProjectType,
    ProjectTier,
    Contract2dInvoiced,
    Contract2dTotal,
    ContractBudget,
    Cost2dTotal,
    Cost2dTxt,
    Cost2dSubcon,
    Cost2dOthers,
    CostBudgetTotal,
    CostBudgetTxt,
    CostBudgetSubcon,
    CostBudgetContin,
    CostBudgetOthers,
    Cost4castTotal,
    Cost4castTxt,
    Cost4castSubcon,
    Cost4castContin,
    Cost4castOthers,
    DateBudget,
    Date4cast,
    RatioInvoiced,
    RatioSpent,
    RatioTxt,
    PrMonth,
    PrYear,
    Pr2date,
    PrBudgetedSelling,
    Pr4casted,
    Pr4castedExecution,
    PrNetYear,
    PrNet2date,
    ForecastChangePr,
    ForecastChangeContin,
    OutstandingInv,
    InvOldestUnpaid,
    InvMostRecent,
    InvBase,
    WipGross,
    InvCost,
    WipNet,
    WorkloadFirm,
    WoDateStart,
    WoDateEnd,
    Customer,
}

impl Field {
    /// 报表原列名
    pub fn name(&self) -> &'static str {
        match self {
            Field::Type => "Type",
            Field::Wo => "WO",
            Field::PmMp => "PM_MP",
            Field::Description => "Description",
            Field::ProjectType => "Project_type",
            Field::ProjectTier => "Project_tier",
            Field::Contract2dInvoiced => "Contract_2d_invoiced",
            Field::Contract2dTotal => "Contract_2d_total",
            Field::ContractBudget => "Contract_budget",
            Field::Cost2dTotal => "Cost_2d_total",
            Field::Cost2dTxt => "Cost_2d_txt",
            Field::Cost2dSubcon => "Cost_2d_subcon",
            Field::Cost2dOthers => "Cost_2d_others",
            Field::CostBudgetTotal => "Cost_budget_total",
            Field::CostBudgetTxt => "Cost_budget_txt",
            Field::CostBudgetSubcon => "Cost_budget_subcon",
            Field::CostBudgetContin => "Cost_budget_contin",
            Field::CostBudgetOthers => "Cost_budget_others",
            Field::Cost4castTotal => "Cost_4cast_total",
            Field::Cost4castTxt => "Cost_4cast_txt",
            Field::Cost4castSubcon => "Cost_4cast_subcon",
            Field::Cost4castContin => "Cost_4cast_contin",
            Field::Cost4castOthers => "Cost_4cast_others",
            Field::DateBudget => "Date_budget",
            Field::Date4cast => "Date_4cast",
            Field::RatioInvoiced => "Ratio_invoiced %",
            Field::RatioSpent => "Ratio_spent %",
            Field::RatioTxt => "Ratio_txt %",
            Field::PrMonth => "PR_month",
            Field::PrYear => "PR_year",
            Field::Pr2date => "PR_2date",
            Field::PrBudgetedSelling => "PR_budgeted_selling",
            Field::Pr4casted => "PR_4casted",
            Field::Pr4castedExecution => "PR_4casted_execution",
            Field::PrNetYear => "PR_net_year",
            Field::PrNet2date => "PR_net_2date",
            Field::ForecastChangePr => "4cast_change_pr",
            Field::ForecastChangeContin => "4cast_change_contin",
            Field::OutstandingInv => "Outstanding_inv",
            Field::InvOldestUnpaid => "Inv_oldest_unpaid",
            Field::InvMostRecent => "Inv_most_recent",
            Field::InvBase => "Inv_base",
            Field::WipGross => "WIP_gross",
            Field::InvCost => "Inv_cost",
            Field::WipNet => "WIP_net",
            Field::WorkloadFirm => "Workload_firm",
            Field::WoDateStart => "WO_date_start",
            Field::WoDateEnd => "WO_date_end",
            Field::Customer => "Customer",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Type => FieldKind::RecordType,
            Field::Wo => FieldKind::Identifier,
            Field::PmMp | Field::ProjectType | Field::ProjectTier => FieldKind::Category,
            Field::Description | Field::Customer => FieldKind::Text,
            Field::DateBudget
            | Field::Date4cast
            | Field::InvOldestUnpaid
            | Field::InvMostRecent
            | Field::WoDateStart
            | Field::WoDateEnd => FieldKind::Date,
            Field::RatioInvoiced | Field::RatioSpent | Field::RatioTxt => FieldKind::Percentage,
            _ => FieldKind::Currency,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ==========================================
// Record - 清洗后的记录
// ==========================================
// 约束: identifier 非空; monetary 已换算为报告币种
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub identifier: String,
    pub tier: Tier,
    pub record_type: RecordType,
    pub entity: String,
    pub monetary: BTreeMap<Field, f64>,
    pub percentages: BTreeMap<Field, f64>,
    pub dates: BTreeMap<Field, NaiveDate>,
    pub descriptive: BTreeMap<Field, String>,
    pub source_row: usize,
}

impl Record {
    /// 创建空记录, tier 在此处一次性计算
    pub fn new(
        identifier: impl Into<String>,
        record_type: RecordType,
        entity: impl Into<String>,
        source_row: usize,
    ) -> Self {
        let identifier = identifier.into();
        let tier = Tier::classify(&identifier);
        Self {
            identifier,
            tier,
            record_type,
            entity: entity.into(),
            monetary: BTreeMap::new(),
            percentages: BTreeMap::new(),
            dates: BTreeMap::new(),
            descriptive: BTreeMap::new(),
            source_row,
        }
    }

    /// 金额字段（缺失为 None）
    pub fn amount(&self, field: Field) -> Option<f64> {
        self.monetary.get(&field).copied()
    }

    /// 金额字段, 缺失按 0 计
    pub fn amount_or_zero(&self, field: Field) -> f64 {
        self.amount(field).unwrap_or(0.0)
    }

    pub fn percentage(&self, field: Field) -> Option<f64> {
        self.percentages.get(&field).copied()
    }

    pub fn date(&self, field: Field) -> Option<NaiveDate> {
        self.dates.get(&field).copied()
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        self.descriptive.get(&field).map(String::as_str)
    }

    /// 项目经理 (PM_MP)
    pub fn manager(&self) -> Option<&str> {
        self.text(Field::PmMp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_cell_text_formats_integral_numbers() {
        assert_eq!(RawCell::Number(123456.0).as_text(), Some("123456".to_string()));
        assert_eq!(RawCell::Number(1.5).as_text(), Some("1.5".to_string()));
        assert_eq!(RawCell::text("  ABC ").as_text(), Some("ABC".to_string()));
        assert_eq!(RawCell::text("   ").as_text(), None);
        assert_eq!(RawCell::Empty.as_text(), None);
    }

    #[test]
    fn test_raw_row_out_of_range_cell_is_empty() {
        let row = RawRow::new(1, vec![RawCell::text("MP")]);
        assert_eq!(row.cell(0), &RawCell::text("MP"));
        assert_eq!(row.cell(50), &RawCell::Empty);
        assert!(!row.is_blank());
        assert!(RawRow::new(2, vec![RawCell::Empty, RawCell::text(" ")]).is_blank());
    }

    #[test]
    fn test_field_kinds() {
        assert_eq!(Field::ContractBudget.kind(), FieldKind::Currency);
        assert_eq!(Field::ForecastChangePr.kind(), FieldKind::Currency);
        assert_eq!(Field::RatioSpent.kind(), FieldKind::Percentage);
        assert_eq!(Field::InvOldestUnpaid.kind(), FieldKind::Date);
        assert_eq!(Field::PmMp.kind(), FieldKind::Category);
        assert_eq!(Field::Customer.kind(), FieldKind::Text);
        assert_eq!(Field::Wo.name(), "WO");
    }

    #[test]
    fn test_record_new_computes_tier() {
        let record = Record::new("AAAAAA0001", RecordType::Project, "VN", 19);
        assert_eq!(record.tier, Tier::Project);
        assert_eq!(record.amount_or_zero(Field::ContractBudget), 0.0);
        assert_eq!(record.manager(), None);
    }
}
