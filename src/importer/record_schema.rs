// ==========================================
// 项目台账监控 - 记录列结构 (Record Schema)
// ==========================================
// 职责: 位置 → 字段 → 语义类型 的静态声明表
// 说明: 未列出的位置为无意义占位列, 不进入任何输出
// ==========================================

use crate::domain::record::{Field, RawCell, RawRow};
use crate::domain::types::FieldKind;
use crate::importer::error::{IngestError, IngestResult};

/// 报表固定列宽
pub const SCHEMA_WIDTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub position: usize,
    pub field: Field,
}

impl ColumnSpec {
    pub fn kind(&self) -> FieldKind {
        self.field.kind()
    }
}

const fn col(position: usize, field: Field) -> ColumnSpec {
    ColumnSpec { position, field }
}

/// pcb012 报表 'Report' 工作表的列布局
pub static PCB012_COLUMNS: &[ColumnSpec] = &[
    col(0, Field::Type),
    col(1, Field::Wo),
    col(5, Field::PmMp),
    col(6, Field::Description),
    col(7, Field::ProjectType),
    col(11, Field::ProjectTier),
    col(15, Field::Contract2dInvoiced),
    col(22, Field::Contract2dTotal),
    col(23, Field::ContractBudget),
    col(24, Field::Cost2dTotal),
    col(25, Field::Cost2dTxt),
    col(26, Field::Cost2dSubcon),
    col(27, Field::Cost2dOthers),
    col(28, Field::CostBudgetTotal),
    col(29, Field::CostBudgetTxt),
    col(30, Field::CostBudgetSubcon),
    col(31, Field::CostBudgetContin),
    col(32, Field::CostBudgetOthers),
    col(33, Field::Cost4castTotal),
    col(34, Field::Cost4castTxt),
    col(35, Field::Cost4castSubcon),
    col(36, Field::Cost4castContin),
    col(37, Field::Cost4castOthers),
    col(38, Field::DateBudget),
    col(39, Field::Date4cast),
    col(40, Field::RatioInvoiced),
    col(41, Field::RatioSpent),
    col(42, Field::RatioTxt),
    col(44, Field::PrMonth),
    col(45, Field::PrYear),
    col(46, Field::Pr2date),
    col(47, Field::PrBudgetedSelling),
    col(48, Field::Pr4casted),
    col(49, Field::Pr4castedExecution),
    col(50, Field::PrNetYear),
    col(51, Field::PrNet2date),
    col(59, Field::ForecastChangePr),
    col(60, Field::ForecastChangeContin),
    col(68, Field::OutstandingInv),
    col(71, Field::InvOldestUnpaid),
    col(72, Field::InvMostRecent),
    col(73, Field::InvBase),
    col(74, Field::WipGross),
    col(75, Field::InvCost),
    col(76, Field::WipNet),
    col(83, Field::WorkloadFirm),
    col(84, Field::WoDateStart),
    col(85, Field::WoDateEnd),
    col(87, Field::Customer),
];

// ==========================================
// RecordSchema
// ==========================================
#[derive(Debug, Clone)]
pub struct RecordSchema {
    width: usize,
    columns: &'static [ColumnSpec],
}

/// 一行按列结构取出的命名单元格
#[derive(Debug, Clone)]
pub struct NamedRow<'r> {
    pub row_number: usize,
    pub cells: Vec<(ColumnSpec, &'r RawCell)>,
}

impl<'r> NamedRow<'r> {
    pub fn get(&self, field: Field) -> Option<&'r RawCell> {
        self.cells
            .iter()
            .find(|(spec, _)| spec.field == field)
            .map(|(_, cell)| *cell)
    }
}

impl RecordSchema {
    /// 构造并校验列结构（位置严格递增, 均小于列宽, 必含 Type / WO）
    pub fn new(width: usize, columns: &'static [ColumnSpec]) -> IngestResult<Self> {
        let mut last: Option<usize> = None;
        for spec in columns {
            if spec.position >= width {
                return Err(IngestError::Config(format!(
                    "列 {} 的位置 {} 超出列宽 {}",
                    spec.field, spec.position, width
                )));
            }
            if let Some(prev) = last {
                if spec.position <= prev {
                    return Err(IngestError::Config(format!(
                        "列位置必须严格递增: {} 位于 {} 之后",
                        spec.position, prev
                    )));
                }
            }
            last = Some(spec.position);
        }

        for required in [Field::Type, Field::Wo] {
            if !columns.iter().any(|c| c.field == required) {
                return Err(IngestError::Config(format!("列结构缺少必需字段 {}", required)));
            }
        }

        Ok(Self { width, columns })
    }

    /// pcb012 报表的列结构
    pub fn pcb012() -> Self {
        Self {
            width: SCHEMA_WIDTH,
            columns: PCB012_COLUMNS,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn columns(&self) -> &'static [ColumnSpec] {
        self.columns
    }

    pub fn position_of(&self, field: Field) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.position)
    }

    pub fn fields_of_kind(&self, kind: FieldKind) -> impl Iterator<Item = Field> + '_ {
        self.columns
            .iter()
            .filter(move |c| c.kind() == kind)
            .map(|c| c.field)
    }

    /// 应用列结构: 行宽不足 → SchemaMismatch; 无名列直接丢弃
    pub fn apply<'r>(&self, row: &'r RawRow) -> IngestResult<NamedRow<'r>> {
        if row.len() < self.width {
            return Err(IngestError::SchemaMismatch {
                row: row.row_number,
                expected: self.width,
                actual: row.len(),
            });
        }

        let cells = self
            .columns
            .iter()
            .map(|spec| (*spec, row.cell(spec.position)))
            .collect();

        Ok(NamedRow {
            row_number: row.row_number,
            cells,
        })
    }
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self::pcb012()
    }
}
