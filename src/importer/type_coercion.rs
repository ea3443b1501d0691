// ==========================================
// 项目台账监控 - 类型转换器实现
// ==========================================
// 职责: 金额(含汇率换算) / 比例 / 序列日 / 分类标签
// 规则: 金额、比例无法解析 → CoercionError（整表失败）
//       日期永不失败: 空值/0 → 哨兵日期 (1899-12-31)
// ==========================================

use crate::domain::record::{Field, RawCell};
use crate::importer::error::{IngestError, IngestResult};
use chrono::{Duration, NaiveDate};
use tracing::warn;

/// 序列日起点 (day 0)
pub fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// 空值/0 使用的序列日偏移
pub const SENTINEL_OFFSET: i64 = 1;

/// 哨兵日期 = 起点 + 1 天
pub fn sentinel_date() -> NaiveDate {
    serial_epoch() + Duration::days(SENTINEL_OFFSET)
}

/// 序列日 → 日历日期（纯函数）
pub fn serial_to_date(offset: i64) -> Option<NaiveDate> {
    serial_epoch().checked_add_signed(Duration::try_days(offset)?)
}

// ==========================================
// TypeCoercer
// ==========================================
pub struct TypeCoercer;

impl TypeCoercer {
    /// 金额: 解析数值后乘以汇率; 空值 → None
    pub fn to_currency(
        &self,
        cell: &RawCell,
        rate: f64,
        row: usize,
        field: Field,
    ) -> IngestResult<Option<f64>> {
        Ok(self.parse_number(cell, row, field)?.map(|v| v * rate))
    }

    /// 比例: 仅做数值转换, 不缩放
    pub fn to_percentage(
        &self,
        cell: &RawCell,
        row: usize,
        field: Field,
    ) -> IngestResult<Option<f64>> {
        self.parse_number(cell, row, field)
    }

    /// 日期: 序列日 → 日期; 空值/0/无法识别 → 哨兵日期
    pub fn to_date(&self, cell: &RawCell, row: usize, field: Field) -> NaiveDate {
        let offset = match cell {
            RawCell::Empty => None,
            RawCell::Number(n) => Some(*n),
            RawCell::Bool(_) => None,
            RawCell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else if let Ok(n) = clean_numeric_text(trimmed).parse::<f64>() {
                    Some(n)
                } else if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                    return date;
                } else {
                    warn!(row, field = %field, value = %trimmed, "日期无法识别, 使用哨兵日期");
                    None
                }
            }
        };

        match offset {
            Some(n) if n.is_finite() && n != 0.0 => {
                serial_to_date(n.floor() as i64).unwrap_or_else(|| {
                    warn!(row, field = %field, offset = n, "序列日超出范围, 使用哨兵日期");
                    sentinel_date()
                })
            }
            _ => sentinel_date(),
        }
    }

    /// 分类标签: TRIM 后原样保留（开放集合）
    pub fn to_category(&self, cell: &RawCell) -> Option<String> {
        cell.as_text()
    }

    fn parse_number(&self, cell: &RawCell, row: usize, field: Field) -> IngestResult<Option<f64>> {
        match cell {
            RawCell::Empty => Ok(None),
            RawCell::Number(n) if n.is_nan() => Ok(None),
            RawCell::Number(n) => Ok(Some(*n)),
            RawCell::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
            RawCell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                clean_numeric_text(trimmed)
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| IngestError::Coercion {
                        row,
                        field: field.name().to_string(),
                        value: trimmed.to_string(),
                    })
            }
        }
    }
}

/// 去除千分位与内部空白
fn clean_numeric_text(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect()
}
