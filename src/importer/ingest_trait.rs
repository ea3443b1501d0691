// ==========================================
// 项目台账监控 - 导入接口定义
// ==========================================
// 职责: 定义数据源读取接口（不包含实现）
// 实现者: ExcelParser / CsvParser / UniversalFileParser
// ==========================================

use crate::domain::record::RawRow;
use crate::importer::error::IngestResult;
use std::path::Path;

// ==========================================
// TableSource Trait
// ==========================================
// 用途: 读取一个实体的源表, 输出按列位置排列的原始行
pub trait TableSource: Send + Sync {
    /// 读取工作表的数据行
    ///
    /// # 参数
    /// - path: 源文件路径
    /// - sheet_name: 工作表名（CSV 忽略）
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 表头行之后的所有行（含空白行, 保持行位置）, 单元格按绝对列位置排列
    /// - Err(SourceUnavailable): 文件不存在或无法打开
    fn read_table(&self, path: &Path, sheet_name: &str) -> IngestResult<Vec<RawRow>>;
}
