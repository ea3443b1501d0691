// ==========================================
// 项目台账监控 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 表级错误只影响当前实体, 其他实体继续导入
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum IngestError {
    // ===== 数据源错误 =====
    #[error("数据源不可用 ({path}): {reason}")]
    SourceUnavailable { path: String, reason: String },

    #[error("文件格式不支持: {0}（仅支持 .xlsb/.xlsx/.xls/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("工作表不存在: {0}")]
    SheetNotFound(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParse(String),

    #[error("CSV 解析失败: {0}")]
    CsvParse(String),

    // ===== 结构与类型错误 =====
    #[error("列结构不匹配 (行 {row}): 期望至少 {expected} 列, 实际 {actual} 列")]
    SchemaMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("类型转换失败 (行 {row}, 字段 {field}): 无法解析数值 {value:?}")]
    Coercion {
        row: usize,
        field: String,
        value: String,
    },

    // ===== 配置错误 =====
    #[error("配置错误: {0}")]
    Config(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IngestError {
    /// 是否为"数据源不可用"类错误（文件缺失/无法打开）
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self,
            IngestError::SourceUnavailable { .. } | IngestError::SheetNotFound(_)
        )
    }

    /// 简短分类名, 用于失败列表与日志字段
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::SourceUnavailable { .. } | IngestError::SheetNotFound(_) => {
                "SOURCE_UNAVAILABLE"
            }
            IngestError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            IngestError::ExcelParse(_) | IngestError::CsvParse(_) => "PARSE_ERROR",
            IngestError::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            IngestError::Coercion { .. } => "COERCION_ERROR",
            IngestError::Config(_) => "CONFIG_ERROR",
            IngestError::Internal(_) | IngestError::Other(_) => "INTERNAL",
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::SourceUnavailable {
            path: String::new(),
            reason: err.to_string(),
        }
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::CsvParse(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for IngestError {
    fn from(err: calamine::Error) -> Self {
        IngestError::ExcelParse(err.to_string())
    }
}

/// Result 类型别名
pub type IngestResult<T> = Result<T, IngestError>;
