// ==========================================
// 项目台账监控 - 领域类型定义
// ==========================================
// 职责: 层级、记录类型、字段语义类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 层级 (Tier)
// ==========================================
// 由 identifier 字符长度决定, 构造记录时计算一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    MasterProject, // 6 位
    Project,       // 10 位
    WorkOrder,     // 14 位
    Unclassified,  // 其他长度
}

impl Tier {
    pub const MASTER_PROJECT_LEN: usize = 6;
    pub const PROJECT_LEN: usize = 10;
    pub const WORK_ORDER_LEN: usize = 14;

    /// 按 identifier 字符数分类
    pub fn classify(identifier: &str) -> Self {
        match identifier.chars().count() {
            Self::MASTER_PROJECT_LEN => Tier::MasterProject,
            Self::PROJECT_LEN => Tier::Project,
            Self::WORK_ORDER_LEN => Tier::WorkOrder,
            _ => Tier::Unclassified,
        }
    }

    /// 上一级层级（MasterProject / Unclassified 没有父级）
    pub fn parent(&self) -> Option<Tier> {
        match self {
            Tier::WorkOrder => Some(Tier::Project),
            Tier::Project => Some(Tier::MasterProject),
            Tier::MasterProject | Tier::Unclassified => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::MasterProject => write!(f, "MASTER_PROJECT"),
            Tier::Project => write!(f, "PROJECT"),
            Tier::WorkOrder => write!(f, "WORK_ORDER"),
            Tier::Unclassified => write!(f, "UNCLASSIFIED"),
        }
    }
}

// ==========================================
// 记录类型 (Record Type)
// ==========================================
// 来源: Type 列; 开放集合, 未知值原样保留
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RecordType {
    MasterProject, // MP
    Project,       // PR
    WorkOrder,     // WO
    Placeholder,   // MPZ 空白填充行
    Other(String),
}

impl RecordType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "MP" => RecordType::MasterProject,
            "PR" => RecordType::Project,
            "WO" => RecordType::WorkOrder,
            "MPZ" => RecordType::Placeholder,
            other => RecordType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordType::MasterProject => "MP",
            RecordType::Project => "PR",
            RecordType::WorkOrder => "WO",
            RecordType::Placeholder => "MPZ",
            RecordType::Other(s) => s.as_str(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, RecordType::Placeholder)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        RecordType::parse(&value)
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

// ==========================================
// 字段语义类型 (Field Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    Identifier, // WO
    RecordType, // Type
    Currency,   // 金额, 按汇率换算
    Percentage, // 比例, 不换算
    Date,       // 序列日
    Category,   // 分类标签
    Text,       // 自由文本
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Identifier => write!(f, "IDENTIFIER"),
            FieldKind::RecordType => write!(f, "RECORD_TYPE"),
            FieldKind::Currency => write!(f, "CURRENCY"),
            FieldKind::Percentage => write!(f, "PERCENTAGE"),
            FieldKind::Date => write!(f, "DATE"),
            FieldKind::Category => write!(f, "CATEGORY"),
            FieldKind::Text => write!(f, "TEXT"),
        }
    }
}
