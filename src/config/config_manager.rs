// ==========================================
// 项目台账监控 - 配置管理
// ==========================================
// 职责: 配置加载、默认值、校验、实体文件路径解析
// 存储: JSON 文件 (serde_json)
// 默认位置: $PCB_MONITOR_CONFIG 或 <config_dir>/pcb-monitor/config.json
// ==========================================

use crate::domain::types::RecordType;
use crate::engine::hierarchy_builder::MatchStrategyKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// 覆盖默认配置路径的环境变量
pub const CONFIG_ENV_VAR: &str = "PCB_MONITOR_CONFIG";

pub mod config_keys {
    pub const DEFAULT_BASE_NAME: &str = "pcb012a_2450";
    pub const DEFAULT_EXTENSION: &str = "xlsb";
    pub const DEFAULT_SHEET: &str = "Report";
    pub const DEFAULT_SKIP_ROWS: usize = 17;
    /// 报告币种汇率（EUR, 以 VND 为基准）
    pub const DEFAULT_REPORTING_RATE: f64 = 26600.0;
    pub const DEFAULT_ENTITY_RATES: [(&str, f64); 6] = [
        ("VN", 1.0),
        ("NL", 26600.0),
        ("UK", 32000.0),
        ("SG", 18750.0),
        ("PH", 440.0),
        ("ML", 5700.0),
    ];
}

// ==========================================
// ConfigError
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("汇率无效 ({entity}): {rate}")]
    InvalidRate { entity: String, rate: f64 },

    #[error("配置无效: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// EntityConfig - 单个实体
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    /// 实体币种汇率; 0 表示不导入该实体
    pub rate: f64,
    /// 覆盖默认文件名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl EntityConfig {
    pub fn new(name: impl Into<String>, rate: f64) -> Self {
        Self {
            name: name.into(),
            rate,
            file: None,
        }
    }

    pub fn is_selected(&self) -> bool {
        self.rate != 0.0
    }
}

// ==========================================
// MonitorConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub source_dir: PathBuf,
    pub base_name: String,
    pub extension: String,
    pub sheet_name: String,
    pub skip_rows: usize,
    pub reporting_rate: f64,
    pub entities: Vec<EntityConfig>,
    pub parent_match: MatchStrategyKind,
    /// 金额合计使用的记录类型
    pub type_filter: RecordType,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            base_name: config_keys::DEFAULT_BASE_NAME.to_string(),
            extension: config_keys::DEFAULT_EXTENSION.to_string(),
            sheet_name: config_keys::DEFAULT_SHEET.to_string(),
            skip_rows: config_keys::DEFAULT_SKIP_ROWS,
            reporting_rate: config_keys::DEFAULT_REPORTING_RATE,
            entities: config_keys::DEFAULT_ENTITY_RATES
                .iter()
                .map(|(name, rate)| EntityConfig::new(*name, *rate))
                .collect(),
            parent_match: MatchStrategyKind::default(),
            type_filter: RecordType::MasterProject,
        }
    }
}

impl MonitorConfig {
    /// 从 JSON 文件加载并校验
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            entities = config.selected_entities().count(),
            "配置加载完成"
        );
        Ok(config)
    }

    pub fn from_json(raw: &str) -> ConfigResult<Self> {
        let config: MonitorConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 加载配置文件; 文件不存在时使用默认值
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "配置文件不存在, 使用默认配置");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.reporting_rate.is_finite() || self.reporting_rate <= 0.0 {
            return Err(ConfigError::InvalidRate {
                entity: "reporting".to_string(),
                rate: self.reporting_rate,
            });
        }

        // 实体名称区分大小写, 不允许重复
        let mut names = HashSet::new();
        for entity in &self.entities {
            if entity.name.trim().is_empty() {
                return Err(ConfigError::Invalid("实体名称不能为空".to_string()));
            }
            if !names.insert(entity.name.as_str()) {
                return Err(ConfigError::Invalid(format!("实体名称重复: {}", entity.name)));
            }
            if !entity.rate.is_finite() || entity.rate < 0.0 {
                return Err(ConfigError::InvalidRate {
                    entity: entity.name.clone(),
                    rate: entity.rate,
                });
            }
        }

        if self.sheet_name.trim().is_empty() {
            return Err(ConfigError::Invalid("工作表名不能为空".to_string()));
        }
        Ok(())
    }

    /// 参与导入的实体（保持配置顺序）
    pub fn selected_entities(&self) -> impl Iterator<Item = &EntityConfig> {
        self.entities.iter().filter(|e| e.is_selected())
    }

    /// 实体源文件路径: source_dir/{base_name}_{ENTITY}.{extension}
    pub fn source_path(&self, entity: &EntityConfig) -> PathBuf {
        match &entity.file {
            Some(file) if file.is_absolute() => file.clone(),
            Some(file) => self.source_dir.join(file),
            None => self.source_dir.join(format!(
                "{}_{}.{}",
                self.base_name, entity.name, self.extension
            )),
        }
    }

    /// 实体币种 → 报告币种
    pub fn effective_rate(&self, entity: &EntityConfig) -> f64 {
        entity.rate / self.reporting_rate
    }
}

/// 默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|dir| dir.join("pcb-monitor").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_entity_rates() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.entities.len(), 6);
        assert_eq!(config.reporting_rate, 26600.0);

        let vn = &config.entities[0];
        let nl = &config.entities[1];
        assert_eq!(config.effective_rate(vn), 1.0 / 26600.0);
        assert_eq!(config.effective_rate(nl), 1.0);
    }

    #[test]
    fn test_source_path() {
        let mut config = MonitorConfig {
            source_dir: PathBuf::from("/data"),
            ..Default::default()
        };
        assert_eq!(
            config.source_path(&config.entities[0]),
            PathBuf::from("/data/pcb012a_2450_VN.xlsb")
        );

        config.entities[1].file = Some(PathBuf::from("nl.csv"));
        assert_eq!(
            config.source_path(&config.entities[1]),
            PathBuf::from("/data/nl.csv")
        );
    }

    #[test]
    fn test_zero_rate_means_not_selected() {
        let config = MonitorConfig::from_json(
            r#"{"entities": [{"name": "VN", "rate": 1}, {"name": "UK", "rate": 0}]}"#,
        )
        .unwrap();
        let selected: Vec<_> = config.selected_entities().map(|e| e.name.as_str()).collect();
        assert_eq!(selected, vec!["VN"]);
        assert_eq!(config.sheet_name, "Report");
    }

    #[test]
    fn test_invalid_rates_rejected() {
        let err = MonitorConfig::from_json(r#"{"entities": [{"name": "VN", "rate": -1}]}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRate { .. }));

        let err = MonitorConfig::from_json(r#"{"reporting_rate": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRate { .. }));
    }

    #[test]
    fn test_duplicate_entity_names_rejected() {
        let err = MonitorConfig::from_json(
            r#"{"entities": [{"name": "VN", "rate": 1}, {"name": "VN", "rate": 2}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("VN")));

        // 未选中的实体同样参与重名检查
        let err = MonitorConfig::from_json(
            r#"{"entities": [{"name": "UK", "rate": 0}, {"name": "UK", "rate": 32000}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config = MonitorConfig::from_json(
            r#"{"entities": [{"name": "VN", "rate": 1}, {"name": "vn", "rate": 1}]}"#,
        )
        .unwrap();
        assert_eq!(config.selected_entities().count(), 2);
    }

    #[test]
    fn test_parse_strategy_and_type_filter() {
        let config = MonitorConfig::from_json(
            r#"{"parent_match": "PREFIX_PREFERRED", "type_filter": "PR"}"#,
        )
        .unwrap();
        assert_eq!(config.parent_match, MatchStrategyKind::PrefixPreferred);
        assert_eq!(config.type_filter, RecordType::Project);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"{{"source_dir": "/tmp/pcb", "skip_rows": 3}}"#).unwrap();

        let config = MonitorConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.skip_rows, 3);
        assert_eq!(config.source_dir, PathBuf::from("/tmp/pcb"));

        let missing = MonitorConfig::load_or_default("/no/such/pcb_monitor.json").unwrap();
        assert_eq!(missing, MonitorConfig::default());
        assert!(matches!(
            MonitorConfig::load("/no/such/pcb_monitor.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
