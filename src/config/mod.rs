// ==========================================
// 项目台账监控 - 配置层
// ==========================================
// 职责: 实体汇率、文件命名、层级匹配策略等运行配置
// 存储: JSON 文件
// ==========================================

pub mod config_manager;

// 重导出核心配置类型
pub use config_manager::{
    config_keys, default_config_path, ConfigError, ConfigResult, EntityConfig, MonitorConfig,
    CONFIG_ENV_VAR,
};
