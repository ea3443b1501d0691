// ==========================================
// 项目台账监控 - 命令行入口
// ==========================================
// 用法: pcb-monitor [CONFIG] [--json] [--log-json]
//   CONFIG 缺省时依次使用 $PCB_MONITOR_CONFIG、用户配置目录, 都不存在则用默认配置
//   --json      以 JSON 输出统计结果
//   --log-json  日志以 JSON 格式写 stderr
// ==========================================

use anyhow::{Context, Result};
use clap::Parser;
use pcb_monitor::config::{default_config_path, MonitorConfig};
use pcb_monitor::{logging, report, PortfolioLoader};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pcb-monitor")]
#[command(about = "项目台账监控: 导入 pcb012 报表, 重建 MP/PR/WO 层级并输出汇总统计")]
#[command(version)]
struct Cli {
    /// 配置文件 (JSON)
    config: Option<PathBuf>,

    /// 以 JSON 输出统计结果
    #[arg(long)]
    json: bool,

    /// 日志以 JSON 格式输出
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<MonitorConfig> {
        match &self.config {
            Some(path) => MonitorConfig::load(path)
                .with_context(|| format!("无法加载配置文件 {}", path.display())),
            None => match default_config_path() {
                Some(path) => MonitorConfig::load_or_default(&path)
                    .with_context(|| format!("无法加载配置文件 {}", path.display())),
                None => Ok(MonitorConfig::default()),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("{} v{}", pcb_monitor::APP_NAME, pcb_monitor::VERSION);

    let config = cli.resolve_config()?;
    let loader = PortfolioLoader::new(config);
    let snapshot = loader.load().await;

    if cli.json {
        let output = json!({
            "run_id": snapshot.run_id,
            "loaded_at": snapshot.loaded_at,
            "entities": snapshot.entity_statistics,
            "unified": snapshot.unified_statistics,
            "forest": {
                "roots": snapshot.forest.roots.len(),
                "nodes": snapshot.forest.node_count(),
                "unclassified": snapshot.forest.unclassified,
                "anomalies": snapshot.forest.anomalies,
            },
            "failures": snapshot.failures,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", report::render_portfolio(&snapshot));
    }

    Ok(())
}
