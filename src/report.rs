// ==========================================
// 项目台账监控 - 文本报表
// ==========================================
// 职责: 统计快照 → 控制台文本块（千分位, 右对齐 17 位）
// ==========================================

use crate::domain::hierarchy::HierarchyForest;
use crate::domain::statistics::StatisticsSnapshot;
use crate::engine::orchestrator::PortfolioSnapshot;
use std::fmt::Write;

const AMOUNT_WIDTH: usize = 17;

/// 四舍五入到整数并加千分位: 1234567.6 → "1,234,568"
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if negative && out != "0" {
        out.insert(0, '-');
    }
    out
}

/// 单个统计快照的文本块
pub fn render_statistics(title: &str, stats: &StatisticsSnapshot) -> String {
    let rows = [
        ("Contract budget", stats.contract_budget),
        ("Invoiced", stats.contract_2d_invoiced),
        ("To date", stats.contract_2d_total),
        ("Outstanding inv", stats.outstanding_inv),
        ("Workload firm", stats.workload_firm),
    ];

    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", title);
    let _ = writeln!(
        out,
        "MP: {}  PR: {}  WO: {}  PM: {}",
        stats.mp_no(),
        stats.pr_no(),
        stats.wo_no(),
        stats.pm_no()
    );
    for (label, value) in rows {
        let _ = writeln!(
            out,
            "{:<16}{:>width$}",
            label,
            format_thousands(value),
            width = AMOUNT_WIDTH
        );
    }
    out
}

pub fn render_forest(forest: &HierarchyForest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Hierarchy ==");
    let _ = writeln!(
        out,
        "roots: {}  nodes: {}  unclassified: {}  anomalies: {}",
        forest.roots.len(),
        forest.node_count(),
        forest.unclassified.len(),
        forest.anomalies.len()
    );
    for anomaly in &forest.anomalies {
        let _ = writeln!(out, "  {}", anomaly);
    }
    out
}

/// 完整控制台报表: 各实体 → 合计 → 层级 → 失败实体
pub fn render_portfolio(snapshot: &PortfolioSnapshot) -> String {
    let mut out = String::new();
    for (entity, stats) in &snapshot.entity_statistics {
        out.push_str(&render_statistics(entity, stats));
    }
    out.push_str(&render_statistics("TOTAL", &snapshot.unified_statistics));
    out.push_str(&render_forest(&snapshot.forest));

    if !snapshot.failures.is_empty() {
        let _ = writeln!(out, "== Failed entities ==");
        for failure in &snapshot.failures {
            let _ = writeln!(
                out,
                "  {} [{}] {}: {}",
                failure.entity, failure.kind, failure.path, failure.message
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1234567.6), "1,234,568");
        assert_eq!(format_thousands(-98765.0), "-98,765");
        assert_eq!(format_thousands(-0.2), "0");
    }

    #[test]
    fn test_render_statistics_block() {
        let stats = StatisticsSnapshot {
            mp_list: vec!["AAAAAA".to_string()],
            contract_budget: 1_500_000.0,
            ..Default::default()
        };
        let text = render_statistics("VN", &stats);
        assert!(text.starts_with("== VN =="));
        assert!(text.contains("MP: 1  PR: 0"));
        assert!(text.contains(&format!("{:<16}{:>17}", "Contract budget", "1,500,000")));
    }
}
