// ==========================================
// 组合加载集成测试
// ==========================================
// 测试目标: 多实体并发导入 → 合并 → 层级 → 全局统计 / 失败隔离
// ==========================================


use pcb_monitor::engine::views;
use pcb_monitor::{logging, Field, HierarchyAnomaly, MatchStrategyKind, PortfolioLoader, Tier};
use test_helpers::*;

#[tokio::test]
async fn test_vn_nl_rates_convert_to_reporting_currency() {
    logging::init_test();
    let ws = Workspace::new(&[("VN", 1.0), ("NL", 26600.0)]).unwrap();
    ws.write("VN", &[mp("AAAAAA").set(Field::ContractBudget, 26600)])
        .unwrap();
    ws.write("NL", &[mp("BBBBBB").set(Field::ContractBudget, 1)])
        .unwrap();

    let snapshot = PortfolioLoader::new(ws.config.clone()).load().await;

    assert!(snapshot.is_complete());
    assert_eq!(snapshot.records.len(), 2);
    for record in &snapshot.records {
        assert!(approx_eq(record.amount_or_zero(Field::ContractBudget), 1.0));
    }
    assert!(approx_eq(snapshot.unified_statistics.contract_budget, 2.0));
    assert_eq!(snapshot.entity_statistics["VN"].mp_no(), 1);
    assert_eq!(snapshot.entity_statistics["NL"].mp_no(), 1);
}

#[tokio::test]
async fn test_missing_entity_does_not_block_others() {
    logging::init_test();
    let ws = Workspace::new(&[("VN", 1.0), ("UK", 32000.0), ("NL", 26600.0)]).unwrap();
    ws.write("VN", &[mp("AAAAAA")]).unwrap();
    ws.write("NL", &[mp("BBBBBB")]).unwrap();

    let snapshot = PortfolioLoader::new(ws.config.clone()).load().await;

    assert_eq!(snapshot.failures.len(), 1);
    let failure = &snapshot.failures[0];
    assert_eq!(failure.entity, "UK");
    assert_eq!(failure.kind, "SOURCE_UNAVAILABLE");
    assert!(failure.path.ends_with("pcb012a_2450_UK.csv"));

    let entities: Vec<_> = snapshot.records.iter().map(|r| r.entity.as_str()).collect();
    assert_eq!(entities, vec!["VN", "NL"]);
    assert_eq!(snapshot.unified_statistics.mp_no(), 2);
}

#[tokio::test]
async fn test_three_level_hierarchy_across_entities() {
    let ws = Workspace::new(&[("VN", 1.0), ("NL", 26600.0)]).unwrap();
    ws.write(
        "VN",
        &[
            mp("AAAAAA"),
            pr("AAAAAA0001"),
            wo("AAAAAA00"),
            wo("AAAAAA00010002"),
        ],
    )
    .unwrap();
    // 工单可以挂在另一个实体的项目下
    ws.write("NL", &[wo("AAAAAA00010001"), wo("ZZZZZZ00010001")])
        .unwrap();

    let snapshot = PortfolioLoader::new(ws.config.clone()).load().await;
    let forest = &snapshot.forest;

    let project = forest.find_path(&["AAAAAA", "AAAAAA0001"]).unwrap();
    let children: Vec<_> = project.children.keys().map(String::as_str).collect();
    assert_eq!(children, vec!["AAAAAA00010001", "AAAAAA00010002"]);
    assert_eq!(project.children["AAAAAA00010001"].record.entity, "NL");

    // 长度 8 的编号只在平表中
    assert!(snapshot.records.iter().any(|r| r.identifier == "AAAAAA00"));
    assert!(forest.find("AAAAAA00").is_none());
    assert_eq!(forest.unclassified, vec!["AAAAAA00".to_string()]);

    // 无父级的工单记录为异常
    assert!(forest.anomalies.iter().any(|a| matches!(
        a,
        HierarchyAnomaly::UnmatchedChild { identifier, tier: Tier::WorkOrder, .. }
            if identifier == "ZZZZZZ00010001"
    )));
    assert!(snapshot.records.len() >= forest.node_count());
}

#[tokio::test]
async fn test_every_child_contains_its_parent() {
    let ws = Workspace::new(&[("VN", 1.0)]).unwrap();
    ws.write(
        "VN",
        &[
            mp("AAAAAA"),
            mp("BBBBBB"),
            pr("BBBBBB0001"),
            pr("AAAAAA0002"),
            pr("XAAAAAA001"),
            wo("AAAAAA00020001"),
            wo("BBBBBB00010009"),
        ],
    )
    .unwrap();

    let snapshot = PortfolioLoader::new(ws.config.clone()).load().await;

    let mut checked = 0;
    for root in snapshot.forest.roots.values() {
        root.walk(&mut |node, parent| {
            if let Some(parent) = parent {
                assert!(node.identifier().contains(parent.identifier()));
                checked += 1;
            }
        });
    }
    assert_eq!(checked, 5);
}

#[tokio::test]
async fn test_prefix_preferred_strategy_from_config() {
    let mut ws = Workspace::new(&[("VN", 1.0)]).unwrap();
    ws.config.parent_match = MatchStrategyKind::PrefixPreferred;
    // "XYZXYZABCD" 包含 "YZABCD"（先出现）, 以 "XYZXYZ" 开头
    ws.write("VN", &[mp("YZABCD"), mp("XYZXYZ"), pr("XYZXYZABCD")])
        .unwrap();

    let snapshot = PortfolioLoader::new(ws.config.clone()).load().await;
    assert!(snapshot
        .forest
        .find_path(&["XYZXYZ", "XYZXYZABCD"])
        .is_some());

    ws.config.parent_match = MatchStrategyKind::FirstContained;
    let legacy = PortfolioLoader::new(ws.config.clone()).load().await;
    assert!(legacy.forest.find_path(&["YZABCD", "XYZXYZABCD"]).is_some());
}

#[tokio::test]
async fn test_views_over_loaded_records() {
    let ws = Workspace::new(&[("VN", 1.0), ("NL", 26600.0)]).unwrap();
    ws.write(
        "VN",
        &[mp("AAAAAA")
            .set(Field::ContractBudget, 266000)
            .set(Field::Contract2dInvoiced, 133000)],
    )
    .unwrap();
    ws.write(
        "NL",
        &[
            mp("BBBBBB").set(Field::ContractBudget, 40),
            pr("BBBBBB0001").set(Field::ContractBudget, 5),
        ],
    )
    .unwrap();

    let snapshot = PortfolioLoader::new(ws.config.clone()).load().await;
    let records = &snapshot.records;

    assert_eq!(views::records_of_entity(records, "NL").len(), 2);
    let top: Vec<_> = views::top_n_by(records, Field::ContractBudget, 2)
        .iter()
        .map(|r| r.identifier.as_str())
        .collect();
    assert_eq!(top, vec!["BBBBBB", "AAAAAA"]);

    let vn = views::records_of_entity(records, "VN")[0];
    let ratio = views::invoiced_ratio(vn).unwrap();
    assert!(approx_eq(ratio, 50.0));
}
