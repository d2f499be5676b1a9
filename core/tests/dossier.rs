//! Supplier dossiers: aggregates and the address-book join.

mod common;

use common::{tables, Release};
use niruguard_core::{
    config::PipelineConfig,
    dossier::NameSource,
    engine::RiskEngine,
    error::PipelineError,
    quality::IssueKind,
};

fn releases() -> Vec<Release<'static>> {
    vec![
        Release::new("L1", "S1", "direct").amount("5000000").signed("2020-01-01").start("2019-12-01"),
        Release::new("L2", "S1", "open").amount("1200.50").signed("2020-02-01"),
        Release::new("L3", "S2", "open").amount("300").signed("2020-03-01").named("Beta Supplies"),
        Release::new("L4", "S1", "direct").amount("2000").signed("2020-04-01"),
    ]
}

#[test]
fn dossier_totals_equal_row_sums() {
    let engine = RiskEngine::build_test("dossier-sums".into()).unwrap();
    let out = engine
        .run_tables(&tables(&releases(), &[("S1", "Acme Ltd"), ("S2", "Beta Supplies Ltd")]))
        .unwrap();

    assert_eq!(out.dossiers.len(), 2);
    for d in &out.dossiers {
        let rows: Vec<_> = out
            .contracts
            .iter()
            .filter(|c| c.features.supplier_id.as_deref() == Some(d.supplier_id.as_str()))
            .collect();
        let value: f64 = rows.iter().map(|c| c.features.amount).sum();
        let high: Vec<_> = rows.iter().filter(|c| c.assessment.label.is_high()).collect();

        assert_eq!(d.total_contracts as usize, rows.len());
        assert!((d.total_value - value).abs() < 1e-6);
        assert_eq!(d.high_risk_count as usize, high.len());
        assert_eq!(d.direct_count + d.non_direct_count, d.total_contracts);
    }

    let s1 = &out.dossiers[0];
    assert_eq!(s1.supplier_id, "S1");
    assert_eq!(s1.official_name.as_deref(), Some("Acme Ltd"));
    assert_eq!(s1.name_source, NameSource::AddressBook);
    assert_eq!(s1.direct_count, 2);
    assert_eq!(s1.suspicious_timing_count, 1);
    // L1 and L4 are both direct deals within the first three awards.
    assert_eq!(s1.new_supplier_direct_deal_count, 2);
    assert_eq!(s1.first_signed.unwrap().format("%Y-%m-%d").to_string(), "2020-01-01");
    assert_eq!(s1.last_signed.unwrap().format("%Y-%m-%d").to_string(), "2020-04-01");
}

/// Duplicate address-book ids resolve to the first entry and never
/// multiply dossiers or contract rows.
#[test]
fn duplicate_party_ids_do_not_fan_out() {
    let engine = RiskEngine::build_test("dossier-dup-party".into()).unwrap();
    let out = engine
        .run_tables(&tables(
            &releases(),
            &[("S1", "Acme Ltd"), ("S1", "ACME LIMITED"), ("S2", "Beta")],
        ))
        .unwrap();

    assert_eq!(out.contracts.len(), 4);
    assert_eq!(out.dossiers.len(), 2);
    assert_eq!(out.dossiers[0].official_name.as_deref(), Some("Acme Ltd"));

    assert_eq!(out.report.count(IssueKind::DuplicateLink), 1);
    let dup = out
        .report
        .issues()
        .iter()
        .find(|i| i.kind == IssueKind::DuplicateLink)
        .unwrap();
    assert_eq!(dup.table, "parties.csv");
    assert_eq!(dup.supplier_id.as_deref(), Some("S1"));
}

#[test]
fn unresolved_supplier_falls_back_to_award_name() {
    let engine = RiskEngine::build_test("dossier-fallback".into()).unwrap();
    let out = engine
        .run_tables(&tables(&releases(), &[("S1", "Acme Ltd")]))
        .unwrap();

    let s2 = &out.dossiers[1];
    assert_eq!(s2.official_name.as_deref(), Some("Beta Supplies"));
    assert_eq!(s2.name_source, NameSource::Award);
    assert_eq!(out.report.count(IssueKind::UnresolvedSupplier), 1);
    assert_eq!(s2.display_name(), "Beta Supplies (ID: S2)");
}

#[test]
fn strict_join_rejects_unresolved_supplier() {
    let mut config = PipelineConfig::default_test();
    config.strict_join = true;
    let engine = RiskEngine::build_test_with("dossier-strict".into(), config).unwrap();

    let err = engine
        .run_tables(&tables(&releases(), &[("S1", "Acme Ltd")]))
        .unwrap_err();
    assert!(matches!(err, PipelineError::Join(ref m) if m.contains("S2")));
    assert_eq!(engine.store.risk_feature_count("dossier-strict").unwrap(), 0);
}

#[test]
fn supplierless_contracts_have_no_dossier() {
    let mut r = releases();
    r.push(Release::new("L5", "", "direct").amount("9000"));
    let engine = RiskEngine::build_test("dossier-no-id".into()).unwrap();
    let out = engine
        .run_tables(&tables(&r, &[("S1", "Acme Ltd"), ("S2", "Beta")]))
        .unwrap();

    assert_eq!(out.contracts.len(), 5);
    assert_eq!(out.dossiers.len(), 2);
    assert_eq!(out.report.count(IssueKind::MissingSupplierId), 1);
}

/// A failing dossier insert rolls back the contracts written before it.
#[test]
fn failed_persist_leaves_no_partial_run() {
    let source = RiskEngine::build_test("persist-source".into()).unwrap();
    let out = source
        .run_tables(&tables(&releases(), &[("S1", "Acme Ltd"), ("S2", "Beta")]))
        .unwrap();

    let target = RiskEngine::build_test("persist-rollback".into()).unwrap();
    let mut dossiers = out.dossiers.clone();
    dossiers.push(dossiers[0].clone());

    let err = target
        .store
        .persist_run("persist-rollback", &out.contracts, &dossiers, &out.report)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Database(_)));
    assert_eq!(target.store.risk_feature_count("persist-rollback").unwrap(), 0);
    assert_eq!(target.store.dossier_count("persist-rollback").unwrap(), 0);
}
