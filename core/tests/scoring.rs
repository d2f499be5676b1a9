//! Explainable scoring: weights, threshold and explanations.

use niruguard_core::{
    config::ScoringConfig,
    features::RiskFeatureRow,
    record::ProcurementMethod,
    scoring::{RedFlag, RiskLabel, RiskScorer},
};

fn row(direct: bool, round: bool, timing: bool, new_direct: bool) -> RiskFeatureRow {
    RiskFeatureRow {
        contract_id:              "c-1".into(),
        supplier_id:              Some("S1".into()),
        supplier_name:            None,
        procurement_method:       if direct { ProcurementMethod::Direct } else { ProcurementMethod::Open },
        date_signed:              None,
        amount:                   5_000_000.0,
        is_direct_procurement:    direct,
        is_round_amount:          round,
        suspicious_timing:        timing,
        supplier_award_count:     1,
        supplier_total_awards:    1,
        new_supplier_direct_deal: new_direct,
    }
}

#[test]
fn clean_contract_scores_zero() {
    let a = RiskScorer::new(ScoringConfig::default()).assess(&row(false, false, false, false));
    assert_eq!(a.score, 0.0);
    assert_eq!(a.label, RiskLabel::Low);
    assert!(a.contributions.is_empty());
}

#[test]
fn direct_alone_is_low_risk() {
    let a = RiskScorer::new(ScoringConfig::default()).assess(&row(true, false, false, false));
    assert_eq!(a.score, 1.5);
    assert_eq!(a.label, RiskLabel::Low);
}

/// Threshold is inclusive: timing alone scores exactly 2.0.
#[test]
fn threshold_is_inclusive() {
    let a = RiskScorer::new(ScoringConfig::default()).assess(&row(false, false, true, false));
    assert_eq!(a.score, 2.0);
    assert_eq!(a.label, RiskLabel::High);
}

#[test]
fn contributions_explain_the_score() {
    let a = RiskScorer::new(ScoringConfig::default()).assess(&row(true, true, true, true));
    let flags: Vec<RedFlag> = a.contributions.iter().map(|c| c.flag).collect();
    assert_eq!(
        flags,
        vec![
            RedFlag::DirectProcurement,
            RedFlag::RoundAmount,
            RedFlag::SuspiciousTiming,
            RedFlag::NewSupplierDirectDeal,
        ]
    );
    let sum: f64 = a.contributions.iter().map(|c| c.weight).sum();
    assert_eq!(sum, a.score);
    assert_eq!(a.score, 7.0);
    assert!(a.label.is_high());
}

#[test]
fn custom_weights_and_threshold() {
    let config = ScoringConfig {
        high_risk_threshold: 4.0,
        ..ScoringConfig::default()
    };
    let scorer = RiskScorer::new(config);
    assert_eq!(scorer.assess(&row(true, false, false, true)).label, RiskLabel::High);
    assert_eq!(scorer.assess(&row(false, true, true, false)).label, RiskLabel::Low);
}
