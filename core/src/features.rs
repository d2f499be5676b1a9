//! Red flag feature engine — one RiskFeatureRow per awarded contract.
//!
//! FLAGS:
//!   suspicious_timing        period_startDate < dateSigned, both present
//!   new_supplier_direct_deal cumulative supplier awards <= N and method Direct
//!   is_direct_procurement    method Direct
//!   is_round_amount          amount > floor and amount % unit == 0
//!
//! Missing or unparseable dates never flag; equal timestamps never flag.

use crate::{
    config::FlagConfig,
    error::PipelineResult,
    history::SupplierLedger,
    quality::{IssueKind, QualityIssue, QualityReport},
    record::{AwardRecord, ProcurementMethod},
    types::{ContractId, SupplierId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFeatureRow {
    pub contract_id:              ContractId,
    pub supplier_id:              Option<SupplierId>,
    pub supplier_name:            Option<String>,
    pub procurement_method:       ProcurementMethod,
    pub date_signed:              Option<DateTime<Utc>>,
    pub amount:                   f64,
    pub is_direct_procurement:    bool,
    pub is_round_amount:          bool,
    pub suspicious_timing:        bool,
    /// Awards to this supplier up to and including this contract.
    pub supplier_award_count:     u32,
    /// Awards to this supplier over the whole run.
    pub supplier_total_awards:    u32,
    pub new_supplier_direct_deal: bool,
}

#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub rows:   Vec<RiskFeatureRow>,
    pub ledger: SupplierLedger,
    pub report: QualityReport,
}

/// Derive the feature rows, in input order. Fails only on duplicate
/// contract identifiers; every other data problem is reported.
pub fn compute_features(records: &[AwardRecord], flags: &FlagConfig) -> PipelineResult<FeatureSet> {
    let ledger = SupplierLedger::build(records)?;
    let mut report = QualityReport::new();

    let rows: Vec<RiskFeatureRow> = records
        .iter()
        .map(|r| {
            // A supplier without a True ID has no history: count it as new.
            let (award_count, total_awards) = match r.supplier_id.as_deref() {
                Some(sid) => (
                    ledger.cumulative_count(&r.contract_id).unwrap_or(1),
                    ledger.total_awards(sid),
                ),
                None => {
                    report.record(QualityIssue {
                        kind:        IssueKind::MissingSupplierId,
                        table:       "awards_suppliers.csv".into(),
                        contract_id: Some(r.contract_id.clone()),
                        supplier_id: None,
                        detail:      "award has no supplier id; treated as a first award".into(),
                    });
                    (1, 1)
                }
            };
            let is_direct = r.procurement_method.is_direct();

            RiskFeatureRow {
                contract_id:              r.contract_id.clone(),
                supplier_id:              r.supplier_id.clone(),
                supplier_name:            r.supplier_name.clone(),
                procurement_method:       r.procurement_method.clone(),
                date_signed:              r.date_signed,
                amount:                   r.amount,
                is_direct_procurement:    is_direct,
                is_round_amount:          is_round_amount(r.amount, flags),
                suspicious_timing:        suspicious_timing(r.period_start_date, r.date_signed),
                supplier_award_count:     award_count,
                supplier_total_awards:    total_awards,
                new_supplier_direct_deal: new_supplier_direct_deal(
                    award_count,
                    &r.procurement_method,
                    flags.new_supplier_max_awards,
                ),
            }
        })
        .collect();

    log::info!(
        "Features: {} rows, {} suspicious timing, {} new-supplier direct deals",
        rows.len(),
        rows.iter().filter(|r| r.suspicious_timing).count(),
        rows.iter().filter(|r| r.new_supplier_direct_deal).count(),
    );
    Ok(FeatureSet { rows, ledger, report })
}

/// Work scheduled to start before the contract was signed.
pub fn suspicious_timing(
    period_start: Option<DateTime<Utc>>,
    date_signed: Option<DateTime<Utc>>,
) -> bool {
    match (period_start, date_signed) {
        (Some(start), Some(signed)) => start < signed,
        _ => false,
    }
}

pub fn new_supplier_direct_deal(
    cumulative_awards: u32,
    method: &ProcurementMethod,
    new_supplier_max_awards: u32,
) -> bool {
    cumulative_awards <= new_supplier_max_awards && method.is_direct()
}

pub fn is_round_amount(amount: f64, flags: &FlagConfig) -> bool {
    amount > flags.round_amount_floor && amount % flags.round_amount_unit == 0.0
}
