//! Result tables handed to the dashboard: the risk feature table and
//! the supplier dossier table, written as CSV.

use crate::{
    dossier::SupplierDossier,
    error::PipelineResult,
    features::RiskFeatureRow,
    scoring::RiskAssessment,
    split::Partition,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// A feature row with its score and holdout partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredContract {
    pub features:   RiskFeatureRow,
    pub assessment: RiskAssessment,
    pub partition:  Partition,
}

// ── CSV row shapes ─────────────────────────────────────────────────
// Flat mirrors of the domain types; csv cannot write nested fields.
// The header is written explicitly so an empty table still has columns.
// Column lists must match the field order of the row structs.

const RISK_FEATURE_COLUMNS: [&str; 16] = [
    "contract_id",
    "supplier_id",
    "supplier_name",
    "procurement_method",
    "date_signed",
    "amount",
    "is_direct_procurement",
    "is_round_amount",
    "suspicious_timing",
    "supplier_award_count",
    "supplier_total_awards",
    "new_supplier_direct_deal",
    "risk_score",
    "risk_label",
    "red_flags",
    "partition",
];

const DOSSIER_COLUMNS: [&str; 13] = [
    "supplier_id",
    "official_name",
    "name_source",
    "total_contracts",
    "total_value",
    "high_risk_count",
    "high_risk_value",
    "direct_count",
    "non_direct_count",
    "suspicious_timing_count",
    "new_supplier_direct_deal_count",
    "first_signed",
    "last_signed",
];

#[derive(Serialize)]
struct RiskFeatureCsv<'a> {
    contract_id:              &'a str,
    supplier_id:              &'a str,
    supplier_name:            &'a str,
    procurement_method:       &'a str,
    date_signed:              String,
    amount:                   f64,
    is_direct_procurement:    u8,
    is_round_amount:          u8,
    suspicious_timing:        u8,
    supplier_award_count:     u32,
    supplier_total_awards:    u32,
    new_supplier_direct_deal: u8,
    risk_score:               f64,
    risk_label:               u8,
    red_flags:                String,
    partition:                &'static str,
}

#[derive(Serialize)]
struct DossierCsv<'a> {
    supplier_id:                    &'a str,
    official_name:                  &'a str,
    name_source:                    &'static str,
    total_contracts:                u32,
    total_value:                    f64,
    high_risk_count:                u32,
    high_risk_value:                f64,
    direct_count:                   u32,
    non_direct_count:               u32,
    suspicious_timing_count:        u32,
    new_supplier_direct_deal_count: u32,
    first_signed:                   String,
    last_signed:                    String,
}

fn date_cell(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339()).unwrap_or_default()
}

fn table_writer<W: Write>(writer: W, columns: &[&str]) -> PipelineResult<csv::Writer<W>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(columns)?;
    Ok(wtr)
}

pub fn write_risk_features<W: Write>(writer: W, contracts: &[ScoredContract]) -> PipelineResult<()> {
    let mut wtr = table_writer(writer, &RISK_FEATURE_COLUMNS)?;
    for c in contracts {
        let f = &c.features;
        let a = &c.assessment;
        wtr.serialize(RiskFeatureCsv {
            contract_id:              &f.contract_id,
            supplier_id:              f.supplier_id.as_deref().unwrap_or(""),
            supplier_name:            f.supplier_name.as_deref().unwrap_or(""),
            procurement_method:       f.procurement_method.as_str(),
            date_signed:              date_cell(f.date_signed),
            amount:                   f.amount,
            is_direct_procurement:    f.is_direct_procurement as u8,
            is_round_amount:          f.is_round_amount as u8,
            suspicious_timing:        f.suspicious_timing as u8,
            supplier_award_count:     f.supplier_award_count,
            supplier_total_awards:    f.supplier_total_awards,
            new_supplier_direct_deal: f.new_supplier_direct_deal as u8,
            risk_score:               a.score,
            risk_label:               a.label.is_high() as u8,
            red_flags:                a
                .contributions
                .iter()
                .map(|c| c.flag.label())
                .collect::<Vec<_>>()
                .join("; "),
            partition:                c.partition.as_str(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_dossiers<W: Write>(writer: W, dossiers: &[SupplierDossier]) -> PipelineResult<()> {
    let mut wtr = table_writer(writer, &DOSSIER_COLUMNS)?;
    for d in dossiers {
        wtr.serialize(DossierCsv {
            supplier_id:                    &d.supplier_id,
            official_name:                  d.official_name.as_deref().unwrap_or(""),
            name_source:                    d.name_source.as_str(),
            total_contracts:                d.total_contracts,
            total_value:                    d.total_value,
            high_risk_count:                d.high_risk_count,
            high_risk_value:                d.high_risk_value,
            direct_count:                   d.direct_count,
            non_direct_count:               d.non_direct_count,
            suspicious_timing_count:        d.suspicious_timing_count,
            new_supplier_direct_deal_count: d.new_supplier_direct_deal_count,
            first_signed:                   date_cell(d.first_signed),
            last_signed:                    date_cell(d.last_signed),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write both tables, creating the output directory if needed.
pub fn export_tables(
    risk_features_path: &Path,
    dossier_path: &Path,
    contracts: &[ScoredContract],
    dossiers: &[SupplierDossier],
) -> PipelineResult<()> {
    for path in [risk_features_path, dossier_path] {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
    }
    write_risk_features(std::fs::File::create(risk_features_path)?, contracts)?;
    write_dossiers(std::fs::File::create(dossier_path)?, dossiers)?;
    log::info!(
        "Exported {} and {}",
        risk_features_path.display(),
        dossier_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tables_still_carry_a_header() {
        let mut features = Vec::new();
        write_risk_features(&mut features, &[]).unwrap();
        let features = String::from_utf8(features).unwrap();
        assert_eq!(features, format!("{}\n", RISK_FEATURE_COLUMNS.join(",")));

        let mut dossiers = Vec::new();
        write_dossiers(&mut dossiers, &[]).unwrap();
        let dossiers = String::from_utf8(dossiers).unwrap();
        assert!(dossiers.starts_with("supplier_id,official_name,name_source,"));
        assert_eq!(dossiers.lines().count(), 1);
    }
}
