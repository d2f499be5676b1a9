//! Supplier dossiers — per-supplier aggregates joined with the
//! parties address book.
//!
//! The address-book join is a left join on supplier_id: a supplier with
//! no party entry keeps the name written on its awards and raises an
//! UnresolvedSupplier issue. Duplicate party ids resolve to the first and
//! raise a DuplicateLink issue.

use crate::{
    error::{PipelineError, PipelineResult},
    features::RiskFeatureRow,
    history::SupplierLedger,
    quality::{IssueKind, QualityIssue, QualityReport},
    record::Party,
    scoring::RiskAssessment,
    types::SupplierId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    AddressBook,
    Award,
    Unknown,
}

impl NameSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameSource::AddressBook => "address_book",
            NameSource::Award       => "award",
            NameSource::Unknown     => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierDossier {
    pub supplier_id:                    SupplierId,
    pub official_name:                  Option<String>,
    pub name_source:                    NameSource,
    pub total_contracts:                u32,
    pub total_value:                    f64,
    pub high_risk_count:                u32,
    pub high_risk_value:                f64,
    pub direct_count:                   u32,
    pub non_direct_count:               u32,
    pub suspicious_timing_count:        u32,
    pub new_supplier_direct_deal_count: u32,
    pub first_signed:                   Option<DateTime<Utc>>,
    pub last_signed:                    Option<DateTime<Utc>>,
}

impl SupplierDossier {
    fn empty(supplier_id: &str) -> Self {
        Self {
            supplier_id:                    supplier_id.to_string(),
            official_name:                  None,
            name_source:                    NameSource::Unknown,
            total_contracts:                0,
            total_value:                    0.0,
            high_risk_count:                0,
            high_risk_value:                0.0,
            direct_count:                   0,
            non_direct_count:               0,
            suspicious_timing_count:        0,
            new_supplier_direct_deal_count: 0,
            first_signed:                   None,
            last_signed:                    None,
        }
    }

    /// "Name (ID: 123)" as the supplier picker shows it.
    pub fn display_name(&self) -> String {
        match &self.official_name {
            Some(name) => format!("{name} (ID: {})", self.supplier_id),
            None => format!("(ID: {})", self.supplier_id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DossierSet {
    /// Ordered by supplier_id.
    pub dossiers: Vec<SupplierDossier>,
    pub report:   QualityReport,
}

pub fn build_dossiers(
    rows: &[RiskFeatureRow],
    assessments: &[RiskAssessment],
    ledger: &SupplierLedger,
    parties: &[Party],
) -> PipelineResult<DossierSet> {
    if rows.len() != assessments.len() {
        return Err(PipelineError::Other(anyhow::anyhow!(
            "{} feature rows but {} assessments",
            rows.len(),
            assessments.len()
        )));
    }

    let mut report = QualityReport::new();
    let mut address_book: HashMap<&str, &str> = HashMap::with_capacity(parties.len());
    for (i, p) in parties.iter().enumerate() {
        if address_book.contains_key(p.supplier_id.as_str()) {
            report.record(QualityIssue {
                kind:        IssueKind::DuplicateLink,
                table:       "parties.csv".into(),
                contract_id: None,
                supplier_id: Some(p.supplier_id.clone()),
                detail:      format!("row {i} repeats supplier_id; first entry kept"),
            });
            continue;
        }
        address_book.insert(p.supplier_id.as_str(), p.official_name.as_str());
    }

    let mut by_supplier: BTreeMap<&str, SupplierDossier> = BTreeMap::new();
    for (row, assessment) in rows.iter().zip(assessments) {
        let Some(sid) = row.supplier_id.as_deref() else {
            continue;
        };
        let d = by_supplier
            .entry(sid)
            .or_insert_with(|| SupplierDossier::empty(sid));

        d.total_contracts += 1;
        d.total_value += row.amount;
        if assessment.label.is_high() {
            d.high_risk_count += 1;
            d.high_risk_value += row.amount;
        }
        if row.is_direct_procurement {
            d.direct_count += 1;
        } else {
            d.non_direct_count += 1;
        }
        d.suspicious_timing_count += row.suspicious_timing as u32;
        d.new_supplier_direct_deal_count += row.new_supplier_direct_deal as u32;

        if d.official_name.is_none() {
            if let Some(name) = row.supplier_name.as_deref().filter(|n| !n.is_empty()) {
                d.official_name = Some(name.to_string());
                d.name_source = NameSource::Award;
            }
        }
    }

    for (sid, d) in by_supplier.iter_mut() {
        match address_book.get(sid).filter(|n| !n.is_empty()) {
            Some(official) => {
                d.official_name = Some(official.to_string());
                d.name_source = NameSource::AddressBook;
            }
            None => report.record(QualityIssue {
                kind:        IssueKind::UnresolvedSupplier,
                table:       "parties.csv".into(),
                contract_id: None,
                supplier_id: Some(sid.to_string()),
                detail:      match &d.official_name {
                    Some(name) => format!("not in address book; using award name '{name}'"),
                    None => "not in address book and no award name".into(),
                },
            }),
        }
        if let Some(h) = ledger.history(sid) {
            d.first_signed = h.first_signed;
            d.last_signed = h.last_signed;
        }
    }

    log::info!(
        "Dossiers: {} suppliers, {} unresolved in address book",
        by_supplier.len(),
        report.count(IssueKind::UnresolvedSupplier)
    );
    Ok(DossierSet {
        dossiers: by_supplier.into_values().collect(),
        report,
    })
}
