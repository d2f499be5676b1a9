//! Linked procurement records — one award per contract, after the
//! OCDS tables have been joined.

use crate::types::{ContractId, SourceRow, SupplierId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// OCDS `tender/procurementMethod` code list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcurementMethod {
    Open,
    Selective,
    Limited,
    Direct,
    /// A code outside the OCDS list, kept verbatim.
    Other(String),
    /// Empty cell, or no matching `main` row.
    Unspecified,
}

impl ProcurementMethod {
    /// Case-insensitive, whitespace-trimmed.
    pub fn parse(raw: &str) -> Self {
        let code = raw.trim();
        match code.to_ascii_lowercase().as_str() {
            ""          => ProcurementMethod::Unspecified,
            "open"      => ProcurementMethod::Open,
            "selective" => ProcurementMethod::Selective,
            "limited"   => ProcurementMethod::Limited,
            "direct"    => ProcurementMethod::Direct,
            _           => ProcurementMethod::Other(code.to_string()),
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, ProcurementMethod::Direct)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProcurementMethod::Open        => "Open",
            ProcurementMethod::Selective   => "Selective",
            ProcurementMethod::Limited     => "Limited",
            ProcurementMethod::Direct      => "Direct",
            ProcurementMethod::Other(code) => code,
            ProcurementMethod::Unspecified => "",
        }
    }
}

impl fmt::Display for ProcurementMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One awarded contract with everything the feature engine needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardRecord {
    pub contract_id:        ContractId,
    pub supplier_id:        Option<SupplierId>,
    /// Supplier name as written on the award, before address-book resolution.
    pub supplier_name:      Option<String>,
    pub date_signed:        Option<DateTime<Utc>>,
    pub period_start_date:  Option<DateTime<Utc>>,
    pub procurement_method: ProcurementMethod,
    pub amount:             f64,
    pub source_row:         SourceRow,
}

impl AwardRecord {
    /// Minimal record, mostly for tests and for callers that build
    /// records without going through CSV ingestion.
    pub fn new(
        contract_id: impl Into<ContractId>,
        supplier_id: Option<&str>,
        procurement_method: ProcurementMethod,
    ) -> Self {
        Self {
            contract_id: contract_id.into(),
            supplier_id: supplier_id.map(str::to_string),
            supplier_name: None,
            date_signed: None,
            period_start_date: None,
            procurement_method,
            amount: 0.0,
            source_row: 0,
        }
    }

    pub fn with_dates(
        mut self,
        date_signed: Option<DateTime<Utc>>,
        period_start_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.date_signed = date_signed;
        self.period_start_date = period_start_date;
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn at_row(mut self, row: SourceRow) -> Self {
        self.source_row = row;
        self
    }
}

/// Address-book entry from `parties.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub supplier_id:   SupplierId,
    pub official_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parsing_ignores_case_and_padding() {
        assert_eq!(ProcurementMethod::parse(" DIRECT "), ProcurementMethod::Direct);
        assert_eq!(ProcurementMethod::parse("open"), ProcurementMethod::Open);
        assert_eq!(ProcurementMethod::parse(""), ProcurementMethod::Unspecified);
        assert_eq!(
            ProcurementMethod::parse("framework"),
            ProcurementMethod::Other("framework".into())
        );
        assert!(ProcurementMethod::parse("Direct").is_direct());
        assert!(!ProcurementMethod::parse("Limited").is_direct());
    }
}
