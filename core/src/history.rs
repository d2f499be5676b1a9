//! Supplier award history, keyed on the True ID.
//!
//! ORDERING (fixed):
//!   - awards with a dateSigned, oldest first
//!   - then undated awards
//!   - ties broken by source row
//!
//! A contract's cumulative count is its 1-based position in its
//! supplier's ordered history. The ledger is immutable once built.

use crate::{
    error::{PipelineError, PipelineResult},
    record::AwardRecord,
    types::{ContractId, SupplierId},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierHistory {
    pub supplier_id:  SupplierId,
    /// Contract ids in history order.
    pub contracts:    Vec<ContractId>,
    pub first_signed: Option<DateTime<Utc>>,
    pub last_signed:  Option<DateTime<Utc>>,
}

impl SupplierHistory {
    pub fn award_count(&self) -> u32 {
        self.contracts.len() as u32
    }
}

#[derive(Debug, Clone, Default)]
pub struct SupplierLedger {
    suppliers:  BTreeMap<SupplierId, SupplierHistory>,
    cumulative: HashMap<ContractId, u32>,
}

impl SupplierLedger {
    /// Scan every award once. Fails on duplicate contract identifiers,
    /// since a contract may occupy only one position in history.
    pub fn build(records: &[AwardRecord]) -> PipelineResult<Self> {
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(records.len());
        for (i, r) in records.iter().enumerate() {
            if let Some(first) = seen.insert(r.contract_id.as_str(), i) {
                return Err(PipelineError::DataQuality(format!(
                    "duplicate contract identifier '{}' (records {first} and {i})",
                    r.contract_id
                )));
            }
        }

        let mut grouped: BTreeMap<&str, Vec<&AwardRecord>> = BTreeMap::new();
        for r in records {
            if let Some(sid) = r.supplier_id.as_deref() {
                grouped.entry(sid).or_default().push(r);
            }
        }

        let mut ledger = SupplierLedger::default();
        for (sid, mut awards) in grouped {
            awards.sort_by_key(|r| (r.date_signed.is_none(), r.date_signed, r.source_row));

            for (pos, r) in awards.iter().enumerate() {
                ledger.cumulative.insert(r.contract_id.clone(), pos as u32 + 1);
            }

            let signed = awards.iter().filter_map(|r| r.date_signed);
            let history = SupplierHistory {
                supplier_id:  sid.to_string(),
                first_signed: signed.clone().min(),
                last_signed:  signed.max(),
                contracts:    awards.iter().map(|r| r.contract_id.clone()).collect(),
            };
            ledger.suppliers.insert(sid.to_string(), history);
        }

        log::debug!(
            "Supplier ledger: {} suppliers over {} linked awards",
            ledger.suppliers.len(),
            ledger.cumulative.len()
        );
        Ok(ledger)
    }

    /// Awards to this contract's supplier up to and including it.
    /// None when the contract has no supplier_id.
    pub fn cumulative_count(&self, contract_id: &str) -> Option<u32> {
        self.cumulative.get(contract_id).copied()
    }

    /// Awards to the supplier over the whole run.
    pub fn total_awards(&self, supplier_id: &str) -> u32 {
        self.suppliers
            .get(supplier_id)
            .map(SupplierHistory::award_count)
            .unwrap_or(0)
    }

    pub fn history(&self, supplier_id: &str) -> Option<&SupplierHistory> {
        self.suppliers.get(supplier_id)
    }

    pub fn supplier_count(&self) -> usize {
        self.suppliers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ProcurementMethod;
    use chrono::TimeZone;

    fn award(id: &str, supplier: &str, day: Option<u32>, row: usize) -> AwardRecord {
        let signed = day.map(|d| Utc.with_ymd_and_hms(2022, 1, d, 0, 0, 0).unwrap());
        AwardRecord::new(id, Some(supplier), ProcurementMethod::Open)
            .with_dates(signed, None)
            .at_row(row)
    }

    #[test]
    fn history_orders_by_signing_date_then_row() {
        let records = vec![
            award("c", "S", Some(20), 0),
            award("undated", "S", None, 1),
            award("a", "S", Some(5), 2),
            award("b1", "S", Some(10), 3),
            award("b2", "S", Some(10), 4),
        ];
        let ledger = SupplierLedger::build(&records).unwrap();
        let h = ledger.history("S").unwrap();
        assert_eq!(h.contracts, vec!["a", "b1", "b2", "c", "undated"]);
        assert_eq!(ledger.cumulative_count("a"), Some(1));
        assert_eq!(ledger.cumulative_count("b2"), Some(3));
        assert_eq!(ledger.cumulative_count("undated"), Some(5));
        assert_eq!(h.first_signed.unwrap().format("%d").to_string(), "05");
        assert_eq!(h.last_signed.unwrap().format("%d").to_string(), "20");
    }

    #[test]
    fn duplicate_contract_is_rejected() {
        let records = vec![award("x", "S", Some(1), 0), award("x", "T", Some(2), 1)];
        let err = SupplierLedger::build(&records).unwrap_err();
        assert!(matches!(err, PipelineError::DataQuality(_)));
    }

    #[test]
    fn supplierless_awards_stay_out_of_history() {
        let records = vec![
            AwardRecord::new("orphan", None, ProcurementMethod::Direct),
            award("k", "S", Some(3), 1),
        ];
        let ledger = SupplierLedger::build(&records).unwrap();
        assert_eq!(ledger.cumulative_count("orphan"), None);
        assert_eq!(ledger.total_awards("S"), 1);
        assert_eq!(ledger.supplier_count(), 1);
    }
}
