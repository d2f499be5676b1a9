//! Shared fixtures: build OCDS tables in memory.

#![allow(dead_code)]

use niruguard_core::{
    ingest::{AwardRow, AwardSupplierRow, ContractRow, MainRow, OcdsTables},
    record::Party,
};

/// One awarded release, as spread across the four linked tables.
pub struct Release<'a> {
    pub link:     &'a str,
    pub method:   &'a str,
    pub amount:   &'a str,
    pub signed:   &'a str,
    pub start:    &'a str,
    pub supplier: &'a str,
    pub name:     &'a str,
}

impl<'a> Release<'a> {
    pub fn new(link: &'a str, supplier: &'a str, method: &'a str) -> Self {
        Self {
            link,
            method,
            amount: "250000.50",
            signed: "",
            start: "",
            supplier,
            name: "",
        }
    }

    pub fn signed(mut self, signed: &'a str) -> Self {
        self.signed = signed;
        self
    }

    pub fn start(mut self, start: &'a str) -> Self {
        self.start = start;
        self
    }

    pub fn amount(mut self, amount: &'a str) -> Self {
        self.amount = amount;
        self
    }

    pub fn named(mut self, name: &'a str) -> Self {
        self.name = name;
        self
    }
}

pub fn tables(releases: &[Release<'_>], parties: &[(&str, &str)]) -> OcdsTables {
    let mut t = OcdsTables::default();
    for r in releases {
        t.main.push(MainRow {
            link:               r.link.into(),
            procurement_method: r.method.into(),
        });
        t.awards.push(AwardRow {
            link_main:    r.link.into(),
            value_amount: r.amount.into(),
        });
        t.contracts.push(ContractRow {
            link_main:         r.link.into(),
            date_signed:       r.signed.into(),
            period_start_date: r.start.into(),
        });
        t.award_suppliers.push(AwardSupplierRow {
            link_main:   r.link.into(),
            supplier_id: r.supplier.into(),
            name:        r.name.into(),
        });
    }
    t.parties = parties
        .iter()
        .map(|(id, name)| Party {
            supplier_id:   id.to_string(),
            official_name: name.to_string(),
        })
        .collect();
    t
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
