//! Table linkage — joins the raw OCDS tables into one AwardRecord per
//! awarded contract.
//!
//! JOIN ORDER (fixed):
//!   1. main ⋈ awards            on _link = _link_main  (inner)
//!   2. ⟕ contracts              on _link_main          (left)
//!   3. ⟕ awards_suppliers       on _link_main          (left)
//!
//! Secondary tables are keyed on their first row per _link_main.
//! Output order follows main.csv, so the result is deterministic.

use crate::{
    error::{PipelineError, PipelineResult},
    ingest::{AwardRow, AwardSupplierRow, ContractRow, OcdsTables},
    parse::{parse_amount, parse_timestamp, Parsed},
    quality::{IssueKind, QualityIssue, QualityReport},
    record::{AwardRecord, ProcurementMethod},
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct LinkedAwards {
    pub records: Vec<AwardRecord>,
    pub report:  QualityReport,
}

pub fn link_tables(tables: &OcdsTables) -> PipelineResult<LinkedAwards> {
    let mut report = QualityReport::new();

    let awards = index_first(&tables.awards, |a| &a.link_main, "awards.csv", &mut report);
    let contracts = index_first(&tables.contracts, |c| &c.link_main, "contracts.csv", &mut report);
    let suppliers = index_first(
        &tables.award_suppliers,
        |s| &s.link_main,
        "awards_suppliers.csv",
        &mut report,
    );

    let mut seen: HashSet<&str> = HashSet::with_capacity(tables.main.len());
    let mut records = Vec::with_capacity(awards.len());
    let mut unawarded = 0usize;

    for (row, main) in tables.main.iter().enumerate() {
        if main.link.is_empty() {
            return Err(PipelineError::DataQuality(format!(
                "main.csv row {row} has no _link contract identifier"
            )));
        }
        if !seen.insert(main.link.as_str()) {
            return Err(PipelineError::DataQuality(format!(
                "duplicate contract identifier '{}' in main.csv (row {row})",
                main.link
            )));
        }
        let Some(award) = awards.get(main.link.as_str()) else {
            unawarded += 1;
            continue;
        };
        records.push(build_record(
            row,
            &main.link,
            &main.procurement_method,
            award,
            contracts.get(main.link.as_str()).copied(),
            suppliers.get(main.link.as_str()).copied(),
            &mut report,
        ));
    }

    // Secondary rows pointing at a release main.csv does not have.
    report_orphans(&awards, &seen, "awards.csv", IssueKind::UnlinkedAward, &mut report);
    report_orphans(&contracts, &seen, "contracts.csv", IssueKind::UnlinkedRow, &mut report);
    report_orphans(
        &suppliers,
        &seen,
        "awards_suppliers.csv",
        IssueKind::UnlinkedRow,
        &mut report,
    );

    log::info!(
        "Linked {} awarded contracts ({} releases without award, {} issues)",
        records.len(),
        unawarded,
        report.len()
    );
    Ok(LinkedAwards { records, report })
}

fn build_record(
    row: usize,
    link: &str,
    method: &str,
    award: &AwardRow,
    contract: Option<&ContractRow>,
    supplier: Option<&AwardSupplierRow>,
    report: &mut QualityReport,
) -> AwardRecord {
    let amount = match parse_amount(&award.value_amount) {
        Parsed::Value(v) => v,
        Parsed::Empty => 0.0,
        Parsed::Malformed(raw) => {
            report.record(QualityIssue {
                kind:        IssueKind::MalformedAmount,
                table:       "awards.csv".into(),
                contract_id: Some(link.to_string()),
                supplier_id: None,
                detail:      format!("value_amount '{raw}' is not a number"),
            });
            0.0
        }
    };

    let (date_signed, period_start_date) = match contract {
        Some(c) => (
            contract_date(link, "dateSigned", &c.date_signed, report),
            contract_date(link, "period_startDate", &c.period_start_date, report),
        ),
        None => (None, None),
    };

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    AwardRecord {
        contract_id:        link.to_string(),
        supplier_id:        supplier.and_then(|s| non_empty(&s.supplier_id)),
        supplier_name:      supplier.and_then(|s| non_empty(&s.name)),
        date_signed,
        period_start_date,
        procurement_method: ProcurementMethod::parse(method),
        amount,
        source_row:         row,
    }
}

fn contract_date(
    link: &str,
    column: &str,
    raw: &str,
    report: &mut QualityReport,
) -> Option<DateTime<Utc>> {
    match parse_timestamp(raw) {
        Parsed::Value(ts) => Some(ts),
        Parsed::Empty => None,
        Parsed::Malformed(bad) => {
            report.record(QualityIssue {
                kind:        IssueKind::MalformedDate,
                table:       "contracts.csv".into(),
                contract_id: Some(link.to_string()),
                supplier_id: None,
                detail:      format!("{column} '{bad}' is not a timestamp"),
            });
            None
        }
    }
}

/// One issue per indexed key with no main.csv release, in key order.
fn report_orphans<T>(
    index: &HashMap<&str, &T>,
    main_links: &HashSet<&str>,
    table: &str,
    kind: IssueKind,
    report: &mut QualityReport,
) {
    let mut orphans: Vec<&str> = index
        .keys()
        .filter(|k| !main_links.contains(*k))
        .copied()
        .collect();
    orphans.sort_unstable();
    for link in orphans {
        report.record(QualityIssue {
            kind,
            table:       table.to_string(),
            contract_id: Some(link.to_string()),
            supplier_id: None,
            detail:      "no main.csv release with this _link".into(),
        });
    }
}

/// Map each key to its first row. Later rows with the same key are
/// recorded as DuplicateLink issues.
fn index_first<'a, T>(
    rows: &'a [T],
    key: impl Fn(&T) -> &String,
    table: &str,
    report: &mut QualityReport,
) -> HashMap<&'a str, &'a T> {
    let mut index: HashMap<&str, &T> = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let k = key(row).as_str();
        if index.contains_key(k) {
            report.record(QualityIssue {
                kind:        IssueKind::DuplicateLink,
                table:       table.to_string(),
                contract_id: Some(k.to_string()),
                supplier_id: None,
                detail:      format!("row {i} repeats _link_main; first row kept"),
            });
            continue;
        }
        index.insert(k, row);
    }
    index
}
