//! CSV ingestion of the OCDS flattened tables.
//!
//! Only the columns the pipeline uses are extracted; the exports carry
//! dozens more. Cells are kept as raw strings here and parsed during
//! linkage, where quality issues can be attributed to a contract.

use crate::{
    config::InputFiles,
    error::{PipelineError, PipelineResult},
    record::Party,
};
use std::fs::File;
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainRow {
    pub link:               String,
    pub procurement_method: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardRow {
    pub link_main:    String,
    pub value_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRow {
    pub link_main:         String,
    pub date_signed:       String,
    pub period_start_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardSupplierRow {
    pub link_main:   String,
    pub supplier_id: String,
    pub name:        String,
}

/// The five raw tables of one analysis run.
#[derive(Debug, Clone, Default)]
pub struct OcdsTables {
    pub main:            Vec<MainRow>,
    pub awards:          Vec<AwardRow>,
    pub contracts:       Vec<ContractRow>,
    pub award_suppliers: Vec<AwardSupplierRow>,
    pub parties:         Vec<Party>,
}

impl OcdsTables {
    /// Read every table from the configured data directory.
    pub fn load(files: &InputFiles) -> PipelineResult<Self> {
        let tables = Self {
            main:            read_main(open_table(files, &files.main)?)?,
            awards:          read_awards(open_table(files, &files.awards)?)?,
            contracts:       read_contracts(open_table(files, &files.contracts)?)?,
            award_suppliers: read_award_suppliers(open_table(files, &files.award_suppliers)?)?,
            parties:         read_parties(open_table(files, &files.parties)?)?,
        };
        log::info!(
            "Loaded tables: main={} awards={} contracts={} award_suppliers={} parties={}",
            tables.main.len(),
            tables.awards.len(),
            tables.contracts.len(),
            tables.award_suppliers.len(),
            tables.parties.len(),
        );
        Ok(tables)
    }
}

fn open_table(files: &InputFiles, name: &str) -> PipelineResult<File> {
    let path = files.path(name);
    if !path.is_file() {
        return Err(PipelineError::Config(format!(
            "input file not found: {}",
            path.display()
        )));
    }
    log::debug!("Reading {}", path.display());
    Ok(File::open(&path)?)
}

pub fn read_main<R: Read>(reader: R) -> PipelineResult<Vec<MainRow>> {
    Ok(read_columns(reader, "main", &["_link", "tender_procurementMethod"])?
        .into_iter()
        .map(|mut c| MainRow {
            procurement_method: c.pop().unwrap_or_default(),
            link:               c.pop().unwrap_or_default(),
        })
        .collect())
}

pub fn read_awards<R: Read>(reader: R) -> PipelineResult<Vec<AwardRow>> {
    Ok(read_columns(reader, "awards", &["_link_main", "value_amount"])?
        .into_iter()
        .map(|mut c| AwardRow {
            value_amount: c.pop().unwrap_or_default(),
            link_main:    c.pop().unwrap_or_default(),
        })
        .collect())
}

pub fn read_contracts<R: Read>(reader: R) -> PipelineResult<Vec<ContractRow>> {
    Ok(read_columns(reader, "contracts", &["_link_main", "dateSigned", "period_startDate"])?
        .into_iter()
        .map(|mut c| ContractRow {
            period_start_date: c.pop().unwrap_or_default(),
            date_signed:       c.pop().unwrap_or_default(),
            link_main:         c.pop().unwrap_or_default(),
        })
        .collect())
}

pub fn read_award_suppliers<R: Read>(reader: R) -> PipelineResult<Vec<AwardSupplierRow>> {
    Ok(read_columns(reader, "awards_suppliers", &["_link_main", "id", "name"])?
        .into_iter()
        .map(|mut c| AwardSupplierRow {
            name:        c.pop().unwrap_or_default(),
            supplier_id: c.pop().unwrap_or_default(),
            link_main:   c.pop().unwrap_or_default(),
        })
        .collect())
}

/// Address book. Rows without an id cannot be keyed and are skipped.
pub fn read_parties<R: Read>(reader: R) -> PipelineResult<Vec<Party>> {
    let rows = read_columns(reader, "parties", &["id", "name"])?;
    let total = rows.len();
    let parties: Vec<Party> = rows
        .into_iter()
        .filter_map(|mut c| {
            let official_name = c.pop().unwrap_or_default();
            let supplier_id = c.pop().unwrap_or_default();
            (!supplier_id.is_empty()).then_some(Party { supplier_id, official_name })
        })
        .collect();
    if parties.len() < total {
        log::warn!("parties: skipped {} rows without an id", total - parties.len());
    }
    Ok(parties)
}

/// Extract `columns` (by header name) from every record, trimmed.
/// Short rows yield empty cells.
fn read_columns<R: Read>(
    reader: R,
    table: &str,
    columns: &[&str],
) -> PipelineResult<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let indexes = columns
        .iter()
        .map(|col| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == *col)
                .ok_or_else(|| PipelineError::MissingColumn {
                    table:  table.to_string(),
                    column: col.to_string(),
                })
        })
        .collect::<PipelineResult<Vec<_>>>()?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            indexes
                .iter()
                .map(|&i| record.get(i).unwrap_or("").to_string())
                .collect(),
        );
    }
    Ok(rows)
}
