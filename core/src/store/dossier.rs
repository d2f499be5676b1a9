//! Store methods for supplier dossiers.

use crate::{
    dossier::{NameSource, SupplierDossier},
    error::PipelineResult,
};
use rusqlite::{params, Connection, OptionalExtension};

use super::{ts_from_sql, ts_to_sql, RiskStore};

fn name_source_from_sql(raw: &str) -> NameSource {
    match raw {
        "address_book" => NameSource::AddressBook,
        "award"        => NameSource::Award,
        _              => NameSource::Unknown,
    }
}

pub(super) fn insert_dossiers(
    conn: &Connection,
    run_id: &str,
    dossiers: &[SupplierDossier],
) -> PipelineResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO supplier_dossier (
            run_id, supplier_id, official_name, name_source, total_contracts,
            total_value, high_risk_count, high_risk_value, direct_count,
            non_direct_count, suspicious_timing_count,
            new_supplier_direct_deal_count, first_signed, last_signed
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
    )?;
    for d in dossiers {
        stmt.execute(params![
            run_id,
            d.supplier_id,
            d.official_name,
            d.name_source.as_str(),
            d.total_contracts,
            d.total_value,
            d.high_risk_count,
            d.high_risk_value,
            d.direct_count,
            d.non_direct_count,
            d.suspicious_timing_count,
            d.new_supplier_direct_deal_count,
            ts_to_sql(d.first_signed),
            ts_to_sql(d.last_signed),
        ])?;
    }
    Ok(())
}

impl RiskStore {
    pub fn get_dossier(
        &self,
        run_id: &str,
        supplier_id: &str,
    ) -> PipelineResult<Option<SupplierDossier>> {
        let dossier = self
            .conn
            .query_row(
                "SELECT supplier_id, official_name, name_source, total_contracts,
                        total_value, high_risk_count, high_risk_value, direct_count,
                        non_direct_count, suspicious_timing_count,
                        new_supplier_direct_deal_count, first_signed, last_signed
                 FROM supplier_dossier WHERE run_id = ?1 AND supplier_id = ?2",
                params![run_id, supplier_id],
                |row| {
                    Ok(SupplierDossier {
                        supplier_id:                    row.get(0)?,
                        official_name:                  row.get(1)?,
                        name_source:                    name_source_from_sql(&row.get::<_, String>(2)?),
                        total_contracts:                row.get(3)?,
                        total_value:                    row.get(4)?,
                        high_risk_count:                row.get(5)?,
                        high_risk_value:                row.get(6)?,
                        direct_count:                   row.get(7)?,
                        non_direct_count:               row.get(8)?,
                        suspicious_timing_count:        row.get(9)?,
                        new_supplier_direct_deal_count: row.get(10)?,
                        first_signed:                   ts_from_sql(row.get(11)?),
                        last_signed:                    ts_from_sql(row.get(12)?),
                    })
                },
            )
            .optional()?;
        Ok(dossier)
    }

    /// Suppliers ranked by high-risk value, for the watchlist summary.
    pub fn top_risk_suppliers(&self, run_id: &str, limit: usize) -> PipelineResult<Vec<(String, Option<String>, f64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT supplier_id, official_name, high_risk_value
             FROM supplier_dossier
             WHERE run_id = ?1 AND high_risk_count > 0
             ORDER BY high_risk_value DESC, supplier_id ASC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![run_id, limit as i64], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn dossier_count(&self, run_id: &str) -> PipelineResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM supplier_dossier WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
