//! Store methods for the risk feature table.

use crate::{
    error::PipelineResult,
    output::ScoredContract,
    scoring::Contribution,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;

use super::{ts_from_sql, ts_to_sql, RiskStore};

/// A risk feature row as read back for the supplier drill-down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRiskRow {
    pub contract_id:              String,
    pub supplier_id:              Option<String>,
    pub procurement_method:       String,
    pub date_signed:              Option<DateTime<Utc>>,
    pub amount:                   f64,
    pub is_direct_procurement:    bool,
    pub is_round_amount:          bool,
    pub suspicious_timing:        bool,
    pub new_supplier_direct_deal: bool,
    pub risk_score:               f64,
    pub risk_label:               String,
    pub explanation:              Vec<Contribution>,
}

pub(super) fn insert_scored_contracts(
    conn: &Connection,
    run_id: &str,
    contracts: &[ScoredContract],
) -> PipelineResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO risk_feature (
            run_id, contract_id, supplier_id, supplier_name, procurement_method,
            date_signed, amount, is_direct_procurement, is_round_amount,
            suspicious_timing, supplier_award_count, supplier_total_awards,
            new_supplier_direct_deal, risk_score, risk_label, explanation, partition
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
    )?;
    for c in contracts {
        let f = &c.features;
        let a = &c.assessment;
        stmt.execute(params![
            run_id,
            f.contract_id,
            f.supplier_id,
            f.supplier_name,
            f.procurement_method.as_str(),
            ts_to_sql(f.date_signed),
            f.amount,
            f.is_direct_procurement,
            f.is_round_amount,
            f.suspicious_timing,
            f.supplier_award_count,
            f.supplier_total_awards,
            f.new_supplier_direct_deal,
            a.score,
            a.label.as_str(),
            serde_json::to_string(&a.contributions)?,
            c.partition.as_str(),
        ])?;
    }
    Ok(())
}

impl RiskStore {
    /// High-risk contracts of one supplier, largest first.
    pub fn high_risk_contracts(
        &self,
        run_id: &str,
        supplier_id: &str,
    ) -> PipelineResult<Vec<StoredRiskRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT contract_id, supplier_id, procurement_method, date_signed, amount,
                    is_direct_procurement, is_round_amount, suspicious_timing,
                    new_supplier_direct_deal, risk_score, risk_label, explanation
             FROM risk_feature
             WHERE run_id = ?1 AND supplier_id = ?2 AND risk_label = 'high'
             ORDER BY amount DESC, contract_id ASC",
        )?;
        let raw = stmt
            .query_map(params![run_id, supplier_id], |row| {
                Ok((
                    StoredRiskRow {
                        contract_id:              row.get(0)?,
                        supplier_id:              row.get(1)?,
                        procurement_method:       row.get(2)?,
                        date_signed:              ts_from_sql(row.get(3)?),
                        amount:                   row.get(4)?,
                        is_direct_procurement:    row.get(5)?,
                        is_round_amount:          row.get(6)?,
                        suspicious_timing:        row.get(7)?,
                        new_supplier_direct_deal: row.get(8)?,
                        risk_score:               row.get(9)?,
                        risk_label:               row.get(10)?,
                        explanation:              Vec::new(),
                    },
                    row.get::<_, String>(11)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(raw.len());
        for (mut r, json) in raw {
            r.explanation = serde_json::from_str(&json)?;
            rows.push(r);
        }
        Ok(rows)
    }

    // ── Test / summary helpers ────────────────────────────────────────

    pub fn risk_feature_count(&self, run_id: &str) -> PipelineResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM risk_feature WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn high_risk_count(&self, run_id: &str) -> PipelineResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM risk_feature WHERE run_id = ?1 AND risk_label = 'high'",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn partition_count(&self, run_id: &str, partition: &str) -> PipelineResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM risk_feature WHERE run_id = ?1 AND partition = ?2",
            params![run_id, partition],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
