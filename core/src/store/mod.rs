//! SQLite persistence layer.
//!
//! RULE: Only store/ talks to the database.
//! Pipeline stages hand their results to store methods; they never
//! execute SQL directly.

use crate::{
    dossier::SupplierDossier,
    error::PipelineResult,
    output::ScoredContract,
    quality::QualityReport,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

mod dossier;
mod features;
mod quality;

pub use features::StoredRiskRow;

pub struct RiskStore {
    conn: Connection,
}

impl RiskStore {
    pub fn open(path: &str) -> PipelineResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PipelineResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PipelineResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_risk_features.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        split_seed: u64,
        version: &str,
        started_at: DateTime<Utc>,
        data_dir: &str,
    ) -> PipelineResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, split_seed, version, started_at, data_dir)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![run_id, split_seed as i64, version, started_at.to_rfc3339(), data_dir],
        )?;
        Ok(())
    }

    /// Persist a run's contracts, dossiers and quality issues in one
    /// transaction. A failed insert leaves none of them behind.
    pub fn persist_run(
        &self,
        run_id: &str,
        contracts: &[ScoredContract],
        dossiers: &[SupplierDossier],
        report: &QualityReport,
    ) -> PipelineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        features::insert_scored_contracts(&tx, run_id, contracts)?;
        dossier::insert_dossiers(&tx, run_id, dossiers)?;
        quality::insert_quality_issues(&tx, run_id, report)?;
        tx.commit()?;
        Ok(())
    }
}

pub(crate) fn ts_to_sql(ts: Option<DateTime<Utc>>) -> Option<String> {
    ts.map(|t| t.to_rfc3339())
}

pub(crate) fn ts_from_sql(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|t| t.with_timezone(&Utc))
}
