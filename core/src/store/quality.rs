//! Store methods for data quality findings.

use crate::{
    error::PipelineResult,
    quality::{IssueKind, QualityReport},
};
use rusqlite::{params, Connection};

use super::RiskStore;

pub(super) fn insert_quality_issues(
    conn: &Connection,
    run_id: &str,
    report: &QualityReport,
) -> PipelineResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO quality_issue (run_id, kind, table_name, contract_id, supplier_id, detail)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for issue in report.issues() {
        stmt.execute(params![
            run_id,
            issue.kind.as_str(),
            issue.table,
            issue.contract_id,
            issue.supplier_id,
            issue.detail,
        ])?;
    }
    Ok(())
}

impl RiskStore {
    pub fn quality_issue_count(&self, run_id: &str, kind: IssueKind) -> PipelineResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM quality_issue WHERE run_id = ?1 AND kind = ?2",
            params![run_id, kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
