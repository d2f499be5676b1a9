//! Data quality findings.
//!
//! RULE: no stage may silently drop or default a value. Every fallback
//! records a QualityIssue; strict mode turns the first one into an error.

use crate::{
    error::{PipelineError, PipelineResult},
    types::{ContractId, SupplierId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MalformedDate,
    MalformedAmount,
    MissingSupplierId,
    DuplicateLink,
    UnlinkedAward,
    /// A contracts or awards_suppliers row with no main.csv release.
    UnlinkedRow,
    UnresolvedSupplier,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MalformedDate      => "malformed_date",
            IssueKind::MalformedAmount    => "malformed_amount",
            IssueKind::MissingSupplierId  => "missing_supplier_id",
            IssueKind::DuplicateLink      => "duplicate_link",
            IssueKind::UnlinkedAward      => "unlinked_award",
            IssueKind::UnlinkedRow        => "unlinked_row",
            IssueKind::UnresolvedSupplier => "unresolved_supplier",
        }
    }

    /// Join failures escalate to `PipelineError::Join`, the rest to
    /// `PipelineError::DataQuality`.
    pub fn is_join_failure(&self) -> bool {
        matches!(
            self,
            IssueKind::UnlinkedAward | IssueKind::UnlinkedRow | IssueKind::UnresolvedSupplier
        )
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub kind:        IssueKind,
    pub table:       String,
    pub contract_id: Option<ContractId>,
    pub supplier_id: Option<SupplierId>,
    pub detail:      String,
}

impl QualityIssue {
    pub fn into_error(self) -> PipelineError {
        let msg = self.to_string();
        if self.kind.is_join_failure() {
            PipelineError::Join(msg)
        } else {
            PipelineError::DataQuality(msg)
        }
    }
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.kind, self.table)?;
        if let Some(c) = &self.contract_id {
            write!(f, " (contract {c})")?;
        }
        if let Some(s) = &self.supplier_id {
            write!(f, " (supplier {s})")?;
        }
        write!(f, ": {}", self.detail)
    }
}

/// Issues collected across every stage of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityReport {
    issues: Vec<QualityIssue>,
}

impl QualityReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, issue: QualityIssue) {
        log::debug!("quality issue: {issue}");
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[QualityIssue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    pub fn counts_by_kind(&self) -> BTreeMap<IssueKind, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn merge(&mut self, other: QualityReport) {
        self.issues.extend(other.issues);
    }

    /// Fail on the first issue whose kind `escalate` selects.
    pub fn check(&self, escalate: impl Fn(IssueKind) -> bool) -> PipelineResult<()> {
        match self.issues.iter().find(|i| escalate(i.kind)) {
            Some(issue) => Err(issue.clone().into_error()),
            None => Ok(()),
        }
    }
}
