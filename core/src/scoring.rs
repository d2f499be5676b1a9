//! Explainable scoring — a weighted sum over the red flags.
//!
//! Every assessment carries the flags that fired and their weights, so
//! the score can always be reconstructed from the explanation.

use crate::{config::ScoringConfig, features::RiskFeatureRow, types::ContractId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedFlag {
    DirectProcurement,
    RoundAmount,
    SuspiciousTiming,
    NewSupplierDirectDeal,
}

impl RedFlag {
    pub fn label(&self) -> &'static str {
        match self {
            RedFlag::DirectProcurement     => "Sole-source (direct) procurement",
            RedFlag::RoundAmount           => "Suspiciously round amount",
            RedFlag::SuspiciousTiming      => "Work started before signing",
            RedFlag::NewSupplierDirectDeal => "New supplier on a direct deal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub flag:   RedFlag,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    pub fn is_high(&self) -> bool {
        matches!(self, RiskLabel::High)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low  => "low",
            RiskLabel::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub contract_id:   ContractId,
    pub score:         f64,
    pub label:         RiskLabel,
    pub contributions: Vec<Contribution>,
}

pub struct RiskScorer {
    config: ScoringConfig,
}

impl RiskScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn assess(&self, row: &RiskFeatureRow) -> RiskAssessment {
        let c = &self.config;
        let candidates = [
            (row.is_direct_procurement,    RedFlag::DirectProcurement,     c.direct_procurement_weight),
            (row.is_round_amount,          RedFlag::RoundAmount,           c.round_amount_weight),
            (row.suspicious_timing,        RedFlag::SuspiciousTiming,      c.suspicious_timing_weight),
            (row.new_supplier_direct_deal, RedFlag::NewSupplierDirectDeal, c.new_supplier_direct_deal_weight),
        ];
        let contributions: Vec<Contribution> = candidates
            .into_iter()
            .filter(|(fired, _, _)| *fired)
            .map(|(_, flag, weight)| Contribution { flag, weight })
            .collect();
        let score: f64 = contributions.iter().map(|c| c.weight).sum();
        let label = if score >= c.high_risk_threshold {
            RiskLabel::High
        } else {
            RiskLabel::Low
        };
        RiskAssessment {
            contract_id: row.contract_id.clone(),
            score,
            label,
            contributions,
        }
    }

    pub fn assess_all(&self, rows: &[RiskFeatureRow]) -> Vec<RiskAssessment> {
        let assessments: Vec<RiskAssessment> = rows.iter().map(|r| self.assess(r)).collect();
        let high = assessments.iter().filter(|a| a.label.is_high()).count();
        log::info!(
            "Scored {} contracts: {} high risk ({:.1}%)",
            assessments.len(),
            high,
            percent(high, assessments.len()),
        );
        assessments
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
