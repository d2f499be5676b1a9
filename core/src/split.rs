//! Stratified train/test holdout over the scored contracts.
//!
//! Each risk label is split on its own, so both partitions carry the
//! same share of high-risk rows.

use crate::{
    config::SplitConfig,
    rng::StratumRng,
    scoring::{RiskAssessment, RiskLabel},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Train,
    Test,
}

impl Partition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Test  => "test",
        }
    }
}

/// Stable stratum slots. Never renumber.
fn stratum_index(label: RiskLabel) -> u64 {
    match label {
        RiskLabel::Low  => 0,
        RiskLabel::High => 1,
    }
}

/// One partition per assessment, in the same order.
pub fn stratified_split(assessments: &[RiskAssessment], config: &SplitConfig) -> Vec<Partition> {
    let mut partitions = vec![Partition::Train; assessments.len()];

    for label in [RiskLabel::Low, RiskLabel::High] {
        let mut members: Vec<usize> = assessments
            .iter()
            .enumerate()
            .filter(|(_, a)| a.label == label)
            .map(|(i, _)| i)
            .collect();
        let n_test = (members.len() as f64 * config.test_fraction).round() as usize;

        StratumRng::new(config.seed, stratum_index(label)).shuffle(&mut members);
        for &i in members.iter().take(n_test) {
            partitions[i] = Partition::Test;
        }
    }

    log::debug!(
        "Split: {} test / {} total (fraction {}, seed {})",
        partitions.iter().filter(|p| **p == Partition::Test).count(),
        partitions.len(),
        config.test_fraction,
        config.seed
    );
    partitions
}
