use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Input tables ───────────────────────────────────────────────────

/// File names of the OCDS flattened tables inside `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFiles {
    pub data_dir: String,
    pub main: String,
    pub awards: String,
    pub contracts: String,
    pub award_suppliers: String,
    pub parties: String,
}

impl Default for InputFiles {
    fn default() -> Self {
        Self {
            data_dir: "data/raw".into(),
            main: "main.csv".into(),
            awards: "awards.csv".into(),
            contracts: "contracts.csv".into(),
            award_suppliers: "awards_suppliers.csv".into(),
            parties: "parties.csv".into(),
        }
    }
}

impl InputFiles {
    pub fn path(&self, file: &str) -> PathBuf {
        PathBuf::from(&self.data_dir).join(file)
    }
}

// ── Red flag thresholds ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagConfig {
    /// A supplier is "new" while its cumulative award count is at or below this.
    pub new_supplier_max_awards: u32,
    /// Amounts must exceed this to count as round.
    pub round_amount_floor: f64,
    /// Round amounts are exact multiples of this unit.
    pub round_amount_unit: f64,
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self {
            new_supplier_max_awards: 3,
            round_amount_floor: 1000.0,
            round_amount_unit: 1000.0,
        }
    }
}

// ── Scoring ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub direct_procurement_weight: f64,
    pub round_amount_weight: f64,
    pub suspicious_timing_weight: f64,
    pub new_supplier_direct_deal_weight: f64,
    /// Score at or above which a contract is labelled high risk.
    pub high_risk_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            direct_procurement_weight: 1.5,
            round_amount_weight: 1.0,
            suspicious_timing_weight: 2.0,
            new_supplier_direct_deal_weight: 2.5,
            high_risk_threshold: 2.0,
        }
    }
}

// ── Holdout split ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { test_fraction: 0.2, seed: 42 }
    }
}

// ── Output ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub out_dir: String,
    pub db_path: String,
    pub risk_features_file: String,
    pub dossier_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_dir: "data/processed".into(),
            db_path: "data/processed/niruguard.db".into(),
            risk_features_file: "risk_features.csv".into(),
            dossier_file: "supplier_dossier.csv".into(),
        }
    }
}

impl OutputConfig {
    pub fn risk_features_path(&self) -> PathBuf {
        PathBuf::from(&self.out_dir).join(&self.risk_features_file)
    }

    pub fn dossier_path(&self) -> PathBuf {
        PathBuf::from(&self.out_dir).join(&self.dossier_file)
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: InputFiles,
    pub flags: FlagConfig,
    pub scoring: ScoringConfig,
    pub split: SplitConfig,
    pub output: OutputConfig,
    /// Escalate the first data quality issue to a hard error.
    pub strict: bool,
    /// Escalate suppliers missing from the address book to a join error.
    pub strict_join: bool,
}

impl PipelineConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let s = &self.scoring;
        let weights = [
            ("direct_procurement_weight", s.direct_procurement_weight),
            ("round_amount_weight", s.round_amount_weight),
            ("suspicious_timing_weight", s.suspicious_timing_weight),
            ("new_supplier_direct_deal_weight", s.new_supplier_direct_deal_weight),
            ("high_risk_threshold", s.high_risk_threshold),
        ];
        for (name, value) in weights {
            if !value.is_finite() {
                anyhow::bail!("scoring.{name} must be finite, got {value}");
            }
        }
        if !(self.split.test_fraction > 0.0 && self.split.test_fraction < 1.0) {
            anyhow::bail!(
                "split.test_fraction must be in (0, 1), got {}",
                self.split.test_fraction
            );
        }
        if self.flags.round_amount_unit <= 0.0 {
            anyhow::bail!(
                "flags.round_amount_unit must be positive, got {}",
                self.flags.round_amount_unit
            );
        }
        Ok(())
    }

    /// Config with defaults and non-strict policies, for tests.
    pub fn default_test() -> Self {
        let mut config = Self::default();
        config.input.data_dir = "tests/data".into();
        config.output.out_dir = std::env::temp_dir().to_string_lossy().into_owned();
        config.output.db_path = ":memory:".into();
        config
    }
}
