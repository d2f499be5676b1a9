//! The pipeline engine — one batch analysis run.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Ingest    raw OCDS tables
//!   2. Link      main ⋈ awards ⟕ contracts ⟕ awards_suppliers
//!   3. Features  red flags per contract
//!   4. Score     weighted explainable score + label
//!   5. Dossier   per-supplier aggregates ⟕ parties
//!   6. Split     stratified train/test holdout
//!   7. Persist   SQLite (and CSV export on request)
//!
//! RULES:
//!   - Every stage is a pure function of the previous stages' output.
//!   - Output row count equals the linked contract count.
//!   - Quality issues from every stage land in one report.
//!   - In strict mode nothing is persisted if any issue escalates.

use crate::{
    config::PipelineConfig,
    dossier::{build_dossiers, SupplierDossier},
    error::{PipelineError, PipelineResult},
    features::compute_features,
    ingest::OcdsTables,
    linkage::link_tables,
    output::{export_tables, ScoredContract},
    quality::{IssueKind, QualityReport},
    scoring::RiskScorer,
    split::{stratified_split, Partition},
    store::RiskStore,
    types::RunId,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

pub struct RiskEngine {
    pub run_id: RunId,
    pub config: PipelineConfig,
    pub store:  RiskStore,
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub run_id:    RunId,
    pub contracts: Vec<ScoredContract>,
    pub dossiers:  Vec<SupplierDossier>,
    pub report:    QualityReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id:                   RunId,
    pub contracts:                usize,
    pub suppliers:                usize,
    pub high_risk:                usize,
    pub suspicious_timing:        usize,
    pub new_supplier_direct_deal: usize,
    pub test_partition:           usize,
    pub issues:                   BTreeMap<String, usize>,
}

impl RunOutput {
    pub fn summary(&self) -> RunSummary {
        let c = &self.contracts;
        RunSummary {
            run_id:                   self.run_id.clone(),
            contracts:                c.len(),
            suppliers:                self.dossiers.len(),
            high_risk:                c.iter().filter(|c| c.assessment.label.is_high()).count(),
            suspicious_timing:        c.iter().filter(|c| c.features.suspicious_timing).count(),
            new_supplier_direct_deal: c.iter().filter(|c| c.features.new_supplier_direct_deal).count(),
            test_partition:           c.iter().filter(|c| c.partition == Partition::Test).count(),
            issues: self
                .report
                .counts_by_kind()
                .into_iter()
                .map(|(k, n)| (k.as_str().to_string(), n))
                .collect(),
        }
    }
}

impl RiskEngine {
    pub fn new(run_id: RunId, config: PipelineConfig, store: RiskStore) -> Self {
        Self { run_id, config, store }
    }

    /// Open the configured database, migrate it and register a new run.
    pub fn build(config: PipelineConfig) -> PipelineResult<Self> {
        config
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        if let Some(dir) = std::path::Path::new(&config.output.db_path)
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
        {
            std::fs::create_dir_all(dir)?;
        }
        let store = RiskStore::open(&config.output.db_path)?;
        store.migrate()?;
        let run_id = format!("run-{}", uuid::Uuid::new_v4());
        store.insert_run(
            &run_id,
            config.split.seed,
            env!("CARGO_PKG_VERSION"),
            Utc::now(),
            &config.input.data_dir,
        )?;
        log::info!("Registered {run_id} in {}", config.output.db_path);
        Ok(Self::new(run_id, config, store))
    }

    /// In-memory engine with test defaults.
    pub fn build_test(run_id: RunId) -> PipelineResult<Self> {
        Self::build_test_with(run_id, PipelineConfig::default_test())
    }

    pub fn build_test_with(run_id: RunId, config: PipelineConfig) -> PipelineResult<Self> {
        let store = RiskStore::in_memory()?;
        store.migrate()?;
        store.insert_run(&run_id, config.split.seed, "0.1.0-test", Utc::now(), "memory")?;
        Ok(Self::new(run_id, config, store))
    }

    /// Read the input tables from disk and run every stage.
    pub fn run(&self) -> PipelineResult<RunOutput> {
        let tables = OcdsTables::load(&self.config.input)?;
        self.run_tables(&tables)
    }

    /// Run stages 2-7 over tables already in memory.
    pub fn run_tables(&self, tables: &OcdsTables) -> PipelineResult<RunOutput> {
        let linked = link_tables(tables)?;
        let mut report = linked.report;

        let features = compute_features(&linked.records, &self.config.flags)?;
        report.merge(features.report);

        let scorer = RiskScorer::new(self.config.scoring.clone());
        let assessments = scorer.assess_all(&features.rows);

        let dossiers = build_dossiers(
            &features.rows,
            &assessments,
            &features.ledger,
            &tables.parties,
        )?;
        report.merge(dossiers.report);

        self.enforce_policy(&report)?;

        let partitions = stratified_split(&assessments, &self.config.split);
        let contracts: Vec<ScoredContract> = features
            .rows
            .into_iter()
            .zip(assessments)
            .zip(partitions)
            .map(|((features, assessment), partition)| ScoredContract {
                features,
                assessment,
                partition,
            })
            .collect();

        if contracts.len() != linked.records.len() {
            return Err(PipelineError::Join(format!(
                "row count changed during linkage: {} contracts in, {} rows out",
                linked.records.len(),
                contracts.len()
            )));
        }

        self.store
            .persist_run(&self.run_id, &contracts, &dossiers.dossiers, &report)?;

        if !report.is_empty() {
            log::warn!("{} data quality issues recorded for {}", report.len(), self.run_id);
        }
        Ok(RunOutput {
            run_id: self.run_id.clone(),
            contracts,
            dossiers: dossiers.dossiers,
            report,
        })
    }

    /// Write the result tables to the configured output directory.
    pub fn export(&self, output: &RunOutput) -> PipelineResult<()> {
        export_tables(
            &self.config.output.risk_features_path(),
            &self.config.output.dossier_path(),
            &output.contracts,
            &output.dossiers,
        )
    }

    fn enforce_policy(&self, report: &QualityReport) -> PipelineResult<()> {
        if self.config.strict {
            report.check(|_| true)
        } else if self.config.strict_join {
            report.check(|k: IssueKind| k.is_join_failure())
        } else {
            Ok(())
        }
    }
}
