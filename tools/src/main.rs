//! niruguard-runner: headless batch runner for the NiruGuard risk engine.
//!
//! Usage:
//!   niruguard-runner --data-dir data/raw --out-dir data/processed
//!   niruguard-runner --config niruguard.json --db run.db --strict
//!   niruguard-runner --summary-json

use anyhow::Result;
use niruguard_core::{
    config::PipelineConfig,
    engine::{RiskEngine, RunOutput},
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = build_config(&args)?;
    let summary_json = args.iter().any(|a| a == "--summary-json");

    if !summary_json {
        println!("NiruGuard: procurement risk engine");
        println!("  data_dir:    {}", config.input.data_dir);
        println!("  out_dir:     {}", config.output.out_dir);
        println!("  db:          {}", config.output.db_path);
        println!("  strict:      {}", config.strict);
        println!("  strict_join: {}", config.strict_join);
        println!();
    }

    let started = chrono::Utc::now();
    let engine = RiskEngine::build(config)?;
    let output = engine.run()?;
    engine.export(&output)?;
    log::info!(
        "{} finished in {} ms",
        output.run_id,
        (chrono::Utc::now() - started).num_milliseconds()
    );

    if summary_json {
        println!("{}", serde_json::to_string_pretty(&output.summary())?);
    } else {
        print_summary(&engine, &output)?;
    }
    Ok(())
}

/// Config file first, then command-line overrides.
fn build_config(args: &[String]) -> Result<PipelineConfig> {
    let mut config = match str_arg(args, "--config") {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = str_arg(args, "--data-dir") {
        config.input.data_dir = dir.to_string();
    }
    if let Some(dir) = str_arg(args, "--out-dir") {
        config.output.out_dir = dir.to_string();
    }
    if let Some(db) = str_arg(args, "--db") {
        config.output.db_path = db.to_string();
    }
    config.split.seed = parse_arg(args, "--seed", config.split.seed)?;
    config.strict |= args.iter().any(|a| a == "--strict");
    config.strict_join |= args.iter().any(|a| a == "--strict-join");
    config.validate()?;
    Ok(config)
}

fn print_summary(engine: &RiskEngine, output: &RunOutput) -> Result<()> {
    let s = output.summary();
    let share = if s.contracts == 0 {
        0.0
    } else {
        s.high_risk as f64 * 100.0 / s.contracts as f64
    };

    println!("=== RUN SUMMARY ===");
    println!("  run_id:             {}", s.run_id);
    println!("  contracts:          {}", s.contracts);
    println!("  suppliers:          {}", s.suppliers);
    println!("  high risk:          {} ({share:.1}%)", s.high_risk);
    println!("  suspicious timing:  {}", s.suspicious_timing);
    println!("  new-supplier deals: {}", s.new_supplier_direct_deal);
    println!("  test partition:     {}", s.test_partition);
    println!("  risk features:      {}", engine.config.output.risk_features_path().display());
    println!("  supplier dossiers:  {}", engine.config.output.dossier_path().display());

    println!();
    println!("=== DATA QUALITY ===");
    if s.issues.is_empty() {
        println!("  (no issues)");
    } else {
        for (kind, n) in &s.issues {
            println!("  {kind:<22} {n}");
        }
    }

    println!();
    println!("=== WATCHLIST (top 5 by high-risk value) ===");
    let top = engine.store.top_risk_suppliers(&engine.run_id, 5)?;
    if top.is_empty() {
        println!("  (no high-risk suppliers)");
    }
    for (supplier_id, name, value) in &top {
        println!(
            "  {} (ID: {supplier_id}) | KES {value:.0} at risk",
            name.as_deref().unwrap_or("?")
        );
    }
    Ok(())
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> Result<T> {
    match str_arg(args, flag) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid value for {flag}: '{raw}'")),
        None => Ok(default),
    }
}
