//! NiruGuard core: procurement record linkage and red flag scoring.
//!
//! Joins OCDS procurement tables on the supplier True ID, derives
//! behavioral red flags per awarded contract, scores them with an
//! explainable weighted rule set and aggregates supplier dossiers.
//! See engine.rs for the stage order.

pub mod config;
pub mod dossier;
pub mod engine;
pub mod error;
pub mod features;
pub mod history;
pub mod ingest;
pub mod linkage;
pub mod output;
pub mod parse;
pub mod quality;
pub mod record;
pub mod rng;
pub mod scoring;
pub mod split;
pub mod store;
pub mod types;
