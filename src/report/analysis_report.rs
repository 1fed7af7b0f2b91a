//! JSON analysis report
//!
//! Collects the cleaning statistics, distribution summaries, and model results
//! of a full run into one document.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{CleaningStats, Distribution, ZeroGamesPolicy};
use crate::report::ModelEntry;

/// Metadata about the analysis run
#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    pub capstat_version: String,
    pub input_file: String,
    pub zero_games_policy: ZeroGamesPolicy,
    pub canadian_teams: Vec<String>,
    pub western_teams: Vec<String>,
}

/// Complete analysis export
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub metadata: ReportMetadata,
    pub cleaning: &'a CleaningStats,
    pub distributions: &'a [Distribution],
    pub models: &'a [ModelEntry],
}

/// Parameters for the report metadata
pub struct ReportParams<'a> {
    pub input_file: &'a str,
    pub zero_games_policy: ZeroGamesPolicy,
    pub canadian_teams: Vec<String>,
    pub western_teams: Vec<String>,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(
        params: ReportParams<'_>,
        cleaning: &'a CleaningStats,
        distributions: &'a [Distribution],
        models: &'a [ModelEntry],
    ) -> Self {
        Self {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                capstat_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: params.input_file.to_string(),
                zero_games_policy: params.zero_games_policy,
                canadian_teams: params.canadian_teams,
                western_teams: params.western_teams,
            },
            cleaning,
            distributions,
            models,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize analysis report to JSON")
    }
}

/// Write the analysis report to a JSON file
pub fn export_analysis_report(report: &AnalysisReport<'_>, output_path: &Path) -> Result<()> {
    let json = report.to_json()?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write analysis report to {}", output_path.display()))?;
    Ok(())
}
