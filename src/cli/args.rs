//! Command-line argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::{ModelFamily, PlotKind, ZeroGamesPolicy, DEFAULT_FINE_MIN_SPLIT};

/// capstat - Clean NHL player-season tables and model salaries
#[derive(Parser, Debug)]
#[command(name = "capstat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Also write the cleaned table here (CSV or Parquet, determined by extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a JSON analysis report (cleaning stats, distributions, models)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Directory for SVG plots of the described fields
    #[arg(long)]
    pub svg_dir: Option<PathBuf>,

    /// Directory for Graphviz files of the fitted trees
    #[arg(long)]
    pub dot_dir: Option<PathBuf>,

    /// Minimum node size before a split is attempted, for the finer salary tree
    #[arg(long, default_value_t = DEFAULT_FINE_MIN_SPLIT, value_parser = validate_min_split)]
    pub min_split: usize,

    #[command(flatten)]
    pub cleaning: CleaningArgs,

    /// Skip interactive confirmation prompts
    #[arg(long, global = true, default_value = "false")]
    pub no_confirm: bool,

    /// Emit TRACE-level diagnostics on stderr
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,
}

/// Options shared by every command that loads and cleans a table
#[derive(Args, Debug, Clone)]
pub struct CleaningArgs {
    /// JSON file overriding the Canadian and Western team sets:
    /// {"canada": [...], "west": [...]}
    #[arg(long)]
    pub teams: Option<PathBuf>,

    /// Handling of rows with zero games played: "null" (default), "exclude", or "zero"
    #[arg(long, default_value = "null")]
    pub zero_games: ZeroGamesPolicy,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean a player table and write the analysis-ready result
    Clean {
        /// Input file path (CSV or Parquet)
        input: PathBuf,

        /// Output file path (optional, defaults to input with a '_clean' suffix)
        output: Option<PathBuf>,

        #[command(flatten)]
        cleaning: CleaningArgs,
    },

    /// Plot the distribution of one cleaned field
    Describe {
        /// Input file path (CSV or Parquet)
        input: PathBuf,

        /// Field to describe: salary, age, points, toi-per-game, or any numeric column.
        /// Prompted for interactively when omitted.
        #[arg(short, long)]
        field: Option<String>,

        /// Plot kind: "histogram" or "density" (defaults per field)
        #[arg(short, long)]
        kind: Option<PlotKind>,

        /// Number of histogram bins (defaults to Sturges' rule)
        #[arg(long, value_parser = validate_bins)]
        bins: Option<usize>,

        /// Write the plot as SVG
        #[arg(long)]
        svg: Option<PathBuf>,

        #[command(flatten)]
        cleaning: CleaningArgs,
    },

    /// Fit a single model against the cleaned table
    Fit {
        /// Input file path (CSV or Parquet)
        input: PathBuf,

        /// Model family: "ols", "regression-tree", or "classification-tree"
        #[arg(long, default_value = "ols")]
        family: ModelFamily,

        /// Target column in the cleaned table
        #[arg(short, long, default_value = "Salary")]
        target: String,

        /// Predictor columns (comma-separated). Defaults to every column except
        /// the target and plus_minus.
        #[arg(short, long, value_delimiter = ',')]
        predictors: Vec<String>,

        /// Columns to leave out of the default predictor set (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Minimum node size before a split is attempted (tree families)
        #[arg(long, default_value = "20", value_parser = validate_min_split)]
        min_split: usize,

        /// Write the tree as a Graphviz file (tree families)
        #[arg(long)]
        dot: Option<PathBuf>,

        #[command(flatten)]
        cleaning: CleaningArgs,
    },
}

impl Cli {
    /// Get the input path for the full analysis.
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }
}

/// Sibling path of `input` with `suffix` appended to the stem, keeping the extension.
/// `data/players.csv` with `_clean` becomes `data/players_clean.csv`.
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv");
    parent.join(format!("{}{}.{}", stem, suffix, extension))
}

/// Validator for min_split parameters
fn validate_min_split(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value < 2 {
        Err(format!("min_split must be at least 2, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for the histogram bin count
fn validate_bins(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(1..=500).contains(&value) {
        Err(format!("bins must be between 1 and 500, got {}", value))
    } else {
        Ok(value)
    }
}
