//! `capstat clean`: load, clean, and write the analysis-ready table

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use crate::cli::{confirm_overwrite, derive_output_path, CleaningArgs};
use crate::pipeline::{
    clean_dataset, load_dataset_with_progress, save_dataset, CleanedTable, CleanerConfig,
    TeamMembership,
};
use crate::report::CleaningSummary;
use crate::utils::{print_info, print_success, with_spinner};

/// Build the cleaner configuration from command-line options
pub fn cleaner_config(args: &CleaningArgs) -> Result<CleanerConfig> {
    let membership = match &args.teams {
        Some(path) => TeamMembership::from_json_file(path)
            .with_context(|| format!("Failed to load team sets from {}", path.display()))?,
        None => TeamMembership::default(),
    };

    Ok(CleanerConfig {
        membership,
        zero_games: args.zero_games,
        ..CleanerConfig::default()
    })
}

/// Load `input` and run the cleaner, with spinners for both steps
pub fn load_and_clean(
    input: &Path,
    args: &CleaningArgs,
    config: &CleanerConfig,
) -> Result<CleanedTable> {
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(input, args.infer_schema_length)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    print_info(&format!(
        "{} rows × {} columns ({:.2} MB)",
        style(rows).yellow(),
        style(cols).yellow(),
        memory_mb
    ));

    let cleaned = with_spinner(
        "Cleaning player table...",
        || clean_dataset(&df, config),
        |cleaned| {
            format!(
                "Cleaned table: {} rows × {} columns",
                cleaned.stats.output_rows, cleaned.stats.output_columns
            )
        },
    )
    .context("Failed to clean player table")?;

    Ok(cleaned)
}

/// Run the clean subcommand
pub fn run_clean(
    input: &Path,
    output: Option<&Path>,
    args: &CleaningArgs,
    no_confirm: bool,
) -> Result<()> {
    let config = cleaner_config(args)?;
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => derive_output_path(input, "_clean"),
    };

    println!("\n {} Cleaning player table", style("◆").cyan().bold());
    println!("   Input:  {}", style(input.display()).dim());
    println!("   Output: {}", style(output_path.display()).dim());
    println!();

    let mut cleaned = load_and_clean(input, args, &config)?;
    CleaningSummary::new(&cleaned.stats).display();

    if !confirm_overwrite(&output_path, no_confirm)? {
        println!("Cancelled by user.");
        return Ok(());
    }

    save_dataset(&mut cleaned.df, &output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!();
    print_success(&format!("Cleaned table written to {}", output_path.display()));
    Ok(())
}
