//! capstat: NHL salary analysis CLI
//!
//! Loads a player-season table, cleans it, describes the key distributions,
//! and fits the standard set of salary and conference models.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use capstat::cli::clean::{cleaner_config, load_and_clean};
use capstat::cli::describe::{print_distribution, write_svg, DescribeOptions};
use capstat::cli::fit::{write_dot, FitOptions};
use capstat::cli::{self, confirm_overwrite, Cli, Commands};
use capstat::pipeline::{
    describe_field, fit_model, save_dataset, standard_plan, DescribeField, Distribution,
};
use capstat::report::{
    display_models, export_analysis_report, AnalysisReport, CleaningSummary, ModelEntry,
    ReportParams,
};
use capstat::utils::{
    create_model_progress, finish_model_progress, init_tracing, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
    print_warning, ConfigCard,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Clean {
                input,
                output,
                cleaning,
            } => cli::clean::run_clean(input, output.as_deref(), cleaning, cli.no_confirm),
            Commands::Describe {
                input,
                field,
                kind,
                bins,
                svg,
                cleaning,
            } => cli::describe::run_describe(
                input,
                &DescribeOptions {
                    field: field.as_deref(),
                    kind: *kind,
                    bins: *bins,
                    svg: svg.as_deref(),
                },
                cleaning,
                cli.no_confirm,
            ),
            Commands::Fit {
                input,
                family,
                target,
                predictors,
                exclude,
                min_split,
                dot,
                cleaning,
            } => cli::fit::run_fit(
                input,
                &FitOptions {
                    family: *family,
                    target,
                    predictors,
                    exclude,
                    min_split: *min_split,
                    dot: dot.as_deref(),
                },
                cleaning,
                cli.no_confirm,
            ),
        };
    }

    // Full analysis - require input
    let input = cli.input().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;

    run_analysis(&cli, input)
}

fn run_analysis(cli: &Cli, input: &Path) -> Result<()> {
    // Validate the team override before any heavy work
    let config = cleaner_config(&cli.cleaning)?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&ConfigCard {
        input,
        output: cli.output.as_deref(),
        report: cli.report.as_deref(),
        zero_games: cli.cleaning.zero_games.to_string(),
        fine_min_split: cli.min_split,
        teams: cli.cleaning.teams.as_deref(),
    });

    // Step 1: Load and clean
    print_step_header(1, "Load & Clean");
    let step_start = Instant::now();
    let mut cleaned = load_and_clean(input, &cli.cleaning, &config)?;
    CleaningSummary::new(&cleaned.stats).display();

    if cleaned.stats.zero_games_rows > 0 {
        print_count(
            "player(s) with zero games played",
            cleaned.stats.zero_games_rows,
            Some(&format!("(policy: {})", cleaned.stats.zero_games_policy)),
        );
    }

    if let Some(output) = &cli.output {
        if confirm_overwrite(output, cli.no_confirm)? {
            save_dataset(&mut cleaned.df, output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            print_success(&format!("Cleaned table written to {}", output.display()));
        }
    }
    print_step_time(step_start.elapsed());

    // Step 2: Distributions
    print_step_header(2, "Distributions");
    let step_start = Instant::now();
    let mut distributions: Vec<Distribution> = Vec::new();

    if let Some(dir) = &cli.svg_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    for field in DescribeField::ALL {
        let distribution = describe_field(&cleaned.df, field.column(), field.default_kind(), None)
            .with_context(|| format!("Failed to describe '{}'", field))?;
        print_distribution(&distribution);

        if let Some(dir) = &cli.svg_dir {
            let path = dir.join(format!("{}_{}.svg", field, distribution.kind()));
            write_svg(&distribution, &path)?;
            print_info(&format!("Plot written to {}", style(path.display()).dim()));
        }
        distributions.push(distribution);
    }
    print_step_time(step_start.elapsed());

    // Step 3: Models
    print_step_header(3, "Models");
    let step_start = Instant::now();
    let plan = standard_plan(cli.min_split);

    let progress = create_model_progress(plan.len());
    let mut entries = Vec::with_capacity(plan.len());
    for spec in &plan {
        progress.set_message(spec.name.clone());
        entries.push(ModelEntry::new(
            spec.name.clone(),
            spec.family,
            fit_model(&cleaned.df, spec),
        ));
        progress.inc(1);
    }

    let failed = entries.iter().filter(|e| e.model().is_none()).count();
    finish_model_progress(&progress, entries.len() - failed, failed);

    display_models(&entries);

    if let Some(dir) = &cli.dot_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        println!();
        for entry in &entries {
            if let Some(model) = entry.model() {
                let path = dir.join(format!("{}.dot", entry.name));
                if write_dot(model, &path)? {
                    print_info(&format!("Tree written to {}", style(path.display()).dim()));
                }
            }
        }
    }
    print_step_time(step_start.elapsed());

    // Step 4: Report
    if let Some(report_path) = &cli.report {
        print_step_header(4, "Report");
        let input_file = input.display().to_string();
        let report = AnalysisReport::new(
            ReportParams {
                input_file: &input_file,
                zero_games_policy: config.zero_games,
                canadian_teams: config.membership.canadian_teams().map(String::from).collect(),
                western_teams: config.membership.western_teams().map(String::from).collect(),
            },
            &cleaned.stats,
            &distributions,
            &entries,
        );
        export_analysis_report(&report, report_path)?;
        print_success(&format!("Analysis report written to {}", report_path.display()));
    }

    if failed > 0 {
        print_warning(&format!(
            "{} model(s) could not be fitted; see the overview above",
            failed
        ));
    }

    print_completion();
    Ok(())
}
