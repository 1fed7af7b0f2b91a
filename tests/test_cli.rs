//! Tests for CLI argument parsing

use capstat::cli::clean::{cleaner_config, load_and_clean};
use capstat::cli::{derive_output_path, Cli, Commands};
use capstat::pipeline::{ModelFamily, PlotKind, ZeroGamesPolicy};
use clap::Parser;
use std::path::{Path, PathBuf};

#[path = "common/mod.rs"]
mod common;

use common::{players_dataframe, PlayerRow};

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["capstat", "-i", "players.csv"]);

    assert!(cli.command.is_none());
    assert_eq!(cli.input(), Some(&PathBuf::from("players.csv")));
    assert_eq!(cli.min_split, 5, "Default fine-tree min split should be 5");
    assert_eq!(cli.cleaning.zero_games, ZeroGamesPolicy::Null);
    assert_eq!(
        cli.cleaning.infer_schema_length, 10000,
        "Default schema inference should be 10000"
    );
    assert!(cli.cleaning.teams.is_none());
    assert!(cli.output.is_none());
    assert!(cli.report.is_none());
    assert!(!cli.no_confirm, "Default no_confirm should be false");
    assert!(!cli.debug);
}

#[test]
fn test_cli_analysis_overrides() {
    let cli = Cli::parse_from([
        "capstat",
        "-i",
        "players.csv",
        "-o",
        "clean.parquet",
        "--report",
        "report.json",
        "--svg-dir",
        "plots",
        "--dot-dir",
        "trees",
        "--min-split",
        "8",
        "--zero-games",
        "exclude",
        "--teams",
        "teams.json",
        "--no-confirm",
        "--debug",
    ]);

    assert_eq!(cli.output, Some(PathBuf::from("clean.parquet")));
    assert_eq!(cli.report, Some(PathBuf::from("report.json")));
    assert_eq!(cli.svg_dir, Some(PathBuf::from("plots")));
    assert_eq!(cli.dot_dir, Some(PathBuf::from("trees")));
    assert_eq!(cli.min_split, 8);
    assert_eq!(cli.cleaning.zero_games, ZeroGamesPolicy::Exclude);
    assert_eq!(cli.cleaning.teams, Some(PathBuf::from("teams.json")));
    assert!(cli.no_confirm);
    assert!(cli.debug);
}

#[test]
fn test_min_split_validation() {
    let result = Cli::try_parse_from(["capstat", "-i", "players.csv", "--min-split", "1"]);
    assert!(result.is_err(), "min_split below 2 should be rejected");

    let result = Cli::try_parse_from(["capstat", "-i", "players.csv", "--min-split", "abc"]);
    assert!(result.is_err());
}

#[test]
fn test_invalid_zero_games_policy() {
    let result = Cli::try_parse_from(["capstat", "-i", "players.csv", "--zero-games", "drop"]);
    assert!(result.is_err());
}

#[test]
fn test_clean_subcommand() {
    let cli = Cli::parse_from(["capstat", "clean", "players.csv", "out.csv", "--no-confirm"]);

    match cli.command {
        Some(Commands::Clean {
            input,
            output,
            cleaning,
        }) => {
            assert_eq!(input, PathBuf::from("players.csv"));
            assert_eq!(output, Some(PathBuf::from("out.csv")));
            assert_eq!(cleaning.zero_games, ZeroGamesPolicy::Null);
        }
        other => panic!("expected clean subcommand, got {:?}", other),
    }
    assert!(cli.no_confirm);
}

#[test]
fn test_describe_subcommand() {
    let cli = Cli::parse_from([
        "capstat", "describe", "players.csv", "--field", "salary", "--kind", "histogram",
        "--bins", "12", "--svg", "salary.svg",
    ]);

    match cli.command {
        Some(Commands::Describe {
            field,
            kind,
            bins,
            svg,
            ..
        }) => {
            assert_eq!(field.as_deref(), Some("salary"));
            assert_eq!(kind, Some(PlotKind::Histogram));
            assert_eq!(bins, Some(12));
            assert_eq!(svg, Some(PathBuf::from("salary.svg")));
        }
        other => panic!("expected describe subcommand, got {:?}", other),
    }
}

#[test]
fn test_describe_bins_validation() {
    let result = Cli::try_parse_from(["capstat", "describe", "players.csv", "--bins", "0"]);
    assert!(result.is_err());
}

#[test]
fn test_fit_subcommand_defaults_and_lists() {
    let cli = Cli::parse_from([
        "capstat",
        "fit",
        "players.csv",
        "--family",
        "regression-tree",
        "--predictors",
        "Age,PTS,toi_per_game",
    ]);

    match cli.command {
        Some(Commands::Fit {
            family,
            target,
            predictors,
            exclude,
            min_split,
            dot,
            ..
        }) => {
            assert_eq!(family, ModelFamily::RegressionTree);
            assert_eq!(target, "Salary");
            assert_eq!(predictors, vec!["Age", "PTS", "toi_per_game"]);
            assert!(exclude.is_empty());
            assert_eq!(min_split, 20);
            assert!(dot.is_none());
        }
        other => panic!("expected fit subcommand, got {:?}", other),
    }
}

#[test]
fn test_fit_rejects_unknown_family() {
    let result = Cli::try_parse_from(["capstat", "fit", "players.csv", "--family", "forest"]);
    assert!(result.is_err());
}

#[test]
fn test_output_path_derivation() {
    assert_eq!(
        derive_output_path(Path::new("/path/to/players.csv"), "_clean"),
        PathBuf::from("/path/to/players_clean.csv")
    );
    assert_eq!(
        derive_output_path(Path::new("season.parquet"), "_clean"),
        PathBuf::from("season_clean.parquet")
    );
}

#[test]
fn test_load_and_clean_uses_given_config() {
    let mut df = players_dataframe(&[
        PlayerRow::new("Oiler", "EDM"),
        PlayerRow::new("Bruin", "BOS"),
    ]);
    let (temp_dir, csv_path) = common::create_temp_csv(&mut df);
    let teams_path = temp_dir.path().join("teams.json");
    std::fs::write(&teams_path, r#"{"canada": ["BOS"], "west": ["BOS"]}"#).unwrap();

    let cli = Cli::parse_from([
        "capstat",
        "-i",
        csv_path.to_str().unwrap(),
        "--teams",
        teams_path.to_str().unwrap(),
    ]);
    let config = cleaner_config(&cli.cleaning).unwrap();
    let cleaned = load_and_clean(&csv_path, &cli.cleaning, &config).unwrap();

    let canada: Vec<Option<i32>> =
        cleaned.df.column("canada").unwrap().i32().unwrap().into_iter().collect();
    assert_eq!(canada, vec![Some(0), Some(1)]);
}

#[test]
fn test_cleaner_config_rejects_missing_teams_file() {
    let cli = Cli::parse_from([
        "capstat",
        "-i",
        "players.csv",
        "--teams",
        "/nonexistent/teams.json",
    ]);

    let err = cleaner_config(&cli.cleaning).unwrap_err();
    assert!(err.to_string().contains("Failed to load team sets"));
}
