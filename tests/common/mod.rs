//! Shared test utilities and fixture generators
#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

/// Teams used by generated fixtures: a mix of Canadian, Western, and Eastern clubs
pub const FIXTURE_TEAMS: [&str; 12] = [
    "EDM", "TOR", "BOS", "CHI", "NYR", "VAN", "MTL", "DAL", "TBL", "COL", "PIT", "CGY",
];

/// One raw player-season. Strength splits, ratios, and ATOI are derived when
/// the table is built.
#[derive(Debug, Clone)]
pub struct PlayerRow {
    pub player: String,
    pub team: String,
    pub age: i64,
    pub games_played: i64,
    pub goals: i64,
    pub assists: i64,
    pub plus_minus: i64,
    pub penalty_minutes: i64,
    pub shots: i64,
    /// Total minutes on ice
    pub time_on_ice: i64,
    pub blocks: i64,
    pub hits: i64,
    pub faceoffs_won: i64,
    pub faceoffs_lost: i64,
    pub salary: i64,
    pub handed: String,
    /// One of "C", "LW", "RW", "D"
    pub position: String,
}

impl PlayerRow {
    /// A plausible forward on `team` with fixed stats
    pub fn new(player: &str, team: &str) -> Self {
        Self {
            player: player.to_string(),
            team: team.to_string(),
            age: 27,
            games_played: 80,
            goals: 20,
            assists: 30,
            plus_minus: 5,
            penalty_minutes: 24,
            shots: 200,
            time_on_ice: 1440,
            blocks: 30,
            hits: 60,
            faceoffs_won: 400,
            faceoffs_lost: 380,
            salary: 2_500_000,
            handed: "L".to_string(),
            position: "C".to_string(),
        }
    }

    pub fn games(mut self, games_played: i64) -> Self {
        self.games_played = games_played;
        self
    }

    pub fn shots(mut self, shots: i64) -> Self {
        self.shots = shots;
        self
    }

    pub fn toi(mut self, time_on_ice: i64) -> Self {
        self.time_on_ice = time_on_ice;
        self
    }

    pub fn salary(mut self, salary: i64) -> Self {
        self.salary = salary;
        self
    }

    pub fn position(mut self, position: &str) -> Self {
        self.position = position.to_string();
        self
    }
}

fn flag(rows: &[PlayerRow], pos: &str) -> Vec<i64> {
    rows.iter().map(|r| (r.position == pos) as i64).collect()
}

fn ints(rows: &[PlayerRow], f: impl Fn(&PlayerRow) -> i64) -> Vec<i64> {
    rows.iter().map(f).collect()
}

/// Build a raw table with all 32 input columns in source order
pub fn players_dataframe(rows: &[PlayerRow]) -> DataFrame {
    let columns = vec![
        Column::new("Rk".into(), (1..=rows.len() as i64).collect::<Vec<i64>>()),
        Column::new(
            "Player".into(),
            rows.iter().map(|r| r.player.clone()).collect::<Vec<String>>(),
        ),
        Column::new("Age".into(), ints(rows, |r| r.age)),
        Column::new(
            "Tm".into(),
            rows.iter().map(|r| r.team.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            "Pos".into(),
            rows.iter().map(|r| r.position.clone()).collect::<Vec<String>>(),
        ),
        Column::new("GP".into(), ints(rows, |r| r.games_played)),
        Column::new("G".into(), ints(rows, |r| r.goals)),
        Column::new("A".into(), ints(rows, |r| r.assists)),
        Column::new("PTS".into(), ints(rows, |r| r.goals + r.assists)),
        Column::new("+/-".into(), ints(rows, |r| r.plus_minus)),
        Column::new("PIM".into(), ints(rows, |r| r.penalty_minutes)),
        Column::new("EVG".into(), ints(rows, |r| r.goals * 3 / 4)),
        Column::new("PPG".into(), ints(rows, |r| r.goals - r.goals * 3 / 4)),
        Column::new("SHG".into(), ints(rows, |_| 0)),
        Column::new("EVA".into(), ints(rows, |r| r.assists * 2 / 3)),
        Column::new("PPA".into(), ints(rows, |r| r.assists - r.assists * 2 / 3)),
        Column::new("SHA".into(), ints(rows, |_| 0)),
        Column::new("S".into(), ints(rows, |r| r.shots)),
        Column::new(
            "S%".into(),
            rows.iter()
                .map(|r| (r.shots > 0).then(|| 100.0 * r.goals as f64 / r.shots as f64))
                .collect::<Vec<Option<f64>>>(),
        ),
        Column::new("TOI".into(), ints(rows, |r| r.time_on_ice)),
        Column::new(
            "ATOI".into(),
            rows.iter()
                .map(|r| {
                    let per_game = if r.games_played > 0 {
                        r.time_on_ice * 60 / r.games_played
                    } else {
                        0
                    };
                    format!("{}:{:02}", per_game / 60, per_game % 60)
                })
                .collect::<Vec<String>>(),
        ),
        Column::new("BLK".into(), ints(rows, |r| r.blocks)),
        Column::new("HIT".into(), ints(rows, |r| r.hits)),
        Column::new("FOW".into(), ints(rows, |r| r.faceoffs_won)),
        Column::new("FOL".into(), ints(rows, |r| r.faceoffs_lost)),
        Column::new(
            "FO%".into(),
            rows.iter()
                .map(|r| {
                    let total = r.faceoffs_won + r.faceoffs_lost;
                    (total > 0).then(|| 100.0 * r.faceoffs_won as f64 / total as f64)
                })
                .collect::<Vec<Option<f64>>>(),
        ),
        Column::new("Salary".into(), ints(rows, |r| r.salary)),
        Column::new(
            "Handed".into(),
            rows.iter().map(|r| r.handed.clone()).collect::<Vec<String>>(),
        ),
        Column::new("C".into(), flag(rows, "C")),
        Column::new("LW".into(), flag(rows, "LW")),
        Column::new("RW".into(), flag(rows, "RW")),
        Column::new("D".into(), flag(rows, "D")),
    ];

    DataFrame::new(columns).unwrap()
}

/// Seeded random player-seasons with salary loosely driven by scoring and ice time
pub fn generated_players(n: usize, seed: u64) -> Vec<PlayerRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    let positions = ["C", "LW", "RW", "D"];

    (0..n)
        .map(|i| {
            let position = positions[i % positions.len()];
            let games_played = rng.gen_range(20..=82);
            let toi_per_game: f64 = if position == "D" {
                rng.gen_range(16.0..25.0)
            } else {
                rng.gen_range(10.0..21.0)
            };
            let goals = rng.gen_range(0..40);
            let assists = rng.gen_range(0..55);
            let shots = goals * 7 + rng.gen_range(10..80);
            let (faceoffs_won, faceoffs_lost) = if position == "C" {
                (rng.gen_range(100..900), rng.gen_range(100..900))
            } else {
                (rng.gen_range(0..20), rng.gen_range(0..20))
            };
            let noise: i64 = rng.gen_range(-400_000..400_000);
            let salary = 750_000
                + 45_000 * (goals + assists)
                + (120_000.0 * toi_per_game) as i64
                + noise;

            PlayerRow {
                player: format!("Player {}", i + 1),
                team: FIXTURE_TEAMS[i % FIXTURE_TEAMS.len()].to_string(),
                age: rng.gen_range(19..39),
                games_played,
                goals,
                assists,
                plus_minus: rng.gen_range(-25..30),
                penalty_minutes: rng.gen_range(0..120),
                shots,
                time_on_ice: (toi_per_game * games_played as f64).round() as i64,
                blocks: rng.gen_range(0..150),
                hits: rng.gen_range(0..250),
                faceoffs_won,
                faceoffs_lost,
                salary: salary.max(750_000),
                handed: if rng.gen_bool(0.6) { "L" } else { "R" }.to_string(),
                position: position.to_string(),
            }
        })
        .collect()
}

/// Raw table of `n` generated players
pub fn create_player_dataframe(n: usize) -> DataFrame {
    players_dataframe(&generated_players(n, 42))
}

/// The three-row example: a traded player's TOT row followed by two single-team rows
pub fn create_traded_player_dataframe() -> DataFrame {
    players_dataframe(&[
        PlayerRow::new("Traded Player", "TOT"),
        PlayerRow::new("Oiler", "EDM").games(82).shots(164).toi(1640),
        PlayerRow::new("Bruin", "BOS").games(50).shots(100).toi(900),
    ])
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(
        rows, expected_rows,
        "Row count mismatch: expected {}, got {}",
        expected_rows, rows
    );
    assert_eq!(
        cols, expected_cols,
        "Column count mismatch: expected {}, got {}",
        expected_cols, cols
    );
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

/// Values of a Float64 column, nulls as `None`
pub fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}
