//! Column pruning and feature construction for player-season tables
//!
//! The cleaner validates the raw schema, reads each row into a typed
//! [`RawPlayer`], transforms rows independently with [`clean_record`], and
//! assembles the surviving rows into the cleaned table. Row order is
//! preserved; the only rows removed are multi-team aggregates (and zero-game
//! rows when [`ZeroGamesPolicy::Exclude`] is selected).

use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::error::{PipelineError, PipelineResult};
use super::schema::{self, *};
use super::teams::{TeamMembership, MULTI_TEAM_MARKER};

/// What to do with per-game rates when a player has zero games played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroGamesPolicy {
    /// Keep the row; per-game rates are null.
    #[default]
    Null,
    /// Drop the row from the cleaned table.
    Exclude,
    /// Keep the row; per-game rates are 0.0.
    Zero,
}

impl std::fmt::Display for ZeroGamesPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZeroGamesPolicy::Null => write!(f, "null"),
            ZeroGamesPolicy::Exclude => write!(f, "exclude"),
            ZeroGamesPolicy::Zero => write!(f, "zero"),
        }
    }
}

impl std::str::FromStr for ZeroGamesPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "null" => Ok(ZeroGamesPolicy::Null),
            "exclude" => Ok(ZeroGamesPolicy::Exclude),
            "zero" => Ok(ZeroGamesPolicy::Zero),
            _ => Err(format!(
                "Unknown zero-games policy: '{}'. Use 'null', 'exclude', or 'zero'.",
                s
            )),
        }
    }
}

/// Immutable configuration passed into the cleaner.
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    pub membership: TeamMembership,
    pub multi_team_marker: String,
    pub zero_games: ZeroGamesPolicy,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            membership: TeamMembership::default(),
            multi_team_marker: MULTI_TEAM_MARKER.to_string(),
            zero_games: ZeroGamesPolicy::default(),
        }
    }
}

/// One raw row, read by column name. Values are optional until the row is
/// known to survive cleaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPlayer {
    /// Zero-based row index in the input table
    pub row: usize,
    pub player: Option<String>,
    pub team: Option<String>,
    pub age: Option<f64>,
    pub games_played: Option<f64>,
    pub goals: Option<f64>,
    pub assists: Option<f64>,
    pub points: Option<f64>,
    pub plus_minus: Option<f64>,
    pub penalty_minutes: Option<f64>,
    pub shots: Option<f64>,
    pub time_on_ice: Option<f64>,
    pub blocks: Option<f64>,
    pub hits: Option<f64>,
    pub faceoffs_won: Option<f64>,
    pub faceoffs_lost: Option<f64>,
    pub salary: Option<f64>,
    pub handed: Option<String>,
    pub center: Option<f64>,
    pub left_wing: Option<f64>,
    pub right_wing: Option<f64>,
}

/// One analysis-ready row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedPlayer {
    pub age: f64,
    pub games_played: f64,
    pub goals: f64,
    pub assists: f64,
    pub points: f64,
    pub plus_minus: f64,
    pub penalty_minutes: f64,
    pub hits: f64,
    pub blocks: f64,
    pub faceoffs_won: f64,
    pub faceoffs_lost: f64,
    pub handed: String,
    pub center: f64,
    pub left_wing: f64,
    pub right_wing: f64,
    pub shots_per_game: Option<f64>,
    pub toi_per_game: Option<f64>,
    pub canada: i32,
    pub west: i32,
    pub salary: f64,
}

/// Result of cleaning a single row.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Kept(CleanedPlayer),
    /// Aggregated season of a player traded mid-season
    MultiTeam,
    /// Zero games played under [`ZeroGamesPolicy::Exclude`]
    ZeroGames,
}

/// Counters and column bookkeeping for one cleaning run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleaningStats {
    pub input_rows: usize,
    pub input_columns: usize,
    pub multi_team_rows: usize,
    pub zero_games_rows: usize,
    pub zero_games_policy: ZeroGamesPolicy,
    pub output_rows: usize,
    pub output_columns: usize,
    pub removed_columns: Vec<String>,
    pub ignored_columns: Vec<String>,
}

/// The cleaned table together with its run statistics.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub df: DataFrame,
    pub stats: CleaningStats,
}

fn require(value: Option<f64>, column: &str, row: usize) -> PipelineResult<f64> {
    value.ok_or_else(|| PipelineError::MissingValue {
        column: column.to_string(),
        row,
    })
}

fn require_non_negative(value: Option<f64>, column: &str, row: usize) -> PipelineResult<f64> {
    let v = require(value, column, row)?;
    if v < 0.0 || !v.is_finite() {
        return Err(PipelineError::InvalidValue {
            column: column.to_string(),
            row,
            message: format!("expected a non-negative count, found {}", v),
        });
    }
    Ok(v)
}

/// Transform one raw row.
///
/// Pure: the outcome depends only on the row and the configuration.
pub fn clean_record(raw: &RawPlayer, config: &CleanerConfig) -> PipelineResult<RecordOutcome> {
    let row = raw.row;
    let team = raw.team.as_deref().ok_or_else(|| PipelineError::MissingValue {
        column: TEAM.to_string(),
        row,
    })?;

    if team == config.multi_team_marker {
        return Ok(RecordOutcome::MultiTeam);
    }

    let games_played = require_non_negative(raw.games_played, GAMES_PLAYED, row)?;
    let shots = require_non_negative(raw.shots, SHOTS, row)?;
    let time_on_ice = require_non_negative(raw.time_on_ice, TIME_ON_ICE, row)?;

    let (shots_per_game, toi_per_game) = if games_played > 0.0 {
        (Some(shots / games_played), Some(time_on_ice / games_played))
    } else {
        match config.zero_games {
            ZeroGamesPolicy::Null => (None, None),
            ZeroGamesPolicy::Zero => (Some(0.0), Some(0.0)),
            ZeroGamesPolicy::Exclude => return Ok(RecordOutcome::ZeroGames),
        }
    };

    let salary = require(raw.salary, SALARY, row)?;
    if salary <= 0.0 || !salary.is_finite() {
        return Err(PipelineError::InvalidValue {
            column: SALARY.to_string(),
            row,
            message: format!("salary must be strictly positive, found {}", salary),
        });
    }

    let handed = raw
        .handed
        .clone()
        .ok_or_else(|| PipelineError::MissingValue {
            column: HANDED.to_string(),
            row,
        })?;

    Ok(RecordOutcome::Kept(CleanedPlayer {
        age: require(raw.age, AGE, row)?,
        games_played,
        goals: require(raw.goals, GOALS, row)?,
        assists: require(raw.assists, ASSISTS, row)?,
        points: require(raw.points, POINTS, row)?,
        plus_minus: require(raw.plus_minus, PLUS_MINUS_RAW, row)?,
        penalty_minutes: require(raw.penalty_minutes, PENALTY_MINUTES, row)?,
        hits: require(raw.hits, HITS, row)?,
        blocks: require(raw.blocks, BLOCKS, row)?,
        faceoffs_won: require(raw.faceoffs_won, FACEOFFS_WON, row)?,
        faceoffs_lost: require(raw.faceoffs_lost, FACEOFFS_LOST, row)?,
        handed,
        center: require(raw.center, CENTER, row)?,
        left_wing: require(raw.left_wing, LEFT_WING, row)?,
        right_wing: require(raw.right_wing, RIGHT_WING, row)?,
        shots_per_game,
        toi_per_game,
        canada: config.membership.is_canadian(team) as i32,
        west: config.membership.is_western(team) as i32,
        salary,
    }))
}

/// Read a column as nullable floats. Numeric and boolean columns are cast;
/// string columns must parse strictly.
fn numeric_values(df: &DataFrame, name: &str) -> PipelineResult<Vec<Option<f64>>> {
    let column = df.column(name).map_err(|_| PipelineError::SchemaMismatch {
        missing: vec![name.to_string()],
    })?;
    let dtype = column.dtype().clone();

    let series = column.as_materialized_series();
    let castable =
        dtype.is_primitive_numeric() || matches!(dtype, DataType::Boolean | DataType::Null);
    let cast = if castable {
        series.cast(&DataType::Float64)?
    } else if dtype == DataType::String {
        series
            .strict_cast(&DataType::Float64)
            .map_err(|_| PipelineError::TypeMismatch {
                column: name.to_string(),
                expected: "numeric".to_string(),
                found: dtype.to_string(),
            })?
    } else {
        return Err(PipelineError::TypeMismatch {
            column: name.to_string(),
            expected: "numeric".to_string(),
            found: dtype.to_string(),
        });
    };

    Ok(cast.f64()?.into_iter().collect())
}

/// Read a column as nullable strings.
fn string_values(df: &DataFrame, name: &str) -> PipelineResult<Vec<Option<String>>> {
    let column = df.column(name).map_err(|_| PipelineError::SchemaMismatch {
        missing: vec![name.to_string()],
    })?;
    let cast = column.cast(&DataType::String)?;
    Ok(cast
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Read every row of a validated raw table into [`RawPlayer`] records.
pub fn extract_records(df: &DataFrame) -> PipelineResult<Vec<RawPlayer>> {
    schema::validate_schema(df)?;

    let player = string_values(df, PLAYER)?;
    let team = string_values(df, TEAM)?;
    let handed = string_values(df, HANDED)?;
    let age = numeric_values(df, AGE)?;
    let games_played = numeric_values(df, GAMES_PLAYED)?;
    let goals = numeric_values(df, GOALS)?;
    let assists = numeric_values(df, ASSISTS)?;
    let points = numeric_values(df, POINTS)?;
    let plus_minus = numeric_values(df, PLUS_MINUS_RAW)?;
    let penalty_minutes = numeric_values(df, PENALTY_MINUTES)?;
    let shots = numeric_values(df, SHOTS)?;
    let time_on_ice = numeric_values(df, TIME_ON_ICE)?;
    let blocks = numeric_values(df, BLOCKS)?;
    let hits = numeric_values(df, HITS)?;
    let faceoffs_won = numeric_values(df, FACEOFFS_WON)?;
    let faceoffs_lost = numeric_values(df, FACEOFFS_LOST)?;
    let salary = numeric_values(df, SALARY)?;
    let center = numeric_values(df, CENTER)?;
    let left_wing = numeric_values(df, LEFT_WING)?;
    let right_wing = numeric_values(df, RIGHT_WING)?;

    let records = (0..df.height())
        .map(|i| RawPlayer {
            row: i,
            player: player[i].clone(),
            team: team[i].clone(),
            age: age[i],
            games_played: games_played[i],
            goals: goals[i],
            assists: assists[i],
            points: points[i],
            plus_minus: plus_minus[i],
            penalty_minutes: penalty_minutes[i],
            shots: shots[i],
            time_on_ice: time_on_ice[i],
            blocks: blocks[i],
            hits: hits[i],
            faceoffs_won: faceoffs_won[i],
            faceoffs_lost: faceoffs_lost[i],
            salary: salary[i],
            handed: handed[i].clone(),
            center: center[i],
            left_wing: left_wing[i],
            right_wing: right_wing[i],
        })
        .collect();

    Ok(records)
}

/// Clean a slice of raw records, preserving input order.
///
/// Returns the surviving rows along with (multi-team, zero-games) counts.
pub fn clean_records(
    records: &[RawPlayer],
    config: &CleanerConfig,
) -> PipelineResult<(Vec<CleanedPlayer>, usize, usize)> {
    let outcomes: Vec<RecordOutcome> = records
        .par_iter()
        .map(|raw| clean_record(raw, config))
        .collect::<PipelineResult<Vec<_>>>()?;

    let mut kept = Vec::with_capacity(outcomes.len());
    let mut multi_team = 0usize;

    for (raw, outcome) in records.iter().zip(outcomes) {
        match outcome {
            RecordOutcome::Kept(player) => kept.push(player),
            RecordOutcome::MultiTeam => {
                multi_team += 1;
                debug!(
                    row = raw.row,
                    player = raw.player.as_deref().unwrap_or("?"),
                    "dropping multi-team row"
                );
            }
            RecordOutcome::ZeroGames => {
                debug!(
                    row = raw.row,
                    player = raw.player.as_deref().unwrap_or("?"),
                    "dropping zero-games row"
                );
            }
        }
    }

    let zero_games = records
        .iter()
        .filter(|raw| {
            raw.team.as_deref() != Some(config.multi_team_marker.as_str())
                && raw.games_played == Some(0.0)
        })
        .count();

    Ok((kept, multi_team, zero_games))
}

/// Assemble cleaned rows into a table with the [`CLEANED_COLUMNS`] layout.
pub fn to_dataframe(players: &[CleanedPlayer]) -> PipelineResult<DataFrame> {
    fn floats(players: &[CleanedPlayer], f: impl Fn(&CleanedPlayer) -> f64) -> Vec<f64> {
        players.iter().map(f).collect()
    }

    let columns = vec![
        Column::new(AGE.into(), floats(players, |p| p.age)),
        Column::new(GAMES_PLAYED.into(), floats(players, |p| p.games_played)),
        Column::new(GOALS.into(), floats(players, |p| p.goals)),
        Column::new(ASSISTS.into(), floats(players, |p| p.assists)),
        Column::new(POINTS.into(), floats(players, |p| p.points)),
        Column::new(PLUS_MINUS.into(), floats(players, |p| p.plus_minus)),
        Column::new(PENALTY_MINUTES.into(), floats(players, |p| p.penalty_minutes)),
        Column::new(HITS.into(), floats(players, |p| p.hits)),
        Column::new(BLOCKS.into(), floats(players, |p| p.blocks)),
        Column::new(FACEOFFS_WON.into(), floats(players, |p| p.faceoffs_won)),
        Column::new(FACEOFFS_LOST.into(), floats(players, |p| p.faceoffs_lost)),
        Column::new(
            HANDED.into(),
            players.iter().map(|p| p.handed.clone()).collect::<Vec<String>>(),
        ),
        Column::new(CENTER.into(), floats(players, |p| p.center)),
        Column::new(LEFT_WING.into(), floats(players, |p| p.left_wing)),
        Column::new(RIGHT_WING.into(), floats(players, |p| p.right_wing)),
        Column::new(
            SHOTS_PER_GAME.into(),
            players
                .iter()
                .map(|p| p.shots_per_game)
                .collect::<Vec<Option<f64>>>(),
        ),
        Column::new(
            TOI_PER_GAME.into(),
            players
                .iter()
                .map(|p| p.toi_per_game)
                .collect::<Vec<Option<f64>>>(),
        ),
        Column::new(
            CANADA.into(),
            players.iter().map(|p| p.canada).collect::<Vec<i32>>(),
        ),
        Column::new(WEST.into(), players.iter().map(|p| p.west).collect::<Vec<i32>>()),
        Column::new(SALARY.into(), floats(players, |p| p.salary)),
    ];

    Ok(DataFrame::new(columns)?)
}

/// Clean a raw player-season table.
///
/// Fails with `SchemaMismatch` when a referenced column is absent, which
/// includes running the cleaner on its own output.
pub fn clean_dataset(df: &DataFrame, config: &CleanerConfig) -> PipelineResult<CleanedTable> {
    let records = extract_records(df)?;
    let (players, multi_team_rows, zero_games_rows) = clean_records(&records, config)?;
    let cleaned = to_dataframe(&players)?;

    let stats = CleaningStats {
        input_rows: df.height(),
        input_columns: df.width(),
        multi_team_rows,
        zero_games_rows,
        zero_games_policy: config.zero_games,
        output_rows: cleaned.height(),
        output_columns: cleaned.width(),
        removed_columns: schema::removed_columns()
            .into_iter()
            .map(String::from)
            .collect(),
        ignored_columns: schema::unreferenced_columns(df),
    };

    info!(
        input_rows = stats.input_rows,
        output_rows = stats.output_rows,
        multi_team_rows = stats.multi_team_rows,
        zero_games_rows = stats.zero_games_rows,
        "cleaning complete"
    );

    Ok(CleanedTable { df: cleaned, stats })
}
