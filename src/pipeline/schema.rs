//! Column names of the raw player-season table and of the cleaned table
//!
//! Columns are always matched by name, never by position.

use polars::prelude::DataFrame;

use super::error::{PipelineError, PipelineResult};

pub const RANK: &str = "Rk";
pub const PLAYER: &str = "Player";
pub const AGE: &str = "Age";
pub const TEAM: &str = "Tm";
pub const POSITION: &str = "Pos";
pub const GAMES_PLAYED: &str = "GP";
pub const GOALS: &str = "G";
pub const ASSISTS: &str = "A";
pub const POINTS: &str = "PTS";
pub const PLUS_MINUS_RAW: &str = "+/-";
pub const PENALTY_MINUTES: &str = "PIM";
pub const SHOTS: &str = "S";
pub const SHOT_PCT: &str = "S%";
pub const TIME_ON_ICE: &str = "TOI";
pub const AVG_TIME_ON_ICE: &str = "ATOI";
pub const BLOCKS: &str = "BLK";
pub const HITS: &str = "HIT";
pub const FACEOFFS_WON: &str = "FOW";
pub const FACEOFFS_LOST: &str = "FOL";
pub const FACEOFF_PCT: &str = "FO%";
pub const SALARY: &str = "Salary";
pub const HANDED: &str = "Handed";
pub const CENTER: &str = "C";
pub const LEFT_WING: &str = "LW";
pub const RIGHT_WING: &str = "RW";
pub const DEFENSE: &str = "D";

/// Even-strength, power-play and short-handed goal/assist splits.
pub const STRENGTH_SPLIT_COLUMNS: [&str; 6] = ["EVG", "PPG", "SHG", "EVA", "PPA", "SHA"];

/// Ratio columns that are redundant with the retained raw counts.
pub const REDUNDANT_RATIO_COLUMNS: [&str; 3] = [SHOT_PCT, AVG_TIME_ON_ICE, FACEOFF_PCT];

pub const PLUS_MINUS: &str = "plus_minus";
pub const SHOTS_PER_GAME: &str = "shots_per_game";
pub const TOI_PER_GAME: &str = "toi_per_game";
pub const CANADA: &str = "canada";
pub const WEST: &str = "west";

/// Every column the cleaner reads or explicitly removes.
pub const REQUIRED_COLUMNS: [&str; 32] = [
    RANK,
    PLAYER,
    AGE,
    TEAM,
    POSITION,
    GAMES_PLAYED,
    GOALS,
    ASSISTS,
    POINTS,
    PLUS_MINUS_RAW,
    PENALTY_MINUTES,
    "EVG",
    "PPG",
    "SHG",
    "EVA",
    "PPA",
    "SHA",
    SHOTS,
    SHOT_PCT,
    TIME_ON_ICE,
    AVG_TIME_ON_ICE,
    BLOCKS,
    HITS,
    FACEOFFS_WON,
    FACEOFFS_LOST,
    FACEOFF_PCT,
    SALARY,
    HANDED,
    CENTER,
    LEFT_WING,
    RIGHT_WING,
    DEFENSE,
];

/// Columns removed by the cleaner without being carried forward.
pub fn removed_columns() -> Vec<&'static str> {
    let mut removed: Vec<&'static str> = STRENGTH_SPLIT_COLUMNS.to_vec();
    removed.extend(REDUNDANT_RATIO_COLUMNS);
    removed.extend([SHOTS, TIME_ON_ICE, POSITION, DEFENSE, RANK, PLAYER, TEAM]);
    removed
}

/// Columns of the cleaned table, in output order.
pub const CLEANED_COLUMNS: [&str; 20] = [
    AGE,
    GAMES_PLAYED,
    GOALS,
    ASSISTS,
    POINTS,
    PLUS_MINUS,
    PENALTY_MINUTES,
    HITS,
    BLOCKS,
    FACEOFFS_WON,
    FACEOFFS_LOST,
    HANDED,
    CENTER,
    LEFT_WING,
    RIGHT_WING,
    SHOTS_PER_GAME,
    TOI_PER_GAME,
    CANADA,
    WEST,
    SALARY,
];

/// Check that every required raw column is present.
///
/// Returns `SchemaMismatch` listing all absent columns, in required order.
pub fn validate_schema(df: &DataFrame) -> PipelineResult<()> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !present.iter().any(|p| p == *col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::SchemaMismatch { missing })
    }
}

/// Columns present in the input that the cleaner neither reads nor removes.
pub fn unreferenced_columns(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .filter(|name| !REQUIRED_COLUMNS.contains(&name.as_str()))
        .collect()
}
