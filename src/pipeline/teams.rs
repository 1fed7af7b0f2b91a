//! Team membership tables used to derive the `canada` and `west` flags

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};

/// Team codes of the seven Canadian franchises.
pub const CANADIAN_TEAMS: [&str; 7] = ["EDM", "TOR", "CGY", "WPG", "VAN", "MTL", "OTT"];

/// Team codes of the fifteen Western Conference franchises.
pub const WESTERN_TEAMS: [&str; 15] = [
    "EDM", "CHI", "LAK", "DAL", "ANA", "NSH", "MIN", "STL", "SJS", "CGY", "VEG", "ARI", "COL",
    "WPG", "VAN",
];

/// Marker in the team column for a player's aggregated multi-team season.
pub const MULTI_TEAM_MARKER: &str = "TOT";

/// Immutable membership sets handed to the cleaner.
///
/// Lookups are exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    canada: BTreeSet<String>,
    west: BTreeSet<String>,
}

impl Default for TeamMembership {
    fn default() -> Self {
        Self::new(CANADIAN_TEAMS, WESTERN_TEAMS)
    }
}

impl TeamMembership {
    pub fn new<C, W>(canada: C, west: W) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        W: IntoIterator,
        W::Item: Into<String>,
    {
        Self {
            canada: canada.into_iter().map(Into::into).collect(),
            west: west.into_iter().map(Into::into).collect(),
        }
    }

    /// Load an override from a JSON file of the form
    /// `{"canada": [...], "west": [...]}`.
    pub fn from_json_file(path: &Path) -> PipelineResult<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| PipelineError::data_access(path, e))?;
        let membership: TeamMembership = serde_json::from_str(&text)
            .map_err(|e| PipelineError::data_access(path, format!("invalid JSON: {}", e)))?;

        if membership.canada.is_empty() && membership.west.is_empty() {
            return Err(PipelineError::InvalidConfig(format!(
                "team membership file {} defines no teams",
                path.display()
            )));
        }

        Ok(membership)
    }

    pub fn is_canadian(&self, team: &str) -> bool {
        self.canada.contains(team)
    }

    pub fn is_western(&self, team: &str) -> bool {
        self.west.contains(team)
    }

    pub fn canadian_teams(&self) -> impl Iterator<Item = &str> {
        self.canada.iter().map(String::as_str)
    }

    pub fn western_teams(&self) -> impl Iterator<Item = &str> {
        self.west.iter().map(String::as_str)
    }
}
