//! Season range and team filtering over a normalized table.

use log::debug;
use serde::Serialize;
use std::collections::HashSet;

use crate::error::{CricError, CricResult};
use crate::innings::InningsTable;

/// Teams selected by default when no team list is configured.
pub const DEFAULT_TEAMS: &[&str] = &[
    "Afghanistan",
    "Australia",
    "Bangladesh",
    "England",
    "India",
    "New Zealand",
    "Pakistan",
    "South Africa",
    "Sri Lanka",
    "West Indies",
];

/// An inclusive season range plus a set of batting teams.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub start_season: String,
    pub end_season: String,
    pub teams: Vec<String>,
}

impl Selection {
    pub fn new(
        start_season: impl Into<String>,
        end_season: impl Into<String>,
        teams: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            start_season: start_season.into(),
            end_season: end_season.into(),
            teams: teams.into_iter().map(Into::into).collect(),
        }
    }

    /// Whole season range and every batting team in the table.
    pub fn everything(table: &InningsTable) -> Option<Self> {
        let seasons = table.seasons();
        Some(Self::new(seasons.first()?, seasons.last()?, table.teams()))
    }

    /// Whole season range and the given default teams that actually appear in the table.
    pub fn default_for<S: AsRef<str>>(table: &InningsTable, default_teams: &[S]) -> Option<Self> {
        let seasons = table.seasons();
        let present: HashSet<String> = table.teams().into_iter().collect();
        let teams = default_teams
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| present.contains(*t))
            .map(String::from)
            .collect::<Vec<_>>();
        Some(Self::new(seasons.first()?, seasons.last()?, teams))
    }

    /// Rows whose batting team is selected and whose season ordinal lies in the range.
    ///
    /// Endpoints are resolved against the table's season sequence. A start after the end
    /// yields an empty table rather than an error.
    pub fn apply(&self, table: &InningsTable) -> CricResult<InningsTable> {
        let seasons = table.seasons();
        let start = seasons
            .ordinal(&self.start_season)
            .ok_or_else(|| CricError::UnknownSeason(self.start_season.clone()))?;
        let end = seasons
            .ordinal(&self.end_season)
            .ok_or_else(|| CricError::UnknownSeason(self.end_season.clone()))?;

        let teams: HashSet<&str> = self.teams.iter().map(String::as_str).collect();
        let rows = table
            .iter()
            .filter(|row| teams.contains(row.batting_team.as_str()))
            .filter(|row| {
                seasons
                    .ordinal(&row.season)
                    .is_some_and(|i| start <= i && i <= end)
            })
            .cloned()
            .collect::<Vec<_>>();

        debug!(
            "selection {}..={} over {} team(s) kept {} of {} innings",
            self.start_season,
            self.end_season,
            self.teams.len(),
            rows.len(),
            table.len()
        );
        Ok(InningsTable::with_seasons(rows, seasons.clone()))
    }
}
