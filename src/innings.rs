//! Normalized innings records and the immutable table that holds them.

use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::overs::Overs;

/// One completed 50-over batting innings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Innings {
    pub match_id: String,
    pub season: String,
    pub date: NaiveDate,
    pub batting_team: String,
    pub bowling_team: String,
    pub venue: String,
    pub winner: String,
    /// Legal deliveries bowled when the score first reached half of the final total.
    pub half_ball: Option<u32>,
}

impl Innings {
    /// Halfway delivery in overs notation, always derived from `half_ball`.
    pub fn half_del(&self) -> Option<Overs> {
        self.half_ball.map(Overs::from_balls)
    }
}

impl Serialize for Innings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Innings", 9)?;
        s.serialize_field("match_id", &self.match_id)?;
        s.serialize_field("season", &self.season)?;
        s.serialize_field("date", &self.date.format("%Y-%m-%d").to_string())?;
        s.serialize_field("batting_team", &self.batting_team)?;
        s.serialize_field("bowling_team", &self.bowling_team)?;
        s.serialize_field("venue", &self.venue)?;
        s.serialize_field("winner", &self.winner)?;
        s.serialize_field("half_ball", &self.half_ball)?;
        s.serialize_field("half_del", &self.half_del())?;
        s.end()
    }
}

/// Seasons in order of first appearance in the source, which is chronological.
///
/// Season labels are compared by ordinal only. "2014-2015" vs "2015" style labels do not
/// sort lexically in general, so no label is ever compared as a string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeasonOrder {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl SeasonOrder {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut order = Self::default();
        for label in labels {
            order.insert(label.as_ref());
        }
        order
    }

    /// Ordinal of `label`, appending it when unseen.
    pub fn insert(&mut self, label: &str) -> usize {
        if let Some(&i) = self.index.get(label) {
            return i;
        }
        let i = self.labels.len();
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), i);
        i
    }

    pub fn ordinal(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn first(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.labels.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Context shown next to the charts: the last innings in source order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LatestMatch {
    pub batting_team: String,
    pub bowling_team: String,
    pub venue: String,
    pub date: NaiveDate,
    pub season: String,
}

impl LatestMatch {
    pub fn describe(&self) -> String {
        format!(
            "{} vs {} at {} on {}",
            self.batting_team,
            self.bowling_team,
            self.venue,
            self.date.format("%b %d, %Y")
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub match_count: usize,
    pub season_count: usize,
    pub innings_count: usize,
}

/// Immutable snapshot of normalized innings, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InningsTable {
    rows: Vec<Innings>,
    seasons: SeasonOrder,
}

impl InningsTable {
    pub fn new(rows: Vec<Innings>) -> Self {
        let seasons = SeasonOrder::from_labels(rows.iter().map(|r| r.season.as_str()));
        Self { rows, seasons }
    }

    /// A table over a subset of a parent's rows, keeping the parent's season sequence so
    /// season ranges resolve the same way against both.
    pub(crate) fn with_seasons(rows: Vec<Innings>, seasons: SeasonOrder) -> Self {
        Self { rows, seasons }
    }

    pub fn rows(&self) -> &[Innings] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Innings> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn seasons(&self) -> &SeasonOrder {
        &self.seasons
    }

    /// Distinct batting teams, sorted by name.
    pub fn teams(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.batting_team.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// The last row in source order. `None` on an empty table.
    pub fn latest(&self) -> Option<LatestMatch> {
        self.rows.last().map(|r| LatestMatch {
            batting_team: r.batting_team.clone(),
            bowling_team: r.bowling_team.clone(),
            venue: r.venue.clone(),
            date: r.date,
            season: r.season.clone(),
        })
    }

    pub fn stats(&self) -> DatasetStats {
        let matches: HashSet<&str> = self.rows.iter().map(|r| r.match_id.as_str()).collect();
        let seasons: HashSet<&str> = self.rows.iter().map(|r| r.season.as_str()).collect();
        DatasetStats {
            match_count: matches.len(),
            season_count: seasons.len(),
            innings_count: self.rows.len(),
        }
    }
}

impl<'a> IntoIterator for &'a InningsTable {
    type Item = &'a Innings;
    type IntoIter = std::slice::Iter<'a, Innings>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
pub(crate) mod test_rows {
    use super::*;

    pub fn innings(
        match_id: &str,
        season: &str,
        date: &str,
        batting_team: &str,
        half_ball: Option<u32>,
    ) -> Innings {
        Innings {
            match_id: match_id.to_string(),
            season: season.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("test date"),
            batting_team: batting_team.to_string(),
            bowling_team: "Opponents".to_string(),
            venue: "Lord's".to_string(),
            winner: batting_team.to_string(),
            half_ball,
        }
    }
}
