//! Per-refresh snapshot: the normalized table plus everything derived from it once.

use log::warn;
use serde::Serialize;
use std::sync::Arc;

use crate::aggregate::{overall_halfway, season_aggregates, SeasonAggregate};
use crate::error::CricResult;
use crate::innings::{DatasetStats, InningsTable, LatestMatch};
use crate::overs::Overs;
use crate::selection::Selection;

/// Derived data for one loaded table. Rebuilt whenever the table changes.
#[derive(Clone, Debug)]
pub struct Dashboard {
    table: Arc<InningsTable>,
    seasons: Vec<SeasonAggregate>,
    /// All-seasons average over the whole table, independent of any selection.
    overall: Option<Overs>,
    stats: DatasetStats,
}

/// What the presentation layer shows for one selection.
#[derive(Clone, Debug, Serialize)]
pub struct DashboardView {
    pub stats: DatasetStats,
    pub latest: Option<LatestMatch>,
    pub selection: Selection,
    /// Average over the whole table, as `"<overs>.<balls>"`.
    pub overall_halfway: Option<String>,
    /// Average over the selected innings only, for the chart rule.
    pub selection_halfway: Option<Overs>,
    pub seasons: Vec<SeasonAggregate>,
    #[serde(skip)]
    pub rows: InningsTable,
}

/// Team and season options for building a selection.
#[derive(Clone, Debug, Serialize)]
pub struct SelectionOptions {
    pub teams: Vec<String>,
    pub seasons: Vec<String>,
    pub first_season: Option<String>,
    pub last_season: Option<String>,
}

impl Dashboard {
    pub fn new(table: Arc<InningsTable>) -> Self {
        let seasons = season_aggregates(&table);
        let overall = match overall_halfway(&table) {
            Ok(o) => Some(o),
            Err(e) => {
                warn!("{}", e);
                None
            }
        };
        let stats = table.stats();
        Self {
            table,
            seasons,
            overall,
            stats,
        }
    }

    pub fn table(&self) -> &Arc<InningsTable> {
        &self.table
    }

    pub fn seasons(&self) -> &[SeasonAggregate] {
        &self.seasons
    }

    pub fn overall(&self) -> Option<Overs> {
        self.overall
    }

    pub fn stats(&self) -> DatasetStats {
        self.stats
    }

    pub fn options(&self) -> SelectionOptions {
        let seasons = self.table.seasons();
        SelectionOptions {
            teams: self.table.teams(),
            seasons: seasons.labels().to_vec(),
            first_season: seasons.first().map(String::from),
            last_season: seasons.last().map(String::from),
        }
    }

    /// Filters the table and bundles the result with the selection-independent parts.
    pub fn view(&self, selection: &Selection) -> CricResult<DashboardView> {
        let rows = selection.apply(&self.table)?;
        let selection_halfway = overall_halfway(&rows).ok();
        Ok(DashboardView {
            stats: self.stats,
            latest: self.table.latest(),
            selection: selection.clone(),
            overall_halfway: self.overall.map(|o| o.to_string()),
            selection_halfway,
            seasons: self.seasons.clone(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::innings::test_rows::innings;

    fn dashboard() -> Dashboard {
        Dashboard::new(Arc::new(InningsTable::new(vec![
            innings("1", "2014-2015", "2014-11-02", "India", Some(150)),
            innings("1", "2014-2015", "2014-11-02", "Sri Lanka", Some(180)),
            innings("2", "2015", "2015-03-29", "Australia", Some(183)),
        ])))
    }

    #[test]
    fn overall_ignores_the_selection() {
        let dash = dashboard();
        let view = dash
            .view(&Selection::new("2015", "2015", ["Australia"]))
            .unwrap();
        assert_eq!(view.overall_halfway.as_deref(), Some("28.3"));
        assert_eq!(view.selection_halfway, Some(Overs::from_balls(183)));
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.seasons.len(), 2);
    }

    #[test]
    fn empty_selection_has_no_selection_average() {
        let dash = dashboard();
        let view = dash.view(&Selection::new("2015", "2015", ["India"])).unwrap();
        assert!(view.rows.is_empty());
        assert_eq!(view.selection_halfway, None);
        assert_eq!(view.latest.unwrap().batting_team, "Australia");
    }

    #[test]
    fn empty_table_builds_without_panicking() {
        let dash = Dashboard::new(Arc::new(InningsTable::new(Vec::new())));
        assert_eq!(dash.overall(), None);
        assert!(dash.seasons().is_empty());
        let options = dash.options();
        assert!(options.first_season.is_none());
        assert!(options.teams.is_empty());
    }

    #[test]
    fn options_list_teams_and_seasons() {
        let options = dashboard().options();
        assert_eq!(options.teams, vec!["Australia", "India", "Sri Lanka"]);
        assert_eq!(options.seasons, vec!["2014-2015", "2015"]);
        assert_eq!(options.last_season.as_deref(), Some("2015"));
    }
}
