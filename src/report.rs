//! Terminal presentation of a dashboard view: plain text tables and JSON.

use color_eyre::Result;
use serde::Serialize;
use std::fmt::Write;

use crate::aggregate::SeasonAggregate;
use crate::dashboard::{DashboardView, SelectionOptions};
use crate::innings::InningsTable;

#[derive(Serialize)]
struct SummaryJson<'a> {
    #[serde(flatten)]
    view: &'a DashboardView,
    options: &'a SelectionOptions,
}

pub fn summary_json(view: &DashboardView, options: &SelectionOptions) -> Result<String> {
    Ok(serde_json::to_string_pretty(&SummaryJson { view, options })?)
}

pub fn seasons_json(seasons: &[SeasonAggregate]) -> Result<String> {
    Ok(serde_json::to_string_pretty(seasons)?)
}

pub fn rows_json(rows: &InningsTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows.rows())?)
}

/// Stats line, latest match, selected range, averages and the season table.
pub fn render_summary(view: &DashboardView) -> String {
    let mut out = String::new();
    let s = view.stats;
    let _ = writeln!(
        out,
        "Matches: {}  Seasons: {}  Completed innings: {}",
        s.match_count, s.season_count, s.innings_count
    );
    match &view.latest {
        Some(latest) => {
            let _ = writeln!(out, "Latest available match: {}", latest.describe());
        }
        None => {
            let _ = writeln!(out, "Latest available match: none");
        }
    }
    let _ = writeln!(
        out,
        "You selected playing seasons between {} and {}",
        view.selection.start_season, view.selection.end_season
    );
    let _ = writeln!(out, "Teams: {}", view.selection.teams.join(", "));
    let _ = writeln!(
        out,
        "Average halfway delivery (all seasons): {}",
        view.overall_halfway
            .as_deref()
            .map(|o| format!("{} overs", o))
            .unwrap_or_else(|| "no data available".to_string())
    );
    let _ = writeln!(
        out,
        "Selected innings: {} (average halfway delivery {})",
        view.rows.len(),
        view.selection_halfway
            .map(|o| format!("{} overs", o))
            .unwrap_or_else(|| "no data available".to_string())
    );
    out.push('\n');
    out.push_str(&render_seasons(&view.seasons));
    out
}

pub fn render_seasons(seasons: &[SeasonAggregate]) -> String {
    if seasons.is_empty() {
        return "No seasons with a recorded halfway delivery\n".to_string();
    }
    let width = seasons
        .iter()
        .map(|s| s.season.len())
        .max()
        .unwrap_or(0)
        .max("Season".len());
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:>9}  {:>5}  {:>8}",
        "Season", "Half_Ball", "Count", "Half_Del"
    );
    for s in seasons {
        let _ = writeln!(
            out,
            "{:<width$}  {:>9}  {:>5}  {:>8}",
            s.season,
            s.half_ball_mean,
            s.count,
            s.half_del.to_string()
        );
    }
    out
}

pub fn render_rows(rows: &InningsTable) -> String {
    if rows.is_empty() {
        return "No innings match the selection\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:<10}  {:<10}  {:<14}  {:<14}  {:>8}  {}",
        "Match_ID", "Season", "Date", "Batting_Team", "Bowling_Team", "Half_Del", "Venue"
    );
    for r in rows {
        let _ = writeln!(
            out,
            "{:<10}  {:<10}  {:<10}  {:<14}  {:<14}  {:>8}  {}",
            r.match_id,
            r.season,
            r.date.format("%Y-%m-%d").to_string(),
            r.batting_team,
            r.bowling_team,
            r.half_del().map(|o| o.to_string()).unwrap_or_default(),
            r.venue
        );
    }
    out
}
