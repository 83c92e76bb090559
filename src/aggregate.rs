//! Per-season and overall halfway-delivery averages.
//!
//! Means are always taken over ball counts and rounded to a whole ball before conversion to
//! overs notation. Rounding is half-to-even.

use log::{debug, warn};
use serde::Serialize;

use crate::error::{CricError, CricResult};
use crate::innings::InningsTable;
use crate::overs::Overs;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeasonAggregate {
    pub season: String,
    /// Rounded mean of `half_ball` over the season's innings.
    pub half_ball_mean: u32,
    /// Innings with a recorded `half_ball`.
    pub count: usize,
    pub half_del: Overs,
}

/// Mean of `values` rounded half-to-even to a whole ball.
pub fn rounded_mean<I>(values: I) -> CricResult<u32>
where
    I: IntoIterator<Item = u32>,
{
    let (sum, n) = values
        .into_iter()
        .fold((0u64, 0u64), |(sum, n), v| (sum + u64::from(v), n + 1));
    if n == 0 {
        return Err(CricError::no_data("average over zero innings"));
    }
    let mean = (sum as f64 / n as f64).round_ties_even();
    Ok(mean as u32)
}

/// One aggregate per season in first-appearance order.
///
/// A season whose innings all lack `half_ball` has no mean and is left out.
pub fn season_aggregates(table: &InningsTable) -> Vec<SeasonAggregate> {
    let seasons = table.seasons();
    let mut buckets: Vec<Vec<u32>> = vec![Vec::new(); seasons.len()];
    for row in table {
        if let (Some(i), Some(balls)) = (seasons.ordinal(&row.season), row.half_ball) {
            buckets[i].push(balls);
        }
    }

    let mut out = Vec::with_capacity(buckets.len());
    for (season, balls) in seasons.labels().iter().zip(buckets) {
        if balls.is_empty() {
            if table.iter().any(|r| &r.season == season) {
                warn!("season {} has no recorded halfway deliveries; skipped", season);
            }
            continue;
        }
        let count = balls.len();
        match rounded_mean(balls) {
            Ok(mean) => out.push(SeasonAggregate {
                season: season.clone(),
                half_ball_mean: mean,
                count,
                half_del: Overs::from_balls(mean),
            }),
            Err(e) => warn!("season {}: {}", season, e),
        }
    }
    debug!("aggregated {} season(s)", out.len());
    out
}

/// Overall halfway delivery across every innings in `table`.
pub fn overall_halfway(table: &InningsTable) -> CricResult<Overs> {
    rounded_mean(table.iter().filter_map(|r| r.half_ball))
        .map(Overs::from_balls)
        .map_err(|_| CricError::no_data("no innings with a recorded halfway delivery"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::innings::test_rows::innings;

    #[test]
    fn mean_is_rounded_before_conversion() {
        let table = InningsTable::new(vec![
            innings("1", "2015", "2015-01-01", "India", Some(170)),
            innings("2", "2015", "2015-01-02", "India", Some(175)),
            innings("3", "2015", "2015-01-03", "India", Some(181)),
        ]);
        let aggs = season_aggregates(&table);
        assert_eq!(aggs.len(), 1);
        assert_eq!(aggs[0].half_ball_mean, 175);
        assert_eq!(aggs[0].count, 3);
        assert_eq!(aggs[0].half_del.to_string(), "29.1");
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(rounded_mean([174, 175]).unwrap(), 174);
        assert_eq!(rounded_mean([175, 176]).unwrap(), 176);
        assert_eq!(rounded_mean([170, 171, 173]).unwrap(), 171);
    }

    #[test]
    fn empty_input_is_no_data_not_nan() {
        let err = rounded_mean(Vec::new()).unwrap_err();
        assert!(err.is_no_data());
        let table = InningsTable::new(Vec::new());
        let err = overall_halfway(&table).unwrap_err();
        assert!(err.is_no_data());
        assert!(!err.to_string().to_lowercase().contains("nan"));
        assert!(season_aggregates(&table).is_empty());
    }

    #[test]
    fn seasons_keep_first_appearance_order() {
        let table = InningsTable::new(vec![
            innings("1", "2014-2015", "2014-11-01", "India", Some(180)),
            innings("2", "2015", "2015-02-01", "India", Some(170)),
            innings("3", "2014-2015", "2015-01-01", "India", Some(182)),
            innings("4", "2003", "2016-01-01", "India", Some(160)),
        ]);
        let seasons: Vec<_> = season_aggregates(&table)
            .into_iter()
            .map(|a| a.season)
            .collect();
        assert_eq!(seasons, vec!["2014-2015", "2015", "2003"]);
    }

    #[test]
    fn within_season_order_does_not_matter() {
        let forward = InningsTable::new(vec![
            innings("1", "2015", "2015-01-01", "India", Some(160)),
            innings("2", "2015", "2015-01-02", "India", Some(171)),
            innings("3", "2015", "2015-01-03", "India", Some(190)),
        ]);
        let mut rows = forward.rows().to_vec();
        rows.reverse();
        let backward = InningsTable::new(rows);
        assert_eq!(season_aggregates(&forward), season_aggregates(&backward));
    }

    #[test]
    fn null_half_balls_are_excluded_and_empty_seasons_skipped() {
        let table = InningsTable::new(vec![
            innings("1", "2015", "2015-01-01", "India", Some(170)),
            innings("2", "2015", "2015-01-02", "India", None),
            innings("3", "2016", "2016-01-02", "India", None),
        ]);
        let aggs = season_aggregates(&table);
        assert_eq!(aggs.len(), 1);
        assert_eq!(aggs[0].count, 1);
        assert_eq!(overall_halfway(&table).unwrap(), Overs::from_balls(170));
    }

    #[test]
    fn overall_is_over_the_whole_table() {
        let table = InningsTable::new(vec![
            innings("1", "2014", "2014-01-01", "India", Some(150)),
            innings("2", "2015", "2015-01-01", "England", Some(180)),
            innings("3", "2016", "2016-01-01", "Australia", Some(183)),
        ]);
        let overall = overall_halfway(&table).unwrap();
        assert_eq!(overall.balls(), 171);
        assert_eq!(overall.to_string(), "28.3");
    }
}
