//! ODI halfway-delivery analysis.
//!
//! Loads a table of One Day International innings, keeps the completed 50-over innings and
//! derives the delivery at which each innings reached half its final score. On top of that
//! table sit a season aggregate, an all-seasons average and a season-range/team filter.
//!
//! ```text
//! DataSource::fetch -> ingest::decode -> InningsTable -> Dashboard -> DashboardView
//!                                                    \-> Selection::apply
//! ```

pub mod aggregate;
pub mod cache;
pub mod chart_export;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod error_display;
pub mod export;
pub mod ingest;
pub mod innings;
pub mod overs;
pub mod report;
pub mod selection;
pub mod source;

pub use aggregate::{overall_halfway, season_aggregates, SeasonAggregate};
pub use cache::{CacheOutcome, TableCache};
pub use config::{AppConfig, ConfigManager};
pub use dashboard::{Dashboard, DashboardView, SelectionOptions};
pub use error::{CricError, CricResult};
pub use innings::{DatasetStats, Innings, InningsTable, LatestMatch, SeasonOrder};
pub use overs::Overs;
pub use selection::{Selection, DEFAULT_TEAMS};
pub use source::{CompressionFormat, DataSource, Location, SourceKind, SourceSnapshot};

/// Application name used for the config directory.
pub const APP_NAME: &str = "cricdata";
