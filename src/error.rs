//! Error taxonomy of the ingestion, aggregation and selection core.

use polars::prelude::PolarsError;
use std::io;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type CricResult<T> = std::result::Result<T, CricError>;

#[derive(Debug, Error)]
pub enum CricError {
    /// The source could not be fetched, or its content does not fit the innings schema.
    /// Fatal for the load: nothing downstream runs on a partial table.
    #[error("{message}")]
    DataFormat {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// An average was requested over zero `half_ball` values.
    #[error("no data available: {0}")]
    NoData(String),

    /// A season range endpoint that is not part of the table's season sequence.
    #[error("season '{0}' is not present in the data")]
    UnknownSeason(String),
}

impl CricError {
    pub fn data_format(message: impl Into<String>) -> Self {
        Self::DataFormat {
            message: message.into(),
            source: None,
        }
    }

    pub fn data_format_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::DataFormat {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn no_data(what: impl Into<String>) -> Self {
        Self::NoData(what.into())
    }

    pub fn is_data_format(&self) -> bool {
        matches!(self, Self::DataFormat { .. })
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData(_))
    }
}

impl From<io::Error> for CricError {
    fn from(err: io::Error) -> Self {
        Self::data_format_with("could not read the data source", err)
    }
}

impl From<PolarsError> for CricError {
    fn from(err: PolarsError) -> Self {
        Self::data_format_with("could not parse the innings table", err)
    }
}
