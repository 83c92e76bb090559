//! User-facing error message formatting.
//!
//! Matches on typed errors (CricError, PolarsError variants, io::ErrorKind) rather than
//! parsing strings, and always yields a single line.

use polars::prelude::PolarsError;
use std::io;

use crate::error::CricError;

/// Format a CricError, following a DataFormat cause to say what actually went wrong.
pub fn user_message_from_cric(err: &CricError) -> String {
    match err {
        CricError::DataFormat { message, source } => {
            let cause = source.as_deref().map(|s| {
                if let Some(pe) = s.downcast_ref::<PolarsError>() {
                    user_message_from_polars(pe)
                } else if let Some(io_err) = s.downcast_ref::<io::Error>() {
                    user_message_from_io(io_err)
                } else {
                    first_line(&s.to_string())
                }
            });
            match cause {
                Some(c) => format!("Could not load the innings data: {}: {}", message, c),
                None => format!("Could not load the innings data: {}", message),
            }
        }
        CricError::NoData(what) => format!("No data available ({})", what),
        CricError::UnknownSeason(season) => format!(
            "Season '{}' is not in the data. `cricdata summary --json` lists the seasons.",
            season
        ),
    }
}

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!("Column not found: {}", msg),
        PE::IO { error, .. } => user_message_from_io(error.as_ref()),
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::ShapeMismatch(msg) => format!("Row shape mismatch: {}", msg),
        PE::ComputeError(msg) => first_line(msg),
        PE::Context { error, msg } => {
            format!("{}: {}", msg, user_message_from_polars(error))
        }
        #[allow(unreachable_patterns)]
        _ => first_line(&err.to_string()),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error) -> String {
    use std::io::ErrorKind;

    match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        _ => first_line(&err.to_string()),
    }
}

/// Format a color_eyre Report by downcasting to known error types along its cause chain.
/// Context added with `wrap_err` stays in front of the message.
pub fn user_message_from_report(report: &color_eyre::eyre::Report) -> String {
    let mut contexts = Vec::new();
    for cause in report.chain() {
        let found = if let Some(ce) = cause.downcast_ref::<CricError>() {
            Some(user_message_from_cric(ce))
        } else if let Some(pe) = cause.downcast_ref::<PolarsError>() {
            Some(user_message_from_polars(pe))
        } else if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            Some(user_message_from_io(io_err))
        } else {
            None
        };
        match found {
            Some(msg) if contexts.is_empty() => return msg,
            Some(msg) => return format!("{}: {}", contexts.join(": "), msg),
            None if cause.source().is_some() => contexts.push(first_line(&cause.to_string())),
            None => {}
        }
    }

    // Fallback: first line of display to avoid long tracebacks
    first_line(&report.to_string())
}

fn first_line(s: &str) -> String {
    s.lines()
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("An error occurred")
        .to_string()
}
