//! Decoding raw source bytes into a polars frame and normalizing it into an [`InningsTable`].

use calamine::{open_workbook_auto_from_rs, Data, DataType as CalamineTrait, Reader};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info};
use polars::prelude::*;
use std::io::{BufReader, Cursor, Read};

use crate::error::{CricError, CricResult};
use crate::innings::{Innings, InningsTable};
use crate::source::{CompressionFormat, DataSource, SourceSnapshot};

pub const MATCH_ID: &str = "Match_ID";
pub const SEASON: &str = "Season";
pub const DATE: &str = "Date";
pub const BATTING_TEAM: &str = "Batting_Team";
pub const BOWLING_TEAM: &str = "Bowling_Team";
pub const VENUE: &str = "Venue";
pub const WINNER: &str = "Winner";
pub const FULL_50: &str = "Full_50";
pub const HALF_BALL: &str = "Half_Ball";

/// Columns every source must carry, after aliases are resolved.
pub const REQUIRED_COLUMNS: &[&str] = &[
    MATCH_ID,
    SEASON,
    DATE,
    BATTING_TEAM,
    BOWLING_TEAM,
    VENUE,
    WINNER,
    FULL_50,
    HALF_BALL,
];

/// Older exports of the dataset use these headers.
const COLUMN_ALIASES: &[(&str, &str)] = &[("Opposition", BOWLING_TEAM), ("Winner?", WINNER)];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Fetches and normalizes `source` in one go.
pub fn load(source: &DataSource) -> CricResult<InningsTable> {
    let snapshot = source.fetch()?;
    decode(source, &snapshot)
}

/// Normalizes already fetched bytes of `source`.
pub fn decode(source: &DataSource, snapshot: &SourceSnapshot) -> CricResult<InningsTable> {
    let df = read_frame(source, &snapshot.bytes)?;
    let table = normalize(df)?;
    info!(
        "loaded {} completed innings over {} season(s) from {}",
        table.len(),
        table.seasons().len(),
        source.key()
    );
    Ok(table)
}

/// Parses raw bytes into a frame of string columns, as the source kind dictates.
pub fn read_frame(source: &DataSource, bytes: &[u8]) -> CricResult<DataFrame> {
    match source {
        DataSource::Csv {
            delimiter,
            compression,
            ..
        } => {
            let data = decompress(bytes, *compression)?;
            read_csv(data, *delimiter)
        }
        DataSource::Excel { sheet, .. } => read_excel(bytes, sheet.as_deref()),
        DataSource::Sheet { .. } => read_csv(bytes.to_vec(), b','),
    }
}

pub fn decompress(bytes: &[u8], compression: Option<CompressionFormat>) -> CricResult<Vec<u8>> {
    let Some(compression) = compression else {
        return Ok(bytes.to_vec());
    };
    let input = BufReader::new(bytes);
    let mut reader: Box<dyn Read + '_> = match compression {
        CompressionFormat::Gzip => Box::new(flate2::read::GzDecoder::new(input)),
        CompressionFormat::Zstd => Box::new(zstd::Decoder::new(input)?),
        CompressionFormat::Bzip2 => Box::new(bzip2::read::BzDecoder::new(input)),
        CompressionFormat::Xz => Box::new(xz2::read::XzDecoder::new(input)),
    };
    let mut out = Vec::new();
    reader.read_to_end(&mut out).map_err(|e| {
        CricError::data_format_with(
            format!("could not decompress {} data", compression.extension()),
            e,
        )
    })?;
    debug!("decompressed {} -> {} bytes", bytes.len(), out.len());
    Ok(out)
}

/// Reads delimited text with every column kept as a string.
pub fn read_csv(bytes: Vec<u8>, delimiter: u8) -> CricResult<DataFrame> {
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(delimiter));
    let df = CsvReader::new(Cursor::new(bytes))
        .with_options(options)
        .finish()?;
    debug!("read {} csv row(s), {} column(s)", df.height(), df.width());
    Ok(df)
}

/// Reads one worksheet, rendering every cell as text. `sheet` is a name or 0-based index.
pub fn read_excel(bytes: &[u8], sheet: Option<&str>) -> CricResult<DataFrame> {
    let excel_err = |e: calamine::Error| CricError::data_format(format!("Excel: {}", e));
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(excel_err)?;
    if workbook.sheet_names().is_empty() {
        return Err(CricError::data_format("Excel file has no worksheets"));
    }
    let range = match sheet {
        Some(sel) => match sel.parse::<usize>() {
            Ok(idx) => workbook
                .worksheet_range_at(idx)
                .ok_or_else(|| CricError::data_format(format!("Excel: no sheet at index {}", idx)))?
                .map_err(excel_err)?,
            Err(_) => workbook.worksheet_range(sel).map_err(excel_err)?,
        },
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| CricError::data_format("Excel: no first sheet"))?
            .map_err(excel_err)?,
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Err(CricError::data_format("Excel sheet is empty"));
    };
    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, c)| match cell_text(c) {
            Some(h) if !h.trim().is_empty() => h,
            _ => format!("column_{}", i + 1),
        })
        .collect();
    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (i, values) in columns.iter_mut().enumerate() {
            values.push(row.get(i).and_then(cell_text));
        }
    }
    let df = headers
        .iter()
        .zip(columns)
        .map(|(name, values)| Series::new(name.as_str().into(), values))
        .collect::<DataFrame>();
    debug!("read {} worksheet row(s), {} column(s)", df.height(), df.width());
    Ok(df)
}

/// Cell as text: whole floats as integers, datetimes as `YYYY-MM-DD`, blanks as null.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::Float(f) if f.fract() == 0.0 => Some(format!("{:.0}", f)),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.date().format("%Y-%m-%d").to_string()),
        Data::DateTimeIso(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Resolves aliases and checks that every required column is present.
/// Returns `(header in the frame, canonical name)` pairs in [`REQUIRED_COLUMNS`] order.
fn resolve_columns(df: &DataFrame) -> CricResult<Vec<(String, &'static str)>> {
    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let find = |wanted: &str| headers.iter().find(|h| h.trim() == wanted).cloned();

    REQUIRED_COLUMNS
        .iter()
        .map(|&canonical| {
            let actual = find(canonical).or_else(|| {
                COLUMN_ALIASES
                    .iter()
                    .filter(|(_, target)| *target == canonical)
                    .find_map(|(alias, _)| find(alias))
            });
            actual.map(|a| (a, canonical)).ok_or_else(|| {
                CricError::data_format(format!("required column '{}' is missing", canonical))
            })
        })
        .collect()
}

/// Restricts to completed innings, drops unused columns and parses every row.
///
/// Source order is kept. Dates are checked on every row before the completed-innings
/// filter, so one bad date anywhere fails the whole load, as does a bad halfway count.
pub fn normalize(df: DataFrame) -> CricResult<InningsTable> {
    let columns = resolve_columns(&df)?;
    let projection: Vec<Expr> = columns
        .iter()
        .map(|(actual, canonical)| col(actual.as_str()).cast(DataType::String).alias(*canonical))
        .collect();
    let kept: Vec<Expr> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| **c != FULL_50)
        .map(|c| col(*c))
        .collect();

    let resolved = df.lazy().select(projection).collect()?;
    check_dates(&resolved)?;

    let completed = resolved
        .lazy()
        .filter(col(FULL_50).eq(lit("Y")))
        .select(kept)
        .collect()?;
    debug!("{} completed innings after the full-50 filter", completed.height());

    let text = |name: &str| -> CricResult<Vec<Option<String>>> {
        Ok(completed
            .column(name)?
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.trim().to_string()))
            .collect())
    };
    let match_ids = text(MATCH_ID)?;
    let seasons = text(SEASON)?;
    let dates = text(DATE)?;
    let batting = text(BATTING_TEAM)?;
    let bowling = text(BOWLING_TEAM)?;
    let venues = text(VENUE)?;
    let winners = text(WINNER)?;
    let half_balls = text(HALF_BALL)?;

    let mut rows = Vec::with_capacity(completed.height());
    for i in 0..completed.height() {
        let match_id = match_ids[i].clone().unwrap_or_default();
        let season = seasons[i]
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(season_label)
            .ok_or_else(|| {
                CricError::data_format(format!("match {}: missing season", match_id))
            })?;
        let date = row_date(&match_id, dates[i].as_deref())?;
        let half_ball = parse_half_ball(half_balls[i].as_deref()).map_err(|bad| {
            CricError::data_format(format!(
                "match {}: halfway ball count '{}' is not a whole number of deliveries",
                match_id, bad
            ))
        })?;
        rows.push(Innings {
            match_id,
            season,
            date,
            batting_team: batting[i].clone().unwrap_or_default(),
            bowling_team: bowling[i].clone().unwrap_or_default(),
            venue: venues[i].clone().unwrap_or_default(),
            winner: winners[i].clone().unwrap_or_default(),
            half_ball,
        });
    }
    Ok(InningsTable::new(rows))
}

/// Every row's date must parse, completed innings or not.
fn check_dates(df: &DataFrame) -> CricResult<()> {
    let ids = df.column(MATCH_ID)?.str()?;
    let dates = df.column(DATE)?.str()?;
    for (id, date) in ids.into_iter().zip(dates) {
        row_date(id.map(str::trim).unwrap_or_default(), date.map(str::trim))?;
    }
    Ok(())
}

fn row_date(match_id: &str, raw: Option<&str>) -> CricResult<NaiveDate> {
    match raw {
        Some(s) if !s.is_empty() => parse_date(s).ok_or_else(|| {
            CricError::data_format(format!("match {}: unparsable date '{}'", match_id, s))
        }),
        _ => Err(CricError::data_format(format!(
            "match {}: missing date",
            match_id
        ))),
    }
}

/// Numeric seasons from spreadsheets arrive as `2015.0`; keep them as `2015`.
fn season_label(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(v) if raw.contains('.') && v.fract() == 0.0 => format!("{:.0}", v),
        _ => raw.to_string(),
    }
}

/// Empty is a null. Whole-valued floats are accepted. Anything else is returned as the error.
fn parse_half_ball(raw: Option<&str>) -> Result<Option<u32>, String> {
    let s = match raw {
        None => return Ok(None),
        Some(s) if s.is_empty() => return Ok(None),
        Some(s) => s,
    };
    if let Ok(v) = s.parse::<u32>() {
        return Ok(Some(v));
    }
    match s.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v >= 0.0 && v <= f64::from(u32::MAX) => Ok(Some(v as u32)),
        _ => Err(s.to_string()),
    }
}

/// Parses the date formats seen in the dataset's various exports.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
