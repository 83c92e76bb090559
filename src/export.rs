//! Writing selection rows and season aggregates to files.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use log::info;
use polars::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub use cricdata_cli::ExportFormat;

use crate::aggregate::SeasonAggregate;
use crate::innings::InningsTable;
use crate::source::CompressionFormat;

#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Separator for CSV. TSV always uses a tab.
    pub delimiter: u8,
    pub include_header: bool,
    pub compression: Option<CompressionFormat>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            delimiter: b',',
            include_header: true,
            compression: None,
        }
    }
}

/// Selection rows as a frame. Dates are `YYYY-MM-DD`, `Half_Del` is overs notation.
pub fn innings_frame(table: &InningsTable) -> Result<DataFrame> {
    let rows = table.rows();
    let df = df!(
        "Match_ID" => rows.iter().map(|r| r.match_id.clone()).collect::<Vec<_>>(),
        "Season" => rows.iter().map(|r| r.season.clone()).collect::<Vec<_>>(),
        "Date" => rows.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect::<Vec<_>>(),
        "Batting_Team" => rows.iter().map(|r| r.batting_team.clone()).collect::<Vec<_>>(),
        "Bowling_Team" => rows.iter().map(|r| r.bowling_team.clone()).collect::<Vec<_>>(),
        "Venue" => rows.iter().map(|r| r.venue.clone()).collect::<Vec<_>>(),
        "Winner" => rows.iter().map(|r| r.winner.clone()).collect::<Vec<_>>(),
        "Half_Ball" => rows.iter().map(|r| r.half_ball.map(i64::from)).collect::<Vec<_>>(),
        "Half_Del" => rows.iter().map(|r| r.half_del().map(|o| o.notation())).collect::<Vec<_>>()
    )?;
    Ok(df)
}

/// Season aggregates as a frame, in season order.
pub fn season_frame(seasons: &[SeasonAggregate]) -> Result<DataFrame> {
    let df = df!(
        "Season" => seasons.iter().map(|s| s.season.clone()).collect::<Vec<_>>(),
        "Half_Ball" => seasons.iter().map(|s| i64::from(s.half_ball_mean)).collect::<Vec<_>>(),
        "Count" => seasons.iter().map(|s| s.count as i64).collect::<Vec<_>>(),
        "Half_Del" => seasons.iter().map(|s| s.half_del.notation()).collect::<Vec<_>>()
    )?;
    Ok(df)
}

/// Delimited text with floats at one decimal, the precision of overs notation.
pub fn write_delimited<W: Write>(
    df: &mut DataFrame,
    writer: W,
    delimiter: u8,
    include_header: bool,
) -> Result<()> {
    CsvWriter::new(writer)
        .with_separator(delimiter)
        .include_header(include_header)
        .with_float_precision(Some(1))
        .finish(df)?;
    Ok(())
}

/// Buffered file writer, compressed when asked to.
fn output(file: File, compression: Option<CompressionFormat>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match compression {
        None => Box::new(BufWriter::new(file)),
        Some(CompressionFormat::Gzip) => Box::new(flate2::write::GzEncoder::new(
            file,
            flate2::Compression::default(),
        )),
        Some(CompressionFormat::Zstd) => Box::new(zstd::Encoder::new(file, 0)?.auto_finish()),
        Some(CompressionFormat::Bzip2) => Box::new(bzip2::write::BzEncoder::new(
            file,
            bzip2::Compression::default(),
        )),
        Some(CompressionFormat::Xz) => Box::new(xz2::write::XzEncoder::new(
            file, 6, // compression level
        )),
    };
    Ok(writer)
}

/// Write a frame to `path` in the requested format.
pub fn export_frame(df: &mut DataFrame, path: &Path, options: &ExportOptions) -> Result<()> {
    if options.compression.is_some() && !options.format.supports_compression() {
        return Err(eyre!(
            "{} output cannot be compressed",
            options.format.extension()
        ));
    }
    let file = File::create(path)
        .map_err(|e| eyre!("Could not create {}: {}", path.display(), e))?;

    match options.format {
        ExportFormat::Csv => {
            let writer = output(file, options.compression)?;
            write_delimited(df, writer, options.delimiter, options.include_header)?;
        }
        ExportFormat::Tsv => {
            let writer = output(file, options.compression)?;
            write_delimited(df, writer, b'\t', options.include_header)?;
        }
        ExportFormat::Json => {
            JsonWriter::new(BufWriter::new(file))
                .with_json_format(JsonFormat::Json)
                .finish(df)?;
        }
        ExportFormat::Ndjson => {
            JsonWriter::new(output(file, options.compression)?)
                .with_json_format(JsonFormat::JsonLines)
                .finish(df)?;
        }
        ExportFormat::Parquet => {
            ParquetWriter::new(BufWriter::new(file)).finish(df)?;
        }
    }
    info!(
        "wrote {} row(s) to {} as {}",
        df.height(),
        path.display(),
        options.format.extension()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::season_aggregates;
    use crate::innings::test_rows::innings;

    fn table() -> InningsTable {
        InningsTable::new(vec![
            innings("1", "2015", "2015-02-14", "India", Some(179)),
            innings("2", "2015", "2015-03-01", "England", None),
        ])
    }

    #[test]
    fn csv_has_iso_dates_and_one_decimal_overs() {
        let mut df = innings_frame(&table()).unwrap();
        let mut out = Vec::new();
        write_delimited(&mut df, &mut out, b',', true).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Match_ID,Season,Date,Batting_Team,Bowling_Team,Venue,Winner,Half_Ball,Half_Del"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,2015,2015-02-14,India,Opponents,Lord's,India,179,29.5"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2,2015,2015-03-01,England,Opponents,Lord's,England,,"
        );
    }

    #[test]
    fn season_csv_without_header() {
        let seasons = season_aggregates(&table());
        let mut df = season_frame(&seasons).unwrap();
        let mut out = Vec::new();
        write_delimited(&mut df, &mut out, b';', false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), "2015;179;1;29.5");
    }

    #[test]
    fn parquet_cannot_be_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let mut df = season_frame(&season_aggregates(&table())).unwrap();
        let options = ExportOptions {
            format: ExportFormat::Parquet,
            compression: Some(CompressionFormat::Gzip),
            ..ExportOptions::default()
        };
        assert!(export_frame(&mut df, &dir.path().join("s.parquet"), &options).is_err());
    }
}
