#![allow(dead_code)]

use cricdata::DataSource;
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Checked-in dataset: 12 innings, 9 of them completed, across four seasons.
pub fn sample_path() -> &'static Path {
    Path::new("tests/sample-data/odi_innings.csv")
}

pub fn csv_source(path: &Path) -> DataSource {
    DataSource::from_location(&path.to_string_lossy(), None, None, b',', None)
        .expect("csv source")
}

/// One completed innings per `(season, batting team, half_ball)`, written with the full
/// source schema. Match ids count from 1 and dates advance a day per row.
pub fn write_innings_csv(dir: &Path, name: &str, rows: &[(&str, &str, Option<i64>)]) -> PathBuf {
    let n = rows.len();
    let mut df = df!(
        "Match_ID" => (1..=n as i64).collect::<Vec<_>>(),
        "Season" => rows.iter().map(|r| r.0.to_string()).collect::<Vec<_>>(),
        "Date" => (0..n).map(|i| format!("2015-01-{:02}", i % 28 + 1)).collect::<Vec<_>>(),
        "Batting_Team" => rows.iter().map(|r| r.1.to_string()).collect::<Vec<_>>(),
        "Bowling_Team" => vec!["Opponents"; n],
        "Venue" => vec!["Lord's"; n],
        "Winner" => rows.iter().map(|r| r.1.to_string()).collect::<Vec<_>>(),
        "Full_50" => vec!["Y"; n],
        "Half_Ball" => rows.iter().map(|r| r.2).collect::<Vec<_>>()
    )
    .unwrap();
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    path
}

/// Gzip `src` into `dest`.
pub fn gzip_file(src: &Path, dest: &Path) {
    let bytes = std::fs::read(src).unwrap();
    let file = File::create(dest).unwrap();
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder.write_all(&bytes).unwrap();
    encoder.finish().unwrap();
}
