//! Where the innings table comes from: local files, HTTP(S) URLs and link-shared Google Sheets.
//!
//! A source only fetches raw bytes. Decoding them into a table is the job of [`crate::ingest`].

use log::{debug, info};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

pub use cricdata_cli::{CompressionFormat, SourceKind};

use crate::error::{CricError, CricResult};

const EXCEL_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

/// Where the bytes of a source live.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Location {
    Local(PathBuf),
    Http(String),
}

impl Location {
    /// Classifies by scheme only (no filesystem calls).
    pub fn parse(s: &str) -> Self {
        if let Some(i) = s.find("://") {
            let scheme = s[..i].to_lowercase();
            if scheme == "http" || scheme == "https" {
                return Self::Http(s.to_string());
            }
        }
        Self::Local(PathBuf::from(s))
    }

    /// Last path segment, used for extension sniffing. Query and fragment are ignored.
    fn file_name(&self) -> Option<String> {
        match self {
            Self::Local(p) => p.file_name().map(|n| n.to_string_lossy().into_owned()),
            Self::Http(url) => {
                let after = url.split_once("://").map(|(_, a)| a).unwrap_or(url);
                let path = after.split(['?', '#']).next().unwrap_or(after);
                path.rsplit('/').next().map(String::from)
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(p) => write!(f, "{}", p.display()),
            Self::Http(u) => write!(f, "{}", u),
        }
    }
}

/// The binding used to fetch the raw innings table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataSource {
    Csv {
        location: Location,
        delimiter: u8,
        compression: Option<CompressionFormat>,
    },
    Excel {
        location: Location,
        /// Sheet name or 0-based index. First sheet when `None`.
        sheet: Option<String>,
    },
    Sheet {
        spreadsheet_id: String,
        gid: Option<String>,
    },
}

/// Raw bytes fetched from a source plus their content digest.
#[derive(Clone, Debug)]
pub struct SourceSnapshot {
    pub bytes: Vec<u8>,
    pub digest: String,
}

impl SourceSnapshot {
    pub fn new(bytes: Vec<u8>) -> Self {
        let digest = content_digest(&bytes);
        Self { bytes, digest }
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn content_digest(bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Guesses the source kind from a path or URL.
pub fn detect_kind(location: &str) -> SourceKind {
    if spreadsheet_id(location).is_some() && location.contains("docs.google.com") {
        return SourceKind::Sheet;
    }
    let loc = Location::parse(location);
    let name = loc.file_name().unwrap_or_default().to_lowercase();
    let compressed = CompressionFormat::from_extension(Path::new(&name)).is_some();
    let stem = if compressed {
        Path::new(&name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        name
    };
    let is_excel = Path::new(&stem)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| EXCEL_EXTENSIONS.contains(&e));
    if is_excel {
        SourceKind::Excel
    } else {
        SourceKind::Csv
    }
}

/// Spreadsheet id from a Google Sheets URL (`.../spreadsheets/d/<id>/...`) or a bare id.
pub fn spreadsheet_id(s: &str) -> Option<String> {
    if let Ok(re) = Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)") {
        if let Some(caps) = re.captures(s) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }
    if let Ok(re) = Regex::new(r"^[A-Za-z0-9_-]{20,}$") {
        if re.is_match(s.trim()) {
            return Some(s.trim().to_string());
        }
    }
    None
}

/// `gid` query or fragment parameter of a Google Sheets URL.
pub fn sheet_gid(s: &str) -> Option<String> {
    let re = Regex::new(r"[?#&]gid=([0-9]+)").ok()?;
    re.captures(s)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Public CSV export URL of a link-shared sheet.
pub fn sheet_export_url(spreadsheet_id: &str, gid: Option<&str>) -> String {
    match gid {
        Some(gid) => format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
            spreadsheet_id, gid
        ),
        None => format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv",
            spreadsheet_id
        ),
    }
}

impl DataSource {
    /// Builds the binding for `location`. `kind` wins over detection; `sheet` picks an Excel
    /// sheet or a Google Sheet gid.
    pub fn from_location(
        location: &str,
        kind: Option<SourceKind>,
        sheet: Option<&str>,
        delimiter: u8,
        compression: Option<CompressionFormat>,
    ) -> CricResult<Self> {
        let kind = kind.unwrap_or_else(|| detect_kind(location));
        let source = match kind {
            SourceKind::Csv => {
                let location = Location::parse(location);
                let compression = compression.or_else(|| {
                    location
                        .file_name()
                        .and_then(|n| CompressionFormat::from_extension(Path::new(&n)))
                });
                Self::Csv {
                    location,
                    delimiter,
                    compression,
                }
            }
            SourceKind::Excel => Self::Excel {
                location: Location::parse(location),
                sheet: sheet.map(String::from),
            },
            SourceKind::Sheet => {
                let spreadsheet_id = spreadsheet_id(location).ok_or_else(|| {
                    CricError::data_format(format!(
                        "'{}' is not a Google Sheets link or spreadsheet id",
                        location
                    ))
                })?;
                let gid = sheet.map(String::from).or_else(|| sheet_gid(location));
                Self::Sheet {
                    spreadsheet_id,
                    gid,
                }
            }
        };
        debug!("source {} resolved as {}", location, source.kind().as_str());
        Ok(source)
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Csv { .. } => SourceKind::Csv,
            Self::Excel { .. } => SourceKind::Excel,
            Self::Sheet { .. } => SourceKind::Sheet,
        }
    }

    /// Identity of the source for caching, independent of its content.
    pub fn key(&self) -> String {
        match self {
            Self::Csv { location, .. } => format!("csv:{}", location),
            Self::Excel { location, sheet } => {
                format!("excel:{}#{}", location, sheet.as_deref().unwrap_or("0"))
            }
            Self::Sheet {
                spreadsheet_id,
                gid,
            } => format!("sheet:{}#{}", spreadsheet_id, gid.as_deref().unwrap_or("0")),
        }
    }

    fn location(&self) -> Location {
        match self {
            Self::Csv { location, .. } | Self::Excel { location, .. } => location.clone(),
            Self::Sheet {
                spreadsheet_id,
                gid,
            } => Location::Http(sheet_export_url(spreadsheet_id, gid.as_deref())),
        }
    }

    /// Reads the raw bytes of the source. Nothing is decoded here.
    pub fn fetch(&self) -> CricResult<SourceSnapshot> {
        let bytes = match self.location() {
            Location::Local(path) => std::fs::read(&path).map_err(|e| {
                CricError::data_format_with(format!("could not read {}", path.display()), e)
            })?,
            Location::Http(url) => http_get(&url)?,
        };
        let snapshot = SourceSnapshot::new(bytes);
        info!(
            "fetched {} bytes from {} (sha256 {})",
            snapshot.bytes.len(),
            self.key(),
            &snapshot.digest[..12]
        );
        Ok(snapshot)
    }
}

#[cfg(feature = "http")]
fn http_get(url: &str) -> CricResult<Vec<u8>> {
    use std::io::Read;

    let response = ureq::get(url)
        .timeout(std::time::Duration::from_secs(60))
        .call()
        .map_err(|e| {
            CricError::data_format(format!(
                "download failed, check the URL and your connection: {}",
                e
            ))
        })?;
    let status = response.status();
    if status >= 400 {
        return Err(CricError::data_format(format!(
            "server returned {} {} for {}",
            status,
            response.status_text(),
            url
        )));
    }
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| CricError::data_format_with("download failed while reading the body", e))?;
    Ok(bytes)
}

#[cfg(not(feature = "http"))]
fn http_get(url: &str) -> CricResult<Vec<u8>> {
    Err(CricError::data_format(format!(
        "cannot fetch {}: built without the http feature",
        url
    )))
}
