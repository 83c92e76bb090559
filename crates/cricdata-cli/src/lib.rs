//! Shared CLI definitions for cricdata.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// Kind of tabular source holding the innings data.
/// When `--kind` is not specified, the kind is auto-detected from the path or URL.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SourceKind {
    /// Delimited text file (optionally compressed)
    Csv,
    /// Excel or OpenDocument workbook (.xls, .xlsx, .xlsm, .xlsb, .ods)
    Excel,
    /// Link-shared Google Sheet, fetched through its CSV export
    Sheet,
}

impl SourceKind {
    /// Parse a kind name as written in the config file ("csv", "excel", "sheet").
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "csv" | "tsv" | "text" => Some(Self::Csv),
            "excel" | "xlsx" | "workbook" => Some(Self::Excel),
            "sheet" | "gsheet" | "google-sheet" => Some(Self::Sheet),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
            Self::Sheet => "sheet",
        }
    }
}

/// Compression format for data files
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Gzip compression (.gz) - Most common, good balance of speed and compression
    Gzip,
    /// Zstandard compression (.zst) - Modern, fast compression with good ratios
    Zstd,
    /// Bzip2 compression (.bz2) - Good compression ratio, slower than gzip
    Bzip2,
    /// XZ compression (.xz) - Excellent compression ratio, slower than bzip2
    Xz,
}

impl CompressionFormat {
    /// Detect compression format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            Self::from_name(ext)
        } else {
            None
        }
    }

    /// Parse a compression name or extension ("gzip", "gz", "zst", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gz" | "gzip" => Some(Self::Gzip),
            "zst" | "zstd" => Some(Self::Zstd),
            "bz2" | "bz" | "bzip2" => Some(Self::Bzip2),
            "xz" => Some(Self::Xz),
            _ => None,
        }
    }

    /// Get file extension for this compression format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Gzip => "gz",
            Self::Zstd => "zst",
            Self::Bzip2 => "bz2",
            Self::Xz => "xz",
        }
    }
}

/// Output format for exported tables.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// JSON array of records
    Json,
    /// JSON Lines / NDJSON (one JSON object per line)
    Ndjson,
    /// Parquet columnar format
    Parquet,
}

impl ExportFormat {
    /// Detect the export format from the output path, looking through a compression suffix
    /// (`seasons.csv.gz` is CSV).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        if CompressionFormat::from_name(ext).is_some() {
            return path
                .file_stem()
                .map(Path::new)
                .and_then(|stem| stem.extension())
                .and_then(|e| e.to_str())
                .and_then(Self::from_extension);
        }
        Self::from_extension(ext)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::Ndjson),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
            Self::Parquet => "parquet",
        }
    }

    /// Whether the format is delimited text that can be compressed on write.
    pub fn supports_compression(&self) -> bool {
        matches!(self, Self::Csv | Self::Tsv | Self::Ndjson)
    }
}

/// Which dashboard chart to render.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ChartKind {
    /// Halfway delivery of every selected innings over time, with the average as a rule
    Halfway,
    /// Average halfway delivery per season (line and bars)
    Seasons,
}

/// Season range and team set applied to the innings table.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct SelectionArgs {
    /// First season of the range (inclusive). Default: first season in the data
    #[arg(long = "from", value_name = "SEASON")]
    pub from: Option<String>,

    /// Last season of the range (inclusive). Default: last season in the data
    #[arg(long = "to", value_name = "SEASON")]
    pub to: Option<String>,

    /// Batting team to include (repeatable). Default: [selection] default_teams from config
    #[arg(long = "team", value_name = "TEAM")]
    pub teams: Vec<String>,

    /// Include every batting team present in the data
    #[arg(long = "all-teams", action, conflicts_with = "teams")]
    pub all_teams: bool,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Dataset stats, latest match, overall average and the season table
    Summary {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Print JSON instead of text
        #[arg(long = "json", action)]
        json: bool,
    },

    /// Average halfway delivery per season
    Seasons {
        /// Print JSON instead of text
        #[arg(long = "json", action)]
        json: bool,

        /// Write the season table to a file (format from extension or --format)
        #[arg(long = "output", short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,

        /// Force the export format
        #[arg(long = "format", value_enum, requires = "output")]
        format: Option<ExportFormat>,
    },

    /// Innings matching the season range and team set
    Select {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Print JSON instead of text
        #[arg(long = "json", action)]
        json: bool,

        /// Write the selected innings to a file (format from extension or --format)
        #[arg(long = "output", short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,

        /// Force the export format
        #[arg(long = "format", value_enum, requires = "output")]
        format: Option<ExportFormat>,

        /// Compress the exported file (csv, tsv and ndjson only)
        #[arg(long = "output-compression", value_enum, requires = "output")]
        output_compression: Option<CompressionFormat>,
    },

    /// Render a dashboard chart to PNG or EPS
    Chart {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Chart to render
        #[arg(long = "chart", value_enum, default_value = "halfway")]
        chart: ChartKind,

        /// Output file (.png or .eps)
        #[arg(long = "output", short = 'o', value_name = "FILE")]
        output: PathBuf,
    },

    /// Reload the source periodically and print the summary whenever its content changes
    Watch {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Seconds between reloads (overrides [watch] interval_secs)
        #[arg(long = "interval", value_name = "SECS")]
        interval: Option<u64>,

        /// Stop after this many reloads (default: run until interrupted)
        #[arg(long = "max-reloads", value_name = "N")]
        max_reloads: Option<usize>,
    },
}

/// Command-line arguments for cricdata
#[derive(Clone, Parser, Debug)]
#[command(
    name = "cricdata",
    version,
    about = "ODI halfway-delivery analysis",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path or URL of the innings data (overrides [source] path / sheet_url)
    #[arg(long = "source", short = 's', value_name = "PATH|URL", global = true)]
    pub source: Option<String>,

    /// Kind of source (csv, excel, sheet). Auto-detected from the path when omitted
    #[arg(long = "kind", value_enum, global = true)]
    pub kind: Option<SourceKind>,

    /// Worksheet to load: Excel sheet name or 0-based index, Google Sheet gid
    #[arg(long = "sheet", value_name = "SHEET", global = true)]
    pub sheet: Option<String>,

    /// Delimiter of a delimited text source (default: ',')
    #[arg(long = "delimiter", global = true)]
    pub delimiter: Option<u8>,

    /// Compression of a CSV source (gzip, zstd, bzip2, xz).
    /// If not specified, compression is auto-detected from file extension.
    #[arg(long = "compression", value_enum, global = true)]
    pub compression: Option<CompressionFormat>,

    /// Read configuration from this file instead of ~/.config/cricdata/config.toml
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Generate default configuration file at ~/.config/cricdata/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

fn push_options_table(out: &mut String, cmd: &clap::Command, skip_global: bool) {
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" || (skip_global && arg.is_global_set()) {
            continue;
        }

        let mut parts = Vec::new();
        if let Some(s) = arg.get_short() {
            parts.push(format!("-{s}"));
        }
        if let Some(l) = arg.get_long() {
            parts.push(format!("--{l}"));
        }
        let op = parts.join(", ");
        let placeholder = if arg.get_action().takes_values() {
            value_placeholder(arg)
        } else {
            String::new()
        };
        let option_str = if placeholder.is_empty() {
            op
        } else {
            format!("{op} {placeholder}")
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }
}

/// Render command-line options as markdown: global options first, then one table per
/// subcommand.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Global Options\n\n");
    push_options_table(&mut out, &cmd, false);

    for sub in cmd.get_subcommands() {
        if sub.get_name() == "help" {
            continue;
        }
        out.push_str(&format!("\n## `{}`\n\n", sub.get_name()));
        if let Some(about) = sub.get_about() {
            out.push_str(&format!("{}\n\n", about));
        }
        push_options_table(&mut out, sub, true);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_detection() {
        assert_eq!(
            CompressionFormat::from_extension(Path::new("innings.csv.gz")),
            Some(CompressionFormat::Gzip)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("innings.csv.zst")),
            Some(CompressionFormat::Zstd)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("innings.csv.bz2")),
            Some(CompressionFormat::Bzip2)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("innings.csv.xz")),
            Some(CompressionFormat::Xz)
        );
        assert_eq!(
            CompressionFormat::from_extension(Path::new("innings.csv")),
            None
        );
        assert_eq!(CompressionFormat::from_extension(Path::new("innings")), None);
    }

    #[test]
    fn test_source_kind_from_name() {
        assert_eq!(SourceKind::from_name("CSV"), Some(SourceKind::Csv));
        assert_eq!(SourceKind::from_name(" excel "), Some(SourceKind::Excel));
        assert_eq!(SourceKind::from_name("gsheet"), Some(SourceKind::Sheet));
        assert_eq!(SourceKind::from_name("parquet"), None);
        assert_eq!(SourceKind::Sheet.as_str(), "sheet");
    }

    #[test]
    fn test_export_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("selection.csv")),
            Some(ExportFormat::Csv)
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("selection.csv.gz")),
            Some(ExportFormat::Csv)
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("seasons.NDJSON")),
            Some(ExportFormat::Ndjson)
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("seasons.parquet")),
            Some(ExportFormat::Parquet)
        );
        assert_eq!(ExportFormat::from_path(Path::new("noext")), None);
        assert_eq!(ExportFormat::from_path(Path::new("data.gz")), None);
    }

    #[test]
    fn test_args_parse_select() {
        let args = Args::try_parse_from([
            "cricdata",
            "--source",
            "data/innings.csv",
            "select",
            "--from",
            "2003-2004",
            "--to",
            "2015",
            "--team",
            "India",
            "--team",
            "Australia",
            "-o",
            "out.csv",
        ])
        .expect("args should parse");
        assert_eq!(args.source.as_deref(), Some("data/innings.csv"));
        match args.command {
            Some(Command::Select {
                selection, output, ..
            }) => {
                assert_eq!(selection.from.as_deref(), Some("2003-2004"));
                assert_eq!(selection.to.as_deref(), Some("2015"));
                assert_eq!(selection.teams, vec!["India", "Australia"]);
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            other => panic!("expected select, got {:?}", other),
        }
    }

    #[test]
    fn test_all_teams_conflicts_with_team() {
        let result = Args::try_parse_from([
            "cricdata",
            "summary",
            "--all-teams",
            "--team",
            "India",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_options_markdown_lists_subcommands() {
        let md = render_options_markdown();
        assert!(md.contains("## Global Options"));
        assert!(md.contains("`-s, --source <PATH|URL>`"));
        assert!(md.contains("## `select`"));
        assert!(md.contains("## `watch`"));
    }
}
