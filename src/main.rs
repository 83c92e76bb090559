use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use cricdata::chart_export::ChartExport;
use cricdata::config::{AppConfig, ConfigManager};
use cricdata::error_display::user_message_from_report;
use cricdata::export::{self, ExportFormat, ExportOptions};
use cricdata::{
    ingest, report, CacheOutcome, CompressionFormat, CricError, Dashboard, DataSource,
    InningsTable, Selection, TableCache, APP_NAME,
};
use cricdata_cli::{Args, ChartKind, Command, SelectionArgs};
use log::{debug, info, warn, LevelFilter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// `-v` count wins over the configured level; RUST_LOG wins over both.
fn init_logging(verbose: u8, config: &AppConfig) -> Result<()> {
    let level = match verbose {
        0 => config.logging.level_filter()?,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let manager = ConfigManager::new(APP_NAME)?;
        let path = manager.write_default_config(args.force)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(Some(()));
    }
    Ok(None)
}

/// Command-line flags first, then the `[source]` section of the config.
fn resolve_source(args: &Args, config: &AppConfig) -> Result<DataSource> {
    let location = args
        .source
        .clone()
        .or_else(|| config.source.path.clone())
        .ok_or_else(|| {
            eyre!("No data source given. Pass --source or set [source] path in the config file")
        })?;
    let delimiter = args
        .delimiter
        .or(config.source.delimiter)
        .unwrap_or(b',');
    let source = DataSource::from_location(
        &location,
        args.kind.or_else(|| config.source_kind()),
        args.sheet.as_deref().or(config.source.sheet.as_deref()),
        delimiter,
        args.compression.or_else(|| config.source_compression()),
    )?;
    Ok(source)
}

/// Teams from `--team`, every team with `--all-teams`, otherwise the configured defaults.
/// The range falls back to the configured seasons, then to the whole table.
fn resolve_selection(
    args: &SelectionArgs,
    table: &InningsTable,
    config: &AppConfig,
) -> Result<Selection> {
    let base = if !args.teams.is_empty() {
        Selection::everything(table).map(|s| Selection {
            teams: args.teams.clone(),
            ..s
        })
    } else if args.all_teams {
        Selection::everything(table)
    } else {
        Selection::default_for(table, &config.selection.default_teams)
    };
    let mut selection = base.ok_or_else(|| {
        CricError::no_data("the source holds no completed 50-over innings")
    })?;

    if let Some(from) = args
        .from
        .clone()
        .or_else(|| config.selection.start_season.clone())
    {
        selection.start_season = from;
    }
    if let Some(to) = args.to.clone().or_else(|| config.selection.end_season.clone()) {
        selection.end_season = to;
    }
    debug!("selection: {:?}", selection);
    Ok(selection)
}

fn load_dashboard(source: &DataSource) -> Result<Dashboard> {
    let table = ingest::load(source)?;
    Ok(Dashboard::new(Arc::new(table)))
}

fn export_options(
    path: &Path,
    format: Option<ExportFormat>,
    compression: Option<CompressionFormat>,
    config: &AppConfig,
) -> Result<ExportOptions> {
    let format = format
        .or_else(|| ExportFormat::from_path(path))
        .ok_or_else(|| {
            eyre!(
                "Cannot tell the export format of {}. Use --format.",
                path.display()
            )
        })?;
    let compression = compression.or_else(|| CompressionFormat::from_extension(path));
    Ok(ExportOptions {
        format,
        delimiter: config.export.delimiter,
        include_header: config.export.include_header,
        compression,
    })
}

fn print_summary(dashboard: &Dashboard, selection: &Selection, json: bool) -> Result<()> {
    let view = dashboard.view(selection)?;
    if json {
        println!("{}", report::summary_json(&view, &dashboard.options())?);
    } else {
        print!("{}", report::render_summary(&view));
    }
    Ok(())
}

fn watch(
    source: &DataSource,
    selection_args: &SelectionArgs,
    config: &AppConfig,
    interval: Duration,
    max_reloads: Option<usize>,
) -> Result<()> {
    let mut cache = TableCache::new();
    let mut fetches = 0usize;
    loop {
        match cache.load(source) {
            Ok((_, CacheOutcome::Hit)) => debug!("{} unchanged", source.key()),
            Ok((table, outcome)) => {
                if outcome == CacheOutcome::Reloaded {
                    println!("--- source changed, reloaded ---");
                }
                let dashboard = Dashboard::new(table);
                let shown = resolve_selection(selection_args, dashboard.table(), config)
                    .and_then(|selection| print_summary(&dashboard, &selection, false));
                if let Err(e) = shown {
                    eprintln!("Error: {}", user_message_from_report(&e));
                }
            }
            Err(e) => {
                // Keep watching; the next fetch may succeed.
                warn!("reload of {} failed: {}", source.key(), e);
                eprintln!("Error: {}", user_message_from_report(&e.into()));
            }
        }
        fetches += 1;
        if max_reloads.is_some_and(|max| fetches >= max) {
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let source = resolve_source(args, config)?;
    let command = args.command.clone().unwrap_or(Command::Summary {
        selection: SelectionArgs::default(),
        json: false,
    });

    match command {
        Command::Summary { selection, json } => {
            let dashboard = load_dashboard(&source)?;
            let selection = resolve_selection(&selection, dashboard.table(), config)?;
            print_summary(&dashboard, &selection, json)
        }
        Command::Seasons {
            json,
            output,
            format,
        } => {
            let dashboard = load_dashboard(&source)?;
            if let Some(path) = output {
                let options = export_options(&path, format, None, config)?;
                let mut df = export::season_frame(dashboard.seasons())?;
                export::export_frame(&mut df, &path, &options)
                    .wrap_err_with(|| format!("Exporting seasons to {}", path.display()))?;
                info!("wrote {} seasons to {}", df.height(), path.display());
            } else if json {
                println!("{}", report::seasons_json(dashboard.seasons())?);
            } else {
                print!("{}", report::render_seasons(dashboard.seasons()));
            }
            Ok(())
        }
        Command::Select {
            selection,
            json,
            output,
            format,
            output_compression,
        } => {
            let dashboard = load_dashboard(&source)?;
            let selection = resolve_selection(&selection, dashboard.table(), config)?;
            let rows = selection.apply(dashboard.table())?;
            if let Some(path) = output {
                let options = export_options(&path, format, output_compression, config)?;
                let mut df = export::innings_frame(&rows)?;
                export::export_frame(&mut df, &path, &options)
                    .wrap_err_with(|| format!("Exporting selection to {}", path.display()))?;
                info!("wrote {} innings to {}", rows.len(), path.display());
            } else if json {
                println!("{}", report::rows_json(&rows)?);
            } else {
                print!("{}", report::render_rows(&rows));
            }
            Ok(())
        }
        Command::Chart {
            selection,
            chart,
            output,
        } => {
            let dashboard = load_dashboard(&source)?;
            let chart = match chart {
                ChartKind::Halfway => {
                    let selection = resolve_selection(&selection, dashboard.table(), config)?;
                    let view = dashboard.view(&selection)?;
                    ChartExport::halfway(&view.rows, view.selection_halfway)?
                }
                ChartKind::Seasons => ChartExport::seasons(dashboard.seasons())?,
            };
            chart
                .write(&output, (config.chart.width, config.chart.height))
                .wrap_err_with(|| format!("Rendering chart to {}", output.display()))?;
            println!("Chart written to {}", output.display());
            Ok(())
        }
        Command::Watch {
            selection,
            interval,
            max_reloads,
        } => {
            let secs = interval.unwrap_or(config.watch.interval_secs).max(1);
            watch(
                &source,
                &selection,
                config,
                Duration::from_secs(secs),
                max_reloads,
            )
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let result = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(APP_NAME),
    }
    .and_then(|config| {
        init_logging(args.verbose, &config)?;
        run(&args, &config)
    });
    if let Err(e) = result {
        eprintln!("Error: {}", user_message_from_report(&e));
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cricdata::Innings;

    fn innings(season: &str, team: &str) -> Innings {
        Innings {
            match_id: "1".to_string(),
            season: season.to_string(),
            date: NaiveDate::from_ymd_opt(2015, 2, 14).unwrap(),
            batting_team: team.to_string(),
            bowling_team: "Opponents".to_string(),
            venue: "Adelaide".to_string(),
            winner: team.to_string(),
            half_ball: Some(170),
        }
    }

    fn table() -> InningsTable {
        InningsTable::new(vec![
            innings("2014-2015", "India"),
            innings("2015", "Ireland"),
            innings("2016", "Australia"),
        ])
    }

    #[test]
    fn test_selection_defaults_to_configured_teams() {
        let config = AppConfig::default();
        let selection = resolve_selection(&SelectionArgs::default(), &table(), &config).unwrap();
        assert_eq!(selection.start_season, "2014-2015");
        assert_eq!(selection.end_season, "2016");
        assert_eq!(selection.teams, vec!["Australia", "India"]);
    }

    #[test]
    fn test_selection_flags_override_config() {
        let mut config = AppConfig::default();
        config.selection.start_season = Some("2015".to_string());
        let args = SelectionArgs {
            to: Some("2015".to_string()),
            teams: vec!["Ireland".to_string()],
            ..SelectionArgs::default()
        };
        let selection = resolve_selection(&args, &table(), &config).unwrap();
        assert_eq!(selection, Selection::new("2015", "2015", ["Ireland"]));

        let all = SelectionArgs {
            all_teams: true,
            ..SelectionArgs::default()
        };
        let selection = resolve_selection(&all, &table(), &config).unwrap();
        assert_eq!(selection.teams, vec!["Australia", "India", "Ireland"]);
    }

    #[test]
    fn test_empty_table_has_no_selection() {
        let config = AppConfig::default();
        let err = resolve_selection(
            &SelectionArgs::default(),
            &InningsTable::new(Vec::new()),
            &config,
        )
        .unwrap_err();
        assert!(user_message_from_report(&err).starts_with("No data available"));
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let args = Args::try_parse_from(["cricdata", "summary"]).unwrap();
        assert!(resolve_source(&args, &AppConfig::default()).is_err());

        let mut config = AppConfig::default();
        config.source.path = Some("data/innings.csv.gz".to_string());
        match resolve_source(&args, &config).unwrap() {
            DataSource::Csv { compression, .. } => {
                assert_eq!(compression, Some(CompressionFormat::Gzip))
            }
            other => panic!("expected a csv source, got {:?}", other),
        }
    }

    #[test]
    fn test_export_format_from_path_or_flag() {
        let config = AppConfig::default();
        let opts = export_options(Path::new("out.csv.gz"), None, None, &config).unwrap();
        assert_eq!(opts.format, ExportFormat::Csv);
        assert_eq!(opts.compression, Some(CompressionFormat::Gzip));
        assert!(export_options(Path::new("out.dat"), None, None, &config).is_err());
        let opts =
            export_options(Path::new("out.dat"), Some(ExportFormat::Json), None, &config).unwrap();
        assert_eq!(opts.format, ExportFormat::Json);
    }
}
