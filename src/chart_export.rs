//! Dashboard charts exported to PNG (plotters bitmap) and EPS (minimal PostScript, no deps).

use chrono::{Datelike, NaiveDate};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::aggregate::SeasonAggregate;
use crate::innings::InningsTable;
use crate::overs::Overs;

pub type Rgb = (u8, u8, u8);

const RULE_COLOR: Rgb = (255, 0, 0);
const SEASON_COLOR: Rgb = (70, 130, 180);

/// Team colours as shown on the web dashboard.
const TEAM_COLORS: &[(&str, Rgb)] = &[
    ("Afghanistan", (0, 0, 255)),
    ("Africa XI", (0, 100, 0)),
    ("Asia XI", (173, 216, 230)),
    ("Australia", (255, 215, 0)),
    ("Bangladesh", (0, 103, 71)),
    ("Bermuda", (0, 0, 255)),
    ("Canada", (255, 0, 0)),
    ("Denmark", (255, 0, 0)),
    ("England", (0, 0, 128)),
    ("Hong Kong", (0, 128, 0)),
    ("India", (135, 206, 235)),
    ("Ireland", (22, 155, 98)),
    ("Italy", (0, 0, 255)),
    ("Kenya", (0, 100, 0)),
    ("Malaysia", (255, 255, 0)),
    ("Namibia", (0, 0, 255)),
    ("Nepal", (0, 0, 255)),
    ("Netherlands", (255, 69, 0)),
    ("New Zealand", (0, 0, 0)),
    ("Oman", (255, 0, 0)),
    ("P.N.G.", (0, 0, 0)),
    ("Pakistan", (0, 255, 0)),
    ("Scotland", (0, 0, 255)),
    ("South Africa", (0, 122, 77)),
    ("Sri Lanka", (0, 0, 139)),
    ("U.A.E.", (128, 128, 128)),
    ("U.S.A.", (0, 0, 255)),
    ("Uganda", (255, 255, 0)),
    ("West Indies", (123, 0, 65)),
    ("Zimbabwe", (255, 0, 0)),
];

/// For teams without a fixed colour.
const FALLBACK_PALETTE: [Rgb; 7] = [
    (0, 178, 230),   // cyan
    (230, 0, 128),   // magenta
    (0, 178, 0),     // green
    (230, 204, 0),   // yellow
    (0, 0, 230),     // blue
    (230, 0, 0),     // red
    (128, 230, 230), // light cyan
];

pub fn team_color(team: &str, fallback_index: usize) -> Rgb {
    TEAM_COLORS
        .iter()
        .find(|(name, _)| *name == team)
        .map(|(_, c)| *c)
        .unwrap_or(FALLBACK_PALETTE[fallback_index % FALLBACK_PALETTE.len()])
}

/// Escape a string for PostScript ( and ) and \.
fn ps_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Generate "nice" tick values in [min, max] with roughly max_ticks steps.
fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    let range = if max > min { max - min } else { 1.0 };
    if range <= 0.0 || max_ticks == 0 {
        return vec![min];
    }
    let raw_step = range / (max_ticks as f64).max(1.0);
    let mag = 10.0_f64.powf(raw_step.log10().floor());
    let norm = if mag > 0.0 { raw_step / mag } else { raw_step };
    let step = if norm <= 1.0 {
        1.0 * mag
    } else if norm <= 2.0 {
        2.0 * mag
    } else if norm <= 5.0 {
        5.0 * mag
    } else {
        10.0 * mag
    };
    let step = step.max(f64::EPSILON);
    let start = (min / step).floor() * step;
    let mut ticks = Vec::new();
    let mut v = start;
    while v <= max + step * 0.001 {
        if v >= min - step * 0.001 {
            ticks.push(v);
        }
        v += step;
        if ticks.len() > max_ticks + 2 {
            break;
        }
    }
    if ticks.is_empty() {
        ticks.push(min);
    }
    ticks
}

/// Integer when whole, else one decimal (the precision of overs notation).
fn format_tick(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}

/// Match date as a fractional calendar year, for a continuous x axis.
fn year_fraction(date: NaiveDate) -> f64 {
    let days = if date.leap_year() { 366.0 } else { 365.0 };
    f64::from(date.year()) + f64::from(date.ordinal0()) / days
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesStyle {
    Points,
    Line,
    Bars,
    /// Horizontal line across the whole plot at the first point's y.
    Rule,
}

/// One series: name, colour and (x, y) points.
pub struct ChartExportSeries {
    pub name: String,
    pub color: Rgb,
    pub style: SeriesStyle,
    pub points: Vec<(f64, f64)>,
}

/// What the x values mean, for tick labels.
#[derive(Debug, Clone, PartialEq)]
pub enum XAxis {
    /// Fractional calendar years
    Years,
    /// Ordinal positions of these season labels
    Seasons(Vec<String>),
}

pub struct ChartExportBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub x_label: String,
    pub y_label: String,
}

/// A chart ready to be written in either format.
pub struct ChartExport {
    pub title: String,
    pub x_axis: XAxis,
    pub bounds: ChartExportBounds,
    pub series: Vec<ChartExportSeries>,
}

/// Export format for chart: PNG or EPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartExportFormat {
    Png,
    Eps,
}

impl ChartExportFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("png") => Some(Self::Png),
            Some("eps") | Some("ps") => Some(Self::Eps),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Eps => "eps",
        }
    }
}

impl ChartExport {
    /// Halfway delivery of each selected innings over time, one series per batting team, with a
    /// rule at `average`.
    pub fn halfway(rows: &InningsTable, average: Option<Overs>) -> Result<Self> {
        let mut series: Vec<ChartExportSeries> = Vec::new();
        for team in rows.teams() {
            let points: Vec<(f64, f64)> = rows
                .iter()
                .filter(|r| r.batting_team == team)
                .filter_map(|r| r.half_del().map(|o| (year_fraction(r.date), o.notation())))
                .collect();
            if points.is_empty() {
                continue;
            }
            let color = team_color(&team, series.len());
            series.push(ChartExportSeries {
                name: team,
                color,
                style: SeriesStyle::Points,
                points,
            });
        }
        let all: Vec<(f64, f64)> = series.iter().flat_map(|s| s.points.iter().copied()).collect();
        if all.is_empty() {
            return Err(eyre!("No innings with a halfway delivery in the selection"));
        }

        let (mut x_min, mut x_max) = min_max(all.iter().map(|p| p.0));
        let (mut y_min, mut y_max) = min_max(all.iter().map(|p| p.1));
        if let Some(avg) = average {
            let y = avg.notation();
            y_min = y_min.min(y);
            y_max = y_max.max(y);
            series.push(ChartExportSeries {
                name: format!("Average {}", avg),
                color: RULE_COLOR,
                style: SeriesStyle::Rule,
                points: vec![(x_min, y)],
            });
        }
        x_min -= 0.25;
        x_max += 0.25;
        y_min = (y_min - 1.0).floor();
        y_max = (y_max + 1.0).ceil();

        let title = match average {
            Some(avg) => format!(
                "Delivery number at the halfway point of a completed 50 over innings (avg={} overs)",
                avg
            ),
            None => "Delivery number at the halfway point of a completed 50 over innings".to_string(),
        };
        Ok(Self {
            title,
            x_axis: XAxis::Years,
            bounds: ChartExportBounds {
                x_min,
                x_max,
                y_min,
                y_max,
                x_label: "Match Date".to_string(),
                y_label: "Halfway Delivery".to_string(),
            },
            series,
        })
    }

    /// Average halfway delivery per season as a line over bars.
    pub fn seasons(seasons: &[SeasonAggregate]) -> Result<Self> {
        if seasons.is_empty() {
            return Err(eyre!("No seasons to chart"));
        }
        let points: Vec<(f64, f64)> = seasons
            .iter()
            .enumerate()
            .map(|(i, s)| (i as f64, s.half_del.notation()))
            .collect();
        let (y_min, y_max) = min_max(points.iter().map(|p| p.1));
        Ok(Self {
            title: "Average halfway delivery per season".to_string(),
            x_axis: XAxis::Seasons(seasons.iter().map(|s| s.season.clone()).collect()),
            bounds: ChartExportBounds {
                x_min: -0.5,
                x_max: seasons.len() as f64 - 0.5,
                y_min: (y_min - 1.0).floor(),
                y_max: (y_max + 1.0).ceil(),
                x_label: "Season".to_string(),
                y_label: "Avg. Halfway Delivery".to_string(),
            },
            series: vec![
                ChartExportSeries {
                    name: "Seasons".to_string(),
                    color: SEASON_COLOR,
                    style: SeriesStyle::Bars,
                    points: points.clone(),
                },
                ChartExportSeries {
                    name: "Trend".to_string(),
                    color: RULE_COLOR,
                    style: SeriesStyle::Line,
                    points,
                },
            ],
        })
    }

    /// Label for an x value, blank where no label belongs.
    pub fn x_label(&self, x: f64) -> String {
        let whole = (x - x.round()).abs() < 1e-6;
        match &self.x_axis {
            XAxis::Years if whole => format!("{:.0}", x),
            XAxis::Years => String::new(),
            XAxis::Seasons(labels) if whole && x >= 0.0 => labels
                .get(x.round() as usize)
                .cloned()
                .unwrap_or_default(),
            XAxis::Seasons(_) => String::new(),
        }
    }

    /// X tick positions: whole years or season ordinals, thinned to at most `max_ticks`.
    fn x_ticks(&self, max_ticks: usize) -> Vec<f64> {
        let (first, last) = match &self.x_axis {
            XAxis::Years => (self.bounds.x_min.ceil(), self.bounds.x_max.floor()),
            XAxis::Seasons(labels) => (0.0, labels.len() as f64 - 1.0),
        };
        if last < first {
            return Vec::new();
        }
        let count = (last - first) as usize + 1;
        let step = count.div_ceil(max_ticks.max(1)).max(1);
        (0..count)
            .step_by(step)
            .map(|i| first + i as f64)
            .collect()
    }

    /// Write to `path`, choosing the format from its extension.
    pub fn write(&self, path: &Path, size: (u32, u32)) -> Result<()> {
        match ChartExportFormat::from_path(path) {
            Some(ChartExportFormat::Png) => write_chart_png(path, self, size),
            Some(ChartExportFormat::Eps) => write_chart_eps(path, self, size),
            None => Err(eyre!(
                "Unsupported chart file {}: use .png or .eps",
                path.display()
            )),
        }
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn ps_rgb(c: Rgb) -> String {
    format!(
        "{:.3} {:.3} {:.3} setrgbcolor",
        f64::from(c.0) / 255.0,
        f64::from(c.1) / 255.0,
        f64::from(c.2) / 255.0
    )
}

/// Write chart to EPS (Encapsulated PostScript). No external dependencies.
pub fn write_chart_eps(path: &Path, chart: &ChartExport, size: (u32, u32)) -> Result<()> {
    if chart.series.iter().all(|s| s.points.is_empty()) {
        return Err(eyre!("No data to export"));
    }

    let w = f64::from(size.0);
    let h = f64::from(size.1);
    const MARGIN_LEFT: f64 = 50.0;
    const MARGIN_BOTTOM: f64 = 40.0;
    const MARGIN_RIGHT: f64 = 110.0;
    const MARGIN_TOP: f64 = 30.0;
    let plot_w = (w - MARGIN_LEFT - MARGIN_RIGHT).max(10.0);
    let plot_h = (h - MARGIN_BOTTOM - MARGIN_TOP).max(10.0);

    let b = &chart.bounds;
    let x_range = if b.x_max > b.x_min { b.x_max - b.x_min } else { 1.0 };
    let y_range = if b.y_max > b.y_min { b.y_max - b.y_min } else { 1.0 };
    let to_x = |x: f64| MARGIN_LEFT + (x - b.x_min) / x_range * plot_w;
    let to_y = |y: f64| MARGIN_BOTTOM + (y - b.y_min) / y_range * plot_h;
    let in_x = |px: f64| (MARGIN_LEFT..=MARGIN_LEFT + plot_w).contains(&px);
    let in_y = |py: f64| (MARGIN_BOTTOM..=MARGIN_BOTTOM + plot_h).contains(&py);

    let mut f = BufWriter::new(File::create(path)?);

    writeln!(f, "%!PS-Adobe-3.0 EPSF-3.0")?;
    writeln!(f, "%%BoundingBox: 0 0 {} {}", size.0, size.1)?;
    writeln!(f, "%%Creator: cricdata")?;
    writeln!(f, "%%Title: ({})", ps_escape(&chart.title))?;
    writeln!(f, "%%EndComments")?;
    writeln!(f, "gsave")?;
    writeln!(f, "1 setlinewidth")?;

    const MAX_TICKS: usize = 8;
    let x_ticks = chart.x_ticks(MAX_TICKS);
    let y_ticks = nice_ticks(b.y_min, b.y_max, MAX_TICKS);

    // Grid
    writeln!(f, "0.9 setgray")?;
    writeln!(f, "0.5 setlinewidth")?;
    for &v in &x_ticks {
        let px = to_x(v);
        if in_x(px) {
            writeln!(f, "{} {} moveto 0 {} rlineto stroke", px, MARGIN_BOTTOM, plot_h)?;
        }
    }
    for &v in &y_ticks {
        let py = to_y(v);
        if in_y(py) {
            writeln!(f, "{} {} moveto {} 0 rlineto stroke", MARGIN_LEFT, py, plot_w)?;
        }
    }
    writeln!(f, "1 setlinewidth")?;
    writeln!(f, "0 setgray")?;

    // Axis box
    writeln!(f, "{} {} moveto", MARGIN_LEFT, MARGIN_BOTTOM)?;
    writeln!(f, "{} 0 rlineto", plot_w)?;
    writeln!(f, "0 {} rlineto", plot_h)?;
    writeln!(f, "{} 0 rlineto", -plot_w)?;
    writeln!(f, "closepath stroke")?;

    const TICK_LEN: f64 = 4.0;
    for &v in &x_ticks {
        let px = to_x(v);
        if in_x(px) {
            writeln!(f, "{} {} moveto 0 {} rlineto stroke", px, MARGIN_BOTTOM, -TICK_LEN)?;
        }
    }
    for &v in &y_ticks {
        let py = to_y(v);
        if in_y(py) {
            writeln!(f, "{} {} moveto {} 0 rlineto stroke", MARGIN_LEFT, py, -TICK_LEN)?;
        }
    }

    writeln!(f, "/Helvetica findfont 9 scalefont setfont")?;
    let char_w: f64 = 5.0;
    for &v in &x_ticks {
        let px = to_x(v);
        let s = chart.x_label(v);
        if in_x(px) && !s.is_empty() {
            let label_w = s.len() as f64 * char_w;
            let tx = (px - label_w / 2.0).max(2.0);
            writeln!(f, "{} {} moveto ({}) show", tx, MARGIN_BOTTOM - 12.0, ps_escape(&s))?;
        }
    }
    for &v in &y_ticks {
        let py = to_y(v);
        if in_y(py) {
            let s = format_tick(v);
            let label_w = s.len() as f64 * char_w;
            let tx = (MARGIN_LEFT - label_w - 4.0).max(2.0);
            writeln!(f, "{} {} moveto ({}) show", tx, py - 3.0, ps_escape(&s))?;
        }
    }

    // Axis titles and chart title
    writeln!(f, "/Helvetica findfont 10 scalefont setfont")?;
    if !b.x_label.is_empty() {
        let x_center = MARGIN_LEFT + plot_w / 2.0;
        let approx = b.x_label.len() as f64 * char_w;
        writeln!(
            f,
            "{} {} moveto ({}) show",
            (x_center - approx / 2.0).max(MARGIN_LEFT),
            MARGIN_BOTTOM - 26.0,
            ps_escape(&b.x_label)
        )?;
    }
    if !b.y_label.is_empty() {
        writeln!(f, "gsave")?;
        writeln!(f, "12 {} translate 90 rotate", MARGIN_BOTTOM + plot_h / 2.0)?;
        let approx = b.y_label.len() as f64 * char_w;
        writeln!(f, "{} 0 moveto ({}) show", -approx / 2.0, ps_escape(&b.y_label))?;
        writeln!(f, "grestore")?;
    }
    writeln!(
        f,
        "{} {} moveto ({}) show",
        MARGIN_LEFT,
        MARGIN_BOTTOM + plot_h + 12.0,
        ps_escape(&chart.title)
    )?;

    for s in &chart.series {
        if s.points.is_empty() {
            continue;
        }
        writeln!(f, "{}", ps_rgb(s.color))?;
        match s.style {
            SeriesStyle::Line => {
                writeln!(f, "2 setlinewidth")?;
                let (px, py) = s.points[0];
                writeln!(f, "{} {} moveto", to_x(px), to_y(py))?;
                for &(px, py) in &s.points[1..] {
                    writeln!(f, "{} {} lineto", to_x(px), to_y(py))?;
                }
                writeln!(f, "stroke")?;
                writeln!(f, "1 setlinewidth")?;
            }
            SeriesStyle::Points => {
                let rad = 3.0;
                for &(px, py) in &s.points {
                    writeln!(f, "{} {} {} 0 360 arc fill", to_x(px), to_y(py), rad)?;
                }
            }
            SeriesStyle::Bars => {
                let n = s.points.len() as f64;
                let bar_w = (plot_w / n).clamp(1.0, 20.0) * 0.7;
                for &(px, py) in &s.points {
                    let cx = to_x(px) - bar_w / 2.0;
                    let cy = to_y(b.y_min);
                    let bar_h = to_y(py) - cy;
                    writeln!(f, "{} {} {} {} rectfill", cx, cy, bar_w, bar_h)?;
                }
            }
            SeriesStyle::Rule => {
                let py = to_y(s.points[0].1);
                writeln!(f, "2 setlinewidth")?;
                writeln!(f, "{} {} moveto {} 0 rlineto stroke", MARGIN_LEFT, py, plot_w)?;
                writeln!(f, "1 setlinewidth")?;
            }
        }
    }

    // Legend, right of the plot
    writeln!(f, "/Helvetica findfont 8 scalefont setfont")?;
    let legend_x = MARGIN_LEFT + plot_w + 10.0;
    let mut legend_y = MARGIN_BOTTOM + plot_h - 8.0;
    for s in &chart.series {
        if s.points.is_empty() || legend_y < MARGIN_BOTTOM {
            continue;
        }
        writeln!(f, "{}", ps_rgb(s.color))?;
        writeln!(f, "{} {} 6 6 rectfill", legend_x, legend_y)?;
        writeln!(f, "0 setgray")?;
        writeln!(
            f,
            "{} {} moveto ({}) show",
            legend_x + 10.0,
            legend_y,
            ps_escape(&s.name)
        )?;
        legend_y -= 11.0;
    }

    writeln!(f, "grestore")?;
    writeln!(f, "%%EOF")?;
    f.flush()?;
    Ok(())
}

/// Write chart to PNG using plotters bitmap backend.
pub fn write_chart_png(path: &Path, chart: &ChartExport, size: (u32, u32)) -> Result<()> {
    use plotters::prelude::*;

    if chart.series.iter().all(|s| s.points.is_empty()) {
        return Err(eyre!("No data to export"));
    }

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let b = &chart.bounds;
    let mut ctx = ChartBuilder::on(&root)
        .caption(chart.title.as_str(), ("sans-serif", 16))
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(b.x_min..b.x_max, b.y_min..b.y_max)?;

    let x_formatter = |x: &f64| chart.x_label(*x);
    let y_formatter = |y: &f64| format_tick(*y);
    ctx.configure_mesh()
        .x_desc(b.x_label.as_str())
        .y_desc(b.y_label.as_str())
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .draw()?;

    for s in &chart.series {
        if s.points.is_empty() {
            continue;
        }
        let color = RGBColor(s.color.0, s.color.1, s.color.2);
        match s.style {
            SeriesStyle::Line => {
                ctx.draw_series(LineSeries::new(
                    s.points.iter().copied(),
                    color.stroke_width(3),
                ))?
                .label(s.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
            SeriesStyle::Points => {
                ctx.draw_series(s.points.iter().map(|&p| {
                    Circle::new(p, 4, color.mix(0.7).filled())
                }))?
                .label(s.name.as_str())
                .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
            }
            SeriesStyle::Bars => {
                let y0 = b.y_min;
                ctx.draw_series(s.points.iter().map(|&(x, y)| {
                    Rectangle::new([(x - 0.3, y0), (x + 0.3, y)], color.mix(0.5).filled())
                }))?;
            }
            SeriesStyle::Rule => {
                let y = s.points[0].1;
                ctx.draw_series(LineSeries::new(
                    vec![(b.x_min, y), (b.x_max, y)],
                    color.mix(0.8).stroke_width(3),
                ))?
                .label(s.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
        }
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::season_aggregates;
    use crate::innings::test_rows::innings;

    fn rows() -> InningsTable {
        InningsTable::new(vec![
            innings("1", "2014-2015", "2014-11-02", "India", Some(170)),
            innings("1", "2014-2015", "2014-11-02", "Sri Lanka", Some(182)),
            innings("2", "2015", "2015-03-29", "Australia", Some(179)),
            innings("3", "2016", "2016-06-01", "Scotland", None),
        ])
    }

    fn render_eps(chart: &ChartExport) -> String {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("chart.eps");
        chart.write(&path, (640, 420)).expect("write eps");
        std::fs::read_to_string(&path).expect("read")
    }

    #[test]
    fn halfway_chart_has_team_series_and_rule() {
        let chart = ChartExport::halfway(&rows(), Some(Overs::from_balls(177))).unwrap();
        // Scotland has no halfway delivery and gets no series.
        let names: Vec<_> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Australia", "India", "Sri Lanka", "Average 29.3"]);
        assert_eq!(chart.series[0].color, (255, 215, 0));
        assert_eq!(chart.series[3].style, SeriesStyle::Rule);
        assert!(chart.title.contains("avg=29.3 overs"));
    }

    #[test]
    fn eps_contains_desired_elements() {
        let chart = ChartExport::halfway(&rows(), Some(Overs::from_balls(177))).unwrap();
        let content = render_eps(&chart);

        assert!(content.contains("%!PS-Adobe-3.0 EPSF-3.0"), "EPS header");
        assert!(content.contains("%%BoundingBox: 0 0 640 420"), "BoundingBox");
        assert!(content.contains("%%Creator: cricdata"), "Creator");
        assert!(content.contains("0.9 setgray"), "grid color");
        assert!(content.contains("closepath stroke"), "axis box");
        assert!(content.contains("(Match Date)"), "x axis title");
        assert!(content.contains("(Halfway Delivery)"), "y axis title");
        assert!(content.contains("(2015) show"), "year tick label");
        assert!(content.contains("arc fill"), "points");
        assert!(content.contains("1.000 0.000 0.000 setrgbcolor"), "red rule");
        assert!(content.contains("(India) show"), "legend entry");
        assert!(content.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn season_chart_labels_seasons() {
        let chart = ChartExport::seasons(&season_aggregates(&rows())).unwrap();
        assert_eq!(chart.x_label(0.0), "2014-2015");
        assert_eq!(chart.x_label(1.0), "2015");
        assert_eq!(chart.x_label(0.5), "");
        assert_eq!(chart.x_label(7.0), "");
        let content = render_eps(&chart);
        assert!(content.contains("rectfill"), "bars");
        assert!(content.contains("lineto"), "trend line");
        assert!(content.contains("(2014-2015) show"));
    }

    #[test]
    fn empty_inputs_are_errors() {
        let empty = InningsTable::new(Vec::new());
        assert!(ChartExport::halfway(&empty, None).is_err());
        assert!(ChartExport::seasons(&[]).is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let chart = ChartExport::seasons(&season_aggregates(&rows())).unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(chart.write(&dir.path().join("chart.svg"), (640, 420)).is_err());
    }

    #[test]
    fn unknown_teams_use_the_fallback_palette() {
        assert_eq!(team_color("India", 0), (135, 206, 235));
        assert_eq!(team_color("Atlantis", 1), FALLBACK_PALETTE[1]);
    }

    #[test]
    fn ticks() {
        assert_eq!(format_tick(29.0), "29");
        assert_eq!(format_tick(29.5), "29.5");
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }
}
