//! Chart geometry for the insights view: a language donut, a stars bar chart and a
//! repositories-per-year line chart. Geometry is computed in SVG user units and
//! can be rendered to a standalone SVG document.

use std::f64::consts::PI;
use std::fmt::Write as _;

use serde::Serialize;

use super::projection::{LanguageCount, RepoStat, YearCount};

pub const PALETTE: [&str; 6] = [
    "#8B5CF6", "#3B82F6", "#10B981", "#F59E0B", "#EC4899", "#6366F1",
];

/// The donut shows the most used languages only; percentages are shares of them.
pub const PIE_MAX_SLICES: usize = 6;

// ────────────────────────────────────────────────────────────────────────────
// Language donut
// ────────────────────────────────────────────────────────────────────────────

const PIE_CENTER: f64 = 50.0;
const PIE_RADIUS: f64 = 45.0;
const PIE_HOLE_RADIUS: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub count: u32,
    /// One decimal place, e.g. "33.3".
    pub percent: String,
    pub color: &'static str,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub view_box: &'static str,
    pub slices: Vec<PieSlice>,
}

fn polar(radius: f64, angle: f64) -> (f64, f64) {
    (
        PIE_CENTER + radius * angle.cos(),
        PIE_CENTER + radius * angle.sin(),
    )
}

/// Closed donut segment between two angles (radians, clockwise from +x).
fn donut_segment(start: f64, end: f64) -> String {
    let large_arc = if end - start > PI { 1 } else { 0 };
    let (ix0, iy0) = polar(PIE_HOLE_RADIUS, start);
    let (ox0, oy0) = polar(PIE_RADIUS, start);
    let (ox1, oy1) = polar(PIE_RADIUS, end);
    let (ix1, iy1) = polar(PIE_HOLE_RADIUS, end);
    format!(
        "M {ix0:.2},{iy0:.2} L {ox0:.2},{oy0:.2} \
         A {PIE_RADIUS},{PIE_RADIUS} 0 {large_arc} 1 {ox1:.2},{oy1:.2} \
         L {ix1:.2},{iy1:.2} \
         A {PIE_HOLE_RADIUS},{PIE_HOLE_RADIUS} 0 {large_arc} 0 {ix0:.2},{iy0:.2} Z"
    )
}

/// Returns `None` when there is nothing to draw.
pub fn pie_chart(data: &[LanguageCount]) -> Option<PieChart> {
    let data = &data[..data.len().min(PIE_MAX_SLICES)];
    let total: u32 = data.iter().map(|d| d.count).sum();
    if total == 0 {
        return None;
    }

    let mut angle = -PI / 2.0;
    let slices = data
        .iter()
        .enumerate()
        .filter(|(_, d)| d.count > 0)
        .map(|(i, d)| {
            let fraction = d.count as f64 / total as f64;
            let start = angle;
            let end = angle + fraction * 2.0 * PI;
            angle = end;

            // An arc cannot start and end on the same point; a full ring is two halves.
            let path = if d.count == total {
                let mid = start + PI;
                format!("{} {}", donut_segment(start, mid), donut_segment(mid, end))
            } else {
                donut_segment(start, end)
            };

            PieSlice {
                name: d.name.clone(),
                count: d.count,
                percent: format!("{:.1}", fraction * 100.0),
                color: PALETTE[i % PALETTE.len()],
                path,
            }
        })
        .collect();

    Some(PieChart {
        view_box: "0 0 100 100",
        slices,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Stars bar chart
// ────────────────────────────────────────────────────────────────────────────

const BAR_HEIGHT: f64 = 250.0;
const BAR_WIDTH: f64 = 500.0;
const BAR_Y_AXIS: f64 = 40.0;
const BAR_X_AXIS: f64 = 60.0;
const BAR_PADDING_TOP: f64 = 20.0;
const BAR_TICK_STEPS: u32 = 3;
const LABEL_MAX_CHARS: usize = 15;
const LABEL_KEEP_CHARS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: u32,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub name: String,
    pub label: String,
    pub stars: u32,
    pub forks: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label_x: f64,
    pub label_y: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub width: f64,
    pub height: f64,
    pub top_tick: u32,
    pub ticks: Vec<Tick>,
    pub bars: Vec<Bar>,
}

fn truncate_label(name: &str) -> String {
    if name.chars().count() > LABEL_MAX_CHARS {
        let head: String = name.chars().take(LABEL_KEEP_CHARS).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

/// Returns `None` when there are no repositories or none has a star.
pub fn bar_chart(data: &[RepoStat]) -> Option<BarChart> {
    let max = data.iter().map(|d| d.stars).max().unwrap_or(0);
    if max == 0 {
        return None;
    }

    let top_tick = max.div_ceil(100) * 100;
    let chart_height = BAR_HEIGHT - BAR_X_AXIS - BAR_PADDING_TOP;

    let ticks = (0..=BAR_TICK_STEPS)
        .map(|i| {
            let value = (top_tick as f64 / BAR_TICK_STEPS as f64 * i as f64).round() as u32;
            Tick {
                value,
                y: BAR_PADDING_TOP + chart_height - (value as f64 / top_tick as f64) * chart_height,
            }
        })
        .collect();

    let slot = (BAR_WIDTH - BAR_Y_AXIS) / data.len() as f64;
    let bar_width = slot * 0.6;
    let gap = slot * 0.4;

    let bars = data
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let height = d.stars as f64 / top_tick as f64 * chart_height;
            let x = BAR_Y_AXIS + i as f64 * slot + gap / 2.0;
            Bar {
                name: d.name.clone(),
                label: truncate_label(&d.name),
                stars: d.stars,
                forks: d.forks,
                x,
                y: BAR_PADDING_TOP + chart_height - height,
                width: bar_width,
                height,
                label_x: x + bar_width / 2.0,
                label_y: BAR_HEIGHT - BAR_X_AXIS + 15.0,
                color: PALETTE[i % PALETTE.len()],
            }
        })
        .collect();

    Some(BarChart {
        width: BAR_WIDTH,
        height: BAR_HEIGHT,
        top_tick,
        ticks,
        bars,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Activity line chart
// ────────────────────────────────────────────────────────────────────────────

const LINE_HEIGHT: f64 = 288.0;
const LINE_WIDTH: f64 = 500.0;
const LINE_Y_AXIS: f64 = 40.0;
const LINE_X_AXIS: f64 = 20.0;
const LINE_PADDING_TOP: f64 = 10.0;
const LINE_PADDING_RIGHT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub year: i32,
    pub count: u32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub width: f64,
    pub height: f64,
    pub max_count: u32,
    pub points: Vec<LinePoint>,
    pub path: String,
}

/// Returns `None` with fewer than two points.
pub fn line_chart(data: &[YearCount]) -> Option<LineChart> {
    if data.len() < 2 {
        return None;
    }

    let chart_height = LINE_HEIGHT - LINE_X_AXIS - LINE_PADDING_TOP;
    let chart_width = LINE_WIDTH - LINE_Y_AXIS - LINE_PADDING_RIGHT;

    let max_count = data.iter().map(|d| d.count).max().unwrap_or(0);
    let min_year = data.iter().map(|d| d.year).min()?;
    let max_year = data.iter().map(|d| d.year).max()?;
    let year_range = (max_year - min_year).max(1) as f64;
    // All-zero series sit on the baseline.
    let y_scale = max_count.max(1) as f64;

    let points: Vec<LinePoint> = data
        .iter()
        .map(|d| LinePoint {
            year: d.year,
            count: d.count,
            x: LINE_Y_AXIS + (d.year - min_year) as f64 / year_range * chart_width,
            y: LINE_PADDING_TOP + chart_height - d.count as f64 / y_scale * chart_height,
        })
        .collect();

    let path = points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}{:.2} {:.2}", if i == 0 { "M" } else { "L" }, p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ");

    Some(LineChart {
        width: LINE_WIDTH,
        height: LINE_HEIGHT,
        max_count,
        points,
        path,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// SVG rendering
// ────────────────────────────────────────────────────────────────────────────

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_pie_svg(chart: &PieChart) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{}">"#,
        chart.view_box
    );
    for slice in &chart.slices {
        let _ = write!(
            svg,
            r#"<path d="{}" fill="{}" stroke="white" stroke-width="2"><title>{}: {} ({}%)</title></path>"#,
            slice.path,
            slice.color,
            escape_xml(&slice.name),
            slice.count,
            slice.percent
        );
    }
    svg.push_str("</svg>");
    svg
}

pub fn render_bar_svg(chart: &BarChart) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
        chart.width, chart.height
    );
    for tick in &chart.ticks {
        let _ = write!(
            svg,
            r##"<line x1="{BAR_Y_AXIS}" y1="{y:.2}" x2="{w}" y2="{y:.2}" stroke="#e5e7eb"/><text x="{tx}" y="{y:.2}" text-anchor="end" font-size="10">{v}</text>"##,
            y = tick.y,
            w = chart.width,
            tx = BAR_Y_AXIS - 5.0,
            v = tick.value
        );
    }
    for bar in &chart.bars {
        let _ = write!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"><title>{}: {} stars, {} forks</title></rect><text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="10">{}</text>"#,
            bar.x,
            bar.y,
            bar.width,
            bar.height,
            bar.color,
            escape_xml(&bar.name),
            bar.stars,
            bar.forks,
            bar.label_x,
            bar.label_y,
            escape_xml(&bar.label)
        );
    }
    svg.push_str("</svg>");
    svg
}

pub fn render_line_svg(chart: &LineChart) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
        chart.width, chart.height
    );
    let _ = write!(
        svg,
        r#"<path d="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
        chart.path, PALETTE[0]
    );
    for point in &chart.points {
        let _ = write!(
            svg,
            r#"<circle cx="{:.2}" cy="{:.2}" r="4" fill="{}"><title>{}: {} repositories</title></circle><text x="{:.2}" y="{}" text-anchor="middle" font-size="10">{}</text>"#,
            point.x,
            point.y,
            PALETTE[0],
            point.year,
            point.count,
            point.x,
            chart.height - 4.0,
            point.year
        );
    }
    svg.push_str("</svg>");
    svg
}
