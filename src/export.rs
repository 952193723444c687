//! Download artifacts: CSV of the analytic table and standalone SVG bar charts.

use std::io::Write;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cycle::TableView;
use crate::shaper::AnalyticRow;

pub const CSV_HEADERS: [&str; 11] = [
    "id",
    "question",
    "category",
    "volume",
    "yes_price",
    "no_price",
    "yes_volume",
    "no_volume",
    "total_volume",
    "end_date",
    "days_to_end",
];

pub const CHART_NAMES: [&str; 3] = ["volume_by_category", "top_markets", "yes_price_distribution"];

const CHART_WIDTH: u32 = 640;
const CHART_BAR_HEIGHT: u32 = 22;
const CHART_BAR_GAP: u32 = 6;
const CHART_LABEL_WIDTH: u32 = 220;
const CHART_TOP: u32 = 40;
const CHART_LABEL_MAX_CHARS: usize = 34;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub name: String,
    pub title: String,
    pub bars: Vec<ChartBar>,
}

pub fn write_csv<W: Write>(rows: &[AnalyticRow], writer: W) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_HEADERS)?;
    for row in rows {
        out.write_record([
            row.id.clone(),
            row.question.clone(),
            row.category.clone(),
            row.volume.to_string(),
            row.yes_price.to_string(),
            row.no_price.to_string(),
            row.yes_volume.to_string(),
            row.no_volume.to_string(),
            row.total_volume.to_string(),
            row.end_date.to_rfc3339_opts(SecondsFormat::Secs, true),
            row.days_to_end.to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

pub fn table_to_csv(rows: &[AnalyticRow]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

pub fn build_charts(view: &TableView) -> Vec<BarChart> {
    vec![
        BarChart {
            name: CHART_NAMES[0].to_string(),
            title: "Volume by category".to_string(),
            bars: view
                .breakdown
                .iter()
                .map(|entry| ChartBar {
                    label: entry.category.clone(),
                    value: entry.volume,
                })
                .collect(),
        },
        BarChart {
            name: CHART_NAMES[1].to_string(),
            title: format!("Top {} markets by volume", view.top_markets.len()),
            bars: view
                .top_markets
                .iter()
                .map(|row| ChartBar {
                    label: row.question.clone(),
                    value: row.volume,
                })
                .collect(),
        },
        BarChart {
            name: CHART_NAMES[2].to_string(),
            title: "YES price distribution".to_string(),
            bars: view
                .price_distribution
                .iter()
                .map(|bucket| ChartBar {
                    label: format!("{:.1}-{:.1}", bucket.lower, bucket.upper),
                    value: bucket.market_count as f64,
                })
                .collect(),
        },
    ]
}

pub fn find_chart(view: &TableView, name: &str) -> Option<BarChart> {
    build_charts(view).into_iter().find(|chart| chart.name == name)
}

/// Horizontal bar chart, bars scaled against the largest finite value.
pub fn render_bar_chart_svg(chart: &BarChart) -> String {
    let bar_count = chart.bars.len() as u32;
    let height = CHART_TOP + bar_count.max(1) * (CHART_BAR_HEIGHT + CHART_BAR_GAP) + 16;
    let plot_width = (CHART_WIDTH - CHART_LABEL_WIDTH - 90) as f64;
    let max_value = chart
        .bars
        .iter()
        .map(|bar| bar.value)
        .filter(|value| value.is_finite())
        .fold(0.0_f64, f64::max);

    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"chart\" data-chart=\"{}\" width=\"{CHART_WIDTH}\" height=\"{height}\" viewBox=\"0 0 {CHART_WIDTH} {height}\">",
        escape_xml(&chart.name)
    ));
    out.push_str("<rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>");
    out.push_str(&format!(
        "<text x=\"12\" y=\"24\" font-family=\"sans-serif\" font-size=\"15\" font-weight=\"700\" fill=\"#14343f\">{}</text>",
        escape_xml(&chart.title)
    ));

    if chart.bars.is_empty() {
        out.push_str(&format!(
            "<text x=\"12\" y=\"{}\" font-family=\"sans-serif\" font-size=\"12\" fill=\"#5f6a73\">No data</text>",
            CHART_TOP + 14
        ));
    }

    for (idx, bar) in chart.bars.iter().enumerate() {
        let y = CHART_TOP + idx as u32 * (CHART_BAR_HEIGHT + CHART_BAR_GAP);
        let width = if max_value > 0.0 && bar.value.is_finite() && bar.value > 0.0 {
            (bar.value / max_value * plot_width).max(1.0)
        } else {
            0.0
        };
        let text_y = y + CHART_BAR_HEIGHT / 2 + 4;

        out.push_str(&format!(
            "<text x=\"{}\" y=\"{text_y}\" text-anchor=\"end\" font-family=\"sans-serif\" font-size=\"11\" fill=\"#182026\">{}</text>",
            CHART_LABEL_WIDTH - 8,
            escape_xml(&truncate_label(&bar.label))
        ));
        out.push_str(&format!(
            "<rect class=\"bar\" x=\"{CHART_LABEL_WIDTH}\" y=\"{y}\" width=\"{width:.1}\" height=\"{CHART_BAR_HEIGHT}\" fill=\"#0c5f78\"/>"
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{text_y}\" font-family=\"sans-serif\" font-size=\"11\" fill=\"#5f6a73\">{}</text>",
            CHART_LABEL_WIDTH as f64 + width + 6.0,
            escape_xml(&format_compact(bar.value))
        ));
    }

    out.push_str("</svg>");
    out
}

pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if !value.is_finite() {
        "-".to_string()
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() <= CHART_LABEL_MAX_CHARS {
        return label.to_string();
    }
    let mut short: String = label.chars().take(CHART_LABEL_MAX_CHARS - 1).collect();
    short.push('…');
    short
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
