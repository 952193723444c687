//! Read-only views over the shaped table: selection filtering and aggregates.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::{parse_category, CategorySelection, CategoryView};
use crate::shaper::AnalyticRow;

pub const PRICE_BUCKET_COUNT: usize = 10;
const WEEK_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub market_count: usize,
    pub total_volume: f64,
    pub total_outcome_volume: f64,
    pub average_yes_price: Option<f64>,
    pub average_no_price: Option<f64>,
    pub average_days_to_end: Option<f64>,
    pub ending_within_week: usize,
    pub ended: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub market_count: usize,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBucket {
    pub lower: f64,
    pub upper: f64,
    pub market_count: usize,
}

/// With the "All" view the server returned every category, so rows are narrowed
/// to the selection here. A named view was already filtered server-side.
pub fn filter_by_selection(
    rows: Vec<AnalyticRow>,
    selection: &CategorySelection,
    view: &CategoryView,
) -> Vec<AnalyticRow> {
    if !view.is_all() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| selection.contains_label(&row.category))
        .collect()
}

pub fn summarize(rows: &[AnalyticRow]) -> TableSummary {
    let market_count = rows.len();
    let total_volume = rows.iter().map(|row| row.volume).sum();
    let total_outcome_volume = rows.iter().map(|row| row.total_volume).sum();

    TableSummary {
        market_count,
        total_volume,
        total_outcome_volume,
        average_yes_price: mean(rows.iter().map(|row| row.yes_price)),
        average_no_price: mean(rows.iter().map(|row| row.no_price)),
        average_days_to_end: mean(rows.iter().map(|row| row.days_to_end as f64)),
        ending_within_week: rows
            .iter()
            .filter(|row| (0..=WEEK_DAYS).contains(&row.days_to_end))
            .count(),
        ended: rows.iter().filter(|row| row.days_to_end < 0).count(),
    }
}

/// Largest markets by `volume`. Ties keep table order; NaN volumes sort last.
pub fn top_by_volume(rows: &[AnalyticRow], n: usize) -> Vec<AnalyticRow> {
    let mut ranked: Vec<&AnalyticRow> = rows.iter().collect();
    ranked.sort_by(|a, b| compare_volume_desc(a.volume, b.volume));
    ranked.into_iter().take(n).cloned().collect()
}

pub fn category_breakdown(rows: &[AnalyticRow]) -> Vec<CategoryBreakdown> {
    let mut by_label: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for row in rows {
        let entry = by_label.entry(row.category.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += row.volume;
    }

    let mut out: Vec<CategoryBreakdown> = by_label
        .into_iter()
        .map(|(category, (market_count, volume))| CategoryBreakdown {
            category: category.to_string(),
            market_count,
            volume,
        })
        .collect();

    // Known categories in their canonical order, then unknown labels alphabetically.
    out.sort_by_key(|entry| {
        parse_category(&entry.category)
            .map(|category| category.ordinal())
            .unwrap_or(usize::MAX)
    });
    out
}

pub fn yes_price_distribution(rows: &[AnalyticRow]) -> Vec<PriceBucket> {
    let width = 1.0 / PRICE_BUCKET_COUNT as f64;
    let mut buckets: Vec<PriceBucket> = (0..PRICE_BUCKET_COUNT)
        .map(|idx| PriceBucket {
            lower: idx as f64 * width,
            upper: (idx + 1) as f64 * width,
            market_count: 0,
        })
        .collect();

    for row in rows {
        if row.yes_price.is_nan() {
            continue;
        }
        let idx = (row.yes_price.clamp(0.0, 1.0) / width) as usize;
        buckets[idx.min(PRICE_BUCKET_COUNT - 1)].market_count += 1;
    }

    buckets
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| {
        (sum + value, count + 1)
    });
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn compare_volume_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
