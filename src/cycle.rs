//! One refresh cycle: fetch, shape, filter and aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::category::{CategorySelection, CategoryView};
use crate::fetcher::{FetchError, MarketFetcher};
use crate::shaper::{shape_markets, AnalyticRow, ShapeError};
use crate::table::{
    category_breakdown, filter_by_selection, summarize, top_by_volume, yes_price_distribution,
    CategoryBreakdown, PriceBucket, TableSummary,
};

pub const EMPTY_SELECTION_WARNING: &str = "Please select at least one category.";
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRequest {
    pub selection: CategorySelection,
    pub view: CategoryView,
    pub top_n: usize,
}

/// Everything the presentation layer needs from one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub rows: Vec<AnalyticRow>,
    pub summary: TableSummary,
    pub top_markets: Vec<AnalyticRow>,
    pub breakdown: Vec<CategoryBreakdown>,
    pub price_distribution: Vec<PriceBucket>,
}

impl TableView {
    pub fn from_rows(rows: Vec<AnalyticRow>, top_n: usize) -> Self {
        Self {
            summary: summarize(&rows),
            top_markets: top_by_volume(&rows, top_n),
            breakdown: category_breakdown(&rows),
            price_distribution: yes_price_distribution(&rows),
            rows,
        }
    }

    pub fn empty() -> Self {
        Self::from_rows(Vec::new(), 0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    EmptySelection { warning: &'static str },
    Table(TableView),
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Runs a full cycle. An empty selection is rejected before any request is made.
pub fn run_cycle(
    fetcher: &MarketFetcher,
    request: &CycleRequest,
    now: DateTime<Utc>,
) -> Result<CycleOutcome, CycleError> {
    if request.selection.is_empty() {
        warn!(
            component = "cycle",
            event = "cycle.empty_selection",
            message = EMPTY_SELECTION_WARNING
        );
        return Ok(CycleOutcome::EmptySelection {
            warning: EMPTY_SELECTION_WARNING,
        });
    }

    let raw = fetcher.fetch_markets(&request.view)?;
    let shaped = shape_markets(&raw, now)?;
    let fetched_count = shaped.len();
    let rows = filter_by_selection(shaped, &request.selection, &request.view);

    info!(
        component = "cycle",
        event = "cycle.shaped",
        category_view = %request.view,
        fetched_rows = fetched_count,
        kept_rows = rows.len()
    );

    Ok(CycleOutcome::Table(TableView::from_rows(rows, request.top_n)))
}
