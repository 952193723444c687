//! Prediction-market dashboard core crate.
//!
//! - `fetcher`: one markets query per refresh against a configurable endpoint
//! - `shaper`: raw markets flattened into analytic rows
//! - `table` / `export`: aggregates, CSV and SVG chart artifacts
//! - `cycle` / `dashboard`: refresh cycles, snapshot sources and HTTP routes

mod category;
mod config;
mod cycle;
mod dashboard;
mod export;
mod fetcher;
mod observability;
mod shaper;
mod table;

pub use category::{
    default_selection, parse_category, parse_category_view, Category, CategoryError,
    CategorySelection, CategoryView, ALL_CATEGORIES, ALL_VIEW_SENTINEL,
};
pub use config::{
    dashboard_config_from_env, validate_refresh_interval, ConfigError, DashboardConfig,
    DEFAULT_DASHBOARD_ADDR, DEFAULT_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS,
    MIN_REFRESH_INTERVAL_SECS,
};
pub use cycle::{
    run_cycle, CycleError, CycleOutcome, CycleRequest, TableView, DEFAULT_TOP_N,
    EMPTY_SELECTION_WARNING,
};
pub use dashboard::{
    dashboard_router, demo_snapshot, market_link, render_dashboard_html, DashboardSnapshot,
    DashboardSnapshotSource, InMemorySnapshotSource, LiveMarketSnapshotSource, LiveSourceError,
    DASHBOARD_HEADERS,
};
pub use export::{
    build_charts, find_chart, format_compact, render_bar_chart_svg, table_to_csv, write_csv,
    BarChart, ChartBar, ExportError, CHART_NAMES, CSV_HEADERS,
};
pub use fetcher::{
    build_markets_request, parse_markets_envelope, FetchError, FetcherConfig, MarketFetcher,
    MarketQueryRequest, MarketTransport, RawMarket, RawNumber, RawOutcome,
    ReqwestBlockingTransport, DEFAULT_ENDPOINT_URL, MARKETS_QUERY,
};
pub use observability::{
    init_logging, log_app_bind, log_app_start, log_source_selected, logging_config_from_env,
    LogFormat, LoggingConfig, LoggingInitError,
};
pub use shaper::{
    days_between, shape_market, shape_markets, shape_markets_now, AnalyticRow, OutcomePair,
    ShapeError,
};
pub use table::{
    category_breakdown, filter_by_selection, summarize, top_by_volume, yes_price_distribution,
    CategoryBreakdown, PriceBucket, TableSummary, PRICE_BUCKET_COUNT,
};
