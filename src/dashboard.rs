//! Dashboard snapshots, the live refresh task, and the HTTP routes that render them.

use std::sync::{Arc, PoisonError, RwLock};
use std::thread::JoinHandle;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::category::{CategorySelection, CategoryView};
use crate::config::DashboardConfig;
use crate::cycle::{run_cycle, CycleOutcome, TableView};
use crate::export::{
    build_charts, escape_xml as escape_html, find_chart, format_compact, render_bar_chart_svg,
    table_to_csv,
};
use crate::fetcher::{FetchError, MarketFetcher, RawMarket, RawNumber, RawOutcome};
use crate::shaper::{shape_markets, AnalyticRow};
use crate::table::filter_by_selection;

pub const DASHBOARD_HEADERS: [&str; 10] = [
    "Question",
    "Category",
    "Volume",
    "YES",
    "NO",
    "YES Volume",
    "NO Volume",
    "Total Volume",
    "End",
    "Days to End",
];

const CSV_FILENAME: &str = "polymarket_data.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub selection: CategorySelection,
    pub view: CategoryView,
    pub auto_refresh: bool,
    pub refresh_interval_secs: u64,
    pub top_n: usize,
    pub warning: Option<String>,
    pub error: Option<String>,
    pub table: TableView,
}

impl DashboardSnapshot {
    /// Placeholder served before the first cycle finishes.
    pub fn pending(config: &DashboardConfig) -> Self {
        Self {
            generated_at: Utc::now(),
            selection: config.selection.clone(),
            view: config.view.clone(),
            auto_refresh: config.auto_refresh,
            refresh_interval_secs: config.refresh_interval_secs,
            top_n: config.top_n,
            warning: None,
            error: None,
            table: TableView::empty(),
        }
    }

    pub fn from_outcome(
        config: &DashboardConfig,
        outcome: CycleOutcome,
        now: DateTime<Utc>,
    ) -> Self {
        let mut snapshot = Self::pending(config);
        snapshot.generated_at = now;
        match outcome {
            CycleOutcome::EmptySelection { warning } => {
                snapshot.warning = Some(warning.to_string())
            }
            CycleOutcome::Table(table) => snapshot.table = table,
        }
        snapshot
    }

    /// A failed cycle discards the previous table; only the error is shown.
    pub fn failed(config: &DashboardConfig, error: impl Into<String>, now: DateTime<Utc>) -> Self {
        let mut snapshot = Self::pending(config);
        snapshot.generated_at = now;
        snapshot.error = Some(error.into());
        snapshot
    }

    /// Narrows rows to the given category labels and recomputes aggregates.
    pub fn narrowed_to(&self, categories: &[String]) -> Self {
        if categories.is_empty() {
            return self.clone();
        }
        let rows = self
            .table
            .rows
            .iter()
            .filter(|row| categories.iter().any(|label| *label == row.category))
            .cloned()
            .collect();
        Self {
            table: TableView::from_rows(rows, self.top_n),
            ..self.clone()
        }
    }
}

pub trait DashboardSnapshotSource: Send + Sync + 'static {
    fn snapshot(&self) -> DashboardSnapshot;

    /// Asks for an out-of-schedule cycle. Returns false when the source is static.
    fn request_refresh(&self) -> bool {
        false
    }
}

#[derive(Clone)]
pub struct InMemorySnapshotSource {
    inner: Arc<RwLock<DashboardSnapshot>>,
}

impl InMemorySnapshotSource {
    pub fn new(snapshot: DashboardSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    pub fn demo(config: &DashboardConfig) -> Self {
        Self::new(demo_snapshot(config, Utc::now()))
    }

    pub fn replace_snapshot(&self, snapshot: DashboardSnapshot) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = snapshot;
    }
}

impl DashboardSnapshotSource for InMemorySnapshotSource {
    fn snapshot(&self) -> DashboardSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshControl {
    Refresh,
    Stop,
}

/// Runs refresh cycles on a dedicated thread.
///
/// The first cycle starts immediately. With auto-refresh on, the next cycle is
/// scheduled one interval after the previous cycle finished, so cycles never
/// overlap. `stop` cancels between cycles; a cycle already in flight runs to
/// completion.
pub struct LiveMarketSnapshotSource {
    store: InMemorySnapshotSource,
    control: Sender<RefreshControl>,
    worker: Option<JoinHandle<()>>,
}

#[derive(Debug, Error)]
pub enum LiveSourceError {
    #[error("failed to spawn refresh thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("market fetcher could not be built: {0}")]
    Fetcher(#[from] FetchError),
    #[error("refresh thread exited before it was ready")]
    WorkerExited,
}

impl LiveMarketSnapshotSource {
    pub fn spawn(config: DashboardConfig) -> Result<Self, LiveSourceError> {
        Self::spawn_inner(config, None)
    }

    pub fn spawn_with_fetcher(
        config: DashboardConfig,
        fetcher: MarketFetcher,
    ) -> Result<Self, LiveSourceError> {
        Self::spawn_inner(config, Some(fetcher))
    }

    /// Returns only once the worker owns a fetcher, so a bad fetcher
    /// configuration fails here instead of leaving a dead source behind.
    fn spawn_inner(
        config: DashboardConfig,
        fetcher: Option<MarketFetcher>,
    ) -> Result<Self, LiveSourceError> {
        let store = InMemorySnapshotSource::new(DashboardSnapshot::pending(&config));
        let (control, control_rx) = unbounded();
        let (ready_tx, ready_rx) = unbounded::<Result<(), FetchError>>();
        let worker_store = store.clone();

        let worker = std::thread::Builder::new()
            .name("pmdash-refresh".to_string())
            .spawn(move || {
                let fetcher = match fetcher {
                    Some(fetcher) => fetcher,
                    None => match MarketFetcher::new(&config.fetcher) {
                        Ok(fetcher) => fetcher,
                        Err(err) => {
                            let _ = ready_tx.send(Err(err));
                            return;
                        }
                    },
                };
                let _ = ready_tx.send(Ok(()));
                refresh_worker(config, fetcher, worker_store, control_rx)
            })?;

        let ready = ready_rx.recv();
        if let Ok(Ok(())) = ready {
            return Ok(Self {
                store,
                control,
                worker: Some(worker),
            });
        }

        let _ = worker.join();
        let err = match ready {
            Ok(Err(err)) => LiveSourceError::Fetcher(err),
            _ => LiveSourceError::WorkerExited,
        };
        warn!(
            component = "dashboard",
            event = "refresh.start.error",
            error = %err
        );
        Err(err)
    }

    pub fn stop(&self) {
        let _ = self.control.send(RefreshControl::Stop);
    }

    /// Stops the worker and waits for an in-flight cycle to finish.
    pub fn shutdown(mut self) {
        self.stop();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for LiveMarketSnapshotSource {
    fn drop(&mut self) {
        self.stop();
    }
}

impl DashboardSnapshotSource for LiveMarketSnapshotSource {
    fn snapshot(&self) -> DashboardSnapshot {
        self.store.snapshot()
    }

    fn request_refresh(&self) -> bool {
        self.control.send(RefreshControl::Refresh).is_ok()
    }
}

fn refresh_worker(
    config: DashboardConfig,
    fetcher: MarketFetcher,
    store: InMemorySnapshotSource,
    control_rx: Receiver<RefreshControl>,
) {
    let mut cycle: u64 = 0;
    loop {
        cycle += 1;
        let snapshot = run_snapshot_cycle(&config, &fetcher, cycle);

        // Requests that queued up during the cycle collapse into the one just run.
        // Draining before publishing keeps later requests for the next wait.
        let mut stop = false;
        while let Ok(control) = control_rx.try_recv() {
            stop |= control == RefreshControl::Stop;
        }
        store.replace_snapshot(snapshot);
        if stop {
            break;
        }

        let next = if config.auto_refresh {
            match control_rx.recv_timeout(config.refresh_interval()) {
                Ok(control) => Some(control),
                Err(RecvTimeoutError::Timeout) => Some(RefreshControl::Refresh),
                Err(RecvTimeoutError::Disconnected) => None,
            }
        } else {
            control_rx.recv().ok()
        };

        if next != Some(RefreshControl::Refresh) {
            break;
        }
    }

    info!(
        component = "dashboard",
        event = "refresh.stopped",
        cycles = cycle
    );
}

fn run_snapshot_cycle(
    config: &DashboardConfig,
    fetcher: &MarketFetcher,
    cycle: u64,
) -> DashboardSnapshot {
    let now = Utc::now();
    match run_cycle(fetcher, &config.cycle_request(), now) {
        Ok(outcome) => {
            let snapshot = DashboardSnapshot::from_outcome(config, outcome, now);
            info!(
                component = "dashboard",
                event = "refresh.cycle.finish",
                cycle,
                rows = snapshot.table.rows.len(),
                warning = snapshot.warning.is_some()
            );
            snapshot
        }
        Err(err) => {
            warn!(
                component = "dashboard",
                event = "refresh.cycle.error",
                cycle,
                error = %err
            );
            DashboardSnapshot::failed(config, err.to_string(), now)
        }
    }
}

pub fn dashboard_router(source: Arc<dyn DashboardSnapshotSource>) -> Router {
    Router::new()
        .route("/dashboard", get(get_dashboard_html))
        .route("/dashboard/snapshot", get(get_dashboard_snapshot))
        .route("/dashboard/export.csv", get(get_dashboard_csv))
        .route("/dashboard/charts/{file}", get(get_dashboard_chart))
        .route("/dashboard/refresh", post(post_dashboard_refresh))
        .with_state(DashboardAppState { source })
}

pub fn market_link(id: &str) -> String {
    format!("https://polymarket.com/market/{id}")
}

pub fn render_dashboard_html(snapshot: &DashboardSnapshot) -> String {
    let generated = snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let summary = &snapshot.table.summary;

    let mut out = String::new();
    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if snapshot.auto_refresh {
        out.push_str(&format!(
            "<meta http-equiv=\"refresh\" content=\"{}\">\n",
            snapshot.refresh_interval_secs
        ));
    }
    out.push_str("<title>Polymarket Analysis Dashboard</title>\n");
    out.push_str("<style>:root{--bg:#f5f1e7;--bg2:#e9f0f2;--card:#ffffff;--ink:#182026;--muted:#5f6a73;--line:#d7dce1;--head:#14343f;--btn:#0c5f78;--warn:#fff5b8;--err:#fde2e1}*{box-sizing:border-box}body{margin:0;color:var(--ink);font-family:\"Space Grotesk\",\"Avenir Next\",\"Segoe UI\",sans-serif;background:linear-gradient(160deg,var(--bg),var(--bg2));min-height:100vh}.shell{max-width:1500px;margin:0 auto;padding:24px 18px 28px}.hero{background:linear-gradient(135deg,#102f3a 0%,#24576b 100%);color:#f7fbfc;border-radius:16px;padding:18px 20px}.hero h1{margin:0 0 8px;font-size:1.6rem}.hero-meta{display:flex;gap:16px;flex-wrap:wrap;font-size:.92rem;color:#dcebf0}.banner{margin-top:16px;padding:12px 16px;border-radius:12px;font-weight:600}.banner-warning{background:var(--warn);color:#5c4700}.banner-error{background:var(--err);color:#7a1712}.stats{display:grid;grid-template-columns:repeat(auto-fit,minmax(180px,1fr));gap:12px;margin-top:16px}.stat{background:var(--card);border:1px solid #cbd4db;border-radius:12px;padding:12px 14px}.stat b{display:block;font-size:1.3rem}.stat span{font-size:.8rem;color:var(--muted);text-transform:uppercase}.charts{display:grid;grid-template-columns:repeat(auto-fit,minmax(480px,1fr));gap:12px;margin-top:16px}.chart-card{background:var(--card);border:1px solid #cbd4db;border-radius:12px;padding:8px;overflow:auto}.chart-card a,.actions a{font-size:.8rem;color:var(--btn)}.card{margin-top:16px;background:var(--card);border:1px solid #cbd4db;border-radius:16px;overflow:hidden}.table-wrap{overflow:auto;max-height:75vh}table{width:100%;border-collapse:collapse;min-width:1100px}thead th{position:sticky;top:0;background:var(--head);color:#f2f7f9;font-size:.8rem;text-transform:uppercase;padding:10px;text-align:left}tbody td{font-size:.84rem;padding:9px 10px;border-bottom:1px solid var(--line)}tbody tr:nth-child(even){background:#fafcfd}td.num{text-align:right;font-variant-numeric:tabular-nums}td.ended{color:#a33}.actions{display:flex;gap:16px;padding:10px 14px;border-top:1px solid var(--line);background:#f8fbfc}</style>\n");
    out.push_str("</head><body><main class=\"shell\">\n");
    out.push_str("<section class=\"hero\"><h1>Polymarket Analysis Dashboard</h1>");
    out.push_str("<div class=\"hero-meta\">\n");
    let selected: Vec<&str> = snapshot
        .selection
        .categories()
        .iter()
        .map(|category| category.as_str())
        .collect();
    out.push_str(&format!(
        "<span>Categories: {}</span>",
        escape_html(&if selected.is_empty() {
            "none".to_string()
        } else {
            selected.join(", ")
        })
    ));
    out.push_str(&format!(
        "<span>View: {}</span>",
        escape_html(snapshot.view.label())
    ));
    if snapshot.auto_refresh {
        out.push_str(&format!(
            "<span>Auto-refresh: every {}s</span>",
            snapshot.refresh_interval_secs
        ));
    } else {
        out.push_str("<span>Auto-refresh: off</span>");
    }
    out.push_str(&format!("<span>Generated: {}</span>", escape_html(&generated)));
    out.push_str("</div></section>\n");

    if let Some(warning) = &snapshot.warning {
        out.push_str(&format!(
            "<div class=\"banner banner-warning\" role=\"alert\">{}</div>\n",
            escape_html(warning)
        ));
    }
    if let Some(error) = &snapshot.error {
        out.push_str(&format!(
            "<div class=\"banner banner-error\" role=\"alert\">Refresh failed: {}</div>\n",
            escape_html(error)
        ));
    }

    out.push_str("<section class=\"stats\">");
    push_stat(&mut out, "Markets", &summary.market_count.to_string());
    push_stat(&mut out, "Total Volume", &format_compact(summary.total_volume));
    push_stat(
        &mut out,
        "Outcome Volume",
        &format_compact(summary.total_outcome_volume),
    );
    push_stat(&mut out, "Avg YES Price", &format_optional(summary.average_yes_price, 3));
    push_stat(
        &mut out,
        "Avg Days to End",
        &format_optional(summary.average_days_to_end, 1),
    );
    push_stat(
        &mut out,
        "Ending within 7d",
        &summary.ending_within_week.to_string(),
    );
    out.push_str("</section>\n");

    out.push_str("<section class=\"charts\">");
    for chart in build_charts(&snapshot.table) {
        out.push_str("<div class=\"chart-card\">");
        out.push_str(&render_bar_chart_svg(&chart));
        out.push_str(&format!(
            "<div><a href=\"/dashboard/charts/{0}.svg\" download=\"{0}.svg\">Download chart</a></div>",
            escape_html(&chart.name)
        ));
        out.push_str("</div>");
    }
    out.push_str("</section>\n");

    out.push_str(
        "<section class=\"card\"><div class=\"table-wrap\"><table id=\"markets-table\">\n",
    );
    out.push_str("<thead><tr>");
    for header in DASHBOARD_HEADERS {
        out.push_str("<th>");
        out.push_str(&escape_html(header));
        out.push_str("</th>");
    }
    out.push_str("</tr></thead><tbody>\n");

    for (idx, row) in snapshot.table.rows.iter().enumerate() {
        out.push_str(&format!("<tr data-row=\"{idx}\">"));
        out.push_str("<td><a target=\"_blank\" rel=\"noopener noreferrer\" href=\"");
        out.push_str(&escape_html(&market_link(&row.id)));
        out.push_str("\">");
        out.push_str(&escape_html(&row.question));
        out.push_str("</a></td>");
        out.push_str(&format!("<td>{}</td>", escape_html(&row.category)));
        for value in row_numeric_cells(row) {
            out.push_str(&format!("<td class=\"num\">{value}</td>"));
        }
        out.push_str(&format!(
            "<td>{}</td>",
            row.end_date.format("%Y-%m-%d %H:%M UTC")
        ));
        let class = if row.days_to_end < 0 { "num ended" } else { "num" };
        out.push_str(&format!("<td class=\"{class}\">{}</td>", row.days_to_end));
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody></table></div><div class=\"actions\">");
    out.push_str(&format!(
        "<a href=\"/dashboard/export.csv\" download=\"{CSV_FILENAME}\">Download CSV</a>"
    ));
    out.push_str("<a href=\"/dashboard/snapshot\">Snapshot JSON</a>");
    out.push_str("</div></section>");
    out.push_str("</main></body></html>\n");
    out
}

fn row_numeric_cells(row: &AnalyticRow) -> [String; 6] {
    [
        format!("{:.2}", row.volume),
        format!("{:.3}", row.yes_price),
        format!("{:.3}", row.no_price),
        format!("{:.2}", row.yes_volume),
        format!("{:.2}", row.no_volume),
        format!("{:.2}", row.total_volume),
    ]
}

fn push_stat(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(
        "<div class=\"stat\"><span>{}</span><b>{}</b></div>",
        escape_html(label),
        escape_html(value)
    ));
}

fn format_optional(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_else(|| "-".to_string())
}

/// A fixed set of markets shaped against `now`, for running without the endpoint.
pub fn demo_snapshot(config: &DashboardConfig, now: DateTime<Utc>) -> DashboardSnapshot {
    if config.selection.is_empty() {
        return DashboardSnapshot::from_outcome(
            config,
            CycleOutcome::EmptySelection {
                warning: crate::cycle::EMPTY_SELECTION_WARNING,
            },
            now,
        );
    }

    let markets = demo_markets(now.timestamp());
    match shape_markets(&markets, now) {
        Ok(rows) => {
            let rows = match config.view.server_filter() {
                Some(label) => rows.into_iter().filter(|row| row.category == label).collect(),
                None => filter_by_selection(rows, &config.selection, &config.view),
            };
            DashboardSnapshot::from_outcome(
                config,
                CycleOutcome::Table(TableView::from_rows(rows, config.top_n)),
                now,
            )
        }
        Err(err) => DashboardSnapshot::failed(config, err.to_string(), now),
    }
}

fn demo_markets(now_ts: i64) -> Vec<RawMarket> {
    const DAY: i64 = 86_400;
    let fixtures: [(&str, &str, &str, f64, f64, f64, i64); 10] = [
        ("demo-pol-1", "Will the incumbent win the next general election?", "Politics", 2_450_000.0, 0.58, 0.42, 120),
        ("demo-pol-2", "Will the budget bill pass before the recess?", "Politics", 860_000.0, 0.31, 0.69, 6),
        ("demo-cry-1", "Will BTC close above $100k this month?", "Crypto", 1_920_000.0, 0.44, 0.56, 14),
        ("demo-cry-2", "Will ETH flip SOL in weekly volume?", "Crypto", 410_000.0, 0.72, 0.28, -2),
        ("demo-spo-1", "Will the home side win the cup final?", "Sports", 1_150_000.0, 0.51, 0.49, 3),
        ("demo-ent-1", "Will the sequel top the opening weekend box office?", "Entertainment", 220_000.0, 0.67, 0.33, 9),
        ("demo-sci-1", "Will the launch reach orbit on the first attempt?", "Science", 180_000.0, 0.83, 0.17, 21),
        ("demo-eco-1", "Will the central bank cut rates at the next meeting?", "Economics", 1_340_000.0, 0.36, 0.64, 30),
        ("demo-eco-2", "Will monthly CPI print above consensus?", "Economics", 530_000.0, 0.47, 0.53, 11),
        ("demo-oth-1", "Will the record for hottest day be broken this year?", "Other", 95_000.0, 0.22, 0.78, 75),
    ];

    fixtures
        .iter()
        .map(|(id, question, category, volume, yes, no, days)| RawMarket {
            id: (*id).to_string(),
            question: (*question).to_string(),
            category: (*category).to_string(),
            volume: RawNumber::Text(volume.to_string()),
            outcomes: vec![
                RawOutcome {
                    price: Some(RawNumber::Text(yes.to_string())),
                    total_volume_yes: Some(RawNumber::Text((volume * yes).round().to_string())),
                    total_volume_no: None,
                },
                RawOutcome {
                    price: Some(RawNumber::Text(no.to_string())),
                    total_volume_yes: None,
                    total_volume_no: Some(RawNumber::Text((volume * no).round().to_string())),
                },
            ],
            end_date: RawNumber::Text((now_ts + days * DAY + DAY / 2).to_string()),
        })
        .collect()
}

/// Non-empty `category=` values, in request order.
fn category_params(pairs: Vec<(String, String)>) -> Vec<String> {
    pairs
        .into_iter()
        .filter(|(key, value)| key == "category" && !value.is_empty())
        .map(|(_, value)| value)
        .collect()
}

#[derive(Clone)]
struct DashboardAppState {
    source: Arc<dyn DashboardSnapshotSource>,
}

async fn get_dashboard_html(State(state): State<DashboardAppState>) -> impl IntoResponse {
    let snapshot = state.source.snapshot();
    info!(
        component = "dashboard",
        event = "http.dashboard.request",
        rows = snapshot.table.rows.len()
    );
    Html(render_dashboard_html(&snapshot))
}

async fn get_dashboard_snapshot(
    State(state): State<DashboardAppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let categories = category_params(pairs);
    let snapshot = state.source.snapshot().narrowed_to(&categories);
    info!(
        component = "dashboard",
        event = "http.snapshot.request",
        category_filters = categories.len(),
        rows = snapshot.table.rows.len()
    );
    Json(snapshot)
}

async fn get_dashboard_csv(State(state): State<DashboardAppState>) -> Response {
    let snapshot = state.source.snapshot();
    info!(
        component = "dashboard",
        event = "http.export.request",
        rows = snapshot.table.rows.len()
    );

    match table_to_csv(&snapshot.table.rows) {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{CSV_FILENAME}\""),
                ),
            ],
            body,
        )
            .into_response(),
        Err(err) => {
            warn!(
                component = "dashboard",
                event = "http.export.error",
                error = %err
            );
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

async fn get_dashboard_chart(
    State(state): State<DashboardAppState>,
    Path(file): Path<String>,
) -> Response {
    let name = file.strip_suffix(".svg").unwrap_or(&file);
    let snapshot = state.source.snapshot();
    info!(
        component = "dashboard",
        event = "http.chart.request",
        chart = name
    );

    match find_chart(&snapshot.table, name) {
        Some(chart) if file.ends_with(".svg") => (
            [
                (header::CONTENT_TYPE, "image/svg+xml".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{name}.svg\""),
                ),
            ],
            render_bar_chart_svg(&chart),
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, format!("unknown chart: {file}")).into_response(),
    }
}

async fn post_dashboard_refresh(State(state): State<DashboardAppState>) -> StatusCode {
    let accepted = state.source.request_refresh();
    info!(
        component = "dashboard",
        event = "http.refresh.request",
        accepted
    );
    if accepted {
        StatusCode::ACCEPTED
    } else {
        StatusCode::CONFLICT
    }
}
