//! Dashboard configuration, read from `PMDASH_*` environment variables.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::category::{
    default_selection, parse_category_view, CategoryError, CategorySelection, CategoryView,
};
use crate::cycle::{CycleRequest, DEFAULT_TOP_N};
use crate::fetcher::FetcherConfig;

pub const MIN_REFRESH_INTERVAL_SECS: u64 = 60;
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_DASHBOARD_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub fetcher: FetcherConfig,
    pub selection: CategorySelection,
    pub view: CategoryView,
    pub auto_refresh: bool,
    pub refresh_interval_secs: u64,
    pub top_n: usize,
    pub dashboard_addr: String,
    pub use_demo: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig::default(),
            selection: default_selection(),
            view: CategoryView::All,
            auto_refresh: false,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            top_n: DEFAULT_TOP_N,
            dashboard_addr: DEFAULT_DASHBOARD_ADDR.to_string(),
            use_demo: false,
        }
    }
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn cycle_request(&self) -> CycleRequest {
        CycleRequest {
            selection: self.selection.clone(),
            view: self.view.clone(),
            top_n: self.top_n,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_refresh_interval(self.refresh_interval_secs)?;
        if self.fetcher.endpoint_url.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("refresh interval must be within [60, 600] seconds, got {0}")]
    RefreshIntervalOutOfRange(u64),
    #[error("endpoint URL must not be empty")]
    EmptyEndpoint,
    #[error(transparent)]
    Category(#[from] CategoryError),
}

pub fn dashboard_config_from_env() -> Result<DashboardConfig, ConfigError> {
    let mut config = DashboardConfig::default();

    if let Some(url) = non_empty_var("PMDASH_ENDPOINT_URL") {
        config.fetcher.endpoint_url = url;
    }
    if let Some(raw) = non_empty_var("PMDASH_HTTP_TIMEOUT_MS") {
        config.fetcher.http_timeout_ms = parse_number("PMDASH_HTTP_TIMEOUT_MS", &raw)?;
    }
    // Present but blank means the user deselected everything.
    if let Ok(raw) = env::var("PMDASH_CATEGORIES") {
        config.selection = CategorySelection::parse_list(&raw)?;
    }
    if let Some(raw) = non_empty_var("PMDASH_CATEGORY_VIEW") {
        config.view = parse_category_view(&raw)?;
    }
    if let Some(raw) = non_empty_var("PMDASH_AUTO_REFRESH") {
        config.auto_refresh = parse_flag("PMDASH_AUTO_REFRESH", &raw)?;
    }
    if let Some(raw) = non_empty_var("PMDASH_REFRESH_INTERVAL_SECS") {
        config.refresh_interval_secs = parse_number("PMDASH_REFRESH_INTERVAL_SECS", &raw)?;
    }
    if let Some(raw) = non_empty_var("PMDASH_TOP_N") {
        config.top_n = parse_number("PMDASH_TOP_N", &raw)?;
    }
    if let Some(addr) = non_empty_var("PMDASH_DASHBOARD_ADDR") {
        config.dashboard_addr = addr;
    }
    if let Some(raw) = non_empty_var("PMDASH_DASHBOARD_USE_DEMO") {
        config.use_demo = parse_flag("PMDASH_DASHBOARD_USE_DEMO", &raw)?;
    }

    config.validate()?;
    Ok(config)
}

pub fn validate_refresh_interval(secs: u64) -> Result<(), ConfigError> {
    if (MIN_REFRESH_INTERVAL_SECS..=MAX_REFRESH_INTERVAL_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(ConfigError::RefreshIntervalOutOfRange(secs))
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    parse_bool(raw).ok_or_else(|| ConfigError::InvalidValue {
        var,
        expected: "boolean",
        value: raw.to_string(),
    })
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        var,
        expected: "unsigned integer",
        value: raw.to_string(),
    })
}


#[cfg(test)]
mod tests {
    use super::test_env::with_env_vars;
    use super::*;
    use crate::category::Category;

    const ALL_VARS: [&str; 9] = [
        "PMDASH_ENDPOINT_URL",
        "PMDASH_HTTP_TIMEOUT_MS",
        "PMDASH_CATEGORIES",
        "PMDASH_CATEGORY_VIEW",
        "PMDASH_AUTO_REFRESH",
        "PMDASH_REFRESH_INTERVAL_SECS",
        "PMDASH_TOP_N",
        "PMDASH_DASHBOARD_ADDR",
        "PMDASH_DASHBOARD_USE_DEMO",
    ];

    fn cleared_with(
        overrides: &[(&'static str, &'static str)],
    ) -> Vec<(&'static str, Option<&'static str>)> {
        ALL_VARS
            .iter()
            .map(|key| {
                let value = overrides
                    .iter()
                    .find(|(name, _)| name == key)
                    .map(|(_, value)| *value);
                (*key, value)
            })
            .collect()
    }

    #[test]
    fn defaults_when_env_missing() {
        let cfg = with_env_vars(&cleared_with(&[]), dashboard_config_from_env).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.fetcher.endpoint_url, "https://clob.polymarket.com/query");
        assert_eq!(
            cfg.selection.categories(),
            &[Category::Politics, Category::Crypto]
        );
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(300));
    }

    #[test]
    fn parses_every_variable() {
        let vars = cleared_with(&[
            ("PMDASH_ENDPOINT_URL", "http://localhost:9000/query"),
            ("PMDASH_HTTP_TIMEOUT_MS", "2500"),
            ("PMDASH_CATEGORIES", "Sports,Science"),
            ("PMDASH_CATEGORY_VIEW", "Sports"),
            ("PMDASH_AUTO_REFRESH", "on"),
            ("PMDASH_REFRESH_INTERVAL_SECS", "60"),
            ("PMDASH_TOP_N", "5"),
            ("PMDASH_DASHBOARD_ADDR", "0.0.0.0:9090"),
            ("PMDASH_DASHBOARD_USE_DEMO", "true"),
        ]);
        let cfg = with_env_vars(&vars, dashboard_config_from_env).unwrap();

        assert_eq!(cfg.fetcher.endpoint_url, "http://localhost:9000/query");
        assert_eq!(cfg.fetcher.http_timeout_ms, 2500);
        assert_eq!(
            cfg.selection.categories(),
            &[Category::Sports, Category::Science]
        );
        assert_eq!(cfg.view, CategoryView::Named("Sports".to_string()));
        assert!(cfg.auto_refresh);
        assert_eq!(cfg.refresh_interval_secs, 60);
        assert_eq!(cfg.top_n, 5);
        assert_eq!(cfg.dashboard_addr, "0.0.0.0:9090");
        assert!(cfg.use_demo);
    }

    #[test]
    fn blank_categories_mean_empty_selection() {
        let vars = cleared_with(&[("PMDASH_CATEGORIES", "")]);
        let cfg = with_env_vars(&vars, dashboard_config_from_env).unwrap();
        assert!(cfg.selection.is_empty());
    }

    #[test]
    fn refresh_interval_bounds_are_enforced() {
        for (raw, ok) in [("59", false), ("60", true), ("600", true), ("601", false)] {
            let vars = cleared_with(&[("PMDASH_REFRESH_INTERVAL_SECS", raw)]);
            let result = with_env_vars(&vars, dashboard_config_from_env);
            assert_eq!(result.is_ok(), ok, "interval {raw}");
        }
        assert_eq!(
            validate_refresh_interval(30),
            Err(ConfigError::RefreshIntervalOutOfRange(30))
        );
    }

    #[test]
    fn invalid_values_are_reported() {
        let vars = cleared_with(&[("PMDASH_AUTO_REFRESH", "maybe")]);
        assert!(matches!(
            with_env_vars(&vars, dashboard_config_from_env),
            Err(ConfigError::InvalidValue {
                var: "PMDASH_AUTO_REFRESH",
                ..
            })
        ));

        let vars = cleared_with(&[("PMDASH_CATEGORIES", "Politics,Weather")]);
        assert!(matches!(
            with_env_vars(&vars, dashboard_config_from_env),
            Err(ConfigError::Category(CategoryError::UnsupportedCategory(_)))
        ));
    }
}
