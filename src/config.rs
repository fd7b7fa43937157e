use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

pub const DEFAULT_LISTING_URL: &str = "https://www.criterion.com/shop/browse/list?sort=year&decade=2020s,2010s,2000s,1990s,1980s&direction=desc";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Settings for the scrape pipeline. Built once at startup and handed to each
/// component by reference.
#[derive(Clone, Debug)]
pub struct Config {
    pub omdb_api_key: String,
    pub omdb_base_url: String,
    pub omdb_rps: u32,
    pub database_url: String,
    pub listing_url: String,
    pub max_concurrent: usize,
    pub strip_title_annotations: bool,
    pub catalog_export_path: PathBuf,
    pub unresolved_report_path: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let omdb_api_key = var("OMDB_API_KEY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingVar("OMDB_API_KEY"))?;

        let omdb_base_url =
            var("OMDB_BASE_URL").unwrap_or_else(|| "http://www.omdbapi.com/".to_string());

        let omdb_rps: u32 = var("OMDB_RPS").and_then(|s| s.parse().ok()).unwrap_or(4);

        let max_concurrent: usize =
            var("MAX_CONCURRENT_REQUESTS").and_then(|s| s.parse().ok()).unwrap_or(4);

        let listing_url = var("LISTING_URL").unwrap_or_else(|| DEFAULT_LISTING_URL.to_string());

        let strip_title_annotations = match var("STRIP_TITLE_ANNOTATIONS") {
            Some(v) => parse_bool(&v).context("STRIP_TITLE_ANNOTATIONS")?,
            None => true,
        };

        let unresolved_report_path =
            var("UNRESOLVED_REPORT_PATH").unwrap_or_else(|| "unresolved.json".to_string()).into();

        Ok(Self {
            omdb_api_key,
            omdb_base_url,
            omdb_rps,
            database_url: database_url_from(&var),
            listing_url,
            max_concurrent,
            strip_title_annotations,
            catalog_export_path: catalog_export_path_from(&var),
            unresolved_report_path,
        })
    }
}

/// Settings for the read-only catalog server, which never talks to OMDb.
#[derive(Clone, Debug)]
pub struct ReaderConfig {
    pub addr: SocketAddr,
    pub database_url: String,
}

impl ReaderConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "7000".to_string()).parse().context("PORT")?;

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url: database_url(),
        })
    }
}

pub fn database_url() -> String {
    database_url_from(&|name: &str| std::env::var(name).ok())
}

pub fn catalog_export_path() -> PathBuf {
    catalog_export_path_from(&|name: &str| std::env::var(name).ok())
}

fn database_url_from(var: &impl Fn(&str) -> Option<String>) -> String {
    var("DATABASE_URL").unwrap_or_else(|| "sqlite://criterionbox.db?mode=rwc".to_string())
}

fn catalog_export_path_from(var: &impl Fn(&str) -> Option<String>) -> PathBuf {
    var("CATALOG_EXPORT_PATH").unwrap_or_else(|| "criterion_movies.json".to_string()).into()
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn parses_boolean_flags() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool(" YES ").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    fn assert_missing_key(result: anyhow::Result<Config>) {
        let err = result.expect_err("config should be rejected");
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingVar("OMDB_API_KEY"))
        ));
        assert_eq!(err.to_string(), "missing required environment variable: OMDB_API_KEY");
    }

    #[test]
    fn absent_api_key_is_fatal() {
        assert_missing_key(Config::from_lookup(vars(&[("OMDB_RPS", "2")])));
    }

    #[test]
    fn blank_api_key_is_fatal() {
        assert_missing_key(Config::from_lookup(vars(&[("OMDB_API_KEY", "   ")])));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(vars(&[("OMDB_API_KEY", " abc123 ")])).unwrap();

        assert_eq!(config.omdb_api_key, "abc123");
        assert_eq!(config.omdb_base_url, "http://www.omdbapi.com/");
        assert_eq!(config.omdb_rps, 4);
        assert_eq!(config.max_concurrent, 4);
        assert!(config.strip_title_annotations);
        assert_eq!(config.listing_url, DEFAULT_LISTING_URL);
        assert_eq!(config.database_url, "sqlite://criterionbox.db?mode=rwc");
        assert_eq!(config.catalog_export_path, PathBuf::from("criterion_movies.json"));
    }

    #[test]
    fn invalid_flag_is_rejected() {
        let result = Config::from_lookup(vars(&[
            ("OMDB_API_KEY", "abc123"),
            ("STRIP_TITLE_ANNOTATIONS", "sometimes"),
        ]));
        assert!(result.is_err());
    }
}
