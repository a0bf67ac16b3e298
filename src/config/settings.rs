//! Runtime settings read from the environment.
//!
//! Values usually come from a `.env` file loaded by the binary before this runs.

use crate::{
    config::database::{DEFAULT_DATABASE_URL, get_database_url},
    core::period::MonthKey,
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use std::path::PathBuf;

/// Default location of the catalog seed file.
pub const DEFAULT_CATALOG_PATH: &str = "config.toml";

/// Settings needed to run the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Database connection string
    pub database_url: String,
    /// TOML file seeding localities, products and teams
    pub catalog_path: PathBuf,
    /// Month reported on startup
    pub report_month: MonthKey,
}

impl Settings {
    /// Reads `DATABASE_URL`, `CATALOG_PATH` and `REPORT_MONTH`.
    ///
    /// Missing values fall back to defaults; the report month defaults to the current month.
    ///
    /// # Errors
    /// Returns `Config` when `REPORT_MONTH` is not a valid `YYYY-MM` key.
    pub fn from_env() -> Result<Self> {
        Self::from_values(
            Some(get_database_url()),
            std::env::var("CATALOG_PATH").ok(),
            std::env::var("REPORT_MONTH").ok().as_deref(),
            Utc::now().date_naive(),
        )
    }

    /// Builds settings from already looked-up values, with `today` deciding the default month.
    ///
    /// # Errors
    /// Returns `Config` when `report_month` is not a valid `YYYY-MM` key.
    pub fn from_values(
        database_url: Option<String>,
        catalog_path: Option<String>,
        report_month: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self> {
        let report_month = match report_month {
            Some(value) => parse_report_month(value)?,
            None => MonthKey::of(today),
        };

        Ok(Self {
            database_url: database_url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            catalog_path: catalog_path.map_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH), PathBuf::from),
            report_month,
        })
    }
}

/// Parses a `YYYY-MM` report month, reporting failures as configuration errors.
pub fn parse_report_month(value: &str) -> Result<MonthKey> {
    value.trim().parse::<MonthKey>().map_err(|e| Error::Config {
        message: format!("REPORT_MONTH: {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_report_month() {
        let month = parse_report_month(" 2025-12 ").unwrap();
        assert_eq!(month, MonthKey::new(2025, 12).unwrap());

        let result = parse_report_month("December");
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
    }

    #[test]
    fn test_from_values_defaults() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 17).unwrap();
        let settings = Settings::from_values(None, None, None, today).unwrap();

        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.catalog_path, PathBuf::from(DEFAULT_CATALOG_PATH));
        assert_eq!(settings.report_month, MonthKey::new(2025, 12).unwrap());
    }

    #[test]
    fn test_from_values_explicit() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 17).unwrap();
        let settings = Settings::from_values(
            Some("sqlite::memory:".to_string()),
            Some("seed/catalog.toml".to_string()),
            Some("2026-01"),
            today,
        )
        .unwrap();

        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.catalog_path, PathBuf::from("seed/catalog.toml"));
        assert_eq!(settings.report_month, MonthKey::new(2026, 1).unwrap());

        let result = Settings::from_values(None, None, Some("2026-13"), today);
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
    }
}
