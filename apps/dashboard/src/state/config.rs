//! # Configuration State
//!
//! Dashboard configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`OAKLINE_*`)
//! 2. Defaults (this file)
//!
//! Read-only after startup, so commands borrow it without locking.

use chrono::NaiveDate;
use directories::ProjectDirs;
use oakline_core::list::MAX_PAGE_SIZE;
use oakline_core::validation::validate_rate;
use oakline_core::{fixtures, AggregateValue, Money, Rate, DEFAULT_PAGE_SIZE};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// An environment value that could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            var: var.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Where records are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Fixture collections in memory; changes last for the process only.
    #[default]
    Memory,
    /// SQLite document store, seeded from the fixtures on first run.
    Sqlite,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "sqlite" => Ok(StorageKind::Sqlite),
            _ => Err("expected 'memory' or 'sqlite'".to_string()),
        }
    }
}

/// Dashboard configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    /// Shown in report headers.
    pub business_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Tax rate applied to new invoices, e.g. 825 bps = 8.25%
    pub default_tax_rate: Rate,

    /// "Today" for aging and overdue checks.
    pub as_of: NaiveDate,

    /// Rows per table page when a query doesn't ask for one.
    pub page_size: usize,

    pub storage: StorageKind,

    /// SQLite file used when `storage` is `sqlite`.
    pub database_path: PathBuf,
}

impl Default for DashboardConfig {
    /// Development defaults: USD, 8.25% tax, the fixture as-of date, and
    /// in-memory storage.
    fn default() -> Self {
        DashboardConfig {
            business_name: "Oakline Furniture Co.".to_string(),
            currency_code: "USD".to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
            default_tax_rate: Rate::from_bps(825),
            as_of: fixtures::as_of(),
            page_size: DEFAULT_PAGE_SIZE,
            storage: StorageKind::Memory,
            database_path: default_database_path(),
        }
    }
}

impl DashboardConfig {
    /// Builds the configuration from `OAKLINE_*` environment variables.
    ///
    /// ## Environment Variables
    /// - `OAKLINE_BUSINESS_NAME`
    /// - `OAKLINE_CURRENCY_CODE`, `OAKLINE_CURRENCY_SYMBOL`
    /// - `OAKLINE_TAX_RATE`: percent, e.g. "8.25"
    /// - `OAKLINE_AS_OF`: ISO date, e.g. "2024-02-01"
    /// - `OAKLINE_PAGE_SIZE`
    /// - `OAKLINE_STORAGE`: "memory" or "sqlite"
    /// - `OAKLINE_DB_PATH`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = DashboardConfig::default();

        if let Some(name) = lookup("OAKLINE_BUSINESS_NAME") {
            config.business_name = name;
        }

        if let Some(code) = lookup("OAKLINE_CURRENCY_CODE") {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ConfigError::invalid(
                    "OAKLINE_CURRENCY_CODE",
                    &code,
                    "expected a three-letter ISO code",
                ));
            }
            config.currency_code = code.to_ascii_uppercase();
        }

        if let Some(symbol) = lookup("OAKLINE_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(raw) = lookup("OAKLINE_TAX_RATE") {
            let pct: f64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("OAKLINE_TAX_RATE", &raw, "expected a percent"))?;
            let rate = Rate::from_percentage(pct);
            validate_rate("OAKLINE_TAX_RATE", rate)
                .map_err(|e| ConfigError::invalid("OAKLINE_TAX_RATE", &raw, e.to_string()))?;
            config.default_tax_rate = rate;
        }

        if let Some(raw) = lookup("OAKLINE_AS_OF") {
            config.as_of = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|e| ConfigError::invalid("OAKLINE_AS_OF", &raw, e.to_string()))?;
        }

        if let Some(raw) = lookup("OAKLINE_PAGE_SIZE") {
            config.page_size = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_PAGE_SIZE).contains(n))
                .ok_or_else(|| {
                    ConfigError::invalid(
                        "OAKLINE_PAGE_SIZE",
                        &raw,
                        format!("expected 1 to {}", MAX_PAGE_SIZE),
                    )
                })?;
        }

        if let Some(raw) = lookup("OAKLINE_STORAGE") {
            config.storage = raw
                .parse()
                .map_err(|reason: String| ConfigError::invalid("OAKLINE_STORAGE", &raw, reason))?;
        }

        if let Some(path) = lookup("OAKLINE_DB_PATH") {
            config.database_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Formats a money amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = DashboardConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = (cents / divisor).abs();
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    group_thousands(whole),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                group_thousands(whole)
            }
        )
    }

    /// Display text for a summary tile.
    pub fn format_aggregate(&self, value: &AggregateValue) -> String {
        match value {
            AggregateValue::Money(m) => self.format_currency(*m),
            AggregateValue::Count(n) => n.to_string(),
            AggregateValue::Rate(r) => r.to_string(),
            AggregateValue::Quantity(q) => q.to_string(),
            AggregateValue::Number(x) => format!("{:.1}", x),
        }
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Platform data directory, or the working directory if there is none.
///
/// - **macOS**: `~/Library/Application Support/com.oakline.dashboard/oakline.db`
/// - **Linux**: `~/.local/share/dashboard/oakline.db`
fn default_database_path() -> PathBuf {
    ProjectDirs::from("com", "oakline", "dashboard")
        .map(|dirs| dirs.data_dir().join("oakline.db"))
        .unwrap_or_else(|| PathBuf::from("oakline.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.currency_code, "USD");
        assert_eq!(config.default_tax_rate, Rate::from_bps(825));
        assert_eq!(config.as_of, fixtures::as_of());
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_overrides() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("OAKLINE_TAX_RATE", "7.5"),
            ("OAKLINE_AS_OF", "2024-03-15"),
            ("OAKLINE_STORAGE", "SQLite"),
            ("OAKLINE_DB_PATH", "/tmp/oak.db"),
            ("OAKLINE_PAGE_SIZE", "10"),
        ]))
        .unwrap();
        assert_eq!(config.default_tax_rate, Rate::from_bps(750));
        assert_eq!(config.as_of, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(config.storage, StorageKind::Sqlite);
        assert_eq!(config.database_path, PathBuf::from("/tmp/oak.db"));
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for (var, value) in [
            ("OAKLINE_TAX_RATE", "eight"),
            ("OAKLINE_TAX_RATE", "250"),
            ("OAKLINE_AS_OF", "02/01/2024"),
            ("OAKLINE_PAGE_SIZE", "0"),
            ("OAKLINE_STORAGE", "postgres"),
            ("OAKLINE_CURRENCY_CODE", "DOLLARS"),
        ] {
            let err = DashboardConfig::from_lookup(lookup(&[(var, value)])).unwrap_err();
            assert!(err.to_string().starts_with(var), "{}", err);
        }
    }

    #[test]
    fn test_format_currency() {
        let config = DashboardConfig::default();
        assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
        assert_eq!(config.format_currency(Money::from_cents(1)), "$0.01");
        assert_eq!(config.format_currency(Money::zero()), "$0.00");
        assert_eq!(config.format_currency(Money::from_cents(-1234)), "-$12.34");
        assert_eq!(config.format_currency(Money::from_major(134_000)), "$134,000.00");
    }

    #[test]
    fn test_format_aggregate() {
        let config = DashboardConfig::default();
        assert_eq!(config.format_aggregate(&AggregateValue::Count(3)), "3");
        assert_eq!(
            config.format_aggregate(&AggregateValue::Money(Money::from_major(1_500))),
            "$1,500.00"
        );
    }
}
