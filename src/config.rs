// ===============================
// src/config.rs
// ===============================
/*
=============================================================================
Project : ee_bond_valuator — Series EE savings bond valuation via TreasuryDirect
Module  : <module_name>.rs
Version : 0.1.0
Author  : Kukuh Tripamungkas Wicaksono (Kukuh TW)
Email   : kukuhtw@gmail.com
WhatsApp: https://wa.me/628129893706
LinkedIn: https://id.linkedin.com/in/kukuhtw
License : MIT (see LICENSE)

Summary : Reads a CSV of Series EE bonds, posts each one to the TreasuryDirect
          savings bond calculator (bounded concurrency), scrapes the returned
          HTML into typed valuations and prints a table plus portfolio total.

(c) 2025 Kukuh TW. All rights reserved where applicable.
=============================================================================
*/
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use thiserror::Error;
use url::Url;

use crate::domain::MonthYear;

pub const DEFAULT_BASE_URL: &str = "https://treasurydirect.gov";
pub const DEFAULT_USER_AGENT: &str = "ee-bond-valuator/0.1 (savings bond calculator client)";

pub const USAGE: &str = "Usage: ee-bond-valuator <INPUT_CSV> [AS_OF (MM/yyyy)] [--format table|json]";

/// Output format laporan
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Command line: CSV path + optional value-as-of date
#[derive(Debug, Parser)]
#[command(name = "ee-bond-valuator", version, about = "Value Series EE savings bonds via TreasuryDirect")]
pub struct Cli {
    /// CSV file: series,denomination,serial number,issue date (MM/yyyy), no header
    pub input_csv: PathBuf,

    /// Value-as-of date (MM/yyyy); defaults to the latest published accrual date
    pub as_of: Option<MonthYear>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TREASURY_DIRECT_URL {value:?} is not a valid URL: {source}")]
    BaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Runtime settings (ENV, `.env` ikut dibaca)
#[derive(Clone, Debug)]
pub struct Settings {
    pub base_url: Url,
    pub user_agent: String,
    pub max_concurrency: usize, // minimal 1
    pub http_timeout: Duration,
    pub metrics_file: Option<PathBuf>,
}

impl Settings {
    /// Build settings from any key lookup (process env in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = lookup("TREASURY_DIRECT_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(base.trim()).map_err(|source| ConfigError::BaseUrl {
            value: base.clone(),
            source,
        })?;

        let user_agent = lookup("TD_USER_AGENT")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let max_concurrency = lookup("MAX_CONCURRENCY")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(4)
            .max(1);

        let timeout_secs = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(30)
            .max(1);

        let metrics_file = lookup("METRICS_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Settings {
            base_url,
            user_agent,
            max_concurrency,
            http_timeout: Duration::from_secs(timeout_secs),
            metrics_file,
        })
    }
}

pub fn load() -> Result<Settings, ConfigError> {
    // Pastikan .env dibaca (agar TREASURY_DIRECT_URL, MAX_CONCURRENCY, dll ter-load)
    let _ = dotenv();
    Settings::from_lookup(|key| env::var(key).ok())
}
