// ===============================
// src/main.rs
// ===============================
/*
 cd /home/kukuhtw/rust/ee_bond_valuator

 # nilai portofolio per bulan publikasi terakhir
cargo run --release -- bonds.csv

 # nilai per tanggal tertentu, output JSON, metrics untuk node_exporter
METRICS_FILE=/var/lib/node_exporter/ee_bonds.prom cargo run --release -- bonds.csv 05/2024 --format json

*/
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
mod accrual;
mod config;
mod domain;
mod error;
mod gateway;   // TreasuryDirect SBCPrice (REST form POST)
mod ingest;
mod metrics;
mod parser;    // SBCPrice HTML -> BondValue
mod report;
mod request;
mod valuator;

use std::process::ExitCode;

use clap::{error::ErrorKind as ClapErrorKind, Parser};
use rust_decimal::prelude::ToPrimitive;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, USAGE};
use crate::error::AppError;
use crate::gateway::HttpGateway;
use crate::valuator::BatchValuator;

#[tokio::main]
async fn main() -> ExitCode {
    // ---- Logging (stderr, stdout khusus laporan) ----
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // ---- CLI ----
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            fail(&clap_message(&e));
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            fail(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    // ---- Load config ----
    let settings = config::load()?;

    // ---- Metrics ----
    metrics::init();

    let gateway = HttpGateway::new(&settings)?;
    info!(
        endpoint = %gateway.endpoint(),
        user_agent = %settings.user_agent,
        max_concurrency = settings.max_concurrency,
        timeout_secs = settings.http_timeout.as_secs(),
        input = %cli.input_csv.display(),
        as_of = ?cli.as_of.map(|d| d.to_string()),
        "startup config"
    );

    // ---- Bonds ----
    let bonds = ingest::read_bonds(&cli.input_csv)?;

    // ---- Valuation ----
    let valuator = BatchValuator::new(gateway, settings.max_concurrency);
    let outcome = valuator.valuate(&bonds, cli.as_of).await;

    if let Ok(batch) = &outcome {
        metrics::PORTFOLIO_VALUE.set(batch.total_value().to_f64().unwrap_or_default());
    }
    // dump metrics juga saat gagal
    if let Some(path) = &settings.metrics_file {
        if let Err(e) = metrics::write_textfile(path) {
            error!(?e, path = %path.display(), "metrics textfile write failed");
        }
    }

    let batch = outcome?;
    print!("{}", report::render(&batch, cli.format)?);
    Ok(())
}

fn fail(message: &str) {
    eprintln!("Error: {message}");
    eprintln!("{USAGE}");
}

// clap renders "error: <msg>\n  <detail>\n\nUsage: ...\n\nFor more information, ..."
// keep the message and its detail lines, drop the rest
fn clap_message(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let message = rendered
        .lines()
        .take_while(|line| !line.starts_with("Usage:") && !line.starts_with("For more information"))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    message.strip_prefix("error: ").unwrap_or(&message).to_string()
}
