// ===============================
// src/report.rs
// ===============================
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::config::OutputFormat;
use crate::domain::{BatchResult, BondValue, MonthYear};

#[derive(Tabled)]
struct BondValueRow {
    #[tabled(rename = "Serial #")]
    serial_number: String,
    #[tabled(rename = "Series")]
    series: String,
    #[tabled(rename = "Denom")]
    denomination: String,
    #[tabled(rename = "Issue Date")]
    issue_date: String,
    #[tabled(rename = "Next Accrual")]
    next_accrual: String,
    #[tabled(rename = "Final Maturity")]
    final_maturity: String,
    #[tabled(rename = "Issue Price")]
    issue_price: String,
    #[tabled(rename = "Interest")]
    interest: String,
    #[tabled(rename = "Rate")]
    interest_rate: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Note")]
    note: String,
}

impl From<&BondValue> for BondValueRow {
    fn from(b: &BondValue) -> Self {
        Self {
            serial_number: b.serial_number.clone(),
            series: b.series.clone(),
            denomination: usd(b.denomination),
            issue_date: b.issue_date.to_string(),
            next_accrual: b.next_accrual.to_string(),
            final_maturity: b.final_maturity.to_string(),
            issue_price: usd(b.issue_price),
            interest: usd(b.interest),
            interest_rate: percent(b.interest_rate),
            value: usd(b.value),
            note: b.note.clone().unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    values_as_of: MonthYear,
    bond_values: &'a [BondValue],
    total_value: Decimal,
}

pub fn usd(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

/// 0.027 -> "2.70%"
pub fn percent(fraction: Decimal) -> String {
    format!("{:.2}%", fraction * Decimal::ONE_HUNDRED)
}

pub fn render_table(result: &BatchResult) -> String {
    let mut out = format!("Values as of {}\n", result.values_as_of);
    if result.bond_values.is_empty() {
        out.push_str("No bonds.\n");
    } else {
        let rows: Vec<BondValueRow> = result.bond_values.iter().map(BondValueRow::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::first()).with(Alignment::left()))
            .to_string();
        out.push_str(&table);
        out.push('\n');
    }
    out.push_str(&format!("Total Value {}\n", usd(result.total_value())));
    out
}

pub fn render_json(result: &BatchResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport {
        values_as_of: result.values_as_of,
        bond_values: &result.bond_values,
        total_value: result.total_value(),
    })
}

pub fn render(result: &BatchResult, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(render_table(result)),
        OutputFormat::Json => render_json(result).map(|s| s + "\n"),
    }
}
