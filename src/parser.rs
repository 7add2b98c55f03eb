// ===============================
// src/parser.rs
// ===============================
//
// SBCPrice HTML response -> BondValue | Rejected | Malformed
//
// Two shapes only:
//   sukses : <table class="bnddata"> with one row of cells
//            (serial, series, denom, issue, next accrual, final maturity,
//             issue price, interest, rate, value, note, remove-button)
//   ditolak: <div class="errormessage"><ul><li>..</li></ul></div>
//
// Cells are mapped by position; the table carries no per-cell ids.
//
use std::str::FromStr;

use rust_decimal::Decimal;
use scraper::{Html, Selector};

use crate::domain::{BondValue, MonthYear};
use crate::error::ValuationError;

pub const RESULT_CELLS: &str = "table.bnddata td";
pub const ERROR_ITEMS: &str = ".errormessage li";
pub const ERROR_BLOCK: &str = ".errormessage";

const MIN_CELLS: usize = 10; // note + remove button may be missing
const MAX_CELLS: usize = 12;

/// Narrow view of an HTML document: the only two queries the parser needs.
pub trait HtmlQuery {
    /// Text of every element matching `css`, in document order.
    fn texts(&self, css: &str) -> Result<Vec<String>, ValuationError>;

    /// Text of the first element matching `css`.
    fn first_text(&self, css: &str) -> Result<Option<String>, ValuationError> {
        Ok(self.texts(css)?.into_iter().next())
    }
}

impl HtmlQuery for Html {
    fn texts(&self, css: &str) -> Result<Vec<String>, ValuationError> {
        let selector = Selector::parse(css)
            .map_err(|e| ValuationError::Malformed(format!("bad selector {css:?}: {e:?}")))?;
        Ok(self
            .select(&selector)
            .map(|el| normalize(&el.text().collect::<String>()))
            .collect())
    }
}

// collapse whitespace (incl. &nbsp;) and trim
fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a raw SBCPrice response body.
pub fn parse(html: &str) -> Result<BondValue, ValuationError> {
    let doc = Html::parse_document(html);
    parse_document(&doc)
}

pub fn parse_document<Q: HtmlQuery>(doc: &Q) -> Result<BondValue, ValuationError> {
    let cells = doc.texts(RESULT_CELLS)?;
    if !cells.is_empty() {
        return map_cells(&cells);
    }

    // first <li> with text; blank items are skipped
    if let Some(message) = doc.texts(ERROR_ITEMS)?.into_iter().find(|m| !m.is_empty()) {
        return Err(ValuationError::Rejected { message });
    }
    // error block without usable <li>: take the block text itself
    if let Some(message) = doc.first_text(ERROR_BLOCK)?.filter(|m| !m.is_empty()) {
        return Err(ValuationError::Rejected { message });
    }

    Err(ValuationError::Malformed(
        "neither results table nor error message found".to_string(),
    ))
}

fn map_cells(cells: &[String]) -> Result<BondValue, ValuationError> {
    if cells.len() < MIN_CELLS || cells.len() > MAX_CELLS {
        return Err(ValuationError::Malformed(format!(
            "expected {MIN_CELLS}..={MAX_CELLS} result cells, found {}",
            cells.len()
        )));
    }

    let serial_number = cells[0].clone();
    if serial_number.is_empty() {
        return Err(ValuationError::Malformed("empty serial number cell".to_string()));
    }

    Ok(BondValue {
        serial_number,
        series: cells[1].clone(),
        denomination: dollars("denomination", &cells[2])?,
        issue_date: month_year("issue date", &cells[3])?,
        next_accrual: month_year("next accrual", &cells[4])?,
        final_maturity: month_year("final maturity", &cells[5])?,
        issue_price: dollars("issue price", &cells[6])?,
        interest: dollars("interest", &cells[7])?,
        interest_rate: rate("interest rate", &cells[8])?,
        value: dollars("value", &cells[9])?,
        note: cells.get(10).filter(|s| !s.is_empty()).cloned(),
        // cells[11] is the remove button
    })
}

fn malformed(field: &str, text: &str) -> ValuationError {
    ValuationError::Malformed(format!("{field}: unexpected cell {text:?}"))
}

/// `$1,000.00` -> 1000.00
fn dollars(field: &str, text: &str) -> Result<Decimal, ValuationError> {
    let amount = text.strip_prefix('$').ok_or_else(|| malformed(field, text))?;
    Decimal::from_str(&amount.replace(',', "")).map_err(|_| malformed(field, text))
}

/// `2.70%` -> 0.027
fn rate(field: &str, text: &str) -> Result<Decimal, ValuationError> {
    let pct = text.strip_suffix('%').ok_or_else(|| malformed(field, text))?;
    let pct = Decimal::from_str(pct.trim()).map_err(|_| malformed(field, text))?;
    Ok(pct / Decimal::ONE_HUNDRED)
}

fn month_year(field: &str, text: &str) -> Result<MonthYear, ValuationError> {
    text.parse().map_err(|_| malformed(field, text))
}
