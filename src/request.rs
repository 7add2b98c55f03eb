// ===============================
// src/request.rs
// ===============================
use crate::domain::{Bond, MonthYear};

/// Value of the submit button the browser form posts.
const CALCULATE: &str = "CALCULATE";

/// Form body for one SBCPrice calculation.
///
/// Field order follows the browser form (RedemptionDate, Series,
/// Denomination, SerialNumber, IssueDate, btnAdd.x); values are
/// percent-encoded, keys are sent as-is.
pub fn build_request_body(bond: &Bond, target: MonthYear) -> String {
    let params = [
        ("RedemptionDate", target.to_string()),
        ("Series", bond.series.to_string()),
        ("Denomination", bond.denomination.to_string()),
        ("SerialNumber", bond.serial_number.clone()),
        ("IssueDate", bond.issue_date.to_string()),
        ("btnAdd.x", CALCULATE.to_string()),
    ];

    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
