// ===============================
// src/accrual.rs
// ===============================
//
// Series EE rate tables are republished twice a year, effective May 1 and
// November 1. The calculator only accepts "value as of" dates it has tables
// for, so the default target is the latest semiannual boundary relative to
// `today`:
//   Jan..Apr -> May of this year
//   May..Oct -> November of this year
//   Nov..Dec -> May of next year
//
use chrono::{Datelike, NaiveDate};

use crate::domain::MonthYear;

const MAY: u32 = 5;
const NOVEMBER: u32 = 11;

/// Latest "value as of" date the calculator publishes rates for.
/// Past chrono's last representable May the month of `today` is returned.
pub fn max_published_date(today: NaiveDate) -> MonthYear {
    let year = today.year();
    let boundary = match today.month0() {
        m if m < 4 => MonthYear::new(year, MAY),
        m if m < 10 => MonthYear::new(year, NOVEMBER),
        _ => year.checked_add(1).and_then(|next| MonthYear::new(next, MAY)),
    };
    boundary.unwrap_or_else(|| MonthYear::from(today))
}
