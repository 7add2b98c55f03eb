// ===============================
// src/domain.rs
// ===============================
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Savings bond series. Only Series EE is priced by this tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    EE,
}

impl Series {
    pub fn as_str(&self) -> &'static str {
        match self {
            Series::EE => "EE",
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported series {0:?} (only EE)")]
pub struct SeriesError(pub String);

impl FromStr for Series {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EE" => Ok(Series::EE),
            other => Err(SeriesError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected MM/yyyy, got {0:?}")]
pub struct MonthYearError(pub String);

/// Calendar month + year, kept as the first day of that month.
/// Text form is always `MM/yyyy` (two-digit month, four-digit year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthYear(NaiveDate);

impl MonthYear {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(MonthYear)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }
}

/// Month containing `date`.
impl From<NaiveDate> for MonthYear {
    fn from(date: NaiveDate) -> Self {
        MonthYear(date - Days::new(u64::from(date.day0())))
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month(), self.year())
    }
}

impl FromStr for MonthYear {
    type Err = MonthYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || MonthYearError(s.to_string());
        let (mm, yyyy) = s.split_once('/').ok_or_else(bad)?;
        if mm.len() != 2
            || yyyy.len() != 4
            || !mm.bytes().all(|b| b.is_ascii_digit())
            || !yyyy.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(bad());
        }
        let month: u32 = mm.parse().map_err(|_| bad())?;
        let year: i32 = yyyy.parse().map_err(|_| bad())?;
        MonthYear::new(year, month).ok_or_else(bad)
    }
}

impl Serialize for MonthYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One bond from the input file. Read-only for the valuation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    pub series: Series,
    pub denomination: u32, // USD
    pub serial_number: String,
    pub issue_date: MonthYear,
}

/// Parsed row of the calculator's results table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BondValue {
    pub serial_number: String,
    pub series: String,
    pub denomination: Decimal,
    pub issue_date: MonthYear,
    pub next_accrual: MonthYear,
    pub final_maturity: MonthYear,
    pub issue_price: Decimal,
    pub interest: Decimal,
    pub interest_rate: Decimal, // fraction, 0.027 == 2.70%
    pub value: Decimal,
    pub note: Option<String>,
}

/// Valuations for a whole batch, in input order, sharing one as-of date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub values_as_of: MonthYear,
    pub bond_values: Vec<BondValue>,
}

impl BatchResult {
    pub fn total_value(&self) -> Decimal {
        self.bond_values.iter().map(|b| b.value).sum()
    }
}
