// ===============================
// src/ingest.rs
// ===============================
//
// Input CSV (tanpa header), satu bond per baris:
//   EE,1000,L123456789EE,03/2010
//   series, denomination (USD), serial number, issue date (MM/yyyy)
//
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

use crate::domain::{Bond, MonthYear, Series};

const COLUMNS: usize = 4;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {message}")]
    Row { row: u64, message: String },
}

pub fn read_bonds(path: &Path) -> Result<Vec<Bond>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.display().to_string(),
        source,
    })?;
    parse_bonds(file)
}

pub fn parse_bonds<R: Read>(input: R) -> Result<Vec<Bond>, InputError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input);

    let mut bonds = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = record.position().map(|p| p.line()).unwrap_or(idx as u64 + 1);
        bonds.push(parse_row(&record, row)?);
    }
    Ok(bonds)
}

fn parse_row(record: &StringRecord, row: u64) -> Result<Bond, InputError> {
    let err = |message: String| InputError::Row { row, message };

    if record.len() != COLUMNS {
        return Err(err(format!("expected {COLUMNS} columns, found {}", record.len())));
    }

    let series: Series = record[0].parse().map_err(|e| err(format!("{e}")))?;

    let denomination = match record[1].parse::<u32>() {
        Ok(d) if d > 0 => d,
        _ => return Err(err(format!("denomination must be a positive integer, got {:?}", &record[1]))),
    };

    let serial_number = record[2].to_string();
    if serial_number.is_empty() {
        return Err(err("serial number is empty".to_string()));
    }

    let issue_date: MonthYear = record[3]
        .parse()
        .map_err(|e| err(format!("issue date: {e}")))?;

    Ok(Bond { series, denomination, serial_number, issue_date })
}
