use crate::core::{CellValue, Record};
use crate::utils::error::{FetchError, Result};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordOptions {
    /// Convert text cells that look like numbers into numbers.
    pub numericise: bool,
}

/// Builds one record per data row, keyed by the first (header) row.
///
/// The header is widened with blank keys when a data row runs past it, so
/// no cell is ever dropped.
pub fn rows_to_records(rows: Vec<Vec<CellValue>>, options: &RecordOptions) -> Result<Vec<Record>> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut rows = rows.into_iter();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };

    let mut headers: Vec<String> = header_row.iter().map(ToString::to_string).collect();
    headers.resize(width, String::new());
    check_unique_headers(&headers)?;

    let records = rows
        .map(|row| {
            let mut cells = row.into_iter();
            let mut record = Record::with_capacity(headers.len());
            for header in &headers {
                let value = cells.next().unwrap_or(CellValue::Empty);
                let value = if options.numericise {
                    numericise(value)
                } else {
                    value
                };
                record.push(header.clone(), value);
            }
            record
        })
        .collect();

    Ok(records)
}

fn check_unique_headers(headers: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(headers.len());
    for header in headers {
        if !seen.insert(header.as_str()) {
            return Err(FetchError::MalformedSheet {
                message: format!("the header row is not unique, '{}' appears twice", header),
            });
        }
    }
    Ok(())
}

pub fn numericise(value: CellValue) -> CellValue {
    let CellValue::Text(text) = value else {
        return value;
    };

    if let Ok(n) = text.parse::<i64>() {
        return CellValue::Number(n.into());
    }
    match text
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        Some(n) => CellValue::Number(n),
        None => CellValue::Text(text),
    }
}
