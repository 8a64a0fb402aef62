//! Splits the compact `YYYYMMDD` date code of the climate table into `year`,
//! `month` and `day` string columns.

use crate::error::{PipelineError, StageContext};
use crate::types::columns::{DAY, MONTH, YEAR};
use crate::types::stage::Stage;
use crate::utils::string_column;
use log::info;
use polars::prelude::*;

pub const DATE_CODE_LEN: usize = 8;

/// Splits a date code into its `(year, month, day)` parts by fixed position.
///
/// Returns `None` unless `code` is exactly 8 ASCII digits. No calendar
/// validation is done: `"20151345"` splits into `("2015", "13", "45")`.
pub fn split_date_code(code: &str) -> Option<(&str, &str, &str)> {
    if code.len() != DATE_CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((&code[0..4], &code[4..6], &code[6..8]))
}

/// Adds `year`, `month` and `day` columns derived from `date_column`.
///
/// The date column is coerced to its string representation first, so both
/// integer and string date codes are accepted. The original column is kept.
/// Null date codes produce null parts.
///
/// # Errors
///
/// * [`PipelineError::MissingColumn`] if `date_column` does not exist.
/// * [`PipelineError::MalformedDateCode`] for the first present value that is
///   not 8 digits.
pub fn decompose_date(df: &DataFrame, date_column: &str) -> Result<DataFrame, PipelineError> {
    let stage = Stage::DateDecomposition;
    let codes = string_column(df, date_column, stage)?;

    let mut years: Vec<Option<&str>> = Vec::with_capacity(codes.len());
    let mut months: Vec<Option<&str>> = Vec::with_capacity(codes.len());
    let mut days: Vec<Option<&str>> = Vec::with_capacity(codes.len());

    for (row, code) in codes.into_iter().enumerate() {
        match code {
            Some(code) => {
                let (year, month, day) =
                    split_date_code(code).ok_or_else(|| PipelineError::MalformedDateCode {
                        stage,
                        column: date_column.to_string(),
                        row,
                        value: code.to_string(),
                    })?;
                years.push(Some(year));
                months.push(Some(month));
                days.push(Some(day));
            }
            None => {
                years.push(None);
                months.push(None);
                days.push(None);
            }
        }
    }

    let mut out = df.clone();
    out.with_column(Series::new(YEAR.into(), years))
        .in_stage(stage)?;
    out.with_column(Series::new(MONTH.into(), months))
        .in_stage(stage)?;
    out.with_column(Series::new(DAY.into(), days))
        .in_stage(stage)?;

    info!(
        "Decomposed '{}' into year/month/day for {} rows",
        date_column,
        out.height()
    );
    Ok(out)
}
