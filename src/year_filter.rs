//! Restricts the climate table to the years covered by the productivity data.

use crate::error::{PipelineError, StageContext};
use crate::types::columns::YEAR;
use crate::types::stage::Stage;
use crate::utils::string_column;
use log::{info, warn};
use polars::prelude::*;
use std::collections::BTreeSet;

/// Which `year` values survive the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearSelection {
    /// Exact membership against a set of year labels. This is the canonical
    /// form: the set is derived from the productivity table's year columns
    /// and tracks whatever years the productivity data covers.
    Membership(BTreeSet<String>),
    /// Closed numeric interval `[start, end]`. The `year` column is parsed
    /// as an integer; values that do not parse are excluded.
    Interval { start: i32, end: i32 },
}

impl YearSelection {
    pub fn membership<I, S>(years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        YearSelection::Membership(years.into_iter().map(Into::into).collect())
    }

    pub fn interval(start: i32, end: i32) -> Result<Self, PipelineError> {
        if start > end {
            return Err(PipelineError::InvalidConfig(format!(
                "year interval start {} is after end {}",
                start, end
            )));
        }
        Ok(YearSelection::Interval { start, end })
    }

    /// Returns the string form of `year` to keep, or `None` if the row is
    /// filtered out.
    fn accept(&self, year: Option<&str>) -> Option<String> {
        let year = year?;
        match self {
            YearSelection::Membership(years) => years.contains(year).then(|| year.to_string()),
            YearSelection::Interval { start, end } => {
                let parsed = year.trim().parse::<i32>().ok()?;
                (*start..=*end)
                    .contains(&parsed)
                    .then(|| format!("{:04}", parsed))
            }
        }
    }
}

/// Keeps rows whose `year` is accepted by `selection`.
///
/// After filtering `year` is a string column. With an interval selection the
/// surviving values are re-rendered from the parsed number, so `" 2015"`
/// becomes `"2015"`.
///
/// # Errors
///
/// Returns [`PipelineError::MissingColumn`] if the frame has no `year` column.
pub fn filter_years(
    df: &DataFrame,
    selection: &YearSelection,
) -> Result<DataFrame, PipelineError> {
    let stage = Stage::YearFilter;
    let years = string_column(df, YEAR, stage)?;

    let mut mask = Vec::with_capacity(years.len());
    let mut kept_years: Vec<Option<String>> = Vec::with_capacity(years.len());
    let mut unparseable = 0usize;

    for year in years.into_iter() {
        let accepted = selection.accept(year);
        if let (YearSelection::Interval { .. }, Some(raw)) = (selection, year) {
            if raw.trim().parse::<i32>().is_err() {
                unparseable += 1;
            }
        }
        mask.push(accepted.is_some());
        kept_years.push(accepted);
    }

    if unparseable > 0 {
        warn!("Excluded {} rows with unparseable year values", unparseable);
    }

    let mut rewritten = df.clone();
    rewritten
        .with_column(Series::new(YEAR.into(), kept_years))
        .in_stage(stage)?;
    let mask = BooleanChunked::from_slice("year_mask".into(), &mask);
    let out = rewritten.filter(&mask).in_stage(stage)?;

    info!(
        "Year filter kept {} of {} rows",
        out.height(),
        df.height()
    );
    Ok(out)
}
