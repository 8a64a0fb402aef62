use crate::error::{PipelineError, StageContext};
use crate::types::columns::{DAY, MONTH, SEASON};
use crate::types::season::{Season, SeasonConvention};
use crate::types::stage::Stage;
use crate::utils::string_column;
use log::{info, warn};
use polars::prelude::*;

/// Adds a `season` column computed from the zero-padded `month` and `day`
/// columns using the fixed season windows.
///
/// Rows outside every window, including rows with a null month or day, are
/// labelled `Unknown`.
pub fn assign_seasons(
    df: &DataFrame,
    convention: SeasonConvention,
) -> Result<DataFrame, PipelineError> {
    let stage = Stage::SeasonClassification;
    let months = string_column(df, MONTH, stage)?;
    let days = string_column(df, DAY, stage)?;

    let labels: Vec<&'static str> = months
        .into_iter()
        .zip(days.into_iter())
        .map(|(month, day)| convention.classify(month, day).as_str())
        .collect();

    let unknown = labels
        .iter()
        .filter(|label| **label == Season::Unknown.as_str())
        .count();
    if unknown > 0 {
        warn!("{} rows fall outside every season window and are labelled Unknown", unknown);
    }

    let mut out = df.clone();
    out.with_column(Series::new(SEASON.into(), labels))
        .in_stage(stage)?;
    info!(
        "Assigned {:?} seasons to {} rows",
        convention,
        out.height()
    );
    Ok(out)
}
