use crate::error::PipelineError;
use crate::types::stage::Stage;
use log::debug;
use polars::prelude::*;

/// Keeps only the columns named in `retain`.
///
/// Columns come out in the frame's own order, not the order of `retain`.
/// Entries of `retain` that are not in the frame are skipped, so the retain
/// list can name columns an upstream schema may or may not carry.
///
/// # Errors
///
/// [`PipelineError::ProjectionFailed`] if polars rejects the selection. The
/// selected names are taken from `df` itself, so a well-formed `DataFrame`
/// always projects; the variant guards against frames built without the
/// usual consistency checks.
pub fn project_columns<S: AsRef<str>>(
    df: &DataFrame,
    retain: &[S],
) -> Result<DataFrame, PipelineError> {
    let keep: Vec<PlSmallStr> = df
        .get_column_names()
        .into_iter()
        .filter(|name| retain.iter().any(|r| r.as_ref() == name.as_str()))
        .cloned()
        .collect();

    let absent: Vec<&str> = retain
        .iter()
        .map(|r| r.as_ref())
        .filter(|r| !keep.iter().any(|k| k.as_str() == *r))
        .collect();
    if !absent.is_empty() {
        debug!("Retain-list columns not present in input: {:?}", absent);
    }

    let dropped = df.width() - keep.len();
    let out = df
        .select(keep)
        .map_err(|source| PipelineError::ProjectionFailed {
            stage: Stage::ColumnProjection,
            source,
        })?;
    debug!("Projected to {} columns, dropped {}", out.width(), dropped);
    Ok(out)
}
