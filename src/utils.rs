use crate::error::{PipelineError, StageContext};
use crate::types::stage::Stage;
use polars::prelude::*;

/// Returns the named column or a [`PipelineError::MissingColumn`] for `stage`.
pub(crate) fn require_column<'a>(
    df: &'a DataFrame,
    column: &str,
    stage: Stage,
) -> Result<&'a Column, PipelineError> {
    df.column(column).map_err(|_| PipelineError::MissingColumn {
        stage,
        column: column.to_string(),
    })
}

/// Returns the named column coerced to its string representation.
pub(crate) fn string_column(
    df: &DataFrame,
    column: &str,
    stage: Stage,
) -> Result<StringChunked, PipelineError> {
    let coerced = require_column(df, column, stage)?
        .cast(&DataType::String)
        .in_stage(stage)?;
    Ok(coerced.str().in_stage(stage)?.clone())
}

/// Returns the named column coerced to `f64`; values that cannot be cast become null.
pub(crate) fn float_column(
    df: &DataFrame,
    column: &str,
    stage: Stage,
) -> Result<Float64Chunked, PipelineError> {
    let coerced = require_column(df, column, stage)?
        .cast(&DataType::Float64)
        .in_stage(stage)?;
    Ok(coerced.f64().in_stage(stage)?.clone())
}

/// Returns the named column coerced to `i64`; values that cannot be cast become null.
pub(crate) fn int_column(
    df: &DataFrame,
    column: &str,
    stage: Stage,
) -> Result<Int64Chunked, PipelineError> {
    let coerced = require_column(df, column, stage)?
        .cast(&DataType::Int64)
        .in_stage(stage)?;
    Ok(coerced.i64().in_stage(stage)?.clone())
}

/// Returns a municipality-code column as `i64`, plus the number of present
/// values that are not codes. String values are trimmed before parsing, so
/// `"4100103 "` reads as `4100103`.
pub(crate) fn code_column(
    df: &DataFrame,
    column: &str,
    stage: Stage,
) -> Result<(Int64Chunked, usize), PipelineError> {
    let source = require_column(df, column, stage)?;
    let codes: Int64Chunked = match source.dtype() {
        DataType::String => source
            .str()
            .in_stage(stage)?
            .into_iter()
            .map(|code| code.and_then(|c| c.trim().parse::<i64>().ok()))
            .collect(),
        _ => source
            .cast(&DataType::Int64)
            .in_stage(stage)?
            .i64()
            .in_stage(stage)?
            .clone(),
    };
    let invalid = codes.null_count().saturating_sub(source.null_count());
    Ok((codes.with_name(column.into()), invalid))
}

pub(crate) fn has_column(df: &DataFrame, column: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == column)
}

pub(crate) fn row_indices(indices: Vec<IdxSize>) -> IdxCa {
    IdxCa::from_vec("row_idx".into(), indices)
}
