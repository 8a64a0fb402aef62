//! Names the steps of the data-preparation pipeline so that errors can report
//! where they happened.

use std::fmt;

/// A single step of the pipeline.
///
/// Every fatal [`crate::PipelineError`] raised inside a step carries the
/// `Stage` it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Splitting the compact `YYYYMMDD` date code into `year`, `month` and `day`.
    DateDecomposition,
    /// Keeping only the whitelisted columns.
    ColumnProjection,
    /// Restricting rows to the valid analysis years.
    YearFilter,
    /// Labelling every row with a season.
    SeasonClassification,
    /// Normalizing the productivity table and attaching municipality names.
    ProductivityJoin,
    /// Splitting the enriched table by centroid bisection.
    RegionPartition,
    /// Writing the enriched table.
    WriteOutput,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::DateDecomposition => "date-decomposition",
            Stage::ColumnProjection => "column-projection",
            Stage::YearFilter => "year-filter",
            Stage::SeasonClassification => "season-classification",
            Stage::ProductivityJoin => "productivity-join",
            Stage::RegionPartition => "region-partition",
            Stage::WriteOutput => "write-output",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
