use crate::dates;
use crate::error::PipelineError;
use crate::partition;
use crate::productivity::{self, ProductivityTable};
use crate::projection;
use crate::seasons;
use crate::types::region::RegionPartition;
use crate::types::season::SeasonConvention;
use crate::year_filter::{self, YearSelection};
use polars::prelude::DataFrame;

/// Pipeline stages as chainable methods on a climate `DataFrame`.
///
/// Every method returns a new frame and leaves `self` untouched.
pub trait ClimateFrameExt {
    /// Adds `year`, `month` and `day` derived from the `YYYYMMDD` code in
    /// `date_column`. See [`dates::decompose_date`].
    fn decompose_date(&self, date_column: &str) -> Result<DataFrame, PipelineError>;

    /// Keeps only the columns in `retain`, in frame order. See
    /// [`projection::project_columns`].
    fn project_columns<S: AsRef<str>>(&self, retain: &[S]) -> Result<DataFrame, PipelineError>;

    /// Keeps rows whose `year` is accepted by `selection`. See
    /// [`year_filter::filter_years`].
    fn filter_years(&self, selection: &YearSelection) -> Result<DataFrame, PipelineError>;

    /// Adds the `season` label. See [`seasons::assign_seasons`].
    fn assign_seasons(&self, convention: SeasonConvention) -> Result<DataFrame, PipelineError>;

    /// Left-joins `name_ibge` by `codigo_ibge`. See
    /// [`productivity::join_productivity`].
    fn join_productivity(
        &self,
        productivity: &ProductivityTable,
    ) -> Result<DataFrame, PipelineError>;

    /// Centroid bisection into North/South and East/West. See
    /// [`partition::partition_regions`].
    fn partition_regions(&self) -> Result<RegionPartition, PipelineError>;
}

impl ClimateFrameExt for DataFrame {
    fn decompose_date(&self, date_column: &str) -> Result<DataFrame, PipelineError> {
        dates::decompose_date(self, date_column)
    }

    fn project_columns<S: AsRef<str>>(&self, retain: &[S]) -> Result<DataFrame, PipelineError> {
        projection::project_columns(self, retain)
    }

    fn filter_years(&self, selection: &YearSelection) -> Result<DataFrame, PipelineError> {
        year_filter::filter_years(self, selection)
    }

    fn assign_seasons(&self, convention: SeasonConvention) -> Result<DataFrame, PipelineError> {
        seasons::assign_seasons(self, convention)
    }

    fn join_productivity(
        &self,
        productivity: &ProductivityTable,
    ) -> Result<DataFrame, PipelineError> {
        productivity::join_productivity(self, productivity)
    }

    fn partition_regions(&self) -> Result<RegionPartition, PipelineError> {
        partition::partition_regions(self)
    }
}
