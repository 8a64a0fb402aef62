//! Contains `EnrichedFrame`, the pipeline's output table, with the selections
//! the map, histogram and scatter consumers make on it.

use crate::error::{PipelineError, StageContext};
use crate::partition::partition_regions;
use crate::productivity::{productivity_long, ProductivityTable};
use crate::types::columns::{DAY, LATITUDE, LONGITUDE, MONTH, NAME_IBGE, SEASON, YEAR};
use crate::types::region::RegionPartition;
use crate::types::season::Season;
use crate::types::stage::Stage;
use crate::utils::{float_column, has_column, row_indices, string_column};
use chrono::{Datelike, NaiveDate};
use ordered_float::OrderedFloat;
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};

/// A wrapper around the enriched `DataFrame` written by the pipeline.
///
/// Rows carry the projected climate columns plus `year`, `month`, `day`,
/// `season` and `name_ibge`. Every selection returns a new `EnrichedFrame`;
/// the wrapped frame is never mutated.
///
/// Instances are typically obtained from [`crate::Pipeline::process`], or
/// by wrapping a previously written `filtered_data.csv`.
#[derive(Debug, Clone)]
pub struct EnrichedFrame {
    /// The underlying Polars DataFrame.
    pub frame: DataFrame,
}

impl EnrichedFrame {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Filters the rows based on a Polars predicate expression.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use agroclimate::EnrichedFrame;
    /// use polars::prelude::{col, lit};
    ///
    /// # fn run(enriched: EnrichedFrame) -> Result<(), agroclimate::PipelineError> {
    /// // Days with a surface temperature above 30 degrees
    /// let hot = enriched.filter(col("TS").gt(lit(30.0f64)))?;
    /// println!("{} hot station-days", hot.height());
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter(&self, predicate: Expr) -> Result<EnrichedFrame, PipelineError> {
        let frame = self
            .frame
            .clone()
            .lazy()
            .filter(predicate)
            .collect()?;
        Ok(EnrichedFrame::new(frame))
    }

    /// Rows of a single day, matched on the `year`, `month` and `day` strings
    /// (`"2015"`, `"06"`, `"15"`).
    pub fn for_day(&self, year: &str, month: &str, day: &str) -> Result<EnrichedFrame, PipelineError> {
        self.filter(
            col(YEAR)
                .eq(lit(year))
                .and(col(MONTH).eq(lit(month)))
                .and(col(DAY).eq(lit(day))),
        )
    }

    /// Rows of a single calendar date.
    pub fn for_date(&self, date: NaiveDate) -> Result<EnrichedFrame, PipelineError> {
        self.for_day(
            &format!("{:04}", date.year()),
            &format!("{:02}", date.month()),
            &format!("{:02}", date.day()),
        )
    }

    /// Rows of one season within one year.
    pub fn for_season(&self, year: &str, season: Season) -> Result<EnrichedFrame, PipelineError> {
        self.filter(col(YEAR).eq(lit(year)).and(col(SEASON).eq(lit(season.as_str()))))
    }

    /// Distinct non-null `year` values, ascending.
    pub fn years(&self) -> Result<Vec<String>, PipelineError> {
        let years = string_column(&self.frame, YEAR, Stage::RegionPartition)?;
        let distinct: BTreeSet<String> = years
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        Ok(distinct.into_iter().collect())
    }

    /// One row per distinct station coordinate, in first-seen order, with the
    /// `name_ibge` column if the frame carries it.
    pub fn unique_coordinates(&self) -> Result<DataFrame, PipelineError> {
        let stage = Stage::RegionPartition;
        let latitudes = float_column(&self.frame, LATITUDE, stage)?;
        let longitudes = float_column(&self.frame, LONGITUDE, stage)?;

        let mut seen = HashSet::new();
        let mut rows: Vec<IdxSize> = Vec::new();
        for (row, (lat, lon)) in latitudes.into_iter().zip(longitudes.into_iter()).enumerate() {
            let (Some(lat), Some(lon)) = (lat, lon) else {
                continue;
            };
            if seen.insert((OrderedFloat(lat), OrderedFloat(lon))) {
                rows.push(row as IdxSize);
            }
        }

        let mut columns = Vec::with_capacity(3);
        if has_column(&self.frame, NAME_IBGE) {
            columns.push(NAME_IBGE);
        }
        columns.extend([LATITUDE, LONGITUDE]);
        self.frame
            .select(columns)
            .and_then(|frame| frame.take(&row_indices(rows)))
            .in_stage(stage)
    }

    /// Splits the rows by centroid bisection. The partition is recomputed on
    /// every call.
    pub fn regions(&self) -> Result<RegionPartition, PipelineError> {
        partition_regions(&self.frame)
    }

    /// Long-format productivity for the stations in this frame. See
    /// [`productivity_long`].
    pub fn productivity_long(
        &self,
        productivity: &ProductivityTable,
    ) -> Result<DataFrame, PipelineError> {
        productivity_long(&self.frame, productivity)
    }
}
