//! The linear pipeline: read, decompose dates, project, filter years, assign
//! seasons, join productivity names, write.

use crate::config::PipelineConfig;
use crate::enriched_frame::EnrichedFrame;
use crate::error::{PipelineError, StageContext};
use crate::frame_ext::ClimateFrameExt;
use crate::io::{read_csv, write_table};
use crate::productivity::ProductivityTable;
use crate::types::columns::{CODIGO_IBGE, DAY, LATITUDE, LONGITUDE, MONTH, NAME_IBGE, SEASON, YEAR};
use crate::types::stage::Stage;
use bon::bon;
use log::{debug, info};
use polars::prelude::*;
use std::path::PathBuf;

const LEADING_COLUMNS: [&str; 6] = [YEAR, MONTH, DAY, CODIGO_IBGE, LATITUDE, LONGITUDE];
const TRAILING_COLUMNS: [&str; 2] = [SEASON, NAME_IBGE];

/// Summary of a completed [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub climate_path: PathBuf,
    pub productivity_path: PathBuf,
    pub output_path: PathBuf,
    pub input_rows: usize,
    pub output_rows: usize,
    /// Distinct years present in the output, ascending.
    pub years: Vec<String>,
}

/// Runs the data-preparation stages in a fixed order.
///
/// A failure at any stage aborts the run and nothing is written. Given the
/// same inputs, two runs produce byte-identical output.
///
/// # Examples
///
/// ```no_run
/// use agroclimate::{InputSource, Pipeline, PipelineConfig};
///
/// # fn run() -> Result<(), agroclimate::PipelineError> {
/// let config = PipelineConfig::builder()
///     .inputs(InputSource::Directory("input".into()))
///     .output("output/filtered_data.csv".into())
///     .build();
/// let report = Pipeline::new(config)?.run()?;
/// println!("{} rows written to {}", report.output_rows, report.output_path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

#[bon]
impl Pipeline {
    /// Validates `config` and wraps it.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidConfig`] for an inverted year interval or an
    /// empty date column name.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Reads both input tables, processes them and writes the enriched table
    /// to the configured output path.
    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        let inputs = self.config.inputs.resolve()?;
        info!(
            "Reading climate table {} and productivity table {}",
            inputs.climate.display(),
            inputs.productivity.display()
        );
        let climate = read_csv(&inputs.climate)?;
        let productivity = ProductivityTable::from_frame(read_csv(&inputs.productivity)?)?;

        let enriched = self.process(&climate, &productivity)?;
        let years = enriched.years()?;
        let mut frame = enriched.frame;
        write_table(&mut frame, &self.config.output)?;

        Ok(PipelineReport {
            climate_path: inputs.climate,
            productivity_path: inputs.productivity,
            output_path: self.config.output.clone(),
            input_rows: climate.height(),
            output_rows: frame.height(),
            years,
        })
    }

    /// Processes in-memory tables without touching the filesystem.
    ///
    /// ```no_run
    /// # use agroclimate::{InputSource, Pipeline, PipelineConfig};
    /// # use polars::prelude::DataFrame;
    /// # fn run(climate: DataFrame, productivity: DataFrame) -> Result<(), agroclimate::PipelineError> {
    /// let pipeline = Pipeline::new(
    ///     PipelineConfig::builder().inputs(InputSource::Directory(".".into())).build(),
    /// )?;
    /// let enriched = pipeline
    ///     .process_frames()
    ///     .climate(climate)
    ///     .productivity(productivity)
    ///     .call()?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub fn process_frames(
        &self,
        climate: DataFrame,
        productivity: DataFrame,
    ) -> Result<EnrichedFrame, PipelineError> {
        let productivity = ProductivityTable::from_frame(productivity)?;
        self.process(&climate, &productivity)
    }

    /// Runs every stage on `climate` and orders the output columns as
    /// `year, month, day, codigo_ibge, latitude, longitude, <measurements>,
    /// season, name_ibge`.
    pub fn process(
        &self,
        climate: &DataFrame,
        productivity: &ProductivityTable,
    ) -> Result<EnrichedFrame, PipelineError> {
        let selection = self.config.year_selection(productivity)?;
        debug!("Year selection: {:?}", selection);

        let joined = climate
            .decompose_date(&self.config.date_column)?
            .project_columns(&self.config.retain_columns)?
            .filter_years(&selection)?
            .assign_seasons(self.config.season_convention)?
            .join_productivity(productivity)?;

        let frame = order_output_columns(&joined)?;
        info!(
            "Pipeline produced {} rows x {} columns from {} input rows",
            frame.height(),
            frame.width(),
            climate.height()
        );
        Ok(EnrichedFrame::new(frame))
    }
}

fn order_output_columns(df: &DataFrame) -> Result<DataFrame, PipelineError> {
    let names = df.get_column_names();
    let present = |wanted: &[&str]| -> Vec<PlSmallStr> {
        wanted
            .iter()
            .filter_map(|w| names.iter().find(|n| n.as_str() == *w))
            .map(|n| (*n).clone())
            .collect()
    };

    let mut order = present(&LEADING_COLUMNS);
    order.extend(
        names
            .iter()
            .filter(|n| {
                !LEADING_COLUMNS.contains(&n.as_str()) && !TRAILING_COLUMNS.contains(&n.as_str())
            })
            .map(|n| (*n).clone()),
    );
    order.extend(present(&TRAILING_COLUMNS));

    df.select(order).in_stage(Stage::WriteOutput)
}
