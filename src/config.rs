//! Pipeline configuration: a `bon` builder for programmatic use and a TOML
//! file format for the command line.

use crate::error::PipelineError;
use crate::io::{discover_inputs, InputPaths};
use crate::productivity::ProductivityTable;
use crate::types::columns::{default_retain_columns, DATE, DEFAULT_OUTPUT_FILE};
use crate::types::season::SeasonConvention;
use crate::year_filter::YearSelection;
use bon::Builder;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the two source tables come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Explicit paths to the climate and productivity tables.
    Files {
        climate: PathBuf,
        productivity: PathBuf,
    },
    /// A directory searched with [`discover_inputs`].
    Directory(PathBuf),
}

impl InputSource {
    pub fn resolve(&self) -> Result<InputPaths, PipelineError> {
        match self {
            InputSource::Files {
                climate,
                productivity,
            } => Ok(InputPaths {
                climate: climate.clone(),
                productivity: productivity.clone(),
            }),
            InputSource::Directory(dir) => discover_inputs(dir),
        }
    }
}

/// Settings for one pipeline run.
///
/// # Examples
///
/// ```
/// use agroclimate::{InputSource, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .inputs(InputSource::Directory("input".into()))
///     .output("output/filtered_data.csv".into())
///     .year_range((2004, 2017))
///     .build();
/// assert_eq!(config.date_column, "data");
/// ```
#[derive(Debug, Clone, Builder)]
pub struct PipelineConfig {
    pub inputs: InputSource,
    #[builder(default = PathBuf::from(DEFAULT_OUTPUT_FILE))]
    pub output: PathBuf,
    /// Column holding the `YYYYMMDD` date code.
    #[builder(default = DATE.to_string(), into)]
    pub date_column: String,
    #[builder(default = default_retain_columns())]
    pub retain_columns: Vec<String>,
    /// Closed interval of analysis years. When unset, the valid years are the
    /// year columns of the productivity table.
    pub year_range: Option<(i32, i32)>,
    #[builder(default)]
    pub season_convention: SeasonConvention,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if let Some((start, end)) = self.year_range {
            YearSelection::interval(start, end)?;
        }
        if self.date_column.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "date column name is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The year selection for a run against `productivity`.
    pub fn year_selection(
        &self,
        productivity: &ProductivityTable,
    ) -> Result<YearSelection, PipelineError> {
        match self.year_range {
            Some((start, end)) => YearSelection::interval(start, end),
            None => Ok(productivity.year_selection()),
        }
    }
}

/// The TOML configuration file. Every key is optional.
///
/// ```toml
/// input_dir = "input"
/// output = "output/filtered_data.csv"
/// date_column = "data"
/// retain_columns = ["year", "month", "day", "codigo_ibge", "latitude", "longitude", "TS", "PS", "GWETROOT"]
/// year_range = [2004, 2017]
/// season_convention = "southern"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub climate: Option<PathBuf>,
    pub productivity: Option<PathBuf>,
    pub input_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub date_column: Option<String>,
    pub retain_columns: Option<Vec<String>>,
    pub year_range: Option<(i32, i32)>,
    pub season_convention: Option<SeasonConvention>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text =
            fs::read_to_string(path).map_err(|e| PipelineError::ConfigRead(path.to_path_buf(), e))?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, PipelineError> {
        toml::from_str(text).map_err(|e| PipelineError::ConfigParse(path.to_path_buf(), e))
    }

    /// Values set in `overrides` win over values in `self`.
    pub fn overlay(self, overrides: ConfigFile) -> ConfigFile {
        ConfigFile {
            climate: overrides.climate.or(self.climate),
            productivity: overrides.productivity.or(self.productivity),
            input_dir: overrides.input_dir.or(self.input_dir),
            output: overrides.output.or(self.output),
            date_column: overrides.date_column.or(self.date_column),
            retain_columns: overrides.retain_columns.or(self.retain_columns),
            year_range: overrides.year_range.or(self.year_range),
            season_convention: overrides.season_convention.or(self.season_convention),
        }
    }

    /// Turns the file into a validated [`PipelineConfig`].
    ///
    /// Explicit climate and productivity paths take precedence over an input
    /// directory.
    pub fn into_config(self) -> Result<PipelineConfig, PipelineError> {
        let inputs = match (self.climate, self.productivity, self.input_dir) {
            (Some(climate), Some(productivity), _) => InputSource::Files {
                climate,
                productivity,
            },
            (_, _, Some(dir)) => InputSource::Directory(dir),
            _ => {
                return Err(PipelineError::InvalidConfig(
                    "either both climate and productivity paths, or an input directory, must be set"
                        .to_string(),
                ))
            }
        };

        let config = PipelineConfig::builder()
            .inputs(inputs)
            .maybe_output(self.output)
            .maybe_date_column(self.date_column)
            .maybe_retain_columns(self.retain_columns)
            .maybe_year_range(self.year_range)
            .maybe_season_convention(self.season_convention)
            .build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder()
            .inputs(InputSource::Directory("input".into()))
            .build();
        assert_eq!(config.output, PathBuf::from("filtered_data.csv"));
        assert_eq!(config.date_column, "data");
        assert_eq!(config.retain_columns.len(), 15);
        assert_eq!(config.year_range, None);
        assert_eq!(config.season_convention, SeasonConvention::Southern);
    }

    #[test]
    fn test_parse_full_file() -> Result<(), Box<dyn std::error::Error>> {
        let text = r#"
            climate = "input/agroclimatology.csv"
            productivity = "input/produtividade_soja.csv"
            output = "output/filtered_data.parquet"
            retain_columns = ["year", "month", "day", "codigo_ibge", "TS"]
            year_range = [2004, 2005]
            season_convention = "northern"
        "#;
        let file = ConfigFile::parse(text, Path::new("agroclimate.toml"))?;
        let config = file.into_config()?;
        assert_eq!(
            config.inputs,
            InputSource::Files {
                climate: "input/agroclimatology.csv".into(),
                productivity: "input/produtividade_soja.csv".into(),
            }
        );
        assert_eq!(config.output, PathBuf::from("output/filtered_data.parquet"));
        assert_eq!(config.retain_columns.len(), 5);
        assert_eq!(config.year_range, Some((2004, 2005)));
        assert_eq!(config.season_convention, SeasonConvention::Northern);
        Ok(())
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = ConfigFile::parse("colour = \"red\"", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse(..)));
    }

    #[test]
    fn test_overlay_prefers_overrides() -> Result<(), Box<dyn std::error::Error>> {
        let file = ConfigFile {
            input_dir: Some("input".into()),
            date_column: Some("date".into()),
            ..Default::default()
        };
        let cli = ConfigFile {
            date_column: Some("data".into()),
            year_range: Some((2010, 2012)),
            ..Default::default()
        };
        let config = file.overlay(cli).into_config()?;
        assert_eq!(config.inputs, InputSource::Directory("input".into()));
        assert_eq!(config.date_column, "data");
        assert_eq!(config.year_range, Some((2010, 2012)));
        Ok(())
    }

    #[test]
    fn test_missing_inputs_and_bad_interval() {
        assert!(matches!(
            ConfigFile::default().into_config(),
            Err(PipelineError::InvalidConfig(_))
        ));
        let inverted = ConfigFile {
            input_dir: Some("input".into()),
            year_range: Some((2017, 2004)),
            ..Default::default()
        };
        assert!(matches!(
            inverted.into_config(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }
}
