//! Reading the two source tables and writing the enriched table.

use crate::error::PipelineError;
use crate::types::columns::{DAY, MONTH, YEAR};
use crate::utils::has_column;
use log::{debug, info};
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Paths of the two source tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub climate: PathBuf,
    pub productivity: PathBuf,
}

/// File format of the enriched table, chosen from the output extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    /// `.parquet` selects Parquet, anything else CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => OutputFormat::Parquet,
            _ => OutputFormat::Csv,
        }
    }
}

/// Columns read as text whenever a CSV carries them. Their values are
/// zero-padded (`"06"`) and would otherwise be inferred as integers.
const TEXT_COLUMNS: [&str; 3] = [YEAR, MONTH, DAY];

/// Reads a CSV file with a header row into a `DataFrame`.
///
/// `year`, `month` and `day` are always read as strings, so a table written by
/// [`write_table`] reads back with the same column types.
pub fn read_csv(path: &Path) -> Result<DataFrame, PipelineError> {
    let csv_error = |e: PolarsError| PipelineError::CsvRead(path.to_path_buf(), e);

    let header = CsvReadOptions::default()
        .with_has_header(true)
        .with_n_rows(Some(1))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(csv_error)?
        .finish()
        .map_err(csv_error)?;
    let text_columns: Schema = TEXT_COLUMNS
        .iter()
        .filter(|c| has_column(&header, c))
        .map(|c| (PlSmallStr::from_static(*c), DataType::String))
        .collect();

    let mut options = CsvReadOptions::default().with_has_header(true);
    if !text_columns.is_empty() {
        options = options.with_schema_overwrite(Some(Arc::new(text_columns)));
    }
    let df = options
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(csv_error)?
        .finish()
        .map_err(csv_error)?;
    info!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Finds the two source tables in `dir`: the largest `.csv` file is the
/// climate table and the smallest is the productivity table.
///
/// Files of equal size are ordered by name so the choice is stable.
///
/// # Errors
///
/// [`PipelineError::InputDiscovery`] if `dir` holds fewer than two CSV files.
pub fn discover_inputs(dir: &Path) -> Result<InputPaths, PipelineError> {
    let entries = fs::read_dir(dir).map_err(|e| PipelineError::InputDirRead(dir.to_path_buf(), e))?;

    let mut csv_files: Vec<(u64, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::InputDirRead(dir.to_path_buf(), e))?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv || !path.is_file() {
            continue;
        }
        let size = entry
            .metadata()
            .map_err(|e| PipelineError::InputDirRead(path.clone(), e))?
            .len();
        csv_files.push((size, path));
    }

    if csv_files.len() < 2 {
        return Err(PipelineError::InputDiscovery {
            dir: dir.to_path_buf(),
            message: format!("expected at least 2 CSV files, found {}", csv_files.len()),
        });
    }
    csv_files.sort();

    let productivity = csv_files[0].1.clone();
    let climate = csv_files[csv_files.len() - 1].1.clone();
    debug!(
        "Discovered climate table {} and productivity table {}",
        climate.display(),
        productivity.display()
    );
    Ok(InputPaths {
        climate,
        productivity,
    })
}

/// Writes `df` to `path` as CSV or Parquet, depending on the extension.
///
/// The table is written to a temporary file next to `path` and moved into
/// place only once it is complete, so a failed write never leaves a partial
/// output behind. Missing parent directories are created.
pub fn write_table(df: &mut DataFrame, path: &Path) -> Result<(), PipelineError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| PipelineError::OutputIo(parent.clone(), e))?;

    let mut temp_file =
        NamedTempFile::new_in(&parent).map_err(|e| PipelineError::OutputIo(parent.clone(), e))?;

    match OutputFormat::from_path(path) {
        OutputFormat::Csv => {
            CsvWriter::new(temp_file.as_file_mut())
                .include_header(true)
                .finish(df)
                .map_err(|e| PipelineError::CsvWrite(path.to_path_buf(), e))?;
        }
        OutputFormat::Parquet => {
            ParquetWriter::new(temp_file.as_file_mut())
                .with_compression(ParquetCompression::Snappy)
                .finish(df)
                .map_err(|e| PipelineError::ParquetWrite(path.to_path_buf(), e))?;
        }
    }

    temp_file
        .persist(path)
        .map_err(|e| PipelineError::OutputIo(path.to_path_buf(), e.error))?;
    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enriched_frame::EnrichedFrame;
    use tempfile::tempdir;

    #[test]
    fn test_discover_inputs_by_size() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("agroclimatology.csv"),
            "data,codigo_ibge,latitude,longitude,TS\n20150615,4100103,-23.3,-50.3,14.0\n20150616,4100103,-23.3,-50.3,15.0\n",
        )?;
        fs::write(
            dir.path().join("produtividade_soja.csv"),
            "codigo_ibge,name,2015\n4100103,Abatia,1.0\n",
        )?;
        fs::write(dir.path().join("notes.txt"), "x".repeat(10_000))?;

        let inputs = discover_inputs(dir.path())?;
        assert_eq!(inputs.climate, dir.path().join("agroclimatology.csv"));
        assert_eq!(inputs.productivity, dir.path().join("produtividade_soja.csv"));
        Ok(())
    }

    #[test]
    fn test_discover_inputs_needs_two_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("only.csv"), "a\n1\n")?;
        let err = discover_inputs(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::InputDiscovery { .. }));
        Ok(())
    }

    #[test]
    fn test_write_then_read_csv() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("output").join("filtered_data.csv");
        let mut df = df!(
            "year" => &["2015"],
            "codigo_ibge" => &[4100103i64],
            "name_ibge" => &[Some("Abatia")],
        )?;
        write_table(&mut df, &path)?;

        let text = fs::read_to_string(&path)?;
        assert_eq!(text, "year,codigo_ibge,name_ibge\n2015,4100103,Abatia\n");

        let back = read_csv(&path)?;
        assert_eq!(back.height(), 1);
        assert_eq!(back.column("codigo_ibge")?.i64()?.get(0), Some(4100103));
        Ok(())
    }

    #[test]
    fn test_written_table_reads_back_with_padded_date_parts(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("filtered_data.csv");
        let mut df = df!(
            "year" => &["2015", "2015"],
            "month" => &["06", "12"],
            "day" => &["05", "21"],
            "codigo_ibge" => &[4100103i64, 4100103],
            "TS" => &[14.0, 29.5],
            "season" => &["Autumn", "Summer"],
        )?;
        write_table(&mut df, &path)?;

        let back = read_csv(&path)?;
        for column in ["year", "month", "day"] {
            assert_eq!(back.column(column)?.dtype(), &DataType::String);
        }
        assert_eq!(back.column("codigo_ibge")?.dtype(), &DataType::Int64);

        let enriched = EnrichedFrame::new(back);
        let day = enriched.for_day("2015", "06", "05")?;
        assert_eq!(day.height(), 1);
        assert_eq!(day.frame.column("season")?.str()?.get(0), Some("Autumn"));
        Ok(())
    }

    #[test]
    fn test_write_parquet_by_extension() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("filtered_data.parquet");
        let mut df = df!("year" => &["2015", "2016"])?;
        write_table(&mut df, &path)?;
        assert!(path.metadata()?.len() > 0);
        assert_eq!(OutputFormat::from_path(&path), OutputFormat::Parquet);
        assert_eq!(OutputFormat::from_path(Path::new("out.CSV")), OutputFormat::Csv);
        Ok(())
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::CsvRead(..)));
    }
}
