//! Productivity table handling: header normalization, the hash join that
//! attaches municipality names to climate rows, and the productivity views
//! consumed by the dashboards.

use crate::error::{PipelineError, StageContext};
use crate::types::columns::{CODIGO_IBGE, LATITUDE, LONGITUDE, NAME, NAME_IBGE, PRODUCTIVITY, YEAR};
use crate::types::stage::Stage;
use crate::utils::{code_column, float_column, int_column, row_indices, string_column};
use crate::year_filter::YearSelection;
use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};

/// A column header is a year column when, once trimmed, it is four digits.
pub fn is_year_label(name: &str) -> bool {
    name.len() == 4 && name.bytes().all(|b| b.is_ascii_digit())
}

/// The productivity table with trimmed headers and trimmed municipality names.
///
/// Raw headers carry stray whitespace (`"codigo_ibge "`, `"2016   "`), and so
/// do names (`"  Abatia  "`). Both are normalized once, on construction.
#[derive(Debug, Clone)]
pub struct ProductivityTable {
    frame: DataFrame,
    years: Vec<String>,
}

impl ProductivityTable {
    /// Normalizes a raw productivity table.
    ///
    /// # Errors
    ///
    /// * [`PipelineError::MissingColumn`] if `codigo_ibge` or `name` is absent
    ///   after trimming.
    /// * [`PipelineError::Polars`] if trimming makes two headers collide.
    pub fn from_frame(raw: DataFrame) -> Result<Self, PipelineError> {
        let stage = Stage::ProductivityJoin;
        let mut frame = raw;

        let trimmed: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.as_str().trim().to_string())
            .collect();
        frame.set_column_names(trimmed.iter().map(String::as_str)).in_stage(stage)?;

        let (codes, invalid) = code_column(&frame, CODIGO_IBGE, stage)?;
        if invalid > 0 {
            warn!(
                "{} productivity rows have a codigo_ibge that is not an integer code; they cannot be joined",
                invalid
            );
        }
        let names: StringChunked = string_column(&frame, NAME, stage)?
            .into_iter()
            .map(|name| name.map(str::trim))
            .collect();
        frame
            .with_column(codes.into_series())
            .in_stage(stage)?;
        frame
            .with_column(names.into_series().with_name(NAME.into()))
            .in_stage(stage)?;

        let years: Vec<String> = trimmed.into_iter().filter(|n| is_year_label(n)).collect();
        debug!("Productivity table covers years {:?}", years);

        Ok(Self { frame, years })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Year column labels, in table order.
    pub fn year_labels(&self) -> &[String] {
        &self.years
    }

    /// The membership selection covering exactly the table's year columns.
    pub fn year_selection(&self) -> YearSelection {
        YearSelection::membership(self.years.iter().cloned())
    }

    /// Row indices by `codigo_ibge`, in table order.
    fn index_by_code(&self) -> Result<HashMap<i64, Vec<usize>>, PipelineError> {
        let codes = int_column(&self.frame, CODIGO_IBGE, Stage::ProductivityJoin)?;
        let mut index: HashMap<i64, Vec<usize>> = HashMap::new();
        for (row, code) in codes.into_iter().enumerate() {
            if let Some(code) = code {
                index.entry(code).or_default().push(row);
            }
        }
        Ok(index)
    }

    /// First row index by municipality name.
    fn index_by_name(&self) -> Result<HashMap<String, usize>, PipelineError> {
        let names = string_column(&self.frame, NAME, Stage::ProductivityJoin)?;
        let mut index = HashMap::new();
        for (row, name) in names.into_iter().enumerate() {
            if let Some(name) = name {
                index.entry(name.to_string()).or_insert(row);
            }
        }
        Ok(index)
    }

    fn names(&self) -> Result<StringChunked, PipelineError> {
        string_column(&self.frame, NAME, Stage::ProductivityJoin)
    }

    fn year_values(&self, year: &str) -> Result<Float64Chunked, PipelineError> {
        float_column(&self.frame, year, Stage::ProductivityJoin)
    }

    /// Adds a `productivity` column holding the value of `year` for the
    /// municipality named in each row's `name_ibge`. Rows without a match get
    /// a null.
    ///
    /// # Errors
    ///
    /// [`PipelineError::MissingColumn`] if `year` is not a column of the
    /// productivity table or `df` has no `name_ibge`.
    pub fn attach_year(&self, df: &DataFrame, year: &str) -> Result<DataFrame, PipelineError> {
        let stage = Stage::ProductivityJoin;
        let values = self.year_values(year)?;
        let by_name = self.index_by_name()?;
        let names = string_column(df, NAME_IBGE, stage)?;

        let productivity: Vec<Option<f64>> = names
            .into_iter()
            .map(|name| {
                name.and_then(|n| by_name.get(n))
                    .and_then(|row| values.get(*row))
            })
            .collect();

        let mut out = df.clone();
        out.with_column(Series::new(PRODUCTIVITY.into(), productivity))
            .in_stage(stage)?;
        Ok(out)
    }
}

/// Left-joins `name_ibge` onto the climate rows by `codigo_ibge`.
///
/// Every input row appears in the output. Rows with no matching code get a
/// null `name_ibge`. A code listed more than once in the productivity table
/// fans out into one output row per listing, in productivity-table order;
/// de-duplicate the productivity table first for 1:1 semantics.
pub fn join_productivity(
    df: &DataFrame,
    productivity: &ProductivityTable,
) -> Result<DataFrame, PipelineError> {
    let stage = Stage::ProductivityJoin;
    let (codes, invalid) = code_column(df, CODIGO_IBGE, stage)?;
    if invalid > 0 {
        warn!(
            "{} climate rows have a codigo_ibge that is not an integer code and stay unmatched",
            invalid
        );
    }
    let index = productivity.index_by_code()?;
    let names = productivity.names()?;

    let duplicated = index.values().filter(|rows| rows.len() > 1).count();
    if duplicated > 0 {
        warn!(
            "{} codigo_ibge values appear more than once in the productivity table; matching rows fan out",
            duplicated
        );
    }

    let mut take: Vec<IdxSize> = Vec::with_capacity(codes.len());
    let mut joined: Vec<Option<&str>> = Vec::with_capacity(codes.len());
    let mut unmatched = 0usize;

    for (row, code) in codes.into_iter().enumerate() {
        match code.and_then(|c| index.get(&c)) {
            Some(matches) => {
                for &m in matches {
                    take.push(row as IdxSize);
                    joined.push(names.get(m));
                }
            }
            None => {
                unmatched += 1;
                take.push(row as IdxSize);
                joined.push(None);
            }
        }
    }

    if unmatched > 0 {
        warn!("{} rows have no matching codigo_ibge in the productivity table", unmatched);
    }

    let mut out = df.take(&row_indices(take)).in_stage(stage)?;
    out.with_column(Series::new(NAME_IBGE.into(), joined))
        .in_stage(stage)?;
    info!(
        "Joined municipality names: {} input rows, {} output rows",
        df.height(),
        out.height()
    );
    Ok(out)
}

/// Long-format productivity for the stations of an enriched table.
///
/// Takes the unique `(name_ibge, year, latitude, longitude)` rows of
/// `enriched`, in first-seen order, and attaches the productivity of that
/// municipality in that year. Rows whose year is not a productivity column,
/// or whose `name_ibge` is null, are skipped. A municipality missing from the
/// productivity table yields a null productivity.
///
/// Output columns: `name_ibge, latitude, longitude, year, productivity`.
pub fn productivity_long(
    enriched: &DataFrame,
    productivity: &ProductivityTable,
) -> Result<DataFrame, PipelineError> {
    let stage = Stage::ProductivityJoin;
    let names = string_column(enriched, NAME_IBGE, stage)?;
    let years = string_column(enriched, YEAR, stage)?;
    let latitudes = float_column(enriched, LATITUDE, stage)?;
    let longitudes = float_column(enriched, LONGITUDE, stage)?;

    let by_name = productivity.index_by_name()?;
    let mut values: HashMap<&str, Float64Chunked> = HashMap::new();
    for year in productivity.year_labels() {
        values.insert(year.as_str(), productivity.year_values(year)?);
    }

    let mut seen: HashSet<(&str, &str, OrderedFloat<f64>, OrderedFloat<f64>)> = HashSet::new();
    let mut out_names: Vec<&str> = Vec::new();
    let mut out_lat: Vec<Option<f64>> = Vec::new();
    let mut out_lon: Vec<Option<f64>> = Vec::new();
    let mut out_years: Vec<&str> = Vec::new();
    let mut out_values: Vec<Option<f64>> = Vec::new();

    for row in 0..enriched.height() {
        let (Some(name), Some(year)) = (names.get(row), years.get(row)) else {
            continue;
        };
        let Some(year_values) = values.get(year) else {
            continue;
        };
        let lat = latitudes.get(row);
        let lon = longitudes.get(row);
        let key = (
            name,
            year,
            OrderedFloat(lat.unwrap_or(f64::NAN)),
            OrderedFloat(lon.unwrap_or(f64::NAN)),
        );
        if !seen.insert(key) {
            continue;
        }
        out_names.push(name);
        out_lat.push(lat);
        out_lon.push(lon);
        out_years.push(year);
        out_values.push(by_name.get(name).and_then(|r| year_values.get(*r)));
    }

    let out = DataFrame::new(vec![
        Series::new(NAME_IBGE.into(), out_names).into(),
        Series::new(LATITUDE.into(), out_lat).into(),
        Series::new(LONGITUDE.into(), out_lon).into(),
        Series::new(YEAR.into(), out_years).into(),
        Series::new(PRODUCTIVITY.into(), out_values).into(),
    ])
    .in_stage(stage)?;
    debug!("Built {} long-format productivity rows", out.height());
    Ok(out)
}

/// Rescales `values` linearly onto `[new_min, new_max]`.
///
/// The smallest input maps to `new_min` and the largest to `new_max`. When
/// every input is equal there is no range to scale and every value maps to
/// `new_min`.
pub fn normalize_values(values: &[f64], new_min: f64, new_max: f64) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    values
        .iter()
        .map(|v| {
            if range > 0.0 {
                new_min + (v - min) * (new_max - new_min) / range
            } else {
                new_min
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_productivity() -> PolarsResult<DataFrame> {
        df!(
            "codigo_ibge " => &[4100103i64, 4100202, 4100301],
            "name" => &["  Abatia  ", "Adrianópolis ", " Agudos do Sul"],
            "uf" => &["PR", "PR", "PR"],
            "2015   " => &[Some(120.5), Some(98.0), None],
            "2016" => &[130.0, 101.5, 87.25],
        )
    }

    fn strings(df: &DataFrame, column: &str) -> Vec<Option<String>> {
        df.column(column)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_headers_and_names_are_trimmed() -> Result<(), Box<dyn std::error::Error>> {
        let table = ProductivityTable::from_frame(raw_productivity()?)?;
        let headers: Vec<String> = table
            .frame()
            .get_column_names()
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(headers, vec!["codigo_ibge", "name", "uf", "2015", "2016"]);
        assert_eq!(table.year_labels(), &["2015".to_string(), "2016".to_string()]);
        assert_eq!(
            strings(table.frame(), "name"),
            vec![
                Some("Abatia".into()),
                Some("Adrianópolis".into()),
                Some("Agudos do Sul".into())
            ]
        );
        assert_eq!(
            table.year_selection(),
            YearSelection::membership(["2015", "2016"])
        );
        Ok(())
    }

    #[test]
    fn test_missing_name_column() -> Result<(), Box<dyn std::error::Error>> {
        let raw = df!("codigo_ibge" => &[1i64], "2015" => &[1.0])?;
        let err = ProductivityTable::from_frame(raw).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingColumn { stage: Stage::ProductivityJoin, ref column } if column == "name"
        ));
        Ok(())
    }

    #[test]
    fn test_left_join_keeps_every_row() -> Result<(), Box<dyn std::error::Error>> {
        let table = ProductivityTable::from_frame(raw_productivity()?)?;
        let climate = df!(
            "codigo_ibge" => &[Some(4100103i64), Some(9999999), Some(4100301), None],
            "TS" => &[20.0, 21.0, 22.0, 23.0],
        )?;
        let out = join_productivity(&climate, &table)?;
        assert_eq!(out.height(), 4);
        assert_eq!(
            strings(&out, "name_ibge"),
            vec![Some("Abatia".into()), None, Some("Agudos do Sul".into()), None]
        );
        assert_eq!(
            out.column("TS")?.f64()?.into_iter().collect::<Vec<_>>(),
            vec![Some(20.0), Some(21.0), Some(22.0), Some(23.0)]
        );
        Ok(())
    }

    #[test]
    fn test_duplicate_codes_fan_out() -> Result<(), Box<dyn std::error::Error>> {
        let raw = df!(
            "codigo_ibge" => &[4100103i64, 4100103],
            "name" => &["Abatia", "Abatiá"],
            "2015" => &[1.0, 2.0],
        )?;
        let table = ProductivityTable::from_frame(raw)?;
        let climate = df!("codigo_ibge" => &[4100103i64, 1], "TS" => &[20.0, 21.0])?;
        let out = join_productivity(&climate, &table)?;
        assert_eq!(out.height(), 3);
        assert_eq!(
            strings(&out, "name_ibge"),
            vec![Some("Abatia".into()), Some("Abatiá".into()), None]
        );
        Ok(())
    }

    #[test]
    fn test_padded_string_codes_are_trimmed() -> Result<(), Box<dyn std::error::Error>> {
        let raw = df!(
            "codigo_ibge " => &["4100103 ", " 4100202", "n/a"],
            "name" => &["Abatia", "Adrianópolis", "Unknown"],
            "2015" => &[120.5, 98.0, 1.0],
        )?;
        let table = ProductivityTable::from_frame(raw)?;
        assert_eq!(
            table.frame().column("codigo_ibge")?.i64()?.into_iter().collect::<Vec<_>>(),
            vec![Some(4100103), Some(4100202), None]
        );

        let climate = df!("codigo_ibge" => &[Some("4100202  "), Some("4100103"), Some("x"), None])?;
        let out = join_productivity(&climate, &table)?;
        assert_eq!(
            strings(&out, "name_ibge"),
            vec![Some("Adrianópolis".into()), Some("Abatia".into()), None, None]
        );

        let numeric = df!("codigo_ibge" => &[4100103i64])?;
        let out = join_productivity(&numeric, &table)?;
        assert_eq!(strings(&out, "name_ibge"), vec![Some("Abatia".into())]);
        Ok(())
    }

    #[test]
    fn test_join_matches_string_codes() -> Result<(), Box<dyn std::error::Error>> {
        let table = ProductivityTable::from_frame(raw_productivity()?)?;
        let climate = df!("codigo_ibge" => &["4100202"])?;
        let out = join_productivity(&climate, &table)?;
        assert_eq!(strings(&out, "name_ibge"), vec![Some("Adrianópolis".into())]);
        Ok(())
    }

    #[test]
    fn test_productivity_long_deduplicates_stations() -> Result<(), Box<dyn std::error::Error>> {
        let table = ProductivityTable::from_frame(raw_productivity()?)?;
        let enriched = df!(
            "name_ibge" => &[Some("Abatia"), Some("Abatia"), Some("Abatia"), Some("Agudos do Sul"), None, Some("Nowhere")],
            "year" => &["2015", "2015", "2016", "2015", "2015", "2016"],
            "latitude" => &[-23.3, -23.3, -23.3, -25.9, -24.0, -24.5],
            "longitude" => &[-50.3, -50.3, -50.3, -49.3, -51.0, -52.0],
        )?;
        let long = productivity_long(&enriched, &table)?;
        assert_eq!(long.height(), 4);
        assert_eq!(
            strings(&long, "name_ibge"),
            vec![
                Some("Abatia".into()),
                Some("Abatia".into()),
                Some("Agudos do Sul".into()),
                Some("Nowhere".into())
            ]
        );
        assert_eq!(
            long.column("productivity")?.f64()?.into_iter().collect::<Vec<_>>(),
            vec![Some(120.5), Some(130.0), None, None]
        );
        Ok(())
    }

    #[test]
    fn test_attach_year() -> Result<(), Box<dyn std::error::Error>> {
        let table = ProductivityTable::from_frame(raw_productivity()?)?;
        let coords = df!("name_ibge" => &[Some("Adrianópolis"), None, Some("Abatia")])?;
        let out = table.attach_year(&coords, "2016")?;
        assert_eq!(
            out.column("productivity")?.f64()?.into_iter().collect::<Vec<_>>(),
            vec![Some(101.5), None, Some(130.0)]
        );
        assert!(matches!(
            table.attach_year(&coords, "1999"),
            Err(PipelineError::MissingColumn { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_normalize_values() {
        assert_eq!(normalize_values(&[10.0, 20.0, 30.0], 0.0, 2.0), vec![0.0, 1.0, 2.0]);
        assert_eq!(normalize_values(&[5.0, 5.0], 0.1, 1.0), vec![0.1, 0.1]);
        assert!(normalize_values(&[], 0.0, 1.0).is_empty());
    }
}
