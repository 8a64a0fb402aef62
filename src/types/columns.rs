//! Column names shared by the climate, productivity and enriched tables, plus
//! the catalog of measurement variables found in the Paraná agroclimatology
//! dataset.

use std::fmt;

/// Compact `YYYYMMDD` date code in the raw climate table.
pub const DATE: &str = "data";
pub const YEAR: &str = "year";
pub const MONTH: &str = "month";
pub const DAY: &str = "day";
pub const SEASON: &str = "season";
/// Municipality identifier, the join key between stations and productivity.
pub const CODIGO_IBGE: &str = "codigo_ibge";
/// Municipality display name in the productivity table.
pub const NAME: &str = "name";
/// Municipality name after it has been joined onto a climate row.
pub const NAME_IBGE: &str = "name_ibge";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const PRODUCTIVITY: &str = "productivity";

/// Default name of the pipeline's output file.
pub const DEFAULT_OUTPUT_FILE: &str = "filtered_data.csv";

/// Columns kept by the column projection unless configured otherwise.
pub const DEFAULT_RETAIN_COLUMNS: [&str; 15] = [
    YEAR,
    MONTH,
    DAY,
    CODIGO_IBGE,
    LATITUDE,
    LONGITUDE,
    "TS",
    "T2M",
    "PS",
    "GWETROOT",
    "PRECTOTCORR",
    "ALLSKY_SFC_SW_DWN",
    "CLRSKY_SFC_SW_DWN",
    "WS2M",
    "WS10M",
];

pub fn default_retain_columns() -> Vec<String> {
    DEFAULT_RETAIN_COLUMNS.iter().map(|c| c.to_string()).collect()
}

/// A measurement column of the climate table.
///
/// The set of columns in a climate table is open-ended; this enum only names
/// the variables consumers know how to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementVariable {
    /// `TS`
    EarthSkinTemperature,
    /// `T2M`
    Temperature2m,
    /// `PS`
    SurfacePressure,
    /// `GWETROOT`
    RootZoneSoilWetness,
    /// `PRECTOTCORR`
    PrecipitationCorrected,
    /// `ALLSKY_SFC_SW_DWN`
    AllSkyShortwaveIrradiance,
    /// `CLRSKY_SFC_SW_DWN`
    ClearSkyShortwaveIrradiance,
    /// `WS2M`
    WindSpeed2m,
    /// `WS10M`
    WindSpeed10m,
}

impl MeasurementVariable {
    pub const ALL: [MeasurementVariable; 9] = [
        MeasurementVariable::EarthSkinTemperature,
        MeasurementVariable::Temperature2m,
        MeasurementVariable::SurfacePressure,
        MeasurementVariable::RootZoneSoilWetness,
        MeasurementVariable::PrecipitationCorrected,
        MeasurementVariable::AllSkyShortwaveIrradiance,
        MeasurementVariable::ClearSkyShortwaveIrradiance,
        MeasurementVariable::WindSpeed2m,
        MeasurementVariable::WindSpeed10m,
    ];

    /// Column name in the climate table.
    pub fn code(&self) -> &'static str {
        match self {
            MeasurementVariable::EarthSkinTemperature => "TS",
            MeasurementVariable::Temperature2m => "T2M",
            MeasurementVariable::SurfacePressure => "PS",
            MeasurementVariable::RootZoneSoilWetness => "GWETROOT",
            MeasurementVariable::PrecipitationCorrected => "PRECTOTCORR",
            MeasurementVariable::AllSkyShortwaveIrradiance => "ALLSKY_SFC_SW_DWN",
            MeasurementVariable::ClearSkyShortwaveIrradiance => "CLRSKY_SFC_SW_DWN",
            MeasurementVariable::WindSpeed2m => "WS2M",
            MeasurementVariable::WindSpeed10m => "WS10M",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MeasurementVariable::EarthSkinTemperature => "Earth Skin Temperature",
            MeasurementVariable::Temperature2m => "Temperature at 2 Meters",
            MeasurementVariable::SurfacePressure => "Surface Pressure",
            MeasurementVariable::RootZoneSoilWetness => "Root Zone Soil Wetness",
            MeasurementVariable::PrecipitationCorrected => "Precipitation Corrected",
            MeasurementVariable::AllSkyShortwaveIrradiance => {
                "All Sky Surface Shortwave Downward Irradiance"
            }
            MeasurementVariable::ClearSkyShortwaveIrradiance => {
                "Clear Sky Surface Shortwave Downward Irradiance"
            }
            MeasurementVariable::WindSpeed2m => "Wind Speed at 2 Meters",
            MeasurementVariable::WindSpeed10m => "Wind Speed at 10 Meters",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MeasurementVariable::EarthSkinTemperature | MeasurementVariable::Temperature2m => "°C",
            MeasurementVariable::SurfacePressure => "kPa",
            MeasurementVariable::RootZoneSoilWetness => "%",
            MeasurementVariable::PrecipitationCorrected => "mm/day",
            MeasurementVariable::AllSkyShortwaveIrradiance
            | MeasurementVariable::ClearSkyShortwaveIrradiance => "kW-hr/m^2/day",
            MeasurementVariable::WindSpeed2m | MeasurementVariable::WindSpeed10m => "m/s",
        }
    }

    /// Looks a variable up by its column name, e.g. `"GWETROOT"`.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.code() == code)
    }
}

impl fmt::Display for MeasurementVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.description(), self.unit())
    }
}
