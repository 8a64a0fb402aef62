//! Defines the `Season` labels, the fixed month/day windows they are assigned
//! from, and the two label conventions found in the source data.

use serde::Deserialize;
use std::fmt;

/// Season label attached to every row of the enriched table.
///
/// `Unknown` is the catch-all for rows whose month/day falls outside every
/// window (malformed or missing values); it is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Summer,
    Autumn,
    Winter,
    Spring,
    Unknown,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An inclusive `(start_month, start_day)` to `(end_month, end_day)` window.
///
/// Bounds are zero-padded two character strings and are compared as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonWindow {
    pub start_month: &'static str,
    pub start_day: &'static str,
    pub end_month: &'static str,
    pub end_day: &'static str,
}

impl SeasonWindow {
    const fn new(
        start_month: &'static str,
        start_day: &'static str,
        end_month: &'static str,
        end_day: &'static str,
    ) -> Self {
        Self {
            start_month,
            start_day,
            end_month,
            end_day,
        }
    }

    /// Checks whether a zero-padded `month`/`day` pair falls inside the window.
    ///
    /// The month must lie between the bounding months; the day is only
    /// checked against a bound when the month equals that bound's month.
    pub fn contains(&self, month: &str, day: &str) -> bool {
        self.start_month <= month
            && month <= self.end_month
            && (self.start_month != month || self.start_day <= day)
            && (self.end_month != month || self.end_day >= day)
    }
}

/// The five windows, in evaluation order. The first and the last window share
/// a label because the summer band wraps the year boundary.
pub const SEASON_WINDOWS: [SeasonWindow; 5] = [
    SeasonWindow::new("01", "01", "03", "20"),
    SeasonWindow::new("03", "21", "06", "20"),
    SeasonWindow::new("06", "21", "09", "22"),
    SeasonWindow::new("09", "23", "12", "20"),
    SeasonWindow::new("12", "21", "12", "31"),
];

/// Which names are given to the five [`SEASON_WINDOWS`].
///
/// `Southern` is the canonical convention for Paraná: January to March 20 is
/// summer. `Northern` rotates the labels by half a year and is kept for
/// comparing against older outputs produced with that labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonConvention {
    #[default]
    Southern,
    Northern,
}

impl SeasonConvention {
    /// Labels for each entry of [`SEASON_WINDOWS`], index for index.
    pub fn labels(&self) -> [Season; 5] {
        match self {
            SeasonConvention::Southern => [
                Season::Summer,
                Season::Autumn,
                Season::Winter,
                Season::Spring,
                Season::Summer,
            ],
            SeasonConvention::Northern => [
                Season::Winter,
                Season::Spring,
                Season::Summer,
                Season::Autumn,
                Season::Winter,
            ],
        }
    }

    /// Returns the label of the first window containing `month`/`day`, or
    /// [`Season::Unknown`] if either is missing or no window matches.
    pub fn classify(&self, month: Option<&str>, day: Option<&str>) -> Season {
        let (Some(month), Some(day)) = (month, day) else {
            return Season::Unknown;
        };
        SEASON_WINDOWS
            .iter()
            .zip(self.labels())
            .find(|(window, _)| window.contains(month, day))
            .map(|(_, season)| season)
            .unwrap_or(Season::Unknown)
    }
}
