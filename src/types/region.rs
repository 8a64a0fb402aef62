//! Types produced by the centroid bisection of an enriched table.

use polars::frame::DataFrame;
use std::fmt;

/// One half of a north/south or east/west bisection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    North,
    South,
    East,
    West,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::North, Region::South, Region::East, Region::West];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "North",
            Region::South => "South",
            Region::East => "East",
            Region::West => "West",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Midpoint of the extreme coordinates present in a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

/// Four views of the same table.
///
/// `north`/`south` and `east`/`west` are two independent bisections: a row is
/// in exactly one of the first pair and exactly one of the second. The
/// partition is a snapshot and goes stale if the source table changes.
#[derive(Debug, Clone)]
pub struct RegionPartition {
    pub north: DataFrame,
    pub south: DataFrame,
    pub east: DataFrame,
    pub west: DataFrame,
    /// `None` when the source table had no coordinates to bisect.
    pub centroid: Option<Centroid>,
}

impl RegionPartition {
    pub fn get(&self, region: Region) -> &DataFrame {
        match region {
            Region::North => &self.north,
            Region::South => &self.south,
            Region::East => &self.east,
            Region::West => &self.west,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Region, &DataFrame)> {
        Region::ALL.into_iter().map(move |region| (region, self.get(region)))
    }
}
