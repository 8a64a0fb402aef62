//! Centroid bisection of a table into north/south and east/west halves.

use crate::error::{PipelineError, StageContext};
use crate::types::columns::{LATITUDE, LONGITUDE};
use crate::types::region::{Centroid, RegionPartition};
use crate::types::stage::Stage;
use crate::utils::float_column;
use log::debug;
use polars::prelude::*;

/// Midpoints of the latitude and longitude ranges of `df`, each `None` when
/// the column holds no value.
///
/// Longitudes in Paraná are negative, so the most eastern point is the
/// *minimum* longitude and the most western point is the *maximum*.
fn midpoints(df: &DataFrame) -> Result<(Option<f64>, Option<f64>), PipelineError> {
    let stage = Stage::RegionPartition;
    let latitudes = float_column(df, LATITUDE, stage)?;
    let longitudes = float_column(df, LONGITUDE, stage)?;

    let latitude = latitudes
        .max()
        .zip(latitudes.min())
        .map(|(most_north, most_south)| (most_north + most_south) / 2.0);
    let longitude = longitudes
        .min()
        .zip(longitudes.max())
        .map(|(most_east, most_west)| (most_east + most_west) / 2.0);
    Ok((latitude, longitude))
}

/// Computes the midpoint of the extreme latitudes and longitudes of `df`.
///
/// Returns `None` unless both coordinate columns hold at least one value.
pub fn centroid(df: &DataFrame) -> Result<Option<Centroid>, PipelineError> {
    let (latitude, longitude) = midpoints(df)?;
    Ok(latitude
        .zip(longitude)
        .map(|(latitude, longitude)| Centroid {
            latitude,
            longitude,
        }))
}

/// Splits `df` into North/South and East/West halves around its centroid.
///
/// * North: `latitude <= centroid.latitude`, South: the rest.
/// * East: `longitude >= centroid.longitude`, West: the rest.
///
/// The two bisections are independent; every row with coordinates lands in
/// exactly one of North/South and exactly one of East/West. Rows with a null
/// coordinate belong to neither half of that bisection, and a bisection whose
/// column holds no value at all has two empty halves. `centroid` is set only
/// when both midpoints exist.
pub fn partition_regions(df: &DataFrame) -> Result<RegionPartition, PipelineError> {
    let stage = Stage::RegionPartition;
    let (mid_latitude, mid_longitude) = midpoints(df)?;
    debug!(
        "Partitioning {} rows around latitude {:?}, longitude {:?}",
        df.height(),
        mid_latitude,
        mid_longitude
    );

    let select = |predicate: Option<Expr>| match predicate {
        Some(predicate) => df.clone().lazy().filter(predicate).collect().in_stage(stage),
        None => Ok(df.slice(0, 0)),
    };
    let latitude = col(LATITUDE).cast(DataType::Float64);
    let longitude = col(LONGITUDE).cast(DataType::Float64);

    Ok(RegionPartition {
        north: select(mid_latitude.map(|mid| latitude.clone().lt_eq(lit(mid))))?,
        south: select(mid_latitude.map(|mid| latitude.clone().gt(lit(mid))))?,
        east: select(mid_longitude.map(|mid| longitude.clone().gt_eq(lit(mid))))?,
        west: select(mid_longitude.map(|mid| longitude.clone().lt(lit(mid))))?,
        centroid: mid_latitude
            .zip(mid_longitude)
            .map(|(latitude, longitude)| Centroid {
                latitude,
                longitude,
            }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::region::Region;

    fn stations() -> PolarsResult<DataFrame> {
        df!(
            "latitude" => &[-22.5, -23.0, -24.0, -25.5, -26.5],
            "longitude" => &[-54.0, -52.5, -51.0, -49.5, -48.0],
            "codigo_ibge" => &[1i64, 2, 3, 4, 5],
        )
    }

    fn codes(df: &DataFrame) -> Vec<i64> {
        df.column("codigo_ibge")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_centroid_uses_extremes() -> Result<(), Box<dyn std::error::Error>> {
        let center = centroid(&stations()?)?.unwrap();
        assert_eq!(center.latitude, -24.5);
        assert_eq!(center.longitude, -51.0);
        Ok(())
    }

    #[test]
    fn test_bisections_follow_sign_convention() -> Result<(), Box<dyn std::error::Error>> {
        let partition = partition_regions(&stations()?)?;
        // latitude <= -24.5 is the lower half of the latitude range
        assert_eq!(codes(&partition.north), vec![4, 5]);
        assert_eq!(codes(&partition.south), vec![1, 2, 3]);
        // longitude >= -51.0 includes the midpoint station
        assert_eq!(codes(&partition.east), vec![3, 4, 5]);
        assert_eq!(codes(&partition.west), vec![1, 2]);
        Ok(())
    }

    #[test]
    fn test_halves_cover_input_without_overlap() -> Result<(), Box<dyn std::error::Error>> {
        let df = stations()?;
        let partition = partition_regions(&df)?;
        for (a, b) in [(Region::North, Region::South), (Region::East, Region::West)] {
            let mut all = codes(partition.get(a));
            all.extend(codes(partition.get(b)));
            all.sort();
            assert_eq!(all, codes(&df), "{a} and {b} must cover every row once");
        }
        Ok(())
    }

    #[test]
    fn test_partition_is_repeatable() -> Result<(), Box<dyn std::error::Error>> {
        let df = stations()?;
        let first = partition_regions(&df)?;
        let second = partition_regions(&df)?;
        for region in Region::ALL {
            assert!(first.get(region).equals_missing(second.get(region)));
        }
        assert_eq!(first.centroid, second.centroid);
        Ok(())
    }

    #[test]
    fn test_empty_table_gives_four_empty_tables() -> Result<(), Box<dyn std::error::Error>> {
        let df = stations()?.slice(0, 0);
        let partition = partition_regions(&df)?;
        assert_eq!(partition.centroid, None);
        for (_, frame) in partition.iter() {
            assert_eq!(frame.height(), 0);
            assert_eq!(frame.width(), 3);
        }
        Ok(())
    }

    #[test]
    fn test_null_latitudes_still_split_east_west() -> Result<(), Box<dyn std::error::Error>> {
        let df = df!(
            "latitude" => &[None::<f64>, None, None],
            "longitude" => &[-54.0, -51.0, -48.0],
            "codigo_ibge" => &[1i64, 2, 3],
        )?;
        assert_eq!(centroid(&df)?, None);

        let partition = partition_regions(&df)?;
        assert_eq!(partition.centroid, None);
        assert_eq!(partition.north.height(), 0);
        assert_eq!(partition.south.height(), 0);
        assert_eq!(codes(&partition.east), vec![2, 3]);
        assert_eq!(codes(&partition.west), vec![1]);
        Ok(())
    }

    #[test]
    fn test_missing_coordinates_column() -> Result<(), Box<dyn std::error::Error>> {
        let df = df!("latitude" => &[-24.0])?;
        let err = partition_regions(&df).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingColumn { stage: Stage::RegionPartition, ref column } if column == "longitude"
        ));
        Ok(())
    }
}
