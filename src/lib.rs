mod config;
mod dates;
mod enriched_frame;
mod error;
mod frame_ext;
mod io;
mod partition;
mod pipeline;
mod productivity;
mod projection;
mod seasons;
mod types;
mod utils;
mod year_filter;

pub use error::PipelineError;

pub use config::*;
pub use enriched_frame::EnrichedFrame;
pub use frame_ext::ClimateFrameExt;
pub use io::*;
pub use pipeline::*;

pub use dates::{decompose_date, split_date_code, DATE_CODE_LEN};
pub use partition::{centroid, partition_regions};
pub use productivity::{
    is_year_label, join_productivity, normalize_values, productivity_long, ProductivityTable,
};
pub use projection::project_columns;
pub use seasons::assign_seasons;
pub use year_filter::{filter_years, YearSelection};

pub use types::columns::*;
pub use types::region::{Centroid, Region, RegionPartition};
pub use types::season::{Season, SeasonConvention, SeasonWindow, SEASON_WINDOWS};
pub use types::stage::Stage;
