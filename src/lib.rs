//! Indoor air quality and thermal comfort trends
//!
//! Building sensor readings (CO2 concentration and air temperature, per floor and per zone)
//! are loaded from a CSV file with [ReadingsLoader] and aggregated over time windows by an [Analysis].
//! The 10 predefined analyses are listed in [Variant].
//!
//! ```no_run
//! use sensor_trends::{ReadingsLoader, Variant, variant::HISTORY_DATE};
//!
//! let readings = ReadingsLoader::default().data_path("rawdata.csv").load()?;
//! let date = HISTORY_DATE.parse()?;
//! for report in Variant::Co2TrendsWeekly.analysis(date).run(&readings, ".")? {
//!     println!("{}: {:?}", report.entity, report.path);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregation;
pub mod analysis;
pub mod bucket;
pub mod category;
pub mod cli;
pub mod coverage;
mod error;
pub mod readings;
pub mod variant;
pub mod window;

pub use analysis::{Analysis, Report};
pub use error::Error;
pub use readings::{Reading, Readings, ReadingsLoader};
pub use variant::Variant;

/// Default sensor readings file
pub const RAW_DATA: &str = "rawdata.csv";
