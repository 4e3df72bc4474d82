pub mod duration;
pub mod error;
pub mod points;
pub mod resource;
pub mod source;

pub use error::{ExporterError, Result};
pub use points::{Bandwidth95, BandwidthPoint, HitRatePoint, HttpCodeCounts, HttpCodePoint, RequestNumPoint};
pub use resource::{MonitoredResource, ReportWindow};
pub use source::{DataSource, DynDataSource, StatQuery, UcdnClient, UcdnClientConfig};
