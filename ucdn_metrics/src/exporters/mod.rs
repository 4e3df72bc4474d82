pub mod json;
pub mod prometheus;

pub use self::json::{JsonExporter, ScrapeSnapshot};
pub use self::prometheus::PrometheusSink;
