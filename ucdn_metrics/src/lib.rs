pub mod aggregator;
pub mod exporters;
pub mod reduce;
pub mod schema;
pub mod sink;

pub use aggregator::{ResourceError, ScrapeAggregator, ScrapeOutcome, ScrapeReport};
pub use exporters::{JsonExporter, PrometheusSink};
pub use reduce::Reduced;
pub use schema::{define_metric, MetricDescriptor, MetricId, SchemaRegistry};
pub use sink::{MemorySink, MetricSink, ReducedObservation};
