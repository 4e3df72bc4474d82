pub mod config;
pub mod parser;

pub use config::{Credentials, HEALTH_PATH, DomainConfig, ExporterConfig, ExporterConfigFile, WindowConfig};
pub use parser::parse_config_from_file;
