// Core logic lives here - filtering, selections and reports
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod report;
pub mod selection;

pub use catalog::Catalog;
pub use config::{Config, StorageBackend};
pub use error::Error;
pub use export::{ExportFormat, Exporter};
pub use filter::{categories, featured, filter, FilterCriteria};
pub use models::{PopularityLevel, PricingTier, Tool, PRICING_OPTIONS};
pub use report::ReportLayout;
pub use selection::{JsonFileBackend, KeyValueBackend, Mark, MemoryBackend, SelectionStore};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
