pub mod api;
pub mod config;
pub mod error;
pub mod inference;
pub mod loader;
pub mod models;
pub mod report;
pub mod service;

pub use config::{AppConfig, ExtractionConfig};
pub use models::{QualifyingRecord, ResultSet, TabularUnit};
pub use service::{ExternalClassifier, ExtractionEngine};
