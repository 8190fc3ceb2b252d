pub mod assembler;
pub mod columns;
pub mod engine;
pub mod fallback;
pub mod filter;
pub mod patterns;

pub use columns::{ColumnClassifier, ColumnRule, KeywordRule, NumericFallbackRule};
pub use engine::ExtractionEngine;
pub use fallback::{DisabledClassifier, ExternalClassifier};
pub use patterns::Patterns;
