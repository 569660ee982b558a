//! # batrat-core
//!
//! **Do bats treat rats as predators?**
//!
//! `batrat-core` holds the data side of the bat-vs-rat forage analysis: the
//! two fixed dataset schemas (bat landings and rat arrivals), CSV loading
//! into an immutable [`DataSession`], the row cleaner that prepares records
//! for inference, and descriptive summaries.
//!
//! ## Quick Start
//!
//! ```no_run
//! use batrat_core::{DataSession, clean, describe};
//!
//! let session = DataSession::load("dataset1.csv", "dataset2.csv").unwrap();
//! let cleaned = clean(session.landings(), &["risk", "reward"]).unwrap();
//! println!("{} usable landings, {} dropped", cleaned.len(), cleaned.dropped());
//!
//! for summary in describe(session.arrivals()) {
//!     println!("{}: {} values", summary.field, summary.count);
//! }
//! ```
//!
//! ## Architecture
//!
//! CSV → [`DataSession`] → [`clean`] → statistical analyses (`batrat-stats`)
//!
//! Every field lookup is capability-checked through [`FieldSpec`], so an
//! unknown or mistyped column surfaces as a [`SchemaError`] before any
//! numeric work starts.

pub mod cleaner;
pub mod config;
pub mod describe;
pub mod error;
pub mod loader;
pub mod records;
pub mod schema;

pub use cleaner::{CleanedRecords, clean, clean_fields};
pub use config::AnalysisConfig;
pub use describe::{
    CategoricalSummary, FieldSummary, Histogram, HistogramBin, NumericSummary, describe,
    describe_field, histogram, numbers, quantile_sorted, sturges_bins, value_counts,
};
pub use error::{AnalysisError, AnalysisResult, ConfigError, LoadError, SchemaError};
pub use loader::{DataSession, LoadedTable, read_csv, read_from};
pub use records::{
    ArrivalField, ArrivalRecord, LandingField, ObservationRecord, REWARD_VOCABULARY,
    RISK_VOCABULARY, TabularRecord,
};
pub use schema::{BinaryVocabulary, FieldKind, FieldSpec, Record, Value, label_order};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
