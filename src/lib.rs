//! Moodatlas Engine - Environmental-mood correlation and spatial aggregation
//!
//! The engine turns a list of heterogeneous, defensively-parsed journal
//! records into (a) statistical correlations between pollution exposure and
//! mood and (b) spatially clustered summaries for map visualization, through
//! a deterministic pipeline: normalization → temporal bucketing →
//! {correlation analysis, spatial clustering} → summary assembly.
//!
//! The engine owns no I/O and no durable state: one ordered record list in,
//! one summary out. Authentication, persistence, and rendering are the
//! calling product's concern.

pub mod correlation;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod spatial;
pub mod summary;
pub mod temporal;
pub mod types;

pub use correlation::CorrelationAnalyzer;
pub use error::EngineError;
pub use normalizer::Normalizer;
pub use pipeline::{analyze_records, analyze_records_json, EngineProcessor};
pub use spatial::SpatialClusterer;
pub use summary::SummaryAssembler;
pub use types::{AnalysisMode, ClusterMode, MoodEnvSummary, RawRecord};

/// Engine version embedded in every summary's producer block
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for summary provenance
pub const PRODUCER_NAME: &str = "moodatlas-engine";
