//! Pipeline orchestration
//!
//! This module provides the public API for the Moodatlas engine. It wires
//! the stages together: normalization → {correlation, spatial clustering} →
//! summary assembly. The stages themselves are pure; the tracing events
//! emitted here are the engine's only side effect.

use crate::correlation::{CorrelationAnalyzer, EnvSample};
use crate::error::EngineError;
use crate::normalizer::Normalizer;
use crate::spatial::SpatialClusterer;
use crate::summary::SummaryAssembler;
use crate::types::{AnalysisMode, MoodEnvSummary, NormalizedPoint, PayloadState, RawRecord};
use tracing::{debug, info};

/// Analyze one batch of already-authorized, already-time-filtered records.
///
/// # Arguments
/// * `records` - Ordered raw journal rows for the selected window
/// * `mode` - Aggregation window; `Today` renders snapshot clusters,
///   the multi-day windows render merged per-location clusters
///
/// # Example
/// ```ignore
/// let summary = analyze_records(&records, AnalysisMode::SevenDays);
/// ```
pub fn analyze_records(records: &[RawRecord], mode: AnalysisMode) -> MoodEnvSummary {
    let assembler = SummaryAssembler::new();
    run(&assembler, records, mode)
}

/// Decode a JSON array of records, analyze it, and encode the summary.
/// Convenience surface for the CLI and non-Rust embedders.
pub fn analyze_records_json(raw_json: &str, mode: AnalysisMode) -> Result<String, EngineError> {
    let records: Vec<RawRecord> = serde_json::from_str(raw_json)?;
    let summary = analyze_records(&records, mode);
    serde_json::to_string_pretty(&summary).map_err(|e| EngineError::EncodingError(e.to_string()))
}

fn run(assembler: &SummaryAssembler, records: &[RawRecord], mode: AnalysisMode) -> MoodEnvSummary {
    debug!(
        mode = mode.as_str(),
        records = records.len(),
        "analysis started"
    );

    // Stage 1: normalize every row; parse failures degrade, never abort
    let points: Vec<NormalizedPoint> = records.iter().map(Normalizer::normalize).collect();

    let malformed = points
        .iter()
        .filter(|p| matches!(p.weather, PayloadState::Malformed))
        .count();
    if malformed > 0 {
        debug!(
            malformed,
            "records with undecodable weather payloads kept in totals only"
        );
    }

    // Stage 2: correlation branch over the environmental dataset
    let env_samples: Vec<EnvSample> = points
        .iter()
        .filter_map(|p| match (&p.weather, p.mood) {
            (PayloadState::Parsed(weather), Some(mood)) => Some(EnvSample {
                mood,
                season: p.season,
                weather,
            }),
            _ => None,
        })
        .collect();
    let correlation = CorrelationAnalyzer::analyze(&env_samples);

    // Stage 3: spatial branch
    let clusters = SpatialClusterer::cluster(&points, mode.cluster_mode());

    // Stage 4: assemble
    let summary = assembler.assemble(mode, &points, correlation, clusters);

    info!(
        total = summary.total_records,
        environmental = summary.environmental_records,
        clusters = summary.clusters.len(),
        correlated = summary.correlation.is_some(),
        "analysis finished"
    );

    summary
}

/// Reusable processor with a stable producer instance ID across calls.
///
/// The analysis itself is stateless per invocation; only the provenance
/// block is shared.
pub struct EngineProcessor {
    assembler: SummaryAssembler,
}

impl Default for EngineProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineProcessor {
    pub fn new() -> Self {
        Self {
            assembler: SummaryAssembler::new(),
        }
    }

    pub fn with_instance_id(instance_id: String) -> Self {
        Self {
            assembler: SummaryAssembler::with_instance_id(instance_id),
        }
    }

    pub fn analyze(&self, records: &[RawRecord], mode: AnalysisMode) -> MoodEnvSummary {
        run(&self.assembler, records, mode)
    }
}
