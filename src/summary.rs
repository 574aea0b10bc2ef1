//! Summary assembly
//!
//! Merges the correlation report, the spatial clusters, and the headline
//! totals into the final response shape. This stage only counts, buckets,
//! and truncates; all statistics come in precomputed.

use crate::types::{
    AnalysisMode, CorrelationReport, MoodBuckets, MoodEnvSummary, MoodSample, NormalizedPoint,
    SpatialCluster, SummaryProducer,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Cap on the mood series handed to the prompt-building collaborator
pub const MOOD_SERIES_PREVIEW: usize = 20;

/// Assembler for the final engine output
pub struct SummaryAssembler {
    instance_id: String,
}

impl Default for SummaryAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryAssembler {
    /// Create an assembler with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an assembler with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Assemble the summary from the analysis branches and the normalized
    /// points the headline totals are counted over.
    pub fn assemble(
        &self,
        mode: AnalysisMode,
        points: &[NormalizedPoint],
        correlation: Option<CorrelationReport>,
        clusters: Vec<SpatialCluster>,
    ) -> MoodEnvSummary {
        let mut buckets = MoodBuckets::default();
        let mut days = BTreeSet::new();
        let mut series = Vec::new();

        for point in points {
            days.insert(point.date);
            if let Some(mood) = point.mood {
                match crate::types::mood_category(mood) {
                    "positive" => buckets.positive += 1,
                    "negative" => buckets.negative += 1,
                    _ => buckets.neutral += 1,
                }
                series.push(MoodSample {
                    date: point.date,
                    mood,
                });
            }
        }

        // Trailing window of the caller's (time-ordered) input
        if series.len() > MOOD_SERIES_PREVIEW {
            series.drain(..series.len() - MOOD_SERIES_PREVIEW);
        }

        MoodEnvSummary {
            mode,
            producer: SummaryProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at: Utc::now().to_rfc3339(),
            total_records: points.len(),
            environmental_records: points.iter().filter(|p| p.is_environmental()).count(),
            mood_buckets: buckets,
            distinct_days: days.len(),
            correlation,
            clusters,
            mood_series: series,
        }
    }
}
