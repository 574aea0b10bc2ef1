//! Core types for the Moodatlas engine pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! engine: raw journal records, normalized points, correlation results,
//! spatial clusters, and the assembled summary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregation window selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisMode {
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "30days")]
    ThirtyDays,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Today => "today",
            AnalysisMode::SevenDays => "7days",
            AnalysisMode::ThirtyDays => "30days",
        }
    }

    /// Clustering strategy implied by the window: today renders every record
    /// individually, multi-day windows merge records per location.
    pub fn cluster_mode(&self) -> ClusterMode {
        match self {
            AnalysisMode::Today => ClusterMode::Snapshot,
            AnalysisMode::SevenDays | AnalysisMode::ThirtyDays => ClusterMode::Windowed,
        }
    }
}

/// Spatial clustering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    /// One singleton cluster per record
    Snapshot,
    /// Records merged under a per-location clustering key
    Windowed,
}

/// A raw journal row as handed over by the querying collaborator.
///
/// Payload fields are opaque: they may arrive as pre-parsed JSON objects or
/// as JSON-encoded strings, and either may be malformed. The normalizer is
/// the only module that looks inside them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// Entry identifier (opaque, carried for provenance)
    pub id: String,
    /// Entry creation time (UTC)
    pub timestamp: DateTime<Utc>,
    /// Mood valence in [-1, 1], computed upstream
    #[serde(default)]
    pub mood_score: Option<f64>,
    /// Detected-emotion payload (object or JSON string)
    #[serde(default)]
    pub emotion_payload: Option<serde_json::Value>,
    /// Weather + air-quality payload (object or JSON string)
    #[serde(default)]
    pub weather_payload: Option<serde_json::Value>,
    /// Entry latitude, independent of the weather payload's own location
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Entry longitude
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Human-readable place name carried by weather-origin records
    #[serde(default)]
    pub location_name: Option<String>,
}

/// Outcome of decoding one opaque payload field.
///
/// Downstream stages pattern-match on this instead of re-probing the raw
/// JSON; `Malformed` and `Absent` both exclude the record from environmental
/// aggregates but never from headline totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "value")]
pub enum PayloadState<T> {
    Parsed(T),
    Absent,
    Malformed,
}

impl<T> PayloadState<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, PayloadState::Parsed(_))
    }

    pub fn as_parsed(&self) -> Option<&T> {
        match self {
            PayloadState::Parsed(v) => Some(v),
            _ => None,
        }
    }
}

/// Canonical weather + air-quality fields extracted from a weather payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Air temperature (celsius)
    pub temperature_c: Option<f64>,
    /// Condition label, e.g. "Partly cloudy"
    pub condition: Option<String>,
    /// Relative humidity (percent)
    pub humidity: Option<f64>,
    /// PM2.5 concentration (µg/m³)
    pub pm2_5: Option<f64>,
    /// PM10 concentration (µg/m³)
    pub pm10: Option<f64>,
    /// Carbon monoxide (µg/m³)
    pub co: Option<f64>,
    /// Nitrogen dioxide (µg/m³)
    pub no2: Option<f64>,
    /// Ozone (µg/m³)
    pub o3: Option<f64>,
    /// Sulphur dioxide (µg/m³)
    pub so2: Option<f64>,
    /// US EPA air-quality index (1-6)
    pub epa_index: Option<u8>,
    /// UK DEFRA air-quality index (1-10)
    pub defra_index: Option<u8>,
}

/// Dominant detected emotion plus the full confidence map it was picked from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionReading {
    pub dominant: String,
    pub confidences: HashMap<String, f64>,
}

/// Meteorological season derived from the entry month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Fixed iteration order used by seasonal breakdowns
    pub const ALL: [Season; 4] = [
        Season::Spring,
        Season::Summer,
        Season::Autumn,
        Season::Winter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }
}

/// Canonical per-record point produced by the normalizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    /// Originating record id
    pub source_id: String,
    /// Calendar day of the entry (UTC)
    pub date: NaiveDate,
    /// Season bucket of the entry
    pub season: Season,
    /// Mood valence in [-1, 1], absent when the record carried none
    pub mood: Option<f64>,
    /// Decoded weather payload
    pub weather: PayloadState<WeatherSnapshot>,
    /// Decoded emotion payload, absent when missing or malformed
    pub emotion: Option<EmotionReading>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_name: Option<String>,
}

impl NormalizedPoint {
    /// Whether the point qualifies for the environmental dataset: it must
    /// carry both a mood score and a parsed weather payload. Points failing
    /// this still count toward headline totals.
    pub fn is_environmental(&self) -> bool {
        self.mood.is_some() && self.weather.is_parsed()
    }
}

/// US EPA index label (1-6)
pub fn epa_label(index: u8) -> &'static str {
    match index {
        1 => "Good",
        2 => "Moderate",
        3 => "Unhealthy for Sensitive Groups",
        4 => "Unhealthy",
        5 => "Very Unhealthy",
        6 => "Hazardous",
        _ => "Unknown",
    }
}

/// UK DEFRA index label (1-10, bucketed into four bands)
pub fn defra_label(index: u8) -> &'static str {
    match index {
        1..=3 => "Low",
        4..=6 => "Moderate",
        7..=9 => "High",
        10 => "Very High",
        _ => "Unknown",
    }
}

/// Mood bucket vocabulary shared by the summary and the map collaborator:
/// positive above 0.2, negative below -0.2, neutral between.
pub fn mood_category(mood: f64) -> &'static str {
    if mood > 0.2 {
        "positive"
    } else if mood < -0.2 {
        "negative"
    } else {
        "neutral"
    }
}

/// Two-sided threshold comparison over one pollutant scope.
///
/// `low` is the cleaner side (low PM2.5, good EPA index), `high` the more
/// polluted one. `impact` is `low_mean - high_mean`: positive when mood is
/// better under cleaner air.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupComparison {
    /// Mean mood of the cleaner group (3 decimals)
    pub low_mean: f64,
    /// Mean mood of the polluted group (3 decimals)
    pub high_mean: f64,
    /// low_mean - high_mean (3 decimals)
    pub impact: f64,
    pub low_count: usize,
    pub high_count: usize,
    /// Share of the pollutant-present subset that falls in the high group
    /// (1 decimal, percent)
    pub high_percentage: f64,
}

/// Mood statistics for one EPA category bucket {1, 2, 3, >=4}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiCategoryStat {
    /// Bucket label: "good", "moderate", "sensitive", "unhealthy"
    pub category: String,
    pub mean_mood: f64,
    pub count: usize,
    /// Share of the EPA-present subset (1 decimal, percent)
    pub percentage: f64,
}

/// Per-season environmental mood statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonStat {
    pub season: Season,
    pub mean_mood: f64,
    pub count: usize,
    /// Mean PM2.5 over the season's PM2.5-present members, absent when none
    pub mean_pm2_5: Option<f64>,
    /// Mean EPA index over the season's EPA-present members, absent when none
    pub mean_epa_index: Option<f64>,
}

/// Correlation analyzer output. Every optional field is absent (never
/// zeroed) when its sample-size rule is unmet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Number of qualifying environmental points the report was computed over
    pub environmental_count: usize,
    /// PM2.5 high/low comparison (high > 35, low <= 15)
    pub pm2_5: Option<GroupComparison>,
    /// EPA index good/bad comparison (good <= 2, bad >= 4)
    pub epa: Option<GroupComparison>,
    /// Breakdown over EPA categories {1, 2, 3, >=4}
    pub aqi_breakdown: Option<Vec<AqiCategoryStat>>,
    /// Seasons with at least one environmental member, spring first
    pub seasonal: Vec<SeasonStat>,
}

/// WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// One emotion label with its member count, in first-occurrence order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionCount {
    pub label: String,
    pub count: usize,
}

/// Per-channel pollutant means over the cluster members that define each
/// channel; a member lacking a channel contributes nothing to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantMeans {
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
}

/// A group of records aggregated under one clustering key for map display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialCluster {
    /// Clustering key: a place name or a "lat,lon" cell rounded to 3 decimals
    pub key: String,
    /// Mean of the raw member coordinates; absent for name-keyed clusters
    /// whose members carried no coordinates
    pub centroid: Option<GeoPoint>,
    /// Carried place name for weather-origin clusters
    pub location_name: Option<String>,
    pub count: usize,
    /// Mean mood over mood-bearing members
    pub mean_mood: Option<f64>,
    /// Map color vocabulary derived from mean_mood
    pub mood_category: Option<String>,
    /// Majority-vote emotion; ties break to the first label seen
    pub dominant_emotion: Option<String>,
    pub emotion_histogram: Vec<EmotionCount>,
    pub pollutants: PollutantMeans,
    pub mean_epa_index: Option<f64>,
    /// Rendering intensity, monotonic in count, capped at 1.0
    pub intensity: f64,
    /// Rendering radius in meters, monotonic in count, capped
    pub radius_m: f64,
}

/// Counts of mood-bearing records per valence bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodBuckets {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

/// One point of the capped mood time-series handed to chart collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSample {
    pub date: NaiveDate,
    pub mood: f64,
}

/// Engine provenance block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Assembled engine output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEnvSummary {
    pub mode: AnalysisMode,
    pub producer: SummaryProducer,
    /// Assembly time (RFC 3339); provenance only, not part of the analysis
    pub computed_at: String,
    pub total_records: usize,
    pub environmental_records: usize,
    pub mood_buckets: MoodBuckets,
    pub distinct_days: usize,
    /// Absent when fewer than 3 qualifying environmental points exist
    pub correlation: Option<CorrelationReport>,
    pub clusters: Vec<SpatialCluster>,
    /// Most recent mood samples, capped to a fixed preview size
    pub mood_series: Vec<MoodSample>,
}
