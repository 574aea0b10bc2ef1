//! End-to-end tests driving the engine through its public surface with
//! realistic journal rows.

use moodatlas_engine::types::{AnalysisMode, RawRecord};
use moodatlas_engine::{analyze_records, EngineProcessor};
use serde_json::json;

fn record(
    id: &str,
    timestamp: &str,
    mood: Option<f64>,
    pm2_5: Option<f64>,
    epa: Option<i64>,
) -> RawRecord {
    let weather = pm2_5.map(|pm| {
        let mut aq = json!({ "pm2_5": pm });
        if let Some(epa) = epa {
            aq["us-epa-index"] = json!(epa);
        }
        json!({ "current": { "temp_c": 15.0, "air_quality": aq } })
    });

    serde_json::from_value(json!({
        "id": id,
        "timestamp": timestamp,
        "moodScore": mood,
        "weatherPayload": weather,
        "latitude": 37.56,
        "longitude": 126.97,
    }))
    .unwrap()
}

#[test]
fn mood_bucket_counts_sum_to_mood_bearing_records() {
    let records = vec![
        record("a", "2024-04-01T08:00:00Z", Some(0.9), None, None),
        record("b", "2024-04-02T08:00:00Z", Some(0.15), None, None),
        record("c", "2024-04-03T08:00:00Z", Some(-0.9), None, None),
        record("d", "2024-04-04T08:00:00Z", None, None, None),
        record("e", "2024-04-05T08:00:00Z", Some(-0.2), None, None),
    ];
    let summary = analyze_records(&records, AnalysisMode::ThirtyDays);

    let buckets = summary.mood_buckets;
    assert_eq!(buckets.positive + buckets.neutral + buckets.negative, 4);
    assert_eq!(buckets.positive, 1);
    assert_eq!(buckets.neutral, 2);
    assert_eq!(buckets.negative, 1);
    assert_eq!(summary.total_records, 5);
    assert_eq!(summary.distinct_days, 5);
}

#[test]
fn pm25_impact_is_low_minus_high_and_gated() {
    // The worked example: A(10, 0.8), B(40, -0.2), C(12, 0.5)
    let records = vec![
        record("a", "2024-04-01T08:00:00Z", Some(0.8), Some(10.0), None),
        record("b", "2024-04-02T08:00:00Z", Some(-0.2), Some(40.0), None),
        record("c", "2024-04-03T08:00:00Z", Some(0.5), Some(12.0), None),
    ];
    let summary = analyze_records(&records, AnalysisMode::SevenDays);
    let pm = summary.correlation.unwrap().pm2_5.unwrap();

    assert_eq!(pm.low_mean, 0.650);
    assert_eq!(pm.high_mean, -0.200);
    assert_eq!(pm.impact, 0.850);
    assert_eq!(pm.high_percentage, 33.3);
    assert_eq!(pm.impact, pm.low_mean - pm.high_mean);

    // Dropping one point underflows the >2-member gate for the whole report
    let summary = analyze_records(&records[..2], AnalysisMode::SevenDays);
    assert!(summary.correlation.is_none());
}

#[test]
fn pm25_comparison_absent_when_a_group_is_empty() {
    let records = vec![
        record("a", "2024-04-01T08:00:00Z", Some(0.8), Some(10.0), None),
        record("b", "2024-04-02T08:00:00Z", Some(0.2), Some(11.0), None),
        record("c", "2024-04-03T08:00:00Z", Some(0.5), Some(12.0), None),
    ];
    let report = analyze_records(&records, AnalysisMode::SevenDays)
        .correlation
        .unwrap();
    assert!(report.pm2_5.is_none());
}

#[test]
fn seasonal_buckets_follow_month_quarters() {
    let records = vec![
        record("spring", "2024-03-01T08:00:00Z", Some(0.5), Some(10.0), Some(1)),
        record("leap", "2024-02-29T08:00:00Z", Some(0.1), Some(20.0), Some(2)),
        record("xmas", "2024-12-25T08:00:00Z", Some(-0.1), Some(30.0), Some(3)),
        record("april", "2024-04-15T08:00:00Z", Some(0.7), Some(12.0), Some(1)),
    ];
    let report = analyze_records(&records, AnalysisMode::ThirtyDays)
        .correlation
        .unwrap();

    // spring (2024-03-01, 2024-04-15) then winter (2024-02-29, 2024-12-25)
    assert_eq!(report.seasonal.len(), 2);
    assert_eq!(report.seasonal[0].season.as_str(), "spring");
    assert_eq!(report.seasonal[0].count, 2);
    assert_eq!(report.seasonal[0].mean_mood, 0.6);
    assert_eq!(report.seasonal[1].season.as_str(), "winter");
    assert_eq!(report.seasonal[1].count, 2);
    assert_eq!(report.seasonal[1].mean_pm2_5, Some(25.0));
}

#[test]
fn windowed_clusters_merge_rounding_cells_with_raw_centroid() {
    let mut a = record("a", "2024-04-01T08:00:00Z", Some(0.5), None, None);
    a.latitude = Some(1.00011);
    a.longitude = Some(2.00012);
    let mut b = record("b", "2024-04-02T08:00:00Z", Some(0.7), None, None);
    b.latitude = Some(1.00044);
    b.longitude = Some(2.00021);

    let summary = analyze_records(&[a, b], AnalysisMode::SevenDays);
    assert_eq!(summary.clusters.len(), 1);
    let cluster = &summary.clusters[0];
    assert_eq!(cluster.key, "1.000,2.000");
    assert_eq!(cluster.count, 2);
    let centroid = cluster.centroid.unwrap();
    assert!((centroid.latitude - 1.000275).abs() < 1e-9);
    assert!((centroid.longitude - 2.000165).abs() < 1e-9);
}

#[test]
fn unparsable_weather_payload_is_isolated() {
    let mut poisoned = record("bad", "2024-04-01T08:00:00Z", Some(0.4), None, None);
    poisoned.weather_payload = Some(json!("][ not json"));
    let records = vec![
        poisoned,
        record("a", "2024-04-02T08:00:00Z", Some(0.8), Some(10.0), None),
        record("b", "2024-04-03T08:00:00Z", Some(-0.2), Some(40.0), None),
        record("c", "2024-04-04T08:00:00Z", Some(0.5), Some(12.0), None),
    ];

    let summary = analyze_records(&records, AnalysisMode::SevenDays);
    assert_eq!(summary.total_records, 4);
    assert_eq!(summary.environmental_records, 3);
    // The remaining three still produce the worked-example comparison
    let pm = summary.correlation.unwrap().pm2_5.unwrap();
    assert_eq!(pm.impact, 0.850);
}

#[test]
fn rerunning_the_engine_is_idempotent() {
    let records = vec![
        record("a", "2024-04-01T08:00:00Z", Some(0.8), Some(10.0), Some(1)),
        record("b", "2024-04-02T08:00:00Z", Some(-0.2), Some(40.0), Some(5)),
        record("c", "2024-04-03T08:00:00Z", Some(0.5), Some(12.0), Some(2)),
    ];
    let processor = EngineProcessor::with_instance_id("itest".to_string());
    let mut first = processor.analyze(&records, AnalysisMode::ThirtyDays);
    let mut second = processor.analyze(&records, AnalysisMode::ThirtyDays);
    first.computed_at = String::new();
    second.computed_at = String::new();
    assert_eq!(first, second);
}

#[test]
fn cluster_counts_never_exceed_input_count() {
    let records = vec![
        record("a", "2024-04-01T08:00:00Z", Some(0.8), Some(10.0), Some(1)),
        record("b", "2024-04-01T09:00:00Z", Some(0.2), Some(12.0), Some(1)),
        record("c", "2024-04-02T08:00:00Z", Some(-0.5), Some(50.0), Some(5)),
    ];
    let summary = analyze_records(&records, AnalysisMode::SevenDays);
    let clustered: usize = summary.clusters.iter().map(|c| c.count).sum();
    assert!(clustered <= summary.total_records);
    for cluster in &summary.clusters {
        assert!(cluster.count <= summary.total_records);
    }
}
