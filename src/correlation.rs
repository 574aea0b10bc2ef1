//! Correlation analysis
//!
//! Computes threshold-based mood comparisons over the environmental dataset:
//! - PM2.5 high/low group comparison
//! - EPA index good/bad group comparison
//! - AQI category breakdown
//! - Seasonal breakdown
//!
//! Every output is gated on sample size; an unmet gate yields an absent
//! field, never a zeroed one.

use crate::types::{
    AqiCategoryStat, CorrelationReport, GroupComparison, Season, SeasonStat, WeatherSnapshot,
};

/// PM2.5 threshold above which a point joins the high-exposure group (µg/m³)
pub const PM25_HIGH_THRESHOLD: f64 = 35.0;
/// PM2.5 threshold at or below which a point joins the low-exposure group
pub const PM25_LOW_THRESHOLD: f64 = 15.0;
/// EPA index at or below which air counts as good
pub const EPA_GOOD_MAX: u8 = 2;
/// EPA index at or above which air counts as bad
pub const EPA_BAD_MIN: u8 = 4;
/// Minimum environmental points for any correlation output
pub const MIN_ENVIRONMENTAL_POINTS: usize = 3;

/// One qualifying environmental point: a mood score plus parsed weather
#[derive(Debug, Clone, Copy)]
pub struct EnvSample<'a> {
    pub mood: f64,
    pub season: Season,
    pub weather: &'a WeatherSnapshot,
}

/// Correlation analyzer over the environmental dataset
pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    /// Analyze the environmental dataset. Returns `None` when fewer than
    /// [`MIN_ENVIRONMENTAL_POINTS`] qualifying points exist.
    pub fn analyze(samples: &[EnvSample]) -> Option<CorrelationReport> {
        if samples.len() < MIN_ENVIRONMENTAL_POINTS {
            return None;
        }

        Some(CorrelationReport {
            environmental_count: samples.len(),
            pm2_5: compare_pm2_5(samples),
            epa: compare_epa(samples),
            aqi_breakdown: aqi_breakdown(samples),
            seasonal: seasonal_breakdown(samples),
        })
    }
}

/// Round to 3 decimal places, half away from zero
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Round to 1 decimal place, half away from zero
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// PM2.5 comparison: high group above [`PM25_HIGH_THRESHOLD`], low group at
/// or below [`PM25_LOW_THRESHOLD`]; points strictly between are excluded.
/// Requires the PM2.5-present subset to exceed 2 members and both groups to
/// be non-empty.
fn compare_pm2_5(samples: &[EnvSample]) -> Option<GroupComparison> {
    let present: Vec<(f64, f64)> = samples
        .iter()
        .filter_map(|s| s.weather.pm2_5.map(|pm| (pm, s.mood)))
        .collect();
    if present.len() <= 2 {
        return None;
    }

    let high: Vec<f64> = present
        .iter()
        .filter(|(pm, _)| *pm > PM25_HIGH_THRESHOLD)
        .map(|(_, mood)| *mood)
        .collect();
    let low: Vec<f64> = present
        .iter()
        .filter(|(pm, _)| *pm <= PM25_LOW_THRESHOLD)
        .map(|(_, mood)| *mood)
        .collect();

    build_comparison(&low, &high, present.len())
}

/// EPA comparison: good at or below [`EPA_GOOD_MAX`], bad at or above
/// [`EPA_BAD_MIN`]; index 3 is excluded from the binary comparison. Same
/// gating as the PM2.5 comparison, over the EPA-present subset.
fn compare_epa(samples: &[EnvSample]) -> Option<GroupComparison> {
    let present: Vec<(u8, f64)> = samples
        .iter()
        .filter_map(|s| s.weather.epa_index.map(|idx| (idx, s.mood)))
        .collect();
    if present.len() <= 2 {
        return None;
    }

    let bad: Vec<f64> = present
        .iter()
        .filter(|(idx, _)| *idx >= EPA_BAD_MIN)
        .map(|(_, mood)| *mood)
        .collect();
    let good: Vec<f64> = present
        .iter()
        .filter(|(idx, _)| *idx <= EPA_GOOD_MAX)
        .map(|(_, mood)| *mood)
        .collect();

    build_comparison(&good, &bad, present.len())
}

fn build_comparison(low: &[f64], high: &[f64], subset_len: usize) -> Option<GroupComparison> {
    if low.is_empty() || high.is_empty() {
        return None;
    }

    let low_mean = mean(low);
    let high_mean = mean(high);

    Some(GroupComparison {
        low_mean: round3(low_mean),
        high_mean: round3(high_mean),
        impact: round3(low_mean - high_mean),
        low_count: low.len(),
        high_count: high.len(),
        high_percentage: round1(high.len() as f64 / subset_len as f64 * 100.0),
    })
}

/// Breakdown of the EPA-present subset into categories {1, 2, 3, >=4}.
/// Omitted entirely when fewer than 3 EPA-present points exist; empty
/// categories are skipped.
fn aqi_breakdown(samples: &[EnvSample]) -> Option<Vec<AqiCategoryStat>> {
    let present: Vec<(u8, f64)> = samples
        .iter()
        .filter_map(|s| s.weather.epa_index.map(|idx| (idx, s.mood)))
        .collect();
    if present.len() < 3 {
        return None;
    }

    const CATEGORIES: [&str; 4] = ["good", "moderate", "sensitive", "unhealthy"];
    let mut groups: [Vec<f64>; 4] = Default::default();
    for (idx, mood) in &present {
        // Indices 4-6 share the "unhealthy" bucket
        let slot = (idx.min(&4) - 1) as usize;
        groups[slot].push(*mood);
    }

    let mut stats = Vec::new();
    for (category, moods) in CATEGORIES.iter().zip(groups.iter()) {
        if moods.is_empty() {
            continue;
        }
        stats.push(AqiCategoryStat {
            category: (*category).to_string(),
            mean_mood: round3(mean(moods)),
            count: moods.len(),
            percentage: round1(moods.len() as f64 / present.len() as f64 * 100.0),
        });
    }

    Some(stats)
}

/// Per-season statistics over seasons with at least one environmental
/// member, in fixed spring-first order.
fn seasonal_breakdown(samples: &[EnvSample]) -> Vec<SeasonStat> {
    let mut stats = Vec::new();

    for season in Season::ALL {
        let members: Vec<&EnvSample> = samples.iter().filter(|s| s.season == season).collect();
        if members.is_empty() {
            continue;
        }

        let moods: Vec<f64> = members.iter().map(|s| s.mood).collect();
        let pm_values: Vec<f64> = members.iter().filter_map(|s| s.weather.pm2_5).collect();
        let epa_values: Vec<f64> = members
            .iter()
            .filter_map(|s| s.weather.epa_index.map(f64::from))
            .collect();

        stats.push(SeasonStat {
            season,
            mean_mood: round3(mean(&moods)),
            count: members.len(),
            mean_pm2_5: (!pm_values.is_empty()).then(|| round3(mean(&pm_values))),
            mean_epa_index: (!epa_values.is_empty()).then(|| round3(mean(&epa_values))),
        });
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WeatherSnapshot;
    use pretty_assertions::assert_eq;

    fn snapshot(pm2_5: Option<f64>, epa: Option<u8>) -> WeatherSnapshot {
        WeatherSnapshot {
            pm2_5,
            epa_index: epa,
            ..Default::default()
        }
    }

    fn sample<'a>(mood: f64, season: Season, weather: &'a WeatherSnapshot) -> EnvSample<'a> {
        EnvSample {
            mood,
            season,
            weather,
        }
    }

    #[test]
    fn test_pm25_worked_example() {
        // A(pm2_5=10, mood=0.8), B(pm2_5=40, mood=-0.2), C(pm2_5=12, mood=0.5)
        let a = snapshot(Some(10.0), None);
        let b = snapshot(Some(40.0), None);
        let c = snapshot(Some(12.0), None);
        let samples = vec![
            sample(0.8, Season::Spring, &a),
            sample(-0.2, Season::Spring, &b),
            sample(0.5, Season::Spring, &c),
        ];

        let report = CorrelationAnalyzer::analyze(&samples).unwrap();
        let pm = report.pm2_5.unwrap();
        assert_eq!(pm.low_mean, 0.65);
        assert_eq!(pm.high_mean, -0.2);
        assert_eq!(pm.impact, 0.85);
        assert_eq!(pm.low_count, 2);
        assert_eq!(pm.high_count, 1);
        assert_eq!(pm.high_percentage, 33.3);
    }

    #[test]
    fn test_fewer_than_three_environmental_points_yields_none() {
        let a = snapshot(Some(10.0), Some(1));
        let b = snapshot(Some(40.0), Some(5));
        let samples = vec![
            sample(0.8, Season::Spring, &a),
            sample(-0.2, Season::Winter, &b),
        ];
        assert!(CorrelationAnalyzer::analyze(&samples).is_none());
    }

    #[test]
    fn test_pm25_absent_when_one_group_empty() {
        // All three points land in the low group; no high group, no result.
        let a = snapshot(Some(10.0), None);
        let b = snapshot(Some(12.0), None);
        let c = snapshot(Some(14.0), None);
        let samples = vec![
            sample(0.1, Season::Summer, &a),
            sample(0.2, Season::Summer, &b),
            sample(0.3, Season::Summer, &c),
        ];
        let report = CorrelationAnalyzer::analyze(&samples).unwrap();
        assert_eq!(report.pm2_5, None);
    }

    #[test]
    fn test_pm25_midband_points_are_excluded() {
        // 20 and 30 fall strictly between the thresholds and join no group,
        // but they still count toward the present subset used for gating and
        // percentages.
        let a = snapshot(Some(10.0), None);
        let b = snapshot(Some(20.0), None);
        let c = snapshot(Some(30.0), None);
        let d = snapshot(Some(40.0), None);
        let samples = vec![
            sample(0.6, Season::Autumn, &a),
            sample(0.0, Season::Autumn, &b),
            sample(0.0, Season::Autumn, &c),
            sample(-0.4, Season::Autumn, &d),
        ];

        let pm = CorrelationAnalyzer::analyze(&samples)
            .unwrap()
            .pm2_5
            .unwrap();
        assert_eq!(pm.low_count, 1);
        assert_eq!(pm.high_count, 1);
        assert_eq!(pm.high_percentage, 25.0);
        assert_eq!(pm.impact, 1.0);
    }

    #[test]
    fn test_epa_comparison_excludes_index_three() {
        let a = snapshot(None, Some(1));
        let b = snapshot(None, Some(2));
        let c = snapshot(None, Some(3));
        let d = snapshot(None, Some(5));
        let samples = vec![
            sample(0.5, Season::Spring, &a),
            sample(0.3, Season::Spring, &b),
            sample(0.0, Season::Spring, &c),
            sample(-0.3, Season::Spring, &d),
        ];

        let epa = CorrelationAnalyzer::analyze(&samples).unwrap().epa.unwrap();
        assert_eq!(epa.low_count, 2);
        assert_eq!(epa.high_count, 1);
        assert_eq!(epa.low_mean, 0.4);
        assert_eq!(epa.high_mean, -0.3);
        assert_eq!(epa.impact, 0.7);
        assert_eq!(epa.high_percentage, 25.0);
    }

    #[test]
    fn test_aqi_breakdown_partitions_epa_subset() {
        let a = snapshot(None, Some(1));
        let b = snapshot(None, Some(1));
        let c = snapshot(None, Some(3));
        let d = snapshot(None, Some(6));
        let samples = vec![
            sample(0.8, Season::Spring, &a),
            sample(0.6, Season::Spring, &b),
            sample(0.1, Season::Spring, &c),
            sample(-0.5, Season::Spring, &d),
        ];

        let breakdown = CorrelationAnalyzer::analyze(&samples)
            .unwrap()
            .aqi_breakdown
            .unwrap();
        assert_eq!(breakdown.len(), 3); // "moderate" (index 2) is empty
        assert_eq!(breakdown[0].category, "good");
        assert_eq!(breakdown[0].count, 2);
        assert_eq!(breakdown[0].mean_mood, 0.7);
        assert_eq!(breakdown[0].percentage, 50.0);
        assert_eq!(breakdown[1].category, "sensitive");
        assert_eq!(breakdown[2].category, "unhealthy");
        assert_eq!(breakdown[2].mean_mood, -0.5);

        let total: usize = breakdown.iter().map(|s| s.count).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_aqi_breakdown_absent_under_three_epa_points() {
        let a = snapshot(Some(10.0), Some(1));
        let b = snapshot(Some(40.0), Some(5));
        let c = snapshot(Some(12.0), None);
        let samples = vec![
            sample(0.8, Season::Spring, &a),
            sample(-0.2, Season::Spring, &b),
            sample(0.5, Season::Spring, &c),
        ];
        let report = CorrelationAnalyzer::analyze(&samples).unwrap();
        assert_eq!(report.aqi_breakdown, None);
        // EPA comparison also gated out: only 2 EPA-present points
        assert_eq!(report.epa, None);
    }

    #[test]
    fn test_seasonal_breakdown_order_and_channel_means() {
        let winter_a = snapshot(Some(30.0), Some(2));
        let winter_b = snapshot(None, None);
        let spring = snapshot(Some(10.0), Some(1));
        let samples = vec![
            sample(-0.1, Season::Winter, &winter_a),
            sample(-0.3, Season::Winter, &winter_b),
            sample(0.7, Season::Spring, &spring),
        ];

        let seasonal = CorrelationAnalyzer::analyze(&samples).unwrap().seasonal;
        assert_eq!(seasonal.len(), 2);
        assert_eq!(seasonal[0].season, Season::Spring);
        assert_eq!(seasonal[1].season, Season::Winter);

        let winter = &seasonal[1];
        assert_eq!(winter.count, 2);
        assert_eq!(winter.mean_mood, -0.2);
        // Channel means only over members that define the channel
        assert_eq!(winter.mean_pm2_5, Some(30.0));
        assert_eq!(winter.mean_epa_index, Some(2.0));
    }

    #[test]
    fn test_rounding_is_three_and_one_decimal() {
        assert_eq!(round3(0.6504), 0.65);
        assert_eq!(round3(0.8516), 0.852);
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.666), 66.7);
    }
}
