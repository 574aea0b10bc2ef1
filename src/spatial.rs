//! Spatial clustering
//!
//! Groups normalized points under a clustering key for map display.
//!
//! Snapshot mode renders every point as its own singleton cluster. Windowed
//! mode merges points per location: journal-origin points (explicit
//! coordinates) are keyed by latitude/longitude each rounded to 3 decimal
//! places (~111 m cells); weather-origin points (no coordinates, a carried
//! place name) are keyed by that name. The asymmetry is load-bearing: the
//! map collaborator pairs name-keyed and cell-keyed clusters differently.
//!
//! Accumulators are kept in insertion order so the dominant-emotion majority
//! vote has a deterministic first-occurrence tie-break.

use crate::correlation::round3;
use crate::types::{
    mood_category, ClusterMode, EmotionCount, GeoPoint, NormalizedPoint, PollutantMeans,
    SpatialCluster,
};
use std::collections::HashMap;

/// Cap on the rendered cluster radius (meters)
const MAX_RADIUS_M: f64 = 500.0;
/// Radius of a singleton cluster (meters)
const BASE_RADIUS_M: f64 = 120.0;

/// Spatial clusterer over normalized points
pub struct SpatialClusterer;

impl SpatialClusterer {
    /// Cluster the clusterable points (those carrying coordinates or a place
    /// name) under the given mode. Points with neither are skipped; the
    /// resulting clusters partition the clusterable points.
    pub fn cluster(points: &[NormalizedPoint], mode: ClusterMode) -> Vec<SpatialCluster> {
        let mut accumulators: Vec<ClusterAccumulator> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (position, point) in points.iter().enumerate() {
            let key = match cluster_key(point, mode, position) {
                Some(key) => key,
                None => continue,
            };

            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    index.insert(key.clone(), accumulators.len());
                    accumulators.push(ClusterAccumulator::new(key));
                    accumulators.len() - 1
                }
            };
            accumulators[slot].add(point);
        }

        accumulators
            .into_iter()
            .map(ClusterAccumulator::finish)
            .collect()
    }
}

/// Clustering key for one point, or `None` when the point carries neither
/// coordinates nor a place name.
fn cluster_key(point: &NormalizedPoint, mode: ClusterMode, position: usize) -> Option<String> {
    let base = match (point.latitude, point.longitude) {
        (Some(lat), Some(lon)) => format!("{lat:.3},{lon:.3}"),
        _ => point.location_name.clone()?,
    };
    match mode {
        // Suffixing the input position keeps every snapshot cluster singleton
        ClusterMode::Snapshot => Some(format!("{base}#{position}")),
        ClusterMode::Windowed => Some(base),
    }
}

/// Running sum over the members that define one numeric channel
#[derive(Debug, Default)]
struct ChannelSum {
    sum: f64,
    count: usize,
}

impl ChannelSum {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| round3(self.sum / self.count as f64))
    }
}

#[derive(Debug)]
struct ClusterAccumulator {
    key: String,
    location_name: Option<String>,
    count: usize,
    lat_sum: f64,
    lon_sum: f64,
    coord_count: usize,
    mood: ChannelSum,
    epa: ChannelSum,
    pm2_5: ChannelSum,
    pm10: ChannelSum,
    co: ChannelSum,
    no2: ChannelSum,
    o3: ChannelSum,
    so2: ChannelSum,
    /// Insertion-ordered histogram; first occurrence decides ties
    emotions: Vec<(String, usize)>,
}

impl ClusterAccumulator {
    fn new(key: String) -> Self {
        Self {
            key,
            location_name: None,
            count: 0,
            lat_sum: 0.0,
            lon_sum: 0.0,
            coord_count: 0,
            mood: ChannelSum::default(),
            epa: ChannelSum::default(),
            pm2_5: ChannelSum::default(),
            pm10: ChannelSum::default(),
            co: ChannelSum::default(),
            no2: ChannelSum::default(),
            o3: ChannelSum::default(),
            so2: ChannelSum::default(),
            emotions: Vec::new(),
        }
    }

    fn add(&mut self, point: &NormalizedPoint) {
        self.count += 1;

        if self.location_name.is_none() {
            self.location_name = point.location_name.clone();
        }

        // Centroids average the raw coordinates, never the rounded key
        if let (Some(lat), Some(lon)) = (point.latitude, point.longitude) {
            self.lat_sum += lat;
            self.lon_sum += lon;
            self.coord_count += 1;
        }

        self.mood.add(point.mood);

        if let Some(weather) = point.weather.as_parsed() {
            self.epa.add(weather.epa_index.map(f64::from));
            self.pm2_5.add(weather.pm2_5);
            self.pm10.add(weather.pm10);
            self.co.add(weather.co);
            self.no2.add(weather.no2);
            self.o3.add(weather.o3);
            self.so2.add(weather.so2);
        }

        if let Some(emotion) = &point.emotion {
            match self.emotions.iter_mut().find(|(label, _)| label == &emotion.dominant) {
                Some((_, count)) => *count += 1,
                None => self.emotions.push((emotion.dominant.clone(), 1)),
            }
        }
    }

    fn finish(self) -> SpatialCluster {
        let centroid = (self.coord_count > 0).then(|| GeoPoint {
            latitude: self.lat_sum / self.coord_count as f64,
            longitude: self.lon_sum / self.coord_count as f64,
        });

        // Strictly-greater comparison keeps the first label seen on ties
        let dominant_emotion = self
            .emotions
            .iter()
            .fold(None::<(&str, usize)>, |best, (label, count)| match best {
                Some((_, best_count)) if *count <= best_count => best,
                _ => Some((label.as_str(), *count)),
            })
            .map(|(label, _)| label.to_string());

        let mean_mood = self.mood.mean();

        SpatialCluster {
            key: self.key,
            centroid,
            location_name: self.location_name,
            count: self.count,
            mean_mood,
            mood_category: mean_mood.map(|m| mood_category(m).to_string()),
            dominant_emotion,
            emotion_histogram: self
                .emotions
                .into_iter()
                .map(|(label, count)| EmotionCount { label, count })
                .collect(),
            pollutants: PollutantMeans {
                pm2_5: self.pm2_5.mean(),
                pm10: self.pm10.mean(),
                co: self.co.mean(),
                no2: self.no2.mean(),
                o3: self.o3.mean(),
                so2: self.so2.mean(),
            },
            mean_epa_index: self.epa.mean(),
            intensity: intensity_for(self.count),
            radius_m: radius_for(self.count),
        }
    }
}

/// Rendering intensity: monotonic in member count, capped at 1.0
fn intensity_for(count: usize) -> f64 {
    (0.3 + 0.1 * count as f64).min(1.0)
}

/// Rendering radius: monotonic in member count, capped at [`MAX_RADIUS_M`]
fn radius_for(count: usize) -> f64 {
    (BASE_RADIUS_M * (count as f64).sqrt()).min(MAX_RADIUS_M)
}
