//! Record normalization
//!
//! Converts raw heterogeneous journal rows into canonical points. Payloads
//! arrive as pre-parsed objects or JSON-encoded strings; decoding never fails
//! the batch. A record whose payload cannot be decoded is marked
//! `Malformed` and thereby excluded from environmental aggregates while
//! still counting toward headline totals.

use crate::temporal;
use crate::types::{EmotionReading, NormalizedPoint, PayloadState, RawRecord, WeatherSnapshot};
use serde_json::Value;
use std::collections::HashMap;

/// Normalizer for converting raw records to canonical points
pub struct Normalizer;

impl Normalizer {
    /// Normalize one raw record. Never fails: parse problems degrade to
    /// `Malformed`/absent fields.
    pub fn normalize(record: &RawRecord) -> NormalizedPoint {
        let date = temporal::day_key(record.timestamp);
        let season = temporal::season_for_date(date);

        NormalizedPoint {
            source_id: record.id.clone(),
            date,
            season,
            mood: record.mood_score.map(|m| m.clamp(-1.0, 1.0)),
            weather: decode_weather(record.weather_payload.as_ref()),
            emotion: decode_emotion(record.emotion_payload.as_ref()),
            latitude: record.latitude,
            longitude: record.longitude,
            location_name: record.location_name.clone(),
        }
    }
}

/// Materialize a payload value as a JSON object, decoding string-encoded
/// payloads on the way. `None` means the payload is structurally unusable.
fn payload_object(value: &Value) -> Option<serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        },
        _ => None,
    }
}

fn decode_weather(payload: Option<&Value>) -> PayloadState<WeatherSnapshot> {
    let value = match payload {
        None | Some(Value::Null) => return PayloadState::Absent,
        Some(v) => v,
    };

    let root = match payload_object(value) {
        Some(map) => map,
        None => return PayloadState::Malformed,
    };

    // Weather services wrap live readings in a `current` object; stored rows
    // sometimes carry the same fields at the top level. Accept both.
    let current = match root.get("current") {
        Some(Value::Object(map)) => Some(map.clone()),
        _ => None,
    };
    let body = current.as_ref().unwrap_or(&root);

    let air_quality = match body.get("air_quality").or_else(|| root.get("air_quality")) {
        Some(Value::Object(map)) => Some(map.clone()),
        _ => None,
    };

    let mut snapshot = WeatherSnapshot {
        temperature_c: field_f64(body, &["temp_c", "temperature_c"]),
        condition: condition_label(body.get("condition")),
        humidity: field_f64(body, &["humidity"]),
        ..Default::default()
    };

    if let Some(aq) = air_quality {
        snapshot.pm2_5 = field_f64(&aq, &["pm2_5"]);
        snapshot.pm10 = field_f64(&aq, &["pm10"]);
        snapshot.co = field_f64(&aq, &["co"]);
        snapshot.no2 = field_f64(&aq, &["no2"]);
        snapshot.o3 = field_f64(&aq, &["o3"]);
        snapshot.so2 = field_f64(&aq, &["so2"]);
        snapshot.epa_index = field_index(&aq, &["us-epa-index", "us_epa_index"], 1, 6);
        snapshot.defra_index = field_index(&aq, &["gb-defra-index", "gb_defra_index"], 1, 10);
    }

    PayloadState::Parsed(snapshot)
}

fn decode_emotion(payload: Option<&Value>) -> Option<EmotionReading> {
    let value = match payload {
        None | Some(Value::Null) => return None,
        Some(v) => v,
    };
    let map = payload_object(value)?;

    let dominant = ["dominant", "emotion", "label"]
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))?
        .to_string();

    let mut confidences = HashMap::new();
    if let Some(Value::Object(scores)) = map.get("confidences").or_else(|| map.get("scores")) {
        for (label, score) in scores {
            if let Some(s) = score.as_f64() {
                confidences.insert(label.clone(), s);
            }
        }
    }

    Some(EmotionReading {
        dominant,
        confidences,
    })
}

/// First numeric value under any of the given keys
fn field_f64(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| map.get(*k).and_then(Value::as_f64))
}

/// Integer index under any of the given keys, restricted to [min, max]
fn field_index(map: &serde_json::Map<String, Value>, keys: &[&str], min: u8, max: u8) -> Option<u8> {
    keys.iter()
        .find_map(|k| map.get(*k).and_then(Value::as_i64))
        .and_then(|i| u8::try_from(i).ok())
        .filter(|i| (min..=max).contains(i))
}

/// Condition arrives either as `{"text": "Sunny"}` or as a bare string
fn condition_label(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::Object(map)) => map.get("text").and_then(Value::as_str).map(String::from),
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}
