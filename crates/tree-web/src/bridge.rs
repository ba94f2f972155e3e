//! JSON shape produced by `js/gesture_bridge.js` and its conversion into a
//! [`GestureReading`].

use glam::Vec2;
use serde::Deserialize;
use tree_core::{Category, Gesture, GestureReading};

#[derive(Debug, Deserialize)]
struct RawCategory {
    label: String,
    #[serde(default)]
    score: f32,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
struct RawReading {
    #[serde(default)]
    categories: Vec<RawCategory>,
    #[serde(default)]
    landmarks: Vec<RawPoint>,
}

/// Parse one recognizer result. A reading without any category is `None`.
pub fn parse_reading(json: &str) -> anyhow::Result<Option<GestureReading>> {
    let raw: RawReading = serde_json::from_str(json)?;
    if raw.categories.is_empty() {
        return Ok(None);
    }
    Ok(Some(GestureReading {
        categories: raw
            .categories
            .iter()
            .map(|c| Category {
                gesture: Gesture::from_label(&c.label),
                score: c.score,
            })
            .collect(),
        landmarks: raw.landmarks.iter().map(|p| Vec2::new(p.x, p.y)).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_label_and_palm_point() {
        let mut landmarks = String::new();
        for i in 0..21 {
            if i > 0 {
                landmarks.push(',');
            }
            let x = if i == 9 { 0.75 } else { 0.0 };
            landmarks.push_str(&format!(r#"{{"x":{x},"y":0.5}}"#));
        }
        let json = format!(
            r#"{{"categories":[{{"label":"Open_Palm","score":0.9}},{{"label":"None","score":0.1}}],"landmarks":[{landmarks}]}}"#
        );
        let reading = parse_reading(&json).unwrap().unwrap();
        assert_eq!(reading.top(), Some(Gesture::OpenPalm));
        let p = reading.hand_position().unwrap();
        assert!((p.x - 0.25).abs() < 1e-6 && p.y.abs() < 1e-6);
    }

    #[test]
    fn empty_reading_is_none() {
        assert!(parse_reading(r#"{"categories":[]}"#).unwrap().is_none());
        assert!(parse_reading("not json").is_err());
    }
}
