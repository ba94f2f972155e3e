//! Runtime settings read from `data-*` attributes on the canvas element.

use tree_core::constants::{BLOOM_STRENGTH, BLOOM_THRESHOLD, PHOTO_COUNT};
use tree_core::SceneConfig;

pub const DEFAULT_RECOGNIZER_WASM: &str =
    "https://cdn.jsdelivr.net/npm/@mediapipe/tasks-vision@0.10.14/wasm";
pub const DEFAULT_RECOGNIZER_MODEL: &str = "https://storage.googleapis.com/mediapipe-models/gesture_recognizer/gesture_recognizer/float16/1/gesture_recognizer.task";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WishEndpoint {
    /// Base URL of the REST service, without a trailing slash.
    pub base: String,
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognizerAssets {
    pub wasm_base: String,
    pub model_url: String,
}

/// Devices reporting this many logical cores or fewer get [`Quality::Low`].
pub const LOW_POWER_CORES: f64 = 4.0;
/// Particle counts are divided by this on [`Quality::Low`].
pub const LOW_POWER_THINNING: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quality {
    Full,
    Low,
}

impl Quality {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "full" => Some(Quality::Full),
            "low" => Some(Quality::Low),
            _ => None,
        }
    }

    /// An explicit choice wins; otherwise pick by `navigator.hardwareConcurrency`
    /// (0 when the browser does not report it).
    pub fn pick(explicit: Option<Quality>, cores: f64) -> Self {
        match explicit {
            Some(q) => q,
            None if cores > 0.0 && cores <= LOW_POWER_CORES => Quality::Low,
            None => Quality::Full,
        }
    }

    pub fn scene_config(self, base: SceneConfig) -> SceneConfig {
        match self {
            Quality::Full => base,
            Quality::Low => base.thinned(LOW_POWER_THINNING),
        }
    }

    /// Bloom `(strength, threshold)` for the renderer.
    pub fn bloom(self) -> (f32, f32) {
        match self {
            Quality::Full => (BLOOM_STRENGTH, BLOOM_THRESHOLD),
            Quality::Low => (BLOOM_STRENGTH * 0.5, BLOOM_THRESHOLD),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebConfig {
    /// `None` means offline: every wish is kept locally.
    pub wishes: Option<WishEndpoint>,
    pub photo_urls: Vec<String>,
    pub music_url: Option<String>,
    pub recognizer: RecognizerAssets,
    /// `data-quality="low|full"`; `None` picks by device.
    pub quality: Option<Quality>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl WebConfig {
    /// Build from an attribute lookup (`name` without the `data-` prefix).
    pub fn from_attrs(get: impl Fn(&str) -> Option<String>) -> Self {
        let wishes = match (non_empty(get("wishes-url")), non_empty(get("wishes-key"))) {
            (Some(base), Some(key)) => Some(WishEndpoint {
                base: base.trim_end_matches('/').to_owned(),
                key,
            }),
            (Some(_), None) => {
                log::warn!("[wishes] data-wishes-url set without data-wishes-key; staying offline");
                None
            }
            _ => None,
        };
        let photo_urls = match non_empty(get("photos")) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            None => (1..=PHOTO_COUNT).map(|i| format!("photos/{i}.jpg")).collect(),
        };
        Self {
            wishes,
            photo_urls,
            music_url: non_empty(get("music")),
            recognizer: RecognizerAssets {
                wasm_base: non_empty(get("recognizer-wasm"))
                    .unwrap_or_else(|| DEFAULT_RECOGNIZER_WASM.to_owned()),
                model_url: non_empty(get("recognizer-model"))
                    .unwrap_or_else(|| DEFAULT_RECOGNIZER_MODEL.to_owned()),
            },
            quality: non_empty(get("quality")).and_then(|q| {
                let parsed = Quality::parse(&q);
                if parsed.is_none() {
                    log::warn!("[config] unknown data-quality {q:?}; picking by device");
                }
                parsed
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_are_offline_with_numbered_photos() {
        let cfg = WebConfig::from_attrs(lookup(&[]));
        assert!(cfg.wishes.is_none());
        assert!(cfg.music_url.is_none());
        assert_eq!(cfg.photo_urls.len(), PHOTO_COUNT);
        assert_eq!(cfg.photo_urls[0], "photos/1.jpg");
        assert_eq!(cfg.recognizer.model_url, DEFAULT_RECOGNIZER_MODEL);
    }

    #[test]
    fn endpoint_needs_both_url_and_key() {
        let cfg = WebConfig::from_attrs(lookup(&[("wishes-url", "https://x.example/")]));
        assert!(cfg.wishes.is_none());
        let cfg = WebConfig::from_attrs(lookup(&[
            ("wishes-url", "https://x.example/"),
            ("wishes-key", "anon"),
        ]));
        assert_eq!(
            cfg.wishes,
            Some(WishEndpoint {
                base: "https://x.example".into(),
                key: "anon".into()
            })
        );
    }

    #[test]
    fn photo_list_is_split_and_trimmed() {
        let cfg = WebConfig::from_attrs(lookup(&[("photos", " a.jpg, ,b.png ")]));
        assert_eq!(cfg.photo_urls, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn quality_attribute_overrides_device_guess() {
        let cfg = WebConfig::from_attrs(lookup(&[("quality", " LOW ")]));
        assert_eq!(cfg.quality, Some(Quality::Low));
        assert_eq!(Quality::pick(cfg.quality, 16.0), Quality::Low);
        let cfg = WebConfig::from_attrs(lookup(&[("quality", "ultra")]));
        assert_eq!(cfg.quality, None);
    }

    #[test]
    fn few_cores_pick_low_quality() {
        assert_eq!(Quality::pick(None, 4.0), Quality::Low);
        assert_eq!(Quality::pick(None, 8.0), Quality::Full);
        // unreported
        assert_eq!(Quality::pick(None, 0.0), Quality::Full);
    }

    #[test]
    fn low_quality_thins_particles_and_softens_bloom() {
        let full = Quality::Full.scene_config(SceneConfig::default());
        let low = Quality::Low.scene_config(SceneConfig::default());
        assert_eq!(full, SceneConfig::default());
        for (f, l) in full.layers.iter().zip(&low.layers) {
            assert_eq!(l.count, (f.count / LOW_POWER_THINNING).max(1));
        }
        assert!(low.validate().is_ok());
        assert!(Quality::Low.bloom().0 < Quality::Full.bloom().0);
    }
}
