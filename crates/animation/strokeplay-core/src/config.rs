//! Configuration: engine tunables and the typed form of the element attributes.

use serde::{Deserialize, Serialize};

use crate::error::StrokeError;

/// Attributes whose changes re-render the component.
pub const OBSERVED_ATTRIBUTES: [&str; 8] = [
    "svg-file-path",
    "animation-speed",
    "width",
    "height",
    "background-color",
    "border",
    "invert-colors",
    "auto-play",
];

/// Tunables shared by every component instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Failed measurement attempts tolerated before giving up.
    pub max_measure_retries: u32,
    /// Channel spread below which a colour counts as grayscale.
    pub grayscale_threshold: u8,
    /// Flattening tolerance for curve lengths measured from markup.
    pub curve_accuracy: f64,
    /// Duration used when `animation-speed` is missing or malformed.
    pub default_duration_ms: f64,
    /// Length of one frame when `animation-speed` is given in frames.
    pub frame_ms: f64,
    /// Speeds below this are frame counts, at or above it milliseconds.
    pub frame_count_limit: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_measure_retries: 20,
            grayscale_threshold: 30,
            curve_accuracy: 0.1,
            default_duration_ms: 2000.0,
            frame_ms: 16.66,
            frame_count_limit: 1000.0,
        }
    }
}

impl EngineConfig {
    /// Playback duration in milliseconds for a raw `animation-speed` value.
    ///
    /// Small values are frame counts; anything unparseable falls back to the
    /// default duration.
    pub fn effective_duration_ms(&self, raw: Option<&str>) -> f64 {
        match raw.map(|raw| self.duration_from_speed(raw)) {
            Some(Ok(duration)) => duration,
            Some(Err(err)) => {
                log::warn!("{err}; using {} ms", self.default_duration_ms);
                self.default_duration_ms
            }
            None => self.default_duration_ms,
        }
    }

    /// Strict form of [`effective_duration_ms`](Self::effective_duration_ms)
    /// for a present `animation-speed` value.
    pub fn duration_from_speed(&self, raw: &str) -> crate::Result<f64> {
        match parse_leading_int(raw) {
            Some(speed) if speed < self.frame_count_limit => Ok(speed * self.frame_ms),
            Some(speed) => Ok(speed),
            None => Err(StrokeError::InvalidAttribute {
                name: "animation-speed".to_string(),
                value: raw.to_string(),
            }),
        }
    }
}

/// Parse the leading base-10 integer of `s`, ignoring anything after it.
///
/// Leading whitespace and a single sign are accepted; returns `None` when no
/// digit follows. The value is accumulated as `f64` so long digit runs do not
/// overflow.
pub fn parse_leading_int(s: &str) -> Option<f64> {
    let trimmed = s.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let mut value = 0.0f64;
    let mut seen = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen = true;
        value = value * 10.0 + f64::from(b - b'0');
    }
    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Typed view of the element attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    pub svg_file_path: Option<String>,
    pub duration_ms: f64,
    pub width: String,
    pub height: Option<String>,
    pub background_color: Option<String>,
    pub border: Option<String>,
    pub invert_colors: bool,
    pub auto_play: bool,
}

impl ElementConfig {
    /// Build from an attribute lookup such as `Element::get_attribute`.
    pub fn from_attributes<F>(get: F, engine: &EngineConfig) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let speed = get("animation-speed");
        Self {
            svg_file_path: get("svg-file-path").filter(|p| !p.is_empty()),
            duration_ms: engine.effective_duration_ms(speed.as_deref()),
            width: get("width")
                .filter(|w| !w.is_empty())
                .unwrap_or_else(|| "100%".to_string()),
            height: get("height").filter(|h| !h.is_empty()),
            background_color: get("background-color").filter(|c| !c.is_empty()),
            border: get("border").filter(|b| !b.is_empty()),
            invert_colors: get("invert-colors").as_deref() == Some("true"),
            auto_play: get("auto-play").as_deref() != Some("false"),
        }
    }

    /// CSS height for the host element.
    pub fn host_height(&self) -> &str {
        self.height.as_deref().unwrap_or("auto")
    }
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self::from_attributes(|_| None, &EngineConfig::default())
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
        move |name| map.get(name).cloned()
    }

    #[test]
    fn leading_int_follows_parse_int_rules() {
        assert_eq!(parse_leading_int("120"), Some(120.0));
        assert_eq!(parse_leading_int("  42px"), Some(42.0));
        assert_eq!(parse_leading_int("-7"), Some(-7.0));
        assert_eq!(parse_leading_int("+3"), Some(3.0));
        assert_eq!(parse_leading_int("1e3"), Some(1.0));
        assert_eq!(parse_leading_int("12.9"), Some(12.0));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn small_speeds_are_frames() {
        let cfg = EngineConfig::default();
        assert!((cfg.effective_duration_ms(Some("100")) - 1666.0).abs() < 1e-9);
        assert!((cfg.effective_duration_ms(Some("999")) - 999.0 * 16.66).abs() < 1e-9);
        assert_eq!(cfg.effective_duration_ms(Some("1000")), 1000.0);
        assert_eq!(cfg.effective_duration_ms(Some("4500")), 4500.0);
    }

    #[test]
    fn malformed_speed_uses_default() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.effective_duration_ms(None), 2000.0);
        assert_eq!(cfg.effective_duration_ms(Some("fast")), 2000.0);
        assert_eq!(
            cfg.duration_from_speed("fast"),
            Err(StrokeError::InvalidAttribute {
                name: "animation-speed".into(),
                value: "fast".into()
            })
        );
        assert_eq!(cfg.duration_from_speed("2500ms"), Ok(2500.0));
    }

    #[test]
    fn defaults_without_attributes() {
        let cfg = ElementConfig::default();
        assert_eq!(cfg.svg_file_path, None);
        assert_eq!(cfg.duration_ms, 2000.0);
        assert_eq!(cfg.width, "100%");
        assert_eq!(cfg.host_height(), "auto");
        assert!(!cfg.invert_colors);
        assert!(cfg.auto_play);
    }

    #[test]
    fn flags_need_exact_strings() {
        let engine = EngineConfig::default();
        let cfg = ElementConfig::from_attributes(
            lookup(&[("invert-colors", "TRUE"), ("auto-play", "no")]),
            &engine,
        );
        assert!(!cfg.invert_colors);
        assert!(cfg.auto_play);

        let cfg = ElementConfig::from_attributes(
            lookup(&[("invert-colors", "true"), ("auto-play", "false")]),
            &engine,
        );
        assert!(cfg.invert_colors);
        assert!(!cfg.auto_play);
    }

    #[test]
    fn reads_layout_attributes() {
        let cfg = ElementConfig::from_attributes(
            lookup(&[
                ("svg-file-path", "drawings/logo.svg"),
                ("animation-speed", "3000"),
                ("width", "320px"),
                ("height", "200px"),
                ("border", "1px solid #ccc"),
                ("background-color", "#111"),
            ]),
            &EngineConfig::default(),
        );
        assert_eq!(cfg.svg_file_path.as_deref(), Some("drawings/logo.svg"));
        assert_eq!(cfg.duration_ms, 3000.0);
        assert_eq!(cfg.width, "320px");
        assert_eq!(cfg.host_height(), "200px");
        assert_eq!(cfg.border.as_deref(), Some("1px solid #ccc"));
        assert_eq!(cfg.background_color.as_deref(), Some("#111"));
    }

    #[test]
    fn engine_config_fills_missing_fields() {
        let cfg: EngineConfig = serde_json::from_str(r#"{ "max_measure_retries": 5 }"#).unwrap();
        assert_eq!(cfg.max_measure_retries, 5);
        assert_eq!(cfg.grayscale_threshold, 30);
    }
}
