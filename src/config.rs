//! Visual parameters for the light-ray background.
//!
//! Two presets exist, one per ray variant. They use different smoothing
//! constants and ray formulas; both are kept as-is rather than merged.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pointer::PointerSpace;

/// How the fragment stage computes each pixel's angle to the rays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RayVariant {
    /// Fixed cone of primary and secondary rays with source and cone glow.
    #[default]
    Cone,
    /// Sampling coordinate sheared by pointer X with depth; origin stays put.
    Skew,
}

impl RayVariant {
    pub fn all() -> &'static [RayVariant] {
        &[RayVariant::Cone, RayVariant::Skew]
    }

    pub fn name(&self) -> &'static str {
        match self {
            RayVariant::Cone => "Fixed Cone",
            RayVariant::Skew => "Tilting Beams",
        }
    }

    /// Parse from string ID (e.g., "cone", "skew")
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "cone" => Some(RayVariant::Cone),
            "skew" => Some(RayVariant::Skew),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            RayVariant::Cone => "cone",
            RayVariant::Skew => "skew",
        }
    }

    /// Coordinate space pointer events are normalized into.
    pub fn pointer_space(&self) -> PointerSpace {
        match self {
            RayVariant::Cone => PointerSpace::Element,
            RayVariant::Skew => PointerSpace::Viewport,
        }
    }
}

/// Immutable render parameters. Built once at startup.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderConfig {
    /// Base tint, each channel in `0..=1`.
    pub color: [f32; 3],
    /// Multiplier applied to elapsed seconds.
    pub speed: f32,
    /// Angular spread of the ray fan.
    pub spread: f32,
    /// Distance at which rays have faded out.
    pub ray_length: f32,
    /// Amplitude of the per-ray wobble.
    pub distortion: f32,
    /// Output saturation in `0..=1`.
    pub saturation: f32,
    /// Pointer weight in `0..=1`.
    pub mouse_influence: f32,
    /// Per-frame pointer smoothing factor in `(0, 1)`.
    pub smoothing: f32,
    /// Upper bound on the device-pixel ratio used for the backing store.
    pub dpr_cap: f64,
    pub variant: RayVariant,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::cone()
    }
}

impl RenderConfig {
    pub fn cone() -> Self {
        Self {
            color: [0.0, 0.431, 1.0],
            speed: 2.5,
            spread: 3.0,
            ray_length: 4.6,
            distortion: 0.05,
            saturation: 0.9,
            mouse_influence: 0.35,
            smoothing: 0.05,
            dpr_cap: 2.0,
            variant: RayVariant::Cone,
        }
    }

    pub fn skew() -> Self {
        Self {
            color: [0.0, 0.43, 1.0],
            speed: 1.0,
            spread: 3.0,
            ray_length: 4.6,
            distortion: 0.05,
            saturation: 1.0,
            mouse_influence: 0.5,
            smoothing: 0.1,
            dpr_cap: 1.5,
            variant: RayVariant::Skew,
        }
    }

    pub fn preset(variant: RayVariant) -> Self {
        match variant {
            RayVariant::Cone => Self::cone(),
            RayVariant::Skew => Self::skew(),
        }
    }

    /// Preset for `variant` with a partial JSON object applied on top.
    pub fn from_json(variant: RayVariant, json: &str) -> Result<Self, ConfigError> {
        let overrides: ConfigOverrides = serde_json::from_str(json)?;
        let config = overrides.apply(Self::preset(variant));
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, channel) in self.color.iter().enumerate() {
            unit_range(*channel).map_err(|reason| ConfigError::Invalid {
                field: "color",
                reason: format!("channel {i}: {reason}"),
            })?;
        }
        finite("speed", self.speed)?;
        positive("spread", self.spread)?;
        positive("ray_length", self.ray_length)?;
        finite("distortion", self.distortion)?;
        unit_range(self.saturation).map_err(|reason| ConfigError::Invalid {
            field: "saturation",
            reason,
        })?;
        unit_range(self.mouse_influence).map_err(|reason| {
            ConfigError::Invalid {
                field: "mouse_influence",
                reason,
            }
        })?;
        if !(self.smoothing > 0.0 && self.smoothing < 1.0) {
            return Err(ConfigError::Invalid {
                field: "smoothing",
                reason: format!("{} is not in (0, 1)", self.smoothing),
            });
        }
        if !(self.dpr_cap.is_finite() && self.dpr_cap >= 1.0) {
            return Err(ConfigError::Invalid {
                field: "dpr_cap",
                reason: format!("{} is below 1", self.dpr_cap),
            });
        }
        Ok(())
    }
}

/// Fields a page may override through `data-config`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    color: Option<[f32; 3]>,
    speed: Option<f32>,
    spread: Option<f32>,
    ray_length: Option<f32>,
    distortion: Option<f32>,
    saturation: Option<f32>,
    mouse_influence: Option<f32>,
    smoothing: Option<f32>,
    dpr_cap: Option<f64>,
}

impl ConfigOverrides {
    fn apply(self, base: RenderConfig) -> RenderConfig {
        RenderConfig {
            color: self.color.unwrap_or(base.color),
            speed: self.speed.unwrap_or(base.speed),
            spread: self.spread.unwrap_or(base.spread),
            ray_length: self.ray_length.unwrap_or(base.ray_length),
            distortion: self.distortion.unwrap_or(base.distortion),
            saturation: self.saturation.unwrap_or(base.saturation),
            mouse_influence: self.mouse_influence.unwrap_or(base.mouse_influence),
            smoothing: self.smoothing.unwrap_or(base.smoothing),
            dpr_cap: self.dpr_cap.unwrap_or(base.dpr_cap),
            variant: base.variant,
        }
    }
}

fn unit_range(value: f32) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{value} is not in [0, 1]"))
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be finite".into(),
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be positive"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for variant in RayVariant::all() {
            let config = RenderConfig::preset(*variant);
            assert_eq!(config.variant, *variant);
            config.validate().unwrap();
        }
    }

    #[test]
    fn variant_ids_round_trip() {
        for variant in RayVariant::all() {
            assert_eq!(RayVariant::from_id(variant.id()), Some(*variant));
        }
        assert_eq!(RayVariant::from_id(" SKEW "), Some(RayVariant::Skew));
        assert_eq!(RayVariant::from_id("spiral"), None);
    }

    #[test]
    fn variant_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RayVariant::Skew).unwrap(), "\"skew\"");
        let parsed: RayVariant = serde_json::from_str("\"cone\"").unwrap();
        assert_eq!(parsed, RayVariant::Cone);
    }

    #[test]
    fn presets_keep_their_own_smoothing() {
        assert_eq!(RenderConfig::cone().smoothing, 0.05);
        assert_eq!(RenderConfig::skew().smoothing, 0.1);
        assert_eq!(RenderConfig::cone().dpr_cap, 2.0);
        assert_eq!(RenderConfig::skew().dpr_cap, 1.5);
    }

    #[test]
    fn json_overrides_only_named_fields() {
        let config =
            RenderConfig::from_json(RayVariant::Cone, r#"{"speed": 1.25, "color": [1, 0.5, 0]}"#)
                .unwrap();
        assert_eq!(config.speed, 1.25);
        assert_eq!(config.color, [1.0, 0.5, 0.0]);
        assert_eq!(config.spread, RenderConfig::cone().spread);
        assert_eq!(config.variant, RayVariant::Cone);
    }

    #[test]
    fn json_rejects_unknown_fields() {
        let err = RenderConfig::from_json(RayVariant::Cone, r#"{"sped": 1.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn json_rejects_out_of_range_values() {
        let err = RenderConfig::from_json(RayVariant::Skew, r#"{"saturation": 1.5}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "saturation",
                ..
            }
        ));

        let err = RenderConfig::from_json(RayVariant::Skew, r#"{"smoothing": 1.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "smoothing", .. }));

        let err = RenderConfig::from_json(RayVariant::Cone, r#"{"dpr_cap": 0.5}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "dpr_cap", .. }));
    }
}
