use serde::{Deserialize, Deserializer, Serialize};

use crate::animation::ease::Ease;
use crate::effects::mask::RevealDirection;
use crate::foundation::error::{RepriseError, RepriseResult};
use crate::motion::path::{PathMotion, PathParams};

/// Upper bound on movers per transition.
pub const MAX_STEPS: u32 = 1024;

/// Compositing mode applied to movers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Source over destination.
    Normal,
    /// Multiply.
    Multiply,
    /// Screen.
    Screen,
    /// Overlay.
    Overlay,
    /// Darken.
    Darken,
    /// Lighten.
    Lighten,
    /// Color dodge.
    ColorDodge,
    /// Color burn.
    ColorBurn,
    /// Hard light.
    HardLight,
    /// Soft light.
    SoftLight,
    /// Difference.
    Difference,
    /// Exclusion.
    Exclusion,
    /// Hue.
    Hue,
    /// Saturation.
    Saturation,
    /// Color.
    Color,
    /// Luminosity.
    Luminosity,
}

/// Tunable parameters of a transition.
///
/// Field names serialize in camelCase (`stepDuration`, `moverBlendMode`, ...). Durations are in
/// seconds. Instances are replaced wholesale by [`TransitionConfig::merged`]; nothing mutates a
/// config in place once an engine holds it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitionConfig {
    /// Number of movers.
    pub steps: u32,
    /// Duration of a mover's enter and exit phases, and the base unit for factors.
    pub step_duration: f64,
    /// Delay between consecutive movers.
    pub step_interval: f64,
    /// Hold between a mover's enter and exit.
    pub mover_pause_before_exit: f64,
    /// Maximum random mover rotation in degrees (either sign).
    pub rotation_range: f64,
    /// Path shape.
    pub path_motion: PathMotion,
    /// Peak perpendicular offset of a sine path.
    pub sine_amplitude: f64,
    /// Angular frequency of a sine path over normalized position.
    pub sine_frequency: f64,
    /// Random per-frame jitter; zero disables it.
    pub wobble_strength: f64,
    /// Reveal direction of masks.
    pub clip_path_direction: RevealDirection,
    /// Derive a horizontal reveal direction from the panel side.
    pub auto_adjust_horizontal_clip_path: bool,
    /// Ease of the mover enter phase.
    pub mover_enter_ease: Ease,
    /// Ease of the mover exit phase.
    pub mover_exit_ease: Ease,
    /// Ease of the panel mask reveal and hide.
    pub panel_reveal_ease: Ease,
    /// Ease of grid item and chrome fades.
    pub grid_item_ease: Ease,
    /// Panel reveal duration as a multiple of `step_duration`.
    pub panel_reveal_duration_factor: f64,
    /// Clicked item fade duration as a multiple of `step_duration`.
    pub clicked_item_duration_factor: f64,
    /// Largest grid item stagger delay.
    pub grid_item_stagger_factor: f64,
    /// Mover compositing mode; `None` (or `false` in JSON) disables it.
    #[serde(deserialize_with = "de_blend_mode")]
    pub mover_blend_mode: Option<BlendMode>,
    /// Extra time after completion before leftover movers are force-released.
    pub cleanup_grace: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            steps: 6,
            step_duration: 0.35,
            step_interval: 0.05,
            mover_pause_before_exit: 0.14,
            rotation_range: 0.0,
            path_motion: PathMotion::Linear,
            sine_amplitude: 50.0,
            sine_frequency: std::f64::consts::PI,
            wobble_strength: 0.0,
            clip_path_direction: RevealDirection::TopBottom,
            auto_adjust_horizontal_clip_path: false,
            mover_enter_ease: Ease::SINE_IN,
            mover_exit_ease: Ease::SINE_OUT,
            panel_reveal_ease: Ease::SINE_IN_OUT,
            grid_item_ease: Ease::SINE_OUT,
            panel_reveal_duration_factor: 2.0,
            clicked_item_duration_factor: 2.0,
            grid_item_stagger_factor: 0.3,
            mover_blend_mode: None,
            cleanup_grace: 0.25,
        }
    }
}

impl TransitionConfig {
    /// Parse and validate a full configuration from JSON; missing fields take defaults.
    pub fn from_json(s: &str) -> RepriseResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// New configuration with every field set in `patch` replaced.
    ///
    /// The result is validated; on error `self` is untouched and no config is produced.
    pub fn merged(&self, patch: &ConfigPatch) -> RepriseResult<Self> {
        let mut next = self.clone();

        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = patch.$field { next.$field = v; })*
            };
        }
        apply!(
            steps,
            step_duration,
            step_interval,
            mover_pause_before_exit,
            rotation_range,
            path_motion,
            sine_amplitude,
            sine_frequency,
            wobble_strength,
            clip_path_direction,
            auto_adjust_horizontal_clip_path,
            mover_enter_ease,
            mover_exit_ease,
            panel_reveal_ease,
            grid_item_ease,
            panel_reveal_duration_factor,
            clicked_item_duration_factor,
            grid_item_stagger_factor,
            mover_blend_mode,
            cleanup_grace,
        );

        next.validate()?;
        Ok(next)
    }

    /// Check numeric fields are finite and, where they are durations or magnitudes,
    /// non-negative.
    pub fn validate(&self) -> RepriseResult<()> {
        if self.steps > MAX_STEPS {
            return Err(RepriseError::validation(format!(
                "steps must be <= {MAX_STEPS}, got {}",
                self.steps
            )));
        }

        let non_negative = [
            ("stepDuration", self.step_duration),
            ("stepInterval", self.step_interval),
            ("moverPauseBeforeExit", self.mover_pause_before_exit),
            ("rotationRange", self.rotation_range),
            ("wobbleStrength", self.wobble_strength),
            ("panelRevealDurationFactor", self.panel_reveal_duration_factor),
            ("clickedItemDurationFactor", self.clicked_item_duration_factor),
            ("gridItemStaggerFactor", self.grid_item_stagger_factor),
            ("cleanupGrace", self.cleanup_grace),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(RepriseError::validation(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }

        for (name, v) in [
            ("sineAmplitude", self.sine_amplitude),
            ("sineFrequency", self.sine_frequency),
        ] {
            if !v.is_finite() {
                return Err(RepriseError::validation(format!(
                    "{name} must be finite, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Path shape parameters.
    pub fn path_params(&self) -> PathParams {
        PathParams {
            motion: self.path_motion,
            sine_amplitude: self.sine_amplitude,
            sine_frequency: self.sine_frequency,
            wobble_strength: self.wobble_strength,
        }
    }

    /// Lifetime of one mover: enter, hold, exit.
    pub fn mover_lifetime(&self) -> f64 {
        2.0 * self.step_duration + self.mover_pause_before_exit
    }

    /// Length of the panel mask reveal (and of the reverse hide).
    pub fn panel_reveal_duration(&self) -> f64 {
        self.step_duration * self.panel_reveal_duration_factor
    }

    /// Offset of the panel reveal from the start of a forward run.
    pub fn panel_reveal_start(&self) -> f64 {
        f64::from(self.steps) * self.step_interval
            + 2.0 * self.step_duration
            + self.mover_pause_before_exit
    }

    /// Fade duration of the clicked grid item.
    pub fn clicked_item_duration(&self) -> f64 {
        self.step_duration * self.clicked_item_duration_factor
    }

    /// Total forward duration:
    /// `steps * stepInterval + 2 * stepDuration + moverPauseBeforeExit + stepDuration * panelRevealDurationFactor`.
    pub fn forward_duration(&self) -> f64 {
        self.panel_reveal_start() + self.panel_reveal_duration()
    }

    /// Total reverse duration: panel hide, then the widest grid stagger plus one fade.
    pub fn reverse_duration(&self) -> f64 {
        self.panel_reveal_duration() + self.grid_item_stagger_factor + self.step_duration
    }
}

/// Partial configuration merged into a [`TransitionConfig`].
///
/// Fields mirror [`TransitionConfig`]; `None` leaves the current value. Unknown fields are
/// rejected so that typos surface instead of silently doing nothing.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigPatch {
    pub steps: Option<u32>,
    pub step_duration: Option<f64>,
    pub step_interval: Option<f64>,
    pub mover_pause_before_exit: Option<f64>,
    pub rotation_range: Option<f64>,
    pub path_motion: Option<PathMotion>,
    pub sine_amplitude: Option<f64>,
    pub sine_frequency: Option<f64>,
    pub wobble_strength: Option<f64>,
    pub clip_path_direction: Option<RevealDirection>,
    pub auto_adjust_horizontal_clip_path: Option<bool>,
    pub mover_enter_ease: Option<Ease>,
    pub mover_exit_ease: Option<Ease>,
    pub panel_reveal_ease: Option<Ease>,
    pub grid_item_ease: Option<Ease>,
    pub panel_reveal_duration_factor: Option<f64>,
    pub clicked_item_duration_factor: Option<f64>,
    pub grid_item_stagger_factor: Option<f64>,
    /// `Some(None)` disables blending; `None` leaves the current mode.
    #[serde(deserialize_with = "de_blend_mode_patch")]
    pub mover_blend_mode: Option<Option<BlendMode>>,
    pub cleanup_grace: Option<f64>,
}

impl ConfigPatch {
    /// Parse a patch from JSON.
    pub fn from_json(s: &str) -> RepriseResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BlendRepr {
    Flag(bool),
    Mode(BlendMode),
    Null(()),
}

fn de_blend_mode<'de, D>(deserializer: D) -> Result<Option<BlendMode>, D::Error>
where
    D: Deserializer<'de>,
{
    match BlendRepr::deserialize(deserializer)? {
        BlendRepr::Mode(mode) => Ok(Some(mode)),
        BlendRepr::Flag(false) | BlendRepr::Null(()) => Ok(None),
        BlendRepr::Flag(true) => Err(serde::de::Error::custom(
            "moverBlendMode must be a blend mode name or false",
        )),
    }
}

fn de_blend_mode_patch<'de, D>(deserializer: D) -> Result<Option<Option<BlendMode>>, D::Error>
where
    D: Deserializer<'de>,
{
    de_blend_mode(deserializer).map(Some)
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
