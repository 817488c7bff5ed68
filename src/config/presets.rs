use std::fmt;
use std::str::FromStr;

use crate::animation::ease::{Curve, Ease, EaseDir};
use crate::config::model::{BlendMode, ConfigPatch};
use crate::effects::mask::RevealDirection;
use crate::foundation::error::RepriseError;
use crate::motion::path::PathMotion;

/// Named configuration overrides for the gallery sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Straight linear paths, smooth easing, clean timing, no rotation.
    Effect01,
    /// More movers, rotation, longer hold, punchier exit.
    Effect02,
    /// Big sine arcs, horizontal reveal following the panel side, slow reveal.
    Effect03,
    /// Few movers, bottom-up reveal, hard-light blending.
    Effect04,
}

impl Preset {
    /// Every preset in gallery order.
    pub const ALL: [Self; 4] = [Self::Effect01, Self::Effect02, Self::Effect03, Self::Effect04];

    /// Identifier used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Effect01 => "effect01",
            Self::Effect02 => "effect02",
            Self::Effect03 => "effect03",
            Self::Effect04 => "effect04",
        }
    }

    /// Overrides to merge into the default configuration.
    pub fn patch(self) -> ConfigPatch {
        match self {
            Self::Effect01 => ConfigPatch::default(),
            Self::Effect02 => ConfigPatch {
                steps: Some(8),
                rotation_range: Some(7.0),
                step_interval: Some(0.05),
                mover_pause_before_exit: Some(0.25),
                mover_enter_ease: Some(Ease::SINE_IN),
                mover_exit_ease: out(Curve::Power(2)),
                panel_reveal_ease: out(Curve::Power(2)),
                ..ConfigPatch::default()
            },
            Self::Effect03 => ConfigPatch {
                steps: Some(10),
                step_duration: Some(0.3),
                path_motion: Some(PathMotion::Sine),
                sine_amplitude: Some(300.0),
                clip_path_direction: Some(RevealDirection::LeftRight),
                auto_adjust_horizontal_clip_path: Some(true),
                step_interval: Some(0.07),
                mover_pause_before_exit: Some(0.3),
                mover_enter_ease: Some(Ease::SINE_OUT),
                mover_exit_ease: out(Curve::Power(4)),
                panel_reveal_ease: out(Curve::Power(4)),
                panel_reveal_duration_factor: Some(4.0),
                ..ConfigPatch::default()
            },
            Self::Effect04 => ConfigPatch {
                steps: Some(4),
                clip_path_direction: Some(RevealDirection::BottomTop),
                step_duration: Some(0.25),
                step_interval: Some(0.06),
                mover_pause_before_exit: Some(0.2),
                mover_enter_ease: Some(Ease::SINE_IN),
                mover_exit_ease: out(Curve::Expo),
                panel_reveal_ease: out(Curve::Expo),
                panel_reveal_duration_factor: Some(4.0),
                mover_blend_mode: Some(Some(BlendMode::HardLight)),
                ..ConfigPatch::default()
            },
        }
    }
}

fn out(curve: Curve) -> Option<Ease> {
    Some(Ease::Curve(curve, EaseDir::Out))
}

impl FromStr for Preset {
    type Err = RepriseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s || p.name().trim_start_matches("effect0") == s)
            .ok_or_else(|| RepriseError::validation(format!("unknown preset '{s}'")))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
