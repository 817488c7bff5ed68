use std::fmt;

use crate::foundation::core::Point;

/// Edge a reveal advances from and toward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RevealDirection {
    /// Reveal grows downward from the top edge.
    #[default]
    TopBottom,
    /// Reveal grows upward from the bottom edge.
    BottomTop,
    /// Reveal grows rightward from the left edge.
    LeftRight,
    /// Reveal grows leftward from the right edge.
    RightLeft,
}

impl RevealDirection {
    /// All recognized directions.
    pub const ALL: [Self; 4] = [
        Self::TopBottom,
        Self::BottomTop,
        Self::LeftRight,
        Self::RightLeft,
    ];

    /// Parse a direction identifier. Unrecognized input falls back to [`Self::TopBottom`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "bottom-top" | "bottom_top" | "btt" => Self::BottomTop,
            "left-right" | "left_right" | "ltr" => Self::LeftRight,
            "right-left" | "right_left" | "rtl" => Self::RightLeft,
            _ => Self::TopBottom,
        }
    }

    /// Identifier used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopBottom => "top-bottom",
            Self::BottomTop => "bottom-top",
            Self::LeftRight => "left-right",
            Self::RightLeft => "right-left",
        }
    }

    /// Whether the reveal edge travels horizontally.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftRight | Self::RightLeft)
    }
}

impl From<String> for RevealDirection {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<RevealDirection> for String {
    fn from(value: RevealDirection) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for RevealDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named mask states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskPhase {
    /// Fully hidden, collapsed onto the edge the reveal starts from.
    From,
    /// Fully visible.
    Reveal,
    /// Fully hidden, collapsed onto the opposite edge.
    Hide,
}

/// Rectangular clip region as inset fractions of the element's own box.
///
/// An inset of `0` keeps that edge in place; `1` pushes it all the way across the box.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipRegion {
    /// Inset from the top edge.
    pub top: f64,
    /// Inset from the right edge.
    pub right: f64,
    /// Inset from the bottom edge.
    pub bottom: f64,
    /// Inset from the left edge.
    pub left: f64,
}

impl ClipRegion {
    /// The unclipped region.
    pub const FULL: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    /// Visible fraction of the box area.
    pub fn visible_area(self) -> f64 {
        let w = (1.0 - self.left - self.right).max(0.0);
        let h = (1.0 - self.top - self.bottom).max(0.0);
        w * h
    }

    /// Corner polygon in box-relative coordinates, clockwise from top-left.
    pub fn to_polygon(self) -> [Point; 4] {
        let (x0, x1) = (self.left, 1.0 - self.right);
        let (y0, y1) = (self.top, 1.0 - self.bottom);
        [
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    /// CSS `polygon(...)` value for web renderers.
    pub fn to_css_polygon(self) -> String {
        let pts: Vec<String> = self
            .to_polygon()
            .iter()
            .map(|p| format!("{}% {}%", fmt_pct(p.x), fmt_pct(p.y)))
            .collect();
        format!("polygon({})", pts.join(", "))
    }
}

fn fmt_pct(v: f64) -> String {
    let s = format!("{:.4}", v * 100.0);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

/// Clip region for `direction` at reveal progress `p` (clamped to `[0, 1]`).
///
/// `mask(d, 0.0)` equals [`phase(d, MaskPhase::From)`](phase) and `mask(d, 1.0)` equals
/// `phase(d, MaskPhase::Reveal)`; the advancing edge moves linearly in between.
pub fn mask(direction: RevealDirection, p: f64) -> ClipRegion {
    let hidden = 1.0 - p.clamp(0.0, 1.0);
    let mut clip = ClipRegion::FULL;
    match direction {
        RevealDirection::TopBottom => clip.bottom = hidden,
        RevealDirection::BottomTop => clip.top = hidden,
        RevealDirection::LeftRight => clip.right = hidden,
        RevealDirection::RightLeft => clip.left = hidden,
    }
    clip
}

/// Clip region for a named phase.
pub fn phase(direction: RevealDirection, phase: MaskPhase) -> ClipRegion {
    match phase {
        MaskPhase::From => mask(direction, 0.0),
        MaskPhase::Reveal => mask(direction, 1.0),
        MaskPhase::Hide => {
            let mut clip = ClipRegion::FULL;
            match direction {
                RevealDirection::TopBottom => clip.top = 1.0,
                RevealDirection::BottomTop => clip.bottom = 1.0,
                RevealDirection::LeftRight => clip.left = 1.0,
                RevealDirection::RightLeft => clip.right = 1.0,
            }
            clip
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/mask.rs"]
mod tests;
