use crate::foundation::error::{RepriseError, RepriseResult};

pub use kurbo::{Point, Rect, Size, Vec2};

/// Stable identity of an element registered in a [`crate::Scene`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ElementId(pub u32);

/// Generational handle to a mover slot in a [`crate::MoverPool`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct MoverId {
    /// Slot index.
    pub index: u32,
    /// Slot generation at acquisition time.
    pub generation: u32,
}

/// Build a viewport rectangle from `left, top, width, height`.
pub fn rect_ltwh(left: f64, top: f64, width: f64, height: f64) -> Rect {
    Rect::new(left, top, left + width, top + height)
}

/// One intermediate placement produced by the path synthesizer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotionFrame {
    /// Left edge in viewport coordinates.
    pub left: f64,
    /// Top edge in viewport coordinates.
    pub top: f64,
    /// Width in viewport units.
    pub width: f64,
    /// Height in viewport units.
    pub height: f64,
}

impl MotionFrame {
    /// Frame of the given size centered on `center`.
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self {
            left: center.x - width / 2.0,
            top: center.y - height / 2.0,
            width,
            height,
        }
    }

    /// Center point of the frame.
    pub fn center(self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// The frame as a kurbo rectangle.
    pub fn to_rect(self) -> Rect {
        rect_ltwh(self.left, self.top, self.width, self.height)
    }
}

impl From<Rect> for MotionFrame {
    fn from(r: Rect) -> Self {
        Self {
            left: r.x0,
            top: r.y0,
            width: r.width(),
            height: r.height(),
        }
    }
}

/// Tick rate of the animation clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Ticks per `den` seconds.
    pub num: u32,
    /// Denominator; must be > 0.
    pub den: u32,
}

impl Fps {
    /// Validated constructor.
    pub fn new(num: u32, den: u32) -> RepriseResult<Self> {
        if den == 0 {
            return Err(RepriseError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(RepriseError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Ticks per second.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Seconds per tick.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Seconds spanned by `frames` ticks.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Number of whole ticks needed to cover `secs`.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        (secs * self.as_f64()).ceil().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 60, den: 1 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
