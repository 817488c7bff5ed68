use crate::animation::ease::Ease;
use crate::foundation::core::{ElementId, MoverId};
use crate::foundation::math::lerp;

/// Object a tween writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Target {
    /// A scene element.
    Element(ElementId),
    /// A transient mover.
    Mover(MoverId),
}

/// Animatable visual property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Channel {
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Uniform scale factor.
    Scale,
    /// Rotation in degrees.
    Rotation,
    /// Mask reveal progress in `[0, 1]`.
    Reveal,
}

/// A single-property interpolation over a time window on the shared clock.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Tween {
    /// What the tween writes to.
    pub target: Target,
    /// Which property it writes.
    pub channel: Channel,
    /// Value at `start`.
    pub from: f64,
    /// Value at `start + duration`.
    pub to: f64,
    /// Absolute clock time the tween begins, in seconds.
    pub start: f64,
    /// Length in seconds; zero means the value jumps to `to` at `start`.
    pub duration: f64,
    /// Progress mapping.
    pub ease: Ease,
}

impl Tween {
    /// Tween with a linear ease; chain [`Tween::eased`] to change it.
    pub fn new(target: Target, channel: Channel, from: f64, to: f64) -> Self {
        Self {
            target,
            channel,
            from,
            to,
            start: 0.0,
            duration: 0.0,
            ease: Ease::Linear,
        }
    }

    /// Place the tween on the clock.
    pub fn at(mut self, start: f64, duration: f64) -> Self {
        self.start = start;
        self.duration = duration.max(0.0);
        self
    }

    /// Replace the ease.
    pub fn eased(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Absolute clock time the tween reaches `to`.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Interpolated value at absolute time `t`; clamps outside the window.
    pub fn value_at(&self, t: f64) -> f64 {
        if self.duration <= 0.0 {
            return if t >= self.start { self.to } else { self.from };
        }
        let progress = ((t - self.start) / self.duration).clamp(0.0, 1.0);
        if progress >= 1.0 {
            return self.to;
        }
        lerp(self.from, self.to, self.ease.apply(progress))
    }
}

/// One property write produced by advancing the clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// What to write to.
    pub target: Target,
    /// Which property.
    pub channel: Channel,
    /// The value.
    pub value: f64,
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
