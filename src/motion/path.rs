use rand::Rng;

use crate::foundation::core::{MotionFrame, Rect, Vec2};
use crate::foundation::math::{center, lerp, lerp_point};

/// Shape of the path movers are laid out along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMotion {
    /// Straight segment between the two centers.
    #[default]
    Linear,
    /// Arc bulging perpendicular to the direction of travel.
    Sine,
}

/// Path shape parameters, usually taken from [`crate::TransitionConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathParams {
    /// Path shape.
    pub motion: PathMotion,
    /// Peak perpendicular offset of a sine path, in viewport units.
    pub sine_amplitude: f64,
    /// Angular frequency applied to normalized path position.
    pub sine_frequency: f64,
    /// Half-width of the uniform random jitter added to each axis. Zero disables it.
    pub wobble_strength: f64,
}

impl Default for PathParams {
    fn default() -> Self {
        Self {
            motion: PathMotion::Linear,
            sine_amplitude: 50.0,
            sine_frequency: std::f64::consts::PI,
            wobble_strength: 0.0,
        }
    }
}

/// Build `steps` interior frames between `source` and `destination`.
///
/// `steps + 2` evenly spaced points are interpolated from the source center to the
/// destination center (inclusive); the two endpoints are dropped. Width and height are
/// interpolated the same way. With a sine path each frame is pushed along the travel normal
/// by `amplitude * sin(t * frequency)`.
///
/// Wobble draws from `rng`, so output is only reproducible for a fixed seed or with
/// `wobble_strength == 0`.
pub fn synthesize<R: Rng + ?Sized>(
    source: Rect,
    destination: Rect,
    steps: usize,
    params: &PathParams,
    rng: &mut R,
) -> Vec<MotionFrame> {
    let start = center(source);
    let end = center(destination);
    let normal = travel_normal(end - start);
    let denom = (steps + 1) as f64;

    let mut frames = Vec::with_capacity(steps);
    for i in 1..=steps {
        let t = i as f64 / denom;
        let mut c = lerp_point(start, end, t);

        if params.motion == PathMotion::Sine {
            c += normal * (params.sine_amplitude * (t * params.sine_frequency).sin());
        }
        if params.wobble_strength > 0.0 {
            let w = params.wobble_strength;
            c.x += rng.random_range(-w..=w);
            c.y += rng.random_range(-w..=w);
        }

        let width = lerp(source.width(), destination.width(), t);
        let height = lerp(source.height(), destination.height(), t);
        frames.push(MotionFrame::centered(c, width, height));
    }
    frames
}

// Unit normal to the travel direction; straight down when the endpoints coincide.
fn travel_normal(delta: Vec2) -> Vec2 {
    let len = delta.hypot();
    if len > 0.0 && len.is_finite() {
        Vec2::new(-delta.y / len, delta.x / len)
    } else {
        Vec2::new(0.0, 1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/path.rs"]
mod tests;
