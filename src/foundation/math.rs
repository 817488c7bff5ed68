//! Geometry helpers shared by the path synthesizer and the stagger calculator.
//!
//! All functions are pure. NaN inputs propagate through unchanged.

use crate::foundation::core::{Point, Rect};

/// Center of a rectangle.
pub fn center(rect: Rect) -> Point {
    Point::new(
        rect.x0 + (rect.x1 - rect.x0) / 2.0,
        rect.y0 + (rect.y1 - rect.y0) / 2.0,
    )
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Linear interpolation from `a` to `b` at `t` (`t` is not clamped).
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Component-wise [`lerp`] between two points.
pub fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

/// Whether the rectangle's center lies in the left half of a viewport of `viewport_width`.
pub fn is_left_half(rect: Rect, viewport_width: f64) -> bool {
    center(rect).x < viewport_width / 2.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
