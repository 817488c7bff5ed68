use crate::foundation::core::Rect;
use crate::foundation::math::{center, distance};

/// Per-element delays proportional to center distance from `reference`.
///
/// Each delay is `distance / max_distance * scale`, so the farthest element gets `scale` and
/// anything coincident with the reference gets `0`. When every element coincides with the
/// reference all delays are `0`. A negative or non-finite `scale` is treated as `0`.
pub fn stagger_delays(reference: Rect, rects: &[Rect], scale: f64) -> Vec<f64> {
    let origin = center(reference);
    let distances: Vec<f64> = rects.iter().map(|r| distance(origin, center(*r))).collect();
    normalize(&distances, scale)
}

/// Like [`stagger_delays`], but tolerates elements without geometry.
///
/// Missing entries get a delay of `0` and do not take part in the normalization. A missing
/// reference yields all zeros.
pub fn stagger_delays_sparse(
    reference: Option<Rect>,
    rects: &[Option<Rect>],
    scale: f64,
) -> Vec<f64> {
    let Some(reference) = reference else {
        return vec![0.0; rects.len()];
    };
    let origin = center(reference);
    let distances: Vec<f64> = rects
        .iter()
        .map(|r| r.map_or(0.0, |r| distance(origin, center(r))))
        .collect();
    normalize(&distances, scale)
}

fn normalize(distances: &[f64], scale: f64) -> Vec<f64> {
    let scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    let max = distances
        .iter()
        .copied()
        .filter(|d| d.is_finite())
        .fold(0.0, f64::max);
    if max <= 0.0 {
        return vec![0.0; distances.len()];
    }
    distances
        .iter()
        .map(|d| {
            if d.is_finite() {
                (d / max * scale).clamp(0.0, scale)
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/motion/stagger.rs"]
mod tests;
