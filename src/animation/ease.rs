use std::fmt;
use std::str::FromStr;

use crate::foundation::error::RepriseError;

/// Shape of an easing curve, expressed in its "in" form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    /// `t^(degree + 1)`; `power1` is quadratic, `power4` quintic.
    Power(u8),
    /// Quarter sine wave.
    Sine,
    /// Exponential (base 2).
    Expo,
    /// Quarter circle.
    Circ,
}

/// Which end of the curve is eased.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EaseDir {
    /// Slow start.
    In,
    /// Slow end.
    Out,
    /// Slow start and end.
    InOut,
}

/// Easing function used to map normalized tween progress.
///
/// Serialized as a dotted identifier such as `"sine.inOut"` or `"power2"`; a bare family
/// name means the `.out` variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ease {
    /// Linear interpolation (`"none"`).
    #[default]
    Linear,
    /// A curve eased at one or both ends.
    Curve(Curve, EaseDir),
}

impl Ease {
    /// `sine.in`
    pub const SINE_IN: Self = Self::Curve(Curve::Sine, EaseDir::In);
    /// `sine.out`
    pub const SINE_OUT: Self = Self::Curve(Curve::Sine, EaseDir::Out);
    /// `sine.inOut`
    pub const SINE_IN_OUT: Self = Self::Curve(Curve::Sine, EaseDir::InOut);

    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        // Endpoints are exact regardless of curve rounding.
        if t == 0.0 || t == 1.0 {
            return t;
        }
        match self {
            Self::Linear => t,
            Self::Curve(curve, EaseDir::In) => curve.ease_in(t),
            Self::Curve(curve, EaseDir::Out) => 1.0 - curve.ease_in(1.0 - t),
            Self::Curve(curve, EaseDir::InOut) => {
                if t < 0.5 {
                    curve.ease_in(2.0 * t) / 2.0
                } else {
                    1.0 - curve.ease_in(2.0 - 2.0 * t) / 2.0
                }
            }
        }
    }
}

impl Curve {
    fn ease_in(self, t: f64) -> f64 {
        match self {
            Self::Power(degree) => t.powi(i32::from(degree) + 1),
            Self::Sine => 1.0 - (t * std::f64::consts::FRAC_PI_2).cos(),
            Self::Expo => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * (t - 1.0))
                }
            }
            Self::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
        }
    }

    fn name(self) -> String {
        match self {
            Self::Power(d) => format!("power{d}"),
            Self::Sine => "sine".to_owned(),
            Self::Expo => "expo".to_owned(),
            Self::Circ => "circ".to_owned(),
        }
    }
}

impl FromStr for Ease {
    type Err = RepriseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ident = s.trim();
        let (family, dir) = match ident.split_once('.') {
            None => (ident, EaseDir::Out),
            Some((family, dir)) => {
                let dir = match dir.to_ascii_lowercase().as_str() {
                    "in" => EaseDir::In,
                    "out" => EaseDir::Out,
                    "inout" => EaseDir::InOut,
                    other => {
                        return Err(RepriseError::validation(format!(
                            "unknown ease direction '{other}' in '{ident}'"
                        )));
                    }
                };
                (family, dir)
            }
        };

        let curve = match family.to_ascii_lowercase().as_str() {
            "none" | "linear" | "power0" => return Ok(Self::Linear),
            "power1" | "quad" => Curve::Power(1),
            "power2" | "cubic" => Curve::Power(2),
            "power3" | "quart" => Curve::Power(3),
            "power4" | "quint" | "strong" => Curve::Power(4),
            "sine" => Curve::Sine,
            "expo" => Curve::Expo,
            "circ" => Curve::Circ,
            "" => return Err(RepriseError::validation("ease identifier must be non-empty")),
            other => {
                return Err(RepriseError::validation(format!("unknown ease '{other}'")));
            }
        };
        Ok(Self::Curve(curve, dir))
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => f.write_str("none"),
            Self::Curve(curve, dir) => {
                let dir = match dir {
                    EaseDir::In => "in",
                    EaseDir::Out => "out",
                    EaseDir::InOut => "inOut",
                };
                write!(f, "{}.{dir}", curve.name())
            }
        }
    }
}

impl TryFrom<String> for Ease {
    type Error = RepriseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ease> for String {
    fn from(value: Ease) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
