//! Easing curves for turning a normalized controller value into an
//! animation parameter.

use std::f64::consts::PI;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Sine,
    Quad,
    Cubic,
    Quart,
    Expo,
    Circ,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    Curve(Curve, Direction),
}

impl Easing {
    /// Maps `t` (clamped to `[0, 1]`) onto the curve. Every curve passes
    /// through `(0, 0)` and `(1, 1)`.
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match *self {
            Easing::Linear => t,
            Easing::Curve(curve, Direction::In) => ease_in(curve, t),
            Easing::Curve(curve, Direction::Out) => 1.0 - ease_in(curve, 1.0 - t),
            Easing::Curve(curve, Direction::InOut) => {
                if t < 0.5 {
                    ease_in(curve, t * 2.0) / 2.0
                } else {
                    1.0 - ease_in(curve, (1.0 - t) * 2.0) / 2.0
                }
            }
        }
    }
}

fn ease_in(curve: Curve, t: f64) -> f64 {
    match curve {
        Curve::Sine => 1.0 - (t * PI / 2.0).cos(),
        Curve::Quad => t * t,
        Curve::Cubic => t * t * t,
        Curve::Quart => t * t * t * t,
        Curve::Expo => {
            if t == 0.0 {
                0.0
            } else {
                2f64.powf(10.0 * (t - 1.0))
            }
        }
        Curve::Circ => 1.0 - (1.0 - t * t).sqrt(),
    }
}

impl FromStr for Easing {
    type Err = Error;

    /// Short names: `l`, then a curve prefix (`s` sine, `q` quad, `c` cubic,
    /// `qu` quart, `e` expo, `ci` circ) followed by `ei`, `eo` or `eio`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "l" || s == "linear" {
            return Ok(Easing::Linear);
        }

        let (prefix, direction) = if let Some(p) = s.strip_suffix("eio") {
            (p, Direction::InOut)
        } else if let Some(p) = s.strip_suffix("ei") {
            (p, Direction::In)
        } else if let Some(p) = s.strip_suffix("eo") {
            (p, Direction::Out)
        } else {
            return Err(Error::UnknownEasing(s.to_string()));
        };

        let curve = match prefix {
            "s" => Curve::Sine,
            "q" => Curve::Quad,
            "c" => Curve::Cubic,
            "qu" => Curve::Quart,
            "e" => Curve::Expo,
            "ci" => Curve::Circ,
            _ => return Err(Error::UnknownEasing(s.to_string())),
        };

        Ok(Easing::Curve(curve, direction))
    }
}

/// Eases `value` (expected in `[0, 1]`) and scales it into `range`.
pub fn ez(value: f64, easing: Easing, range: (f64, f64)) -> f64 {
    let (lo, hi) = range;
    lo + (hi - lo) * easing.apply(value)
}
