use core::f32::consts::PI;
use core::str::FromStr;

use alloc::string::{String, ToString};

use thiserror::Error;

/// Easing curves mapping linear time `t ∈ [0, 1]` to eased progress.
///
/// `Power*` variants follow the GSAP naming: `power1` is quadratic, `power2` cubic, and so on.
/// Every curve returns exactly `0.0` at `t <= 0` and `1.0` at `t >= 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    SmoothStep,
    EaseInOutCubic,
    PowerIn(u8),
    PowerOut(u8),
    PowerInOut(u8),
    SineInOut,
    ExpoOut,
    BackOut { overshoot: f32 },
    ElasticOut { amplitude: f32, period: f32 },
}

impl Default for Easing {
    fn default() -> Self {
        Self::Linear
    }
}

impl Easing {
    pub const STANDARD_OUT: Self = Self::PowerOut(1);

    pub fn sample(self, t: f32) -> f32 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - (u * u * u) / 2.0
                }
            }
            Self::PowerIn(n) => ease_in(t, n),
            Self::PowerOut(n) => 1.0 - ease_in(1.0 - t, n),
            Self::PowerInOut(n) => {
                if t < 0.5 {
                    ease_in(2.0 * t, n) / 2.0
                } else {
                    1.0 - ease_in(2.0 * (1.0 - t), n) / 2.0
                }
            }
            Self::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Self::ExpoOut => 1.0 - 2f32.powf(-10.0 * t),
            Self::BackOut { overshoot } => {
                let u = t - 1.0;
                u * u * ((overshoot + 1.0) * u + overshoot) + 1.0
            }
            Self::ElasticOut { amplitude, period } => {
                let period = if period > 0.0 { period } else { 0.3 };
                let a = amplitude.max(1.0);
                let shift = period / (2.0 * PI) * (1.0 / a).asin();
                a * 2f32.powf(-10.0 * t) * ((t - shift) * (2.0 * PI) / period).sin() + 1.0
            }
        }
    }
}

fn ease_in(t: f32, power: u8) -> f32 {
    t.powi(i32::from(power) + 1)
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown easing `{0}`")]
pub struct ParseEasingError(pub String);

impl FromStr for Easing {
    type Err = ParseEasingError;

    /// Accepts GSAP-style names: `none`, `linear`, `power2.inOut`, `sine.inOut`, `expo.out`,
    /// `back.out(1.2)`, `elastic.out(1, 0.3)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseEasingError(s.to_string());
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let (head, args) = match compact.split_once('(') {
            Some((head, rest)) => (head, Some(rest.strip_suffix(')').ok_or_else(err)?)),
            None => (compact.as_str(), None),
        };
        let params: Vec<f32> = match args {
            Some("") | None => Vec::new(),
            Some(list) => list
                .split(',')
                .map(|p| p.parse::<f32>().map_err(|_| err()))
                .collect::<Result<_, _>>()?,
        };
        let (family, mode) = head.split_once('.').unwrap_or((head, "out"));

        let power = |n: u8| match mode {
            "in" => Ok(Self::PowerIn(n)),
            "out" => Ok(Self::PowerOut(n)),
            "inOut" => Ok(Self::PowerInOut(n)),
            _ => Err(err()),
        };

        match (family, mode) {
            ("none" | "linear", _) => Ok(Self::Linear),
            ("smoothstep", _) => Ok(Self::SmoothStep),
            ("power0", _) => Ok(Self::Linear),
            ("power1" | "quad", _) => power(1),
            ("power2" | "cubic", _) => power(2),
            ("power3" | "quart", _) => power(3),
            ("power4" | "quint", _) => power(4),
            ("sine", "inOut") => Ok(Self::SineInOut),
            ("expo", "out") => Ok(Self::ExpoOut),
            ("back", "out") => Ok(Self::BackOut {
                overshoot: params.first().copied().unwrap_or(1.70158),
            }),
            ("elastic", "out") => Ok(Self::ElasticOut {
                amplitude: params.first().copied().unwrap_or(1.0),
                period: params.get(1).copied().unwrap_or(0.3),
            }),
            _ => Err(err()),
        }
    }
}
