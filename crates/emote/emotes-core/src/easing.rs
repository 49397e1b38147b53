//! Easing kinds attached to keyframes.
//!
//! Each kind has three spellings:
//! - a stable byte id used on the binary wire,
//! - a JSON name (`"linear"`, `"easeInOutSine"`),
//! - case-insensitive parse aliases with or without the `ease` prefix.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ease {
    #[default]
    Linear,
    Constant,
    InSine,
    OutSine,
    InOutSine,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuad,
    OutQuad,
    InOutQuad,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InExpo,
    OutExpo,
    InOutExpo,
    InCirc,
    OutCirc,
    InOutCirc,
    InBack,
    OutBack,
    InOutBack,
    InElastic,
    OutElastic,
    InOutElastic,
    InBounce,
    OutBounce,
    InOutBounce,
}

/// (kind, wire id, JSON name)
const TABLE: [(Ease, u8, &str); 32] = [
    (Ease::Linear, 0, "linear"),
    (Ease::Constant, 1, "constant"),
    (Ease::InSine, 6, "easeInSine"),
    (Ease::OutSine, 7, "easeOutSine"),
    (Ease::InOutSine, 8, "easeInOutSine"),
    (Ease::InCubic, 9, "easeInCubic"),
    (Ease::OutCubic, 10, "easeOutCubic"),
    (Ease::InOutCubic, 11, "easeInOutCubic"),
    (Ease::InQuad, 12, "easeInQuad"),
    (Ease::OutQuad, 13, "easeOutQuad"),
    (Ease::InOutQuad, 14, "easeInOutQuad"),
    (Ease::InQuart, 15, "easeInQuart"),
    (Ease::OutQuart, 16, "easeOutQuart"),
    (Ease::InOutQuart, 17, "easeInOutQuart"),
    (Ease::InQuint, 18, "easeInQuint"),
    (Ease::OutQuint, 19, "easeOutQuint"),
    (Ease::InOutQuint, 20, "easeInOutQuint"),
    (Ease::InExpo, 21, "easeInExpo"),
    (Ease::OutExpo, 22, "easeOutExpo"),
    (Ease::InOutExpo, 23, "easeInOutExpo"),
    (Ease::InCirc, 24, "easeInCirc"),
    (Ease::OutCirc, 25, "easeOutCirc"),
    (Ease::InOutCirc, 26, "easeInOutCirc"),
    (Ease::InBack, 27, "easeInBack"),
    (Ease::OutBack, 28, "easeOutBack"),
    (Ease::InOutBack, 29, "easeInOutBack"),
    (Ease::InElastic, 30, "easeInElastic"),
    (Ease::OutElastic, 31, "easeOutElastic"),
    (Ease::InOutElastic, 32, "easeInOutElastic"),
    (Ease::InBounce, 33, "easeInBounce"),
    (Ease::OutBounce, 34, "easeOutBounce"),
    (Ease::InOutBounce, 35, "easeInOutBounce"),
];

#[inline]
fn strip_ease_prefix(s: &str) -> &str {
    match s.get(..4) {
        Some(prefix) if s.len() > 4 && prefix.eq_ignore_ascii_case("ease") => &s[4..],
        _ => s,
    }
}

impl Ease {
    /// Every easing kind, in wire-id order.
    pub fn all() -> impl Iterator<Item = Ease> {
        TABLE.iter().map(|(ease, _, _)| *ease)
    }

    /// Stable id used by the binary format and network packets.
    pub fn id(self) -> u8 {
        TABLE
            .iter()
            .find(|(ease, _, _)| *ease == self)
            .map(|(_, id, _)| *id)
            .unwrap_or(0)
    }

    pub fn from_id(id: u8) -> Result<Self, ModelError> {
        TABLE
            .iter()
            .find(|(_, candidate, _)| *candidate == id)
            .map(|(ease, _, _)| *ease)
            .ok_or(ModelError::UnknownEasingId(id))
    }

    /// Name written by the JSON format.
    pub fn json_name(self) -> &'static str {
        TABLE
            .iter()
            .find(|(ease, _, _)| *ease == self)
            .map(|(_, _, name)| *name)
            .unwrap_or("linear")
    }

    /// Evaluate the curve at `t` in `[0, 1]`.
    ///
    /// `Constant` holds the previous keyframe until the next one is reached.
    pub fn apply(self, t: f32) -> f32 {
        const C1: f32 = 1.70158;
        const C2: f32 = C1 * 1.525;
        const C3: f32 = C1 + 1.0;
        const C4: f32 = (2.0 * PI) / 3.0;
        const C5: f32 = (2.0 * PI) / 4.5;

        match self {
            Ease::Linear => t,
            Ease::Constant => 0.0,
            Ease::InSine => 1.0 - (t * PI / 2.0).cos(),
            Ease::OutSine => (t * PI / 2.0).sin(),
            Ease::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Ease::InCubic => t * t * t,
            Ease::OutCubic => 1.0 - (1.0 - t).powi(3),
            Ease::InOutCubic => in_out(t, 3, 4.0),
            Ease::InQuad => t * t,
            Ease::OutQuad => 1.0 - (1.0 - t).powi(2),
            Ease::InOutQuad => in_out(t, 2, 2.0),
            Ease::InQuart => t.powi(4),
            Ease::OutQuart => 1.0 - (1.0 - t).powi(4),
            Ease::InOutQuart => in_out(t, 4, 8.0),
            Ease::InQuint => t.powi(5),
            Ease::OutQuint => 1.0 - (1.0 - t).powi(5),
            Ease::InOutQuint => in_out(t, 5, 16.0),
            Ease::InExpo => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * t - 10.0)
                }
            }
            Ease::OutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Ease::InOutExpo => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    2f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Ease::InCirc => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Ease::OutCirc => (1.0 - (t - 1.0).powi(2)).max(0.0).sqrt(),
            Ease::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).max(0.0).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).max(0.0).sqrt() + 1.0) / 2.0
                }
            }
            Ease::InBack => C3 * t * t * t - C1 * t * t,
            Ease::OutBack => 1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2),
            Ease::InOutBack => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((C2 + 1.0) * 2.0 * t - C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((C2 + 1.0) * (t * 2.0 - 2.0) + C2) + 2.0) / 2.0
                }
            }
            Ease::InElastic => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    -(2f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * C4).sin()
                }
            }
            Ease::OutElastic => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
                }
            }
            Ease::InOutElastic => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    -(2f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * C5).sin()) / 2.0
                } else {
                    (2f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * C5).sin()) / 2.0 + 1.0
                }
            }
            Ease::InBounce => 1.0 - bounce_out(1.0 - t),
            Ease::OutBounce => bounce_out(t),
            Ease::InOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }
}

/// Polynomial in-out: `scale * t^n` on the first half, mirrored on the second.
#[inline]
fn in_out(t: f32, n: i32, scale: f32) -> f32 {
    if t < 0.5 {
        scale * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

#[inline]
fn bounce_out(mut t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        t -= 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        t -= 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        t -= 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

impl FromStr for Ease {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = strip_ease_prefix(s.trim());
        TABLE
            .iter()
            .find(|(_, _, name)| strip_ease_prefix(name).eq_ignore_ascii_case(wanted))
            .map(|(ease, _, _)| *ease)
            .ok_or_else(|| ModelError::UnknownEasing(s.to_string()))
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_name())
    }
}
