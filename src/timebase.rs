//! Rational time bases and timestamp rescaling.
//!
//! A [`TimeBase`] is the number of seconds represented by one timestamp tick,
//! expressed as `numerator / denominator`. [`rescale_rounded`] converts a tick
//! count between two time bases with exact 128-bit intermediate arithmetic,
//! following the same rounding modes as FFmpeg's `av_rescale_q_rnd`.
//!
//! # Example
//!
//! ```
//! use retime::{Rounding, TimeBase, rescale_rounded};
//!
//! let mpeg_ts = TimeBase::new(1, 90_000);
//! let millis = TimeBase::new(1, 1_000);
//! let rescaled = rescale_rounded(90_000, mpeg_ts, millis, Rounding::NearInfinity, true);
//! assert_eq!(rescaled, 1_000);
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

/// The value FFmpeg uses for "no timestamp" (`AV_NOPTS_VALUE`).
///
/// It coincides with `i64::MIN`, so it is one of the two extremes that
/// [`rescale_rounded`] passes through unchanged when asked to.
pub const NOPTS_VALUE: i64 = i64::MIN;

/// A rational number of seconds per timestamp tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeBase {
    numerator: i32,
    denominator: i32,
}

impl TimeBase {
    /// Create a time base of `numerator / denominator` seconds per tick.
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Seconds-per-tick numerator.
    pub const fn numerator(self) -> i32 {
        self.numerator
    }

    /// Seconds-per-tick denominator.
    pub const fn denominator(self) -> i32 {
        self.denominator
    }

    /// Whether both terms are strictly positive.
    pub const fn is_valid(self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    /// Convert a tick count in this time base to seconds.
    pub fn seconds(self, ticks: i64) -> f64 {
        ticks as f64 * self.numerator as f64 / (self.denominator.max(1)) as f64
    }
}

impl Display for TimeBase {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(formatter, "{}/{}", self.numerator, self.denominator)
    }
}

/// Rounding applied when a rescaled value falls between two ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round toward zero.
    Zero,
    /// Round away from zero.
    Infinity,
    /// Round toward negative infinity.
    Down,
    /// Round toward positive infinity.
    Up,
    /// Round to nearest, halfway cases away from zero.
    NearInfinity,
}

impl Rounding {
    /// The mode to use on the magnitude of a negative value so that the
    /// signed result rounds in the requested direction.
    fn mirrored(self) -> Self {
        match self {
            Rounding::Down => Rounding::Up,
            Rounding::Up => Rounding::Down,
            other => other,
        }
    }
}

/// Rescale `value` from `from` ticks to `to` ticks.
///
/// When `pass_min_max` is set, `i64::MIN` ([`NOPTS_VALUE`]) and `i64::MAX`
/// are returned unchanged instead of being treated as finite tick counts.
/// A result that does not fit in an `i64`, or a destination time base that is
/// not [valid](TimeBase::is_valid), yields [`NOPTS_VALUE`].
pub fn rescale_rounded(
    value: i64,
    from: TimeBase,
    to: TimeBase,
    rounding: Rounding,
    pass_min_max: bool,
) -> i64 {
    if pass_min_max && (value == i64::MIN || value == i64::MAX) {
        return value;
    }

    let multiplier = i128::from(from.numerator) * i128::from(to.denominator);
    let divisor = i128::from(to.numerator) * i128::from(from.denominator);
    if divisor <= 0 || multiplier < 0 {
        return NOPTS_VALUE;
    }

    let result = if value < 0 {
        // -i64::MIN is not representable; clamp like FFmpeg does.
        let magnitude = -i128::from(value.max(-i64::MAX));
        -scale_magnitude(magnitude, multiplier, divisor, rounding.mirrored())
    } else {
        scale_magnitude(i128::from(value), multiplier, divisor, rounding)
    };

    i64::try_from(result).unwrap_or(NOPTS_VALUE)
}

/// Rescale with round-to-nearest and no sentinel handling.
///
/// This is the conversion used for packet durations.
pub fn rescale(value: i64, from: TimeBase, to: TimeBase) -> i64 {
    rescale_rounded(value, from, to, Rounding::NearInfinity, false)
}

fn scale_magnitude(magnitude: i128, multiplier: i128, divisor: i128, rounding: Rounding) -> i128 {
    let bias = match rounding {
        Rounding::Zero | Rounding::Down => 0,
        Rounding::Infinity | Rounding::Up => divisor - 1,
        Rounding::NearInfinity => divisor / 2,
    };
    (magnitude * multiplier + bias) / divisor
}
