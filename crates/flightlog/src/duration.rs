//! Elapsed-time values for flight durations.
//!
//! [`FlightDuration`] is a signed count of seconds with a canonical textual
//! form of `H:MM:SS`, where hours are unpadded and may exceed 24.

use std::fmt;
use std::iter::Sum;
use std::num::NonZeroUsize;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// An elapsed-time quantity with second precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlightDuration(i64);

impl FlightDuration {
    /// The zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Create a duration from a number of seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Create a duration from hours, minutes and seconds.
    #[must_use]
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self(
            i64::from(hours) * SECONDS_PER_HOUR
                + i64::from(minutes) * SECONDS_PER_MINUTE
                + i64::from(seconds),
        )
    }

    /// Elapsed time from `take_off` to `landing`.
    ///
    /// A landing earlier in the day than the take-off is treated as landing
    /// on the following day, so the result is always in `0..24h`.
    #[must_use]
    pub fn between(take_off: NaiveTime, landing: NaiveTime) -> Self {
        let start = i64::from(take_off.num_seconds_from_midnight());
        let end = i64::from(landing.num_seconds_from_midnight());
        let elapsed = end - start;
        if elapsed < 0 {
            Self(elapsed + SECONDS_PER_DAY)
        } else {
            Self(elapsed)
        }
    }

    /// Parse a duration from `H:MM:SS` text.
    ///
    /// The input must split on `:` into exactly three unsigned integers. A
    /// single leading `-` marks a negative duration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if the text is not a colon-separated triple
    /// of integers.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let segments: Vec<&str> = body.split(':').collect();
        let [hours, minutes, seconds] = segments.as_slice() else {
            return Err(Error::format(
                text,
                format!("expected 3 ':'-separated segments, found {}", segments.len()),
            ));
        };

        let parse_segment = |segment: &str, name: &str| {
            segment
                .parse::<u32>()
                .map_err(|_| Error::format(text, format!("{name} '{segment}' is not an integer")))
        };

        let duration = Self::from_hms(
            parse_segment(*hours, "hours")?,
            parse_segment(*minutes, "minutes")?,
            parse_segment(*seconds, "seconds")?,
        );
        Ok(if negative { -duration } else { duration })
    }

    /// Total number of seconds.
    #[must_use]
    pub const fn as_seconds(self) -> i64 {
        self.0
    }

    /// Whether the duration is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Floor division by a count, used for averaging.
    #[must_use]
    pub fn div_floor(self, count: NonZeroUsize) -> Self {
        let divisor = i64::try_from(count.get()).unwrap_or(i64::MAX);
        Self(self.0.div_euclid(divisor))
    }
}

impl fmt::Display for FlightDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let total = self.0.unsigned_abs();
        let hours = total / 3600;
        let minutes = total % 3600 / 60;
        let seconds = total % 60;
        write!(f, "{sign}{hours}:{minutes:02}:{seconds:02}")
    }
}

impl FromStr for FlightDuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Add for FlightDuration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for FlightDuration {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for FlightDuration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for FlightDuration {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for FlightDuration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a FlightDuration> for FlightDuration {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for FlightDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FlightDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
