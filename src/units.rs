// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Running pace, expressed as whole seconds per kilometre

use std::fmt;
use std::str::FromStr;

const METERS_PER_KM: f64 = 1000.0;
const SECONDS_PER_MINUTE: u32 = 60;

/// A running pace in seconds per kilometre.
///
/// Ordering follows elapsed time, so a *smaller* pace is a *faster* one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pace {
    seconds_per_km: u32,
}

impl Pace {
    pub const fn from_seconds_per_km(seconds_per_km: u32) -> Self {
        Self { seconds_per_km }
    }

    /// Convert a horizontal speed in m/s into a pace.
    ///
    /// Returns `None` for zero, negative, or non-finite speeds, and for speeds
    /// so high that the pace rounds to zero.
    pub fn from_speed(meters_per_second: f64) -> Option<Self> {
        if !meters_per_second.is_finite() || meters_per_second <= 0.0 {
            return None;
        }

        let seconds_per_km = METERS_PER_KM / meters_per_second;
        if !seconds_per_km.is_finite() || seconds_per_km > f64::from(u32::MAX) {
            return None;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut minutes = (seconds_per_km / 60.0).floor() as u32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut seconds = (seconds_per_km % 60.0).round() as u32;
        if seconds == SECONDS_PER_MINUTE {
            minutes += 1;
            seconds = 0;
        }

        let total = minutes.checked_mul(SECONDS_PER_MINUTE)?.checked_add(seconds)?;
        (total > 0).then_some(Self::from_seconds_per_km(total))
    }

    pub const fn seconds_per_km(self) -> u32 {
        self.seconds_per_km
    }

    /// Equivalent speed in m/s
    pub fn speed(self) -> f64 {
        METERS_PER_KM / f64::from(self.seconds_per_km.max(1))
    }

    /// Estimated seconds needed to cover `meters` at this pace
    pub fn seconds_for(self, meters: f64) -> f64 {
        meters * f64::from(self.seconds_per_km) / METERS_PER_KM
    }

    pub fn is_faster_or_equal(self, other: Pace) -> bool {
        self.seconds_per_km <= other.seconds_per_km
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02}",
            self.seconds_per_km / SECONDS_PER_MINUTE,
            self.seconds_per_km % SECONDS_PER_MINUTE
        )
    }
}

/// Errors produced when parsing an `m:ss` pace string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaceParseError {
    #[error("pace '{0}' is not in m:ss format")]
    Format(String),

    #[error("pace '{0}' has seconds outside 0-59")]
    SecondsOutOfRange(String),

    #[error("pace '{0}' must be greater than zero")]
    Zero(String),
}

impl FromStr for Pace {
    type Err = PaceParseError;

    /// Parses `m:ss` (or a bare number of minutes) per kilometre
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (minutes, seconds) = match trimmed.split_once(':') {
            Some((minutes, seconds)) => (minutes, seconds),
            None => (trimmed, "0"),
        };

        let is_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(minutes) || !is_digits(seconds) || seconds.len() > 2 {
            return Err(PaceParseError::Format(input.to_string()));
        }

        let minutes: u32 = minutes
            .parse()
            .map_err(|_| PaceParseError::Format(input.to_string()))?;
        let seconds: u32 = seconds
            .parse()
            .map_err(|_| PaceParseError::Format(input.to_string()))?;
        if seconds >= SECONDS_PER_MINUTE {
            return Err(PaceParseError::SecondsOutOfRange(input.to_string()));
        }

        let total = minutes
            .checked_mul(SECONDS_PER_MINUTE)
            .and_then(|m| m.checked_add(seconds))
            .ok_or_else(|| PaceParseError::Format(input.to_string()))?;
        if total == 0 {
            return Err(PaceParseError::Zero(input.to_string()));
        }

        Ok(Self::from_seconds_per_km(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_to_pace() {
        assert_eq!(Pace::from_speed(2.5).unwrap().to_string(), "6:40");
        assert_eq!(Pace::from_speed(1000.0 / 300.0).unwrap().to_string(), "5:00");
        assert_eq!(Pace::from_speed(4.0).unwrap().to_string(), "4:10");
    }

    #[test]
    fn test_rounded_seconds_carry_into_minutes() {
        // 1000 / 2.7808 = 359.61 s/km
        assert_eq!(Pace::from_speed(2.7808).unwrap().to_string(), "6:00");
    }

    #[test]
    fn test_unusable_speeds() {
        assert_eq!(Pace::from_speed(0.0), None);
        assert_eq!(Pace::from_speed(-1.2), None);
        assert_eq!(Pace::from_speed(f64::NAN), None);
        assert_eq!(Pace::from_speed(1.0e9), None);
    }

    #[test]
    fn test_parse_pace() {
        assert_eq!("4:30".parse::<Pace>().unwrap().seconds_per_km(), 270);
        assert_eq!("10:05".parse::<Pace>().unwrap().seconds_per_km(), 605);
        assert_eq!("5".parse::<Pace>().unwrap().seconds_per_km(), 300);
        assert_eq!(" 4:07 ".parse::<Pace>().unwrap().to_string(), "4:07");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!("4:75".parse::<Pace>(), Err(PaceParseError::SecondsOutOfRange(_))));
        assert!(matches!("fast".parse::<Pace>(), Err(PaceParseError::Format(_))));
        assert!(matches!("4:300".parse::<Pace>(), Err(PaceParseError::Format(_))));
        assert!(matches!("-4:30".parse::<Pace>(), Err(PaceParseError::Format(_))));
        assert!(matches!("0:00".parse::<Pace>(), Err(PaceParseError::Zero(_))));
    }

    #[test]
    fn test_pace_comparison_and_speed() {
        let fast: Pace = "4:30".parse().unwrap();
        let slow: Pace = "4:50".parse().unwrap();
        assert!(fast.is_faster_or_equal(slow));
        assert!(!slow.is_faster_or_equal(fast));
        assert!(fast.speed() > slow.speed());
        assert!((Pace::from_seconds_per_km(300).seconds_for(1000.0) - 300.0).abs() < 1e-9);
    }
}
