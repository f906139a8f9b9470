use crate::errors::{CustomResult, Error};

/// Sentinel the live timing system writes for incomplete or invalidated laps.
pub const INVALID_LAP_TIME: &str = "00:00.---";

pub struct TimingHelper {}

impl TimingHelper {
    /// Convert a `M:SS.mmm` lap time string to seconds.
    pub fn parse_lap_time(raw: &str) -> CustomResult<f64> {
        let malformed = || Error::MalformedValue {
            value: raw.to_string(),
            expected: "lap time (M:SS.mmm)",
        };

        let (minutes, seconds) = raw.split_once(':').ok_or_else(malformed)?;
        let minutes: f64 = minutes.trim().parse().map_err(|_| malformed())?;
        let seconds: f64 = seconds.trim().parse().map_err(|_| malformed())?;

        Ok(minutes * 60.0 + seconds)
    }

    /// Convert a fuel percentage string (`"87%"`) to a fraction in [0, 1].
    pub fn parse_fuel(raw: &str) -> CustomResult<f64> {
        let malformed = || Error::MalformedValue {
            value: raw.to_string(),
            expected: "fuel percentage",
        };

        let percent = raw.trim().strip_suffix('%').ok_or_else(malformed)?;
        let percent: f64 = percent.parse().map_err(|_| malformed())?;

        Ok(percent / 100.0)
    }

    /// Strip the single leading lap-code letter from a stint boundary value
    /// (`"L12"` encodes "lap 12") and coerce the rest to an integer.
    pub fn parse_lap_number(raw: &str) -> CustomResult<i32> {
        let malformed = || Error::MalformedValue {
            value: raw.to_string(),
            expected: "lap number with leading lap code",
        };

        let raw = raw.trim();
        let mut chars = raw.chars();
        match chars.next() {
            Some(c) if c.is_alphabetic() => chars.as_str().parse().map_err(|_| malformed()),
            _ => Err(malformed()),
        }
    }
}
