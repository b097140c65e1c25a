// romsrs-reader/src/time.rs

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::fmt;
use thiserror::Error;

/// Units assumed when a time variable carries no usable `units` attribute.
pub const DEFAULT_TIME_UNITS: &str = "seconds since 1970-01-01 00:00:00";

const EPOCH_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Decoded `"<unit> since <epoch>"` descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeUnits {
    seconds_per_unit: f64,
    epoch: NaiveDateTime,
}

impl TimeUnits {
    pub fn parse(units: &str) -> Result<Self, TimeUnitsError> {
        let parts: Vec<&str> = units.splitn(2, " since ").collect();
        if parts.len() != 2 {
            return Err(TimeUnitsError::MissingSince(units.to_string()));
        }
        let unit = parts[0].trim().to_lowercase();
        let seconds_per_unit = match unit.as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3600.0,
            "days" | "day" | "d" => 86400.0,
            _ => return Err(TimeUnitsError::UnknownUnit(unit)),
        };
        let epoch = Self::parse_epoch(parts[1])?;
        Ok(Self {
            seconds_per_unit,
            epoch,
        })
    }

    fn parse_epoch(epoch: &str) -> Result<NaiveDateTime, TimeUnitsError> {
        let trimmed = epoch
            .trim()
            .trim_end_matches(" UTC")
            .trim_end_matches('Z')
            .trim_end_matches("+00:00")
            .trim_end_matches("+0000")
            .trim();
        for format in EPOCH_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(parsed);
            }
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| TimeUnitsError::InvalidEpoch(epoch.trim().to_string()))
    }

    pub fn epoch(&self) -> NaiveDateTime {
        self.epoch
    }

    /// Millisecond resolution, matching what ROMS writes for `ocean_time`.
    pub fn decode(&self, value: f64) -> Result<NaiveDateTime, TimeUnitsError> {
        if !value.is_finite() {
            return Err(TimeUnitsError::NonFiniteValue);
        }
        let millis = (value * self.seconds_per_unit * 1000.0).round() as i64;
        self.epoch
            .checked_add_signed(Duration::milliseconds(millis))
            .ok_or(TimeUnitsError::OutOfRange(value))
    }
}

impl Default for TimeUnits {
    fn default() -> Self {
        Self {
            seconds_per_unit: 1.0,
            epoch: NaiveDate::from_ymd_opt(1970, 1, 1)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
        }
    }
}

/// Strictly increasing sequence of model output times.
#[derive(Clone, Debug)]
pub struct TimeAxis {
    times: Vec<NaiveDateTime>,
}

impl TimeAxis {
    pub fn new(times: Vec<NaiveDateTime>) -> Result<Self, TimeAxisError> {
        if times.is_empty() {
            return Err(TimeAxisError::Empty);
        }
        for (i, pair) in times.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(TimeAxisError::NotIncreasing(i + 1, pair[1]));
            }
        }
        Ok(Self { times })
    }

    pub fn decode(values: &[f64], units: &TimeUnits) -> Result<Self, TimeAxisError> {
        let times = values
            .iter()
            .map(|&value| units.decode(value))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(times)
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.times[0]
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.times[self.times.len() - 1]
    }

    /// Spacing of the first two samples; `None` for a single sample.
    pub fn time_step(&self) -> Option<Duration> {
        if self.times.len() > 1 {
            Some(self.times[1] - self.times[0])
        } else {
            None
        }
    }

    /// Closest sample to `time`, with its bracketing samples. Ties go to the
    /// earlier sample and requests beyond the axis clamp to its ends.
    pub fn nearest(&self, time: NaiveDateTime) -> NearestTime {
        let last = self.times.len() - 1;
        let insertion = self.times.partition_point(|t| *t < time);
        let index = if insertion == 0 {
            0
        } else if insertion > last {
            last
        } else if time - self.times[insertion - 1] <= self.times[insertion] - time {
            insertion - 1
        } else {
            insertion
        };
        let index_before = self
            .times
            .partition_point(|t| *t <= time)
            .saturating_sub(1);
        let index_after = (index_before + 1).min(last);
        NearestTime {
            nearest: self.times[index],
            before: self.times[index_before],
            after: self.times[index_after],
            index,
            index_before,
            index_after,
        }
    }
}

impl fmt::Display for TimeAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start_time(), self.end_time())?;
        match self.time_step() {
            Some(step) => write!(f, " every {} s ({} steps)", step.num_seconds(), self.len()),
            None => write!(f, " (single step)"),
        }
    }
}

/// Nearest sample to a requested time together with the samples bracketing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NearestTime {
    pub nearest: NaiveDateTime,
    pub before: NaiveDateTime,
    pub after: NaiveDateTime,
    pub index: usize,
    pub index_before: usize,
    pub index_after: usize,
}

#[derive(Error, Debug)]
pub enum TimeUnitsError {
    #[error("time units must look like '<unit> since <epoch>', got '{0}'")]
    MissingSince(String),
    #[error("unknown time unit '{0}'")]
    UnknownUnit(String),
    #[error("could not parse time epoch '{0}'")]
    InvalidEpoch(String),
    #[error("time value is not finite")]
    NonFiniteValue,
    #[error("time value {0} is outside the representable range")]
    OutOfRange(f64),
}

#[derive(Error, Debug)]
pub enum TimeAxisError {
    #[error("time axis has no samples")]
    Empty,
    #[error("time axis is not strictly increasing at index {0} ({1})")]
    NotIncreasing(usize, NaiveDateTime),
    #[error(transparent)]
    TimeUnitsError(#[from] TimeUnitsError),
}
