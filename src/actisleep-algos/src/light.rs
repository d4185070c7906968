use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// The light portion of one calendar day, from lights-on to lights-off.
/// The dark period runs from one day's `end` to the next day's `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightPeriod {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Resolves the light period for a calendar date. Implementations are
/// infallible: every valid date gets a period.
pub trait LightSchedule {
    fn light_period(&self, date: NaiveDate) -> LightPeriod;
}

/// Opaque sunrise/sunset source for daylight-adjusted schedules. `None`
/// means the source has no data for that date, not an error.
pub trait SunTimes {
    /// Returns `(sunrise, sunset)` local clock times for the date.
    fn sun_times(&self, date: NaiveDate) -> Option<(NaiveTime, NaiveTime)>;
}

/// Fixed clock-time schedule, the housing-room default of 07:00 lights-on
/// and 19:00 lights-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSchedule {
    lights_on: NaiveTime,
    lights_off: NaiveTime,
}

impl FixedSchedule {
    pub fn new(lights_on: NaiveTime, lights_off: NaiveTime) -> Self {
        Self { lights_on, lights_off }
    }

    pub fn lights_on(&self) -> NaiveTime {
        self.lights_on
    }

    pub fn lights_off(&self) -> NaiveTime {
        self.lights_off
    }
}

impl Default for FixedSchedule {
    fn default() -> Self {
        Self {
            lights_on: NaiveTime::from_hms_opt(7, 0, 0).expect("valid clock time"),
            lights_off: NaiveTime::from_hms_opt(19, 0, 0).expect("valid clock time"),
        }
    }
}

impl LightSchedule for FixedSchedule {
    fn light_period(&self, date: NaiveDate) -> LightPeriod {
        LightPeriod {
            start: date.and_time(self.lights_on),
            end: date.and_time(self.lights_off),
        }
    }
}

/// Fixed schedule widened by actual daylight: the light period starts at
/// whichever of sunrise and lights-on comes first and ends at whichever of
/// sunset and lights-off comes last. Dates the sun source cannot resolve
/// fall back to the fixed times, so the schedule never fails.
#[derive(Debug, Clone)]
pub struct DaylightSchedule<S> {
    fixed: FixedSchedule,
    sun: S,
}

impl<S: SunTimes> DaylightSchedule<S> {
    pub fn new(fixed: FixedSchedule, sun: S) -> Self {
        Self { fixed, sun }
    }
}

impl<S: SunTimes> LightSchedule for DaylightSchedule<S> {
    fn light_period(&self, date: NaiveDate) -> LightPeriod {
        let mut period = self.fixed.light_period(date);
        if let Some((sunrise, sunset)) = self.sun.sun_times(date) {
            period.start = period.start.min(date.and_time(sunrise));
            period.end = period.end.max(date.and_time(sunset));
        }
        period
    }
}

/// Date-keyed sunrise/sunset table, filled by whatever computed or observed
/// the times.
#[derive(Debug, Clone, Default)]
pub struct SunTable {
    times: BTreeMap<NaiveDate, (NaiveTime, NaiveTime)>,
}

impl SunTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, sunrise: NaiveTime, sunset: NaiveTime) {
        self.times.insert(date, (sunrise, sunset));
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

impl SunTimes for SunTable {
    fn sun_times(&self, date: NaiveDate) -> Option<(NaiveTime, NaiveTime)> {
        self.times.get(&date).copied()
    }
}
