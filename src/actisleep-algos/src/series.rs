use std::fmt;
use std::ops::Range;

use actisleep_codec::AwcRecord;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::score;
use crate::transition::{self, Criteria};

/// Per-minute sleep/wake classification. The first and last two minutes of a
/// scored series stay `Undefined`: the weighted window does not fit there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepState {
    Sleep,
    Wake,
    Undefined,
}

/// A sustained change of coarse phase, marked at the first minute of the
/// window that satisfied the hybrid criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    SleepOnset,
    WakeOnset,
}

/// One subject-recording: the raw counts plus the two derived sequences.
/// The three vectors always have equal length; `state` and `transition` are
/// recomputed wholesale by [`score`](Self::score) and
/// [`detect_transitions`](Self::detect_transitions) and cannot be mutated
/// independently.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySeries {
    id: String,
    start: NaiveDateTime,
    activity: Vec<u32>,
    state: Vec<SleepState>,
    transition: Vec<Option<Transition>>,
}

impl ActivitySeries {
    pub fn new(id: String, start: NaiveDateTime, activity: Vec<u32>) -> Self {
        let n = activity.len();
        Self {
            id,
            start,
            activity,
            state: vec![SleepState::Undefined; n],
            transition: vec![None; n],
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn len(&self) -> usize {
        self.activity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_empty()
    }

    pub fn activity(&self) -> &[u32] {
        &self.activity
    }

    pub fn states(&self) -> &[SleepState] {
        &self.state
    }

    pub fn transitions(&self) -> &[Option<Transition>] {
        &self.transition
    }

    /// Classify every minute with the Cole-Kripke weighted sum.
    pub fn score(&mut self, threshold: f64) {
        self.state = score::cole_kripke(&self.activity, threshold);
    }

    /// Mark sustained phase changes in the scored sequence. Call after
    /// [`score`](Self::score); an unscored series yields no transitions.
    pub fn detect_transitions(&mut self, sleep: Criteria, wake: Criteria) {
        self.transition = transition::detect_transitions(&self.state, sleep, wake);
    }

    pub fn state_at(&self, minute: usize) -> Option<SleepState> {
        self.state.get(minute).copied()
    }

    pub fn transition_at(&self, minute: usize) -> Option<Transition> {
        self.transition.get(minute).copied().flatten()
    }

    /// Timestamp of a minute index (valid for any index, in or out of range).
    pub fn time_of(&self, minute: usize) -> NaiveDateTime {
        self.start + TimeDelta::minutes(minute as i64)
    }

    /// Whether a timestamp falls on a recorded minute.
    pub fn covers(&self, ts: NaiveDateTime) -> bool {
        let offset = ts - self.start;
        offset >= TimeDelta::zero() && offset < TimeDelta::minutes(self.len() as i64)
    }

    /// Calendar dates spanned by the recording, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let Some(last) = self.len().checked_sub(1) else {
            return Vec::new();
        };

        let end = self.time_of(last).date();
        let mut dates = Vec::new();
        let mut date = self.start.date();
        while date <= end {
            dates.push(date);
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        dates
    }

    /// Sleep and wake minute counts in `[from, to)`. The scan range is
    /// clamped to the recording; minutes outside it are skipped, which is how
    /// partial first/last days drop out of period totals.
    pub fn count_states(&self, from: NaiveDateTime, to: NaiveDateTime) -> (i64, i64) {
        let mut sleep = 0;
        let mut wake = 0;
        for minute in self.clamped_range(from, to) {
            match self.state[minute] {
                SleepState::Sleep => sleep += 1,
                SleepState::Wake => wake += 1,
                SleepState::Undefined => {}
            }
        }
        (sleep, wake)
    }

    /// The marked transition of `kind` whose minute is closest to `target`,
    /// scanning in ascending time order so an exact distance tie keeps the
    /// earlier candidate.
    pub fn nearest_transition(
        &self,
        kind: Transition,
        target: NaiveDateTime,
    ) -> Option<NaiveDateTime> {
        let mut best: Option<(i64, NaiveDateTime)> = None;
        for (minute, mark) in self.transition.iter().enumerate() {
            if *mark != Some(kind) {
                continue;
            }
            let ts = self.time_of(minute);
            let distance = (ts - target).num_minutes().abs();
            if best.is_none_or(|(b, _)| distance < b) {
                best = Some((distance, ts));
            }
        }
        best.map(|(_, ts)| ts)
    }

    fn clamped_range(&self, from: NaiveDateTime, to: NaiveDateTime) -> Range<usize> {
        let n = self.len() as i64;
        let a = (from - self.start).num_minutes().clamp(0, n) as usize;
        let b = (to - self.start).num_minutes().clamp(0, n) as usize;
        a..b.max(a)
    }
}

impl From<AwcRecord> for ActivitySeries {
    fn from(record: AwcRecord) -> Self {
        Self::new(record.id, record.start, record.activity)
    }
}

impl fmt::Display for SleepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            SleepState::Sleep => "s",
            SleepState::Wake => "w",
            SleepState::Undefined => "-",
        };
        f.write_str(c)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Transition::SleepOnset => "S",
            Transition::WakeOnset => "W",
        };
        f.write_str(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2006, 4, 24)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    fn series(len: usize) -> ActivitySeries {
        ActivitySeries::new("T".to_owned(), base(), vec![0; len])
    }

    #[test]
    fn sequences_share_length_from_construction() {
        let s = series(100);
        assert_eq!(s.states().len(), 100);
        assert_eq!(s.transitions().len(), 100);
        assert!(s.states().iter().all(|&st| st == SleepState::Undefined));
    }

    #[test]
    fn covers_is_half_open() {
        let s = series(60);
        assert!(s.covers(base()));
        assert!(s.covers(base() + TimeDelta::minutes(59)));
        assert!(!s.covers(base() + TimeDelta::minutes(60)));
        assert!(!s.covers(base() - TimeDelta::minutes(1)));
    }

    #[test]
    fn dates_span_first_to_last_minute() {
        // 14:00 on the 24th + 2880 minutes: last minute is 13:59 on the 26th
        let s = series(2880);
        let dates = s.dates();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2006, 4, 24).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2006, 4, 26).unwrap());
    }

    #[test]
    fn dates_handle_leap_february() {
        let start = NaiveDate::from_ymd_opt(2004, 2, 28)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let s = ActivitySeries::new("T".to_owned(), start, vec![0; 2 * 1440]);
        let dates = s.dates();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2004, 2, 28).unwrap(),
                NaiveDate::from_ymd_opt(2004, 2, 29).unwrap(),
            ]
        );
    }

    #[test]
    fn empty_series_has_no_dates() {
        assert!(series(0).dates().is_empty());
    }

    #[test]
    fn count_states_clamps_to_recording() {
        let mut s = ActivitySeries::new("T".to_owned(), base(), vec![0; 10]);
        s.score(1.0);
        // Minutes 2..8 scored sleep (all-zero activity), edges undefined
        let (sleep, wake) = s.count_states(base() - TimeDelta::hours(1), base() + TimeDelta::hours(1));
        assert_eq!(sleep, 6);
        assert_eq!(wake, 0);
    }

    #[test]
    fn nearest_transition_prefers_earlier_on_tie() {
        let mut s = series(100);
        s.transition[10] = Some(Transition::WakeOnset);
        s.transition[30] = Some(Transition::WakeOnset);
        // Equidistant from minute 20: the ascending scan keeps minute 10
        let found = s.nearest_transition(Transition::WakeOnset, s.time_of(20));
        assert_eq!(found, Some(s.time_of(10)));
    }

    #[test]
    fn nearest_transition_ignores_other_kind() {
        let mut s = series(100);
        s.transition[10] = Some(Transition::SleepOnset);
        assert_eq!(s.nearest_transition(Transition::WakeOnset, s.time_of(10)), None);
    }
}
