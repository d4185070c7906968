use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;

use crate::light::{LightPeriod, LightSchedule};
use crate::series::{ActivitySeries, Transition};

/// Total-sleep-time bounds (minutes per night) outside which a night is
/// flagged as abnormal actigraphy.
pub const MIN_NORMAL_TST: i64 = 180;
pub const MAX_NORMAL_TST: i64 = 1080;

/// Data-quality note attached to a row that could not be closed normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowFlag {
    #[serde(rename = "END OF SERIES")]
    EndOfSeries,
    #[serde(rename = "UNDEFINED SLEEP PERIOD")]
    UndefinedSleepPeriod,
    #[serde(rename = "ABNORMAL ACTIGRAPHY")]
    AbnormalActigraphy,
}

impl fmt::Display for RowFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RowFlag::EndOfSeries => "END OF SERIES",
            RowFlag::UndefinedSleepPeriod => "UNDEFINED SLEEP PERIOD",
            RowFlag::AbnormalActigraphy => "ABNORMAL ACTIGRAPHY",
        };
        f.write_str(text)
    }
}

/// One calendar date's derived sleep variables. Offsets and period lengths
/// are signed minutes; `se` and `noc` are ratios, with `noc` taking the
/// `+inf` sentinel when the 24-hour window holds no sleep at all. A row is
/// immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateVariableRow {
    pub id: String,
    pub date: NaiveDate,
    pub light_start: NaiveDateTime,
    pub light_end: NaiveDateTime,
    pub sleep_start: Option<NaiveDateTime>,
    pub sleep_end: Option<NaiveDateTime>,
    #[serde(rename = "SOL")]
    pub sol: Option<i64>,
    #[serde(rename = "TWAK")]
    pub twak: Option<i64>,
    pub dark_period: Option<i64>,
    pub sleep_period: Option<i64>,
    #[serde(rename = "TST")]
    pub tst: Option<i64>,
    #[serde(rename = "dark_TST")]
    pub dark_tst: Option<i64>,
    #[serde(rename = "sleep_TST")]
    pub sleep_tst: Option<i64>,
    #[serde(rename = "WASO")]
    pub waso: Option<i64>,
    #[serde(rename = "SE")]
    pub se: Option<f64>,
    #[serde(rename = "NOC")]
    pub noc: Option<f64>,
    pub flag: Option<RowFlag>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NightlyOptions {
    /// Retain flagged rows (with their flag text) instead of omitting them.
    pub keep_flagged: bool,
}

/// Derives one row per calendar date covered by the series, in ascending
/// date order.
///
/// Each date's scan locates the wake transition nearest its lights-on
/// boundary and the sleep transition nearest its lights-off boundary. The
/// current row records the lights-off side (sleep start, onset latency);
/// everything that needs the following morning - dark and sleep periods,
/// the TST counts, efficiency and consolidation - is filled into the
/// previous date's row, which is only then emitted. The final row never
/// gets that closing pass and is flagged `END OF SERIES`.
pub fn nightly_variables<S>(
    series: &ActivitySeries,
    schedule: &S,
    options: NightlyOptions,
) -> Vec<DateVariableRow>
where
    S: LightSchedule + ?Sized,
{
    let mut rows = Vec::new();
    let mut open: Option<DateVariableRow> = None;

    for date in series.dates() {
        let period = schedule.light_period(date);

        let sleep_end = series
            .covers(period.start)
            .then(|| series.nearest_transition(Transition::WakeOnset, period.start))
            .flatten();
        let sleep_start = series
            .covers(period.end)
            .then(|| series.nearest_transition(Transition::SleepOnset, period.end))
            .flatten();

        if let Some(prev) = open.take() {
            let closed = close_row(series, prev, date, &period, sleep_end);
            push_row(&mut rows, closed, options);
        }

        open = Some(DateVariableRow {
            id: series.id().to_owned(),
            date,
            light_start: period.start,
            light_end: period.end,
            sleep_start,
            sleep_end: None,
            sol: sleep_start.map(|s| (s - period.end).num_minutes()),
            twak: None,
            dark_period: None,
            sleep_period: None,
            tst: None,
            dark_tst: None,
            sleep_tst: None,
            waso: None,
            se: None,
            noc: None,
            flag: None,
        });
    }

    if let Some(mut last) = open.take() {
        last.flag = Some(RowFlag::EndOfSeries);
        push_row(&mut rows, last, options);
    }

    rows
}

/// Fills the previous date's closing fields from the current date's scan.
fn close_row(
    series: &ActivitySeries,
    mut prev: DateVariableRow,
    date: NaiveDate,
    period: &LightPeriod,
    sleep_end: Option<NaiveDateTime>,
) -> DateVariableRow {
    // Only the immediately following date of the same recording closes a row.
    if prev.id != series.id() || prev.date.succ_opt() != Some(date) {
        prev.flag = Some(RowFlag::EndOfSeries);
        return prev;
    }

    let dark_period = (period.start - prev.light_end).num_minutes();
    prev.dark_period = Some(dark_period);
    prev.sleep_end = sleep_end;
    prev.twak = sleep_end.map(|e| (period.start - e).num_minutes());

    let (Some(sleep_start), Some(sleep_end)) = (prev.sleep_start, sleep_end) else {
        prev.flag = Some(RowFlag::UndefinedSleepPeriod);
        return prev;
    };

    prev.sleep_period = Some((sleep_end - sleep_start).num_minutes());

    let window_start = prev.date.and_time(noon());
    let (tst, _) = series.count_states(window_start, window_start + TimeDelta::hours(24));
    let (dark_tst, _) = series.count_states(prev.light_end, period.start);
    let (sleep_tst, waso) = series.count_states(sleep_start, sleep_end);

    prev.tst = Some(tst);
    prev.dark_tst = Some(dark_tst);
    prev.sleep_tst = Some(sleep_tst);
    prev.waso = Some(waso);

    prev.se = (dark_period > 0).then(|| dark_tst as f64 / dark_period as f64);
    prev.noc = Some(if tst > 0 {
        sleep_tst as f64 / tst as f64
    } else {
        f64::INFINITY
    });

    if !(MIN_NORMAL_TST..MAX_NORMAL_TST).contains(&tst) {
        prev.flag = Some(RowFlag::AbnormalActigraphy);
    }

    prev
}

fn push_row(rows: &mut Vec<DateVariableRow>, row: DateVariableRow, options: NightlyOptions) {
    if row.flag.is_none() || options.keep_flagged {
        rows.push(row);
    }
}

/// Anchor of the noon-to-noon window the 24-hour TST count runs over.
fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).expect("valid clock time")
}
