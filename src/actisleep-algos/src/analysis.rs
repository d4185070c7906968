use actisleep_codec::AwcRecord;

use crate::light::LightSchedule;
use crate::nightly::{DateVariableRow, NightlyOptions, nightly_variables};
use crate::score::DEFAULT_THRESHOLD;
use crate::series::ActivitySeries;
use crate::transition::Criteria;

/// The full set of analysis tunables, passed explicitly through the
/// pipeline instead of living in ambient settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis {
    pub threshold: f64,
    pub sleep_criteria: Criteria,
    pub wake_criteria: Criteria,
    pub options: NightlyOptions,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            sleep_criteria: Criteria::default(),
            wake_criteria: Criteria::default(),
            options: NightlyOptions::default(),
        }
    }
}

impl Analysis {
    /// Scores and transition-marks a decoded record.
    pub fn prepare(&self, record: AwcRecord) -> ActivitySeries {
        let mut series = ActivitySeries::from(record);
        series.score(self.threshold);
        series.detect_transitions(self.sleep_criteria, self.wake_criteria);
        series
    }

    /// Record in, nightly variable rows out.
    pub fn run<S>(&self, record: AwcRecord, schedule: &S) -> Vec<DateVariableRow>
    where
        S: LightSchedule + ?Sized,
    {
        let series = self.prepare(record);
        nightly_variables(&series, schedule, self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::FixedSchedule;
    use crate::series::SleepState;
    use chrono::NaiveDate;

    fn record() -> AwcRecord {
        let mut activity = vec![400_u32; 2880];
        // Quiet night: 21:00 on day one to 06:00 on day two
        for minute in 660..1200 {
            activity[minute] = 0;
        }
        AwcRecord {
            id: "A7".to_owned(),
            start: NaiveDate::from_ymd_opt(2006, 4, 24)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            activity,
        }
    }

    #[test]
    fn prepare_scores_and_marks() {
        let series = Analysis::default().prepare(record());
        assert_eq!(series.id(), "A7");
        assert!(series.states().contains(&SleepState::Sleep));
        assert!(series.transitions().iter().any(Option::is_some));
    }

    #[test]
    fn run_emits_one_complete_night() {
        let rows = Analysis::default().run(record(), &FixedSchedule::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].flag, None);
        assert_eq!(rows[0].dark_period, Some(720));
    }
}
