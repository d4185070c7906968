use chrono::TimeDelta;

use crate::record::AwcRecord;

/// Minutes of zeros a run must exceed before it is considered an off-wrist
/// period rather than genuine rest.
const TRIM_THRESHOLD: usize = 300;
/// Minutes at each end of the recording excluded from the run scan.
const TRIM_IGNORE: usize = 30;
/// Activity bouts of up to this many minutes do not break a zero run.
const BOUT_TOLERANCE: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimOutcome {
    pub leading: usize,
    pub trailing: usize,
}

impl AwcRecord {
    /// Drops long zero runs at either end of the recording, left behind when
    /// the logger keeps running before the device is worn or after it is
    /// taken off. A leading trim advances `start` so minute timestamps stay
    /// aligned.
    pub fn trim_zero_runs(&mut self) -> TrimOutcome {
        let leading = edge_zero_run(&self.activity, false);
        if leading > 0 {
            self.activity.drain(..leading);
            self.start += TimeDelta::minutes(leading as i64);
        }

        let trailing = edge_zero_run(&self.activity, true);
        if trailing > 0 {
            let keep = self.activity.len() - trailing;
            self.activity.truncate(keep);
        }

        TrimOutcome { leading, trailing }
    }
}

/// Length of the zero run at one edge, or 0 if it does not clear the trim
/// threshold. The scan starts `TRIM_IGNORE` minutes in and advances while any
/// of the next `BOUT_TOLERANCE + 1` minutes is zero.
fn edge_zero_run(activity: &[u32], from_end: bool) -> usize {
    let n = activity.len();
    let window = BOUT_TOLERANCE + 1;

    let at = |i: usize| {
        if from_end {
            activity[n - 1 - i]
        } else {
            activity[i]
        }
    };

    let mut run = 0;
    while run + TRIM_IGNORE + window <= n
        && (0..window).any(|k| at(run + TRIM_IGNORE + k) == 0)
    {
        run += 1;
    }

    if run > TRIM_THRESHOLD { run + TRIM_IGNORE } else { 0 }
}
