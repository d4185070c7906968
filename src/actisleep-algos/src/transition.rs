use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::series::{SleepState, Transition};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("criteria must be written as n/d, got `{0}`")]
    Malformed(String),
    #[error("criteria count must be at least 1")]
    ZeroCount,
    #[error("criteria count {count} exceeds window {window}")]
    CountExceedsWindow { count: usize, window: usize },
}

/// Hybrid transition criteria `n/d`: a phase flip is sustained when at least
/// `n` of the `d` minutes starting at the evaluated minute are scored as the
/// opposite state. Always holds `1 <= n <= d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Criteria {
    count: usize,
    window: usize,
}

impl Criteria {
    pub fn new(count: usize, window: usize) -> Result<Self, CriteriaError> {
        if count == 0 {
            return Err(CriteriaError::ZeroCount);
        }
        if count > window {
            return Err(CriteriaError::CountExceedsWindow { count, window });
        }
        Ok(Self { count, window })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

/// The conventional 9-of-10 criteria used for both phases.
impl Default for Criteria {
    fn default() -> Self {
        Self { count: 9, window: 10 }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.count, self.window)
    }
}

impl FromStr for Criteria {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CriteriaError::Malformed(s.to_owned());

        let (count, window) = s.split_once('/').ok_or_else(malformed)?;
        let count = count.trim().parse().map_err(|_| malformed())?;
        let window = window.trim().parse().map_err(|_| malformed())?;
        Self::new(count, window)
    }
}

/// Scans the scored sequence with trailing tallies and marks sustained
/// sleep/wake onsets. Each criteria keeps its own window; evaluation happens
/// at window-start minutes, so the trailing `max(d) - 1` minutes are never
/// marked. Both phase flags start raised: the first sustained run of either
/// state fires, with the sleep branch taking precedence. After that, marks
/// strictly alternate. A window start whose own state is `Undefined` is not
/// evaluated at all.
pub fn detect_transitions(
    states: &[SleepState],
    sleep: Criteria,
    wake: Criteria,
) -> Vec<Option<Transition>> {
    let n = states.len();
    let mut marks = vec![None; n];

    let lookahead = sleep.window.max(wake.window);
    if n < lookahead {
        return marks;
    }

    let mut sleep_tally = states[..sleep.window]
        .iter()
        .filter(|&&s| s == SleepState::Sleep)
        .count();
    let mut wake_tally = states[..wake.window]
        .iter()
        .filter(|&&s| s == SleepState::Wake)
        .count();

    let mut awake = true;
    let mut asleep = true;

    let last_start = n - lookahead;
    for j in 0..=last_start {
        if states[j] != SleepState::Undefined {
            if awake && sleep_tally >= sleep.count {
                marks[j] = Some(Transition::SleepOnset);
                awake = false;
                asleep = true;
            } else if asleep && wake_tally >= wake.count {
                marks[j] = Some(Transition::WakeOnset);
                asleep = false;
                awake = true;
            }
        }

        if j < last_start {
            if states[j] == SleepState::Sleep {
                sleep_tally -= 1;
            }
            if states[j] == SleepState::Wake {
                wake_tally -= 1;
            }
            if states[j + sleep.window] == SleepState::Sleep {
                sleep_tally += 1;
            }
            if states[j + wake.window] == SleepState::Wake {
                wake_tally += 1;
            }
        }
    }

    marks
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn nine_of_ten() -> Criteria {
        Criteria::default()
    }

    fn run(states: &[SleepState]) -> Vec<Option<Transition>> {
        detect_transitions(states, nine_of_ten(), nine_of_ten())
    }

    fn pattern(specs: &[(usize, SleepState)]) -> Vec<SleepState> {
        specs
            .iter()
            .flat_map(|&(len, state)| std::iter::repeat_n(state, len))
            .collect()
    }

    #[test]
    fn criteria_validation() {
        assert!(Criteria::new(9, 10).is_ok());
        assert!(Criteria::new(10, 10).is_ok());
        assert_eq!(Criteria::new(0, 10), Err(CriteriaError::ZeroCount));
        assert_eq!(
            Criteria::new(11, 10),
            Err(CriteriaError::CountExceedsWindow { count: 11, window: 10 })
        );
    }

    #[test]
    fn criteria_parses_slash_notation() {
        let c: Criteria = "9/10".parse().unwrap();
        assert_eq!((c.count(), c.window()), (9, 10));
        assert_eq!(c.to_string(), "9/10");

        assert!(matches!("9".parse::<Criteria>(), Err(CriteriaError::Malformed(_))));
        assert!(matches!("a/b".parse::<Criteria>(), Err(CriteriaError::Malformed(_))));
        assert!(matches!("12/10".parse::<Criteria>(), Err(CriteriaError::CountExceedsWindow { .. })));
    }

    #[test]
    fn all_wake_never_marks_sleep_onset() {
        let states = pattern(&[(200, SleepState::Wake)]);
        let marks = run(&states);
        assert!(!marks.contains(&Some(Transition::SleepOnset)));
    }

    #[test]
    fn nine_of_ten_fires_at_earliest_qualifying_window() {
        // 20 wake, 9 sleep, wake to the end: the window starting at minute 19
        // is the first holding 9 sleep minutes.
        let states = pattern(&[
            (20, SleepState::Wake),
            (9, SleepState::Sleep),
            (40, SleepState::Wake),
        ]);
        let marks = run(&states);

        assert_eq!(marks[19], Some(Transition::SleepOnset));
        assert!(
            marks[..19].iter().all(|m| *m != Some(Transition::SleepOnset)),
            "no sleep onset may fire before the qualifying window"
        );
    }

    #[test]
    fn eight_of_ten_does_not_fire() {
        let states = pattern(&[
            (20, SleepState::Wake),
            (8, SleepState::Sleep),
            (40, SleepState::Wake),
        ]);
        let marks = run(&states);
        assert!(!marks.contains(&Some(Transition::SleepOnset)));
    }

    #[test]
    fn trailing_window_is_never_marked() {
        // A qualifying sleep run flush against the end of the sequence
        let states = pattern(&[(20, SleepState::Wake), (9, SleepState::Sleep)]);
        let marks = run(&states);

        assert_eq!(marks.len(), 29);
        assert_eq!(marks[19], Some(Transition::SleepOnset));
        assert!(marks[20..].iter().all(Option::is_none));
    }

    #[test]
    fn sequence_shorter_than_window_yields_nothing() {
        let states = pattern(&[(9, SleepState::Sleep)]);
        assert!(run(&states).iter().all(Option::is_none));
    }

    #[test]
    fn undefined_window_start_is_not_evaluated() {
        let mut states = pattern(&[(40, SleepState::Sleep)]);
        states[0] = SleepState::Undefined;
        states[1] = SleepState::Undefined;
        let marks = run(&states);

        assert_eq!(marks[0], None);
        assert_eq!(marks[1], None);
        assert_eq!(marks[2], Some(Transition::SleepOnset));
    }

    #[test]
    fn all_sleep_marks_a_single_onset() {
        let states = pattern(&[(60, SleepState::Sleep)]);
        let marks = run(&states);

        assert_eq!(marks[0], Some(Transition::SleepOnset));
        assert_eq!(
            marks.iter().filter(|m| m.is_some()).count(),
            1,
            "the asleep phase must block further sleep onsets"
        );
    }

    #[test]
    fn marks_alternate_after_a_full_cycle() {
        let states = pattern(&[
            (30, SleepState::Wake),
            (30, SleepState::Sleep),
            (30, SleepState::Wake),
            (30, SleepState::Sleep),
        ]);
        let marks: Vec<Transition> = run(&states).into_iter().flatten().collect();

        // Initial wake run fires the wake branch, then strict alternation
        assert_eq!(
            marks,
            vec![
                Transition::WakeOnset,
                Transition::SleepOnset,
                Transition::WakeOnset,
                Transition::SleepOnset,
            ]
        );
    }

    #[test]
    fn random_input_never_repeats_a_mark_kind() {
        let mut rng = rand::rng();

        for (count, window) in [(1, 1), (3, 5), (9, 10), (10, 10)] {
            let criteria = Criteria::new(count, window).unwrap();
            for _ in 0..50 {
                let states: Vec<SleepState> = (0..300)
                    .map(|_| match rng.random_range(0..10) {
                        0 => SleepState::Undefined,
                        1..=5 => SleepState::Sleep,
                        _ => SleepState::Wake,
                    })
                    .collect();

                let marks: Vec<Transition> = detect_transitions(&states, criteria, criteria)
                    .into_iter()
                    .flatten()
                    .collect();

                for pair in marks.windows(2) {
                    assert_ne!(
                        pair[0], pair[1],
                        "consecutive marks of the same kind for criteria {criteria}"
                    );
                }
            }
        }
    }
}
