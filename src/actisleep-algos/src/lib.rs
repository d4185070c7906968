pub(crate) mod series;
pub use series::{ActivitySeries, SleepState, Transition};

pub(crate) mod score;
pub use score::{DEFAULT_THRESHOLD, cole_kripke};

pub(crate) mod transition;
pub use transition::{Criteria, CriteriaError, detect_transitions};

pub(crate) mod light;
pub use light::{DaylightSchedule, FixedSchedule, LightPeriod, LightSchedule, SunTable, SunTimes};

pub(crate) mod nightly;
pub use nightly::{
    DateVariableRow, MAX_NORMAL_TST, MIN_NORMAL_TST, NightlyOptions, RowFlag, nightly_variables,
};

pub(crate) mod analysis;
pub use analysis::Analysis;

pub mod helpers;
