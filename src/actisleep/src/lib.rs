#[macro_use]
extern crate log;

mod batch;
pub use batch::{BatchSummary, run_batch};

mod report;
pub use report::{RowWriter, write_minutes};

mod suntable;
pub use suntable::load_sun_table;
