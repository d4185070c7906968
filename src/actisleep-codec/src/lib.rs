mod record;
pub use record::{AWC_HEADER_LINES, AwcRecord};

mod error;
pub use error::AwcError;

mod trim;
pub use trim::TrimOutcome;
