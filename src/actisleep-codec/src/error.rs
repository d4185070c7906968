use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{self:?}")]
pub enum AwcError {
    TruncatedHeader,
    EmptySubjectId,
    InvalidStartDate(String),
    InvalidStartTime(String),
    InvalidMonth(String),
    InvalidActivity { minute: usize, token: String },
}
