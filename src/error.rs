use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `GridSirError` and maps other errors to
/// convert to a `GridSirError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum GridSirError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    /// A simulation parameter lies outside the inclusive range `min..=max`.
    ParameterOutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    InvalidPopulation(String),
    LogError(String),
}

impl GridSirError {
    #[must_use]
    pub fn out_of_range(name: &'static str, value: i64, min: i64, max: i64) -> Self {
        GridSirError::ParameterOutOfRange {
            name,
            value,
            min,
            max,
        }
    }

    /// True when the error comes from writing to a reader that has gone away, such as
    /// `gridsir ... | head`.
    #[must_use]
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, GridSirError::IoError(error) if error.kind() == io::ErrorKind::BrokenPipe)
    }
}

impl From<io::Error> for GridSirError {
    fn from(error: io::Error) -> Self {
        GridSirError::IoError(error)
    }
}

impl From<serde_json::Error> for GridSirError {
    fn from(error: serde_json::Error) -> Self {
        GridSirError::JsonError(error)
    }
}

impl std::error::Error for GridSirError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridSirError::IoError(error) => Some(error),
            GridSirError::JsonError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for GridSirError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GridSirError::ParameterOutOfRange {
                name,
                value,
                min,
                max,
            } => write!(
                f,
                "Error: value {value} provided for {name} is outside valid range of {min}..={max}"
            ),
            GridSirError::InvalidPopulation(message) => {
                write!(f, "Error: invalid population: {message}")
            }
            GridSirError::LogError(message) => write!(f, "Error: invalid log level: {message}"),
            GridSirError::IoError(error) => write!(f, "Error: {error}"),
            GridSirError::JsonError(error) => write!(f, "Error: {error}"),
        }
    }
}
