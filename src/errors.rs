use std::fmt;
use std::path::Path;

pub type Result<T> = std::result::Result<T, IndexError>;

/// IndexError payload to provide details about what went wrong for
/// investigation purposes.  `operation` identifies where in the pipeline the
/// failure happened (and, for store failures, which path was involved);
/// `message` is the stringified version of the lower level error.
#[derive(Debug)]
pub struct ErrorDetails {
    pub operation: String,
    pub message: String,
}

/// Everything that can go wrong while indexing one translation unit.  This is
/// a single-shot batch tool, so none of these are retried; they all propagate
/// up to a non-zero exit status.
#[derive(Debug)]
pub enum IndexError {
    /// The front end could not produce a syntax tree at all.  Nothing was
    /// written anywhere.
    FrontEnd(ErrorDetails),
    /// A tree was produced but its diagnostics include an error or fatal
    /// severity.  The unit is not indexed; the store never receives data from
    /// a unit that failed to compile.
    Diagnostics(ErrorDetails),
    /// The compressed per-unit artifact could not be written.  The store is
    /// untouched since the merge happens after serialization.
    Serialization(ErrorDetails),
    /// The cross-unit store failed to open, merge, or close.
    Store(ErrorDetails),
}

impl IndexError {
    pub fn front_end(operation: &str, message: impl fmt::Display) -> IndexError {
        IndexError::FrontEnd(ErrorDetails {
            operation: operation.to_string(),
            message: message.to_string(),
        })
    }

    pub fn diagnostics(unit_path: &str, message: impl fmt::Display) -> IndexError {
        IndexError::Diagnostics(ErrorDetails {
            operation: format!("index {}", unit_path),
            message: message.to_string(),
        })
    }

    pub fn serialization(operation: &str, message: impl fmt::Display) -> IndexError {
        IndexError::Serialization(ErrorDetails {
            operation: operation.to_string(),
            message: message.to_string(),
        })
    }

    pub fn store(path: &Path, operation: &str, message: impl fmt::Display) -> IndexError {
        IndexError::Store(ErrorDetails {
            operation: format!("{} {}", operation, path.display()),
            message: message.to_string(),
        })
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let (kind, details) = match self {
            IndexError::FrontEnd(d) => ("front end failure", d),
            IndexError::Diagnostics(d) => ("unit has error diagnostics", d),
            IndexError::Serialization(d) => ("serialization failure", d),
            IndexError::Store(d) => ("store failure", d),
        };
        write!(
            formatter,
            "{}: {}: {}",
            kind, details.operation, details.message
        )
    }
}

impl std::error::Error for IndexError {}
