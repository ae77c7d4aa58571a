//! Error type shared by the loading, rendering and serving stages

use std::path::PathBuf;

/// Error type for hiclens operations
#[derive(Debug)]
pub enum Error {
    /// Reading or writing a file failed
    Io { path: PathBuf, source: std::io::Error },
    /// A .npy matrix could not be decoded
    Npy { path: PathBuf, message: String },
    /// A delimited file had a malformed row or header
    Parse { path: PathBuf, message: String },
    /// The contact matrix has no entries
    EmptyMatrix,
    /// The contact matrix is not n x n
    NotSquare { rows: usize, cols: usize },
    /// Filtered feature rows don't line up with matrix nodes
    Misaligned { features: usize, nodes: usize },
    /// A user-supplied parameter is out of range
    InvalidParameter(String),
    /// The HTTP server could not start
    Server(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            Error::Npy { path, message } => {
                write!(f, "Failed to read matrix {}: {}", path.display(), message)
            }
            Error::Parse { path, message } => write!(f, "{}: {}", path.display(), message),
            Error::EmptyMatrix => write!(f, "Contact matrix is empty"),
            Error::NotSquare { rows, cols } => {
                write!(f, "Contact matrix must be square, got {}x{}", rows, cols)
            }
            Error::Misaligned { features, nodes } => write!(
                f,
                "Feature table has {} rows in region but the matrix has {} nodes",
                features, nodes
            ),
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            Error::Server(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Error {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    /// Attach a path to a CSV error, keeping the line number when csv reports one
    pub fn csv(path: impl Into<PathBuf>, e: csv::Error) -> Self {
        let path = path.into();
        let message = match e.position() {
            Some(pos) => format!("line {}: {}", pos.line(), e),
            None => e.to_string(),
        };
        match e.into_kind() {
            csv::ErrorKind::Io(source) => Error::Io { path, source },
            _ => Error::Parse { path, message },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
