use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no header row in {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("column '{0}' is not a text column")]
    UnexpectedType(String),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
