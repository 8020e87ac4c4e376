use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("input is neither a directory nor a list file: {0}")]
    InputNotFound(PathBuf),
    #[error("could not read directory list {path}: {source}")]
    ListUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
