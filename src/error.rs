use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a valid MIDI file: {0}")]
    FileFormat(String),

    #[error("unknown easing curve '{0}'")]
    UnknownEasing(String),
}

impl From<midly::Error> for Error {
    fn from(err: midly::Error) -> Self {
        Error::FileFormat(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
