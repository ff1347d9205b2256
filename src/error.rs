use thiserror::Error;

use crate::format::DemuxState;

#[derive(Error, Debug)]
pub enum DemuxError {
    #[error("operation not implemented by this demuxer")]
    NotImplemented,

    #[error("{operation} is not valid in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: DemuxState,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed container: {0}")]
    MalformedContainer(String),

    #[error("stream {0} not found")]
    NotFound(u32),

    #[error("parser error: {0}")]
    Parser(String),

    #[error("config error: {0}")]
    Config(String),
}

impl DemuxError {
    /// Whether the demuxer instance that raised this error must be discarded.
    ///
    /// Only container-level parse failures are terminal. I/O errors leave the
    /// instance usable for a `seek` retry unless they happened during `open`,
    /// in which case the demuxer reports them as `MalformedContainer` or stays
    /// in [`DemuxState::Failed`].
    pub fn is_fatal(&self) -> bool {
        matches!(self, DemuxError::MalformedContainer(_))
    }
}

impl From<toml::de::Error> for DemuxError {
    fn from(e: toml::de::Error) -> Self {
        DemuxError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DemuxError>;
