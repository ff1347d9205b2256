use crate::error::{DemuxError, Result};

/// Lifecycle of a demuxer instance.
///
/// ```text
/// Closed -> Open -> Reading <-> Seeking -> Closed
///    \
///     -> Failed (open error, terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemuxState {
    #[default]
    Closed,
    /// Headers parsed, no packet read yet
    Open,
    Reading,
    /// A seek is in progress or the last seek failed
    Seeking,
    /// `open` failed; the instance cannot be reused
    Failed,
}

impl DemuxState {
    fn reject(self, operation: &'static str) -> DemuxError {
        DemuxError::InvalidState {
            operation,
            state: self,
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, DemuxState::Open | DemuxState::Reading | DemuxState::Seeking)
    }

    /// `open` is allowed on a fresh or closed instance only.
    pub fn begin_open(&mut self) -> Result<()> {
        match self {
            DemuxState::Closed => Ok(()),
            _ => Err(self.reject("open")),
        }
    }

    /// Records the outcome of `open`. Failure is terminal.
    pub fn finish_open<T>(&mut self, result: &Result<T>) {
        *self = if result.is_ok() {
            DemuxState::Open
        } else {
            DemuxState::Failed
        };
    }

    /// Moves `Open` to `Reading`; rejects everything but those two.
    pub fn begin_read(&mut self) -> Result<()> {
        match self {
            DemuxState::Open | DemuxState::Reading => {
                *self = DemuxState::Reading;
                Ok(())
            }
            _ => Err(self.reject("next_packet")),
        }
    }

    pub fn begin_seek(&mut self) -> Result<()> {
        if self.is_open() {
            *self = DemuxState::Seeking;
            Ok(())
        } else {
            Err(self.reject("seek"))
        }
    }

    /// A failed seek leaves the instance in `Seeking` so the caller can retry.
    pub fn finish_seek<T>(&mut self, result: &Result<T>) {
        if result.is_ok() {
            *self = DemuxState::Reading;
        }
    }

    /// Fails unless `open` has succeeded.
    pub fn ensure_open(self, operation: &'static str) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(self.reject(operation))
        }
    }

    pub fn close(&mut self) {
        if *self != DemuxState::Failed {
            *self = DemuxState::Closed;
        }
    }
}
