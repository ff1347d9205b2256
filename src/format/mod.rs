use crate::av::{Packet, StreamType};
use crate::config::DemuxSettings;
use crate::error::{DemuxError, Result};

pub mod adts;
mod shared;
mod state;

pub use self::adts::AdtsDemuxer;
pub use self::shared::{ActiveStreams, SharedStreams, StreamState};
pub use self::state::DemuxState;

/// Locale and menu name of one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescription {
    pub language: Option<String>,
    pub name: String,
}

/// Duration and name of one title of a multi-title container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleInfo {
    /// Duration in 100 ns ticks
    pub duration: i64,
    pub name: String,
}

/// Common trait for container demuxers.
///
/// The producer context drives `open`, `next_packet` and `seek` one call at a
/// time. A controller context may concurrently use the `&self` methods or a
/// clone of [`streams`](Self::streams). There is no cancellation: the caller
/// must make sure no `next_packet`/`seek` is in flight before dropping or
/// closing the demuxer.
#[async_trait::async_trait]
pub trait Demuxer: Send {
    /// What `open` reads from, e.g. a file or an in-memory cursor
    type Source: Send;

    /// Parse container headers and populate the stream catalog
    async fn open(&mut self, source: Self::Source) -> Result<()>;

    /// Total duration in 100 ns ticks, `None` when the container declares none
    fn duration(&self) -> Result<Option<i64>>;

    /// Read the next packet, `None` at end of stream
    async fn next_packet(&mut self) -> Result<Option<Packet>>;

    /// Reposition to the last sync point at or before `time`
    async fn seek(&mut self, time: i64) -> Result<()>;

    /// Short container identifier, e.g. "adts"
    fn container_format(&self) -> &'static str;

    /// Lifecycle state
    fn state(&self) -> DemuxState;

    /// Handle to the catalog and active-stream set
    fn streams(&self) -> &SharedStreams;

    /// Release the source; the instance may be opened again afterwards
    async fn close(&mut self);

    /// Locale and display name of a stream
    fn stream_info(&self, pid: u32) -> Result<StreamDescription> {
        let state = self.streams().lock();
        let stream = state.catalog.find_stream(pid).ok_or(DemuxError::NotFound(pid))?;
        Ok(StreamDescription {
            language: stream.language().map(str::to_string),
            name: stream.display_name(),
        })
    }

    /// Mark the active stream of one type.
    ///
    /// Demuxers may use this to drop packets of inactive streams, but callers
    /// must still check `Packet::stream_id` themselves.
    fn set_active_stream(&self, stream_type: StreamType, pid: Option<u32>) -> Result<()> {
        self.streams().set_active_stream(stream_type, pid);
        Ok(())
    }

    /// Select the active title
    async fn set_title(&mut self, _index: usize) -> Result<()> {
        Err(DemuxError::NotImplemented)
    }

    /// Duration and name of a title
    fn title_info(&self, _index: usize) -> Result<TitleInfo> {
        Err(DemuxError::NotImplemented)
    }

    /// Title count
    fn num_titles(&self) -> Result<usize> {
        Err(DemuxError::NotImplemented)
    }

    /// Called when the host's settings change
    fn settings_changed(&self, _settings: &DemuxSettings) {}
}
