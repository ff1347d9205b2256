use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::av::{StreamCatalog, StreamSelection, StreamType};
use crate::config::DemuxSettings;

/// The currently active PID per media type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveStreams {
    pids: [Option<u32>; 4],
}

impl ActiveStreams {
    pub fn get(&self, stream_type: StreamType) -> Option<u32> {
        self.pids[stream_type.index()]
    }

    pub fn set(&mut self, stream_type: StreamType, pid: Option<u32>) {
        self.pids[stream_type.index()] = pid;
    }

    /// Whether packets of `pid` should reach the consumer. Types with no
    /// active stream let everything through.
    pub fn is_wanted(&self, stream_type: StreamType, pid: u32) -> bool {
        self.get(stream_type).map_or(true, |active| active == pid)
    }
}

/// State shared between the producer and controller contexts.
#[derive(Debug, Default)]
pub struct StreamState {
    pub catalog: StreamCatalog,
    pub active: ActiveStreams,
}

/// Lock-guarded handle to a demuxer's [`StreamState`].
///
/// The host creates one and passes a clone to the demuxer at construction;
/// every catalog query or active-stream update goes through [`lock`](Self::lock).
/// Guards must not be held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct SharedStreams {
    inner: Arc<Mutex<StreamState>>,
}

impl SharedStreams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, StreamState> {
        self.inner.lock()
    }

    pub fn set_active_stream(&self, stream_type: StreamType, pid: Option<u32>) {
        log::debug!("active {} stream -> {:?}", stream_type, pid);
        self.lock().active.set(stream_type, pid);
    }

    pub fn active_stream(&self, stream_type: StreamType) -> Option<u32> {
        self.lock().active.get(stream_type)
    }

    /// Runs the selectors under the lock and marks the chosen streams active.
    pub fn apply_selection(&self, settings: &DemuxSettings) -> StreamSelection {
        let mut state = self.lock();
        let selection = StreamSelection::select(&state.catalog, settings);
        state.active.set(StreamType::Video, selection.video);
        state.active.set(StreamType::Audio, selection.audio);
        state.active.set(StreamType::Subtitle, Some(selection.subtitle));
        selection
    }

    /// Empties the catalog for a re-open; active selections are kept.
    pub fn reset_catalog(&self) {
        self.lock().catalog.clear();
    }
}
