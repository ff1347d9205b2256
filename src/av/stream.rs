use std::collections::VecDeque;

use super::{CodecType, StreamType, NO_SUBTITLE_PID};
use crate::error::{DemuxError, Result};

/// Metadata a concrete demuxer knows about an elementary stream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamDescriptor {
    /// Language code as found in the container (ISO 639-1 or 639-2)
    pub language: Option<String>,
    /// Track title
    pub name: Option<String>,
    pub codec: Option<CodecType>,
    /// Mandatory narrative subtitles
    pub forced: bool,
    /// Container's default-track flag
    pub default: bool,
}

impl StreamDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_codec(mut self, codec: CodecType) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn with_forced(mut self, forced: bool) -> Self {
        self.forced = forced;
        self
    }

    pub fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    /// Case-insensitive comparison against a preference entry.
    pub fn matches_language(&self, language: &str) -> bool {
        self.language
            .as_deref()
            .is_some_and(|l| l.eq_ignore_ascii_case(language))
    }
}

/// One elementary stream in a catalog. Equality is by PID alone.
#[derive(Debug, Clone)]
pub struct Stream {
    pub pid: u32,
    pub stream_type: StreamType,
    pub descriptor: Option<Box<StreamDescriptor>>,
}

impl Stream {
    pub fn new(pid: u32, stream_type: StreamType) -> Self {
        Self {
            pid,
            stream_type,
            descriptor: None,
        }
    }

    pub fn with_descriptor(mut self, descriptor: StreamDescriptor) -> Self {
        self.descriptor = Some(Box::new(descriptor));
        self
    }

    pub fn language(&self) -> Option<&str> {
        self.descriptor.as_ref().and_then(|d| d.language.as_deref())
    }

    pub fn matches_language(&self, language: &str) -> bool {
        self.descriptor
            .as_ref()
            .is_some_and(|d| d.matches_language(language))
    }

    pub fn is_forced(&self) -> bool {
        self.descriptor.as_ref().is_some_and(|d| d.forced)
    }

    /// Whether this is the placeholder inserted by
    /// [`StreamCatalog::create_no_subtitle_stream`].
    pub fn is_no_subtitle(&self) -> bool {
        self.pid == NO_SUBTITLE_PID
    }

    /// Name for stream menus: the track title, else the language, else
    /// "<Type> #<pid>".
    pub fn display_name(&self) -> String {
        let descriptor = self.descriptor.as_deref();
        match (
            descriptor.and_then(|d| d.name.as_deref()),
            descriptor.and_then(|d| d.language.as_deref()),
        ) {
            (Some(name), Some(lang)) => format!("{} [{}]", name, lang),
            (Some(name), None) => name.to_string(),
            (None, Some(lang)) => format!("{} ({})", self.stream_type, lang),
            (None, None) => format!("{} #{}", self.stream_type, self.pid),
        }
    }
}

impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid
    }
}

impl Eq for Stream {}

/// Streams of one type, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct StreamList {
    streams: VecDeque<Stream>,
}

impl StreamList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_stream(&self, pid: u32) -> Option<&Stream> {
        self.streams.iter().find(|s| s.pid == pid)
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.find_stream(pid).is_some()
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, Stream> {
        self.streams.iter()
    }

    pub fn first(&self) -> Option<&Stream> {
        self.streams.front()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn clear(&mut self) {
        self.streams.clear();
    }

    fn push(&mut self, stream: Stream) {
        self.streams.push_back(stream);
    }

    fn remove(&mut self, pid: u32) -> Option<Stream> {
        let index = self.streams.iter().position(|s| s.pid == pid)?;
        self.streams.remove(index)
    }
}

impl<'a> IntoIterator for &'a StreamList {
    type Item = &'a Stream;
    type IntoIter = std::collections::vec_deque::Iter<'a, Stream>;

    fn into_iter(self) -> Self::IntoIter {
        self.streams.iter()
    }
}

/// Every discovered stream, partitioned by type.
///
/// Insertion order within each partition is the container's discovery order
/// and serves as the tie-break during selection.
#[derive(Debug, Clone, Default)]
pub struct StreamCatalog {
    lists: [StreamList; 4],
}

impl StreamCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stream to its type's partition.
    ///
    /// Fails when the PID is already present in that partition or collides
    /// with [`NO_SUBTITLE_PID`].
    pub fn add_stream(&mut self, stream: Stream) -> Result<()> {
        if stream.pid == NO_SUBTITLE_PID {
            return Err(DemuxError::MalformedContainer(format!(
                "pid {:#x} is reserved",
                stream.pid
            )));
        }
        self.push_unique(stream)
    }

    fn push_unique(&mut self, stream: Stream) -> Result<()> {
        let list = &mut self.lists[stream.stream_type.index()];
        if list.contains(stream.pid) {
            return Err(DemuxError::MalformedContainer(format!(
                "duplicate {} stream pid {}",
                stream.stream_type, stream.pid
            )));
        }
        log::debug!("catalog: added {} stream {}", stream.stream_type, stream.pid);
        list.push(stream);
        Ok(())
    }

    /// Appends the "No subtitles" placeholder to the subtitle partition so
    /// hosts can offer it in stream menus.
    pub fn create_no_subtitle_stream(&mut self) {
        if self.subtitle_streams().contains(NO_SUBTITLE_PID) {
            return;
        }
        let stream = Stream::new(NO_SUBTITLE_PID, StreamType::Subtitle)
            .with_descriptor(StreamDescriptor::new().with_name("No subtitles"));
        // pid uniqueness checked just above
        let _ = self.push_unique(stream);
    }

    /// Removes a stream, e.g. when a program map drops it mid-file.
    pub fn remove_stream(&mut self, pid: u32) -> Option<Stream> {
        self.lists.iter_mut().find_map(|list| list.remove(pid))
    }

    /// Looks `pid` up across all partitions.
    pub fn find_stream(&self, pid: u32) -> Option<&Stream> {
        self.lists.iter().find_map(|list| list.find_stream(pid))
    }

    pub fn find_stream_of_type(&self, stream_type: StreamType, pid: u32) -> Option<&Stream> {
        self.streams_of_type(stream_type).find_stream(pid)
    }

    pub fn streams_of_type(&self, stream_type: StreamType) -> &StreamList {
        &self.lists[stream_type.index()]
    }

    pub fn video_streams(&self) -> &StreamList {
        self.streams_of_type(StreamType::Video)
    }

    pub fn audio_streams(&self) -> &StreamList {
        self.streams_of_type(StreamType::Audio)
    }

    pub fn subtitle_streams(&self) -> &StreamList {
        self.streams_of_type(StreamType::Subtitle)
    }

    /// All streams, partition by partition.
    pub fn iter(&self) -> impl Iterator<Item = &Stream> {
        self.lists.iter().flat_map(|list| list.iter())
    }

    pub fn len(&self) -> usize {
        self.lists.iter().map(StreamList::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(StreamList::is_empty)
    }

    /// Drops every stream and its descriptor; the catalog stays usable.
    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }
}
