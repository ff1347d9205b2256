use std::io::{self, SeekFrom};
use std::path::Path;

use async_trait::async_trait;
use log::{debug, info, trace, warn};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use super::{DemuxState, Demuxer, SharedStreams};
use crate::av::{
    rescale_to_ticks, ticks_to_duration, CodecType, MediaFormat, Packet, Stream, StreamDescriptor,
    StreamType,
};
use crate::codec::aac::{AACParser, ADTSHeader, ADTS_HEADER_SIZE, MAX_FRAME_LENGTH};
use crate::error::{DemuxError, Result};

/// PID of the single audio stream of an ADTS file.
pub const ADTS_STREAM_PID: u32 = 0;

const READ_CHUNK_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy)]
struct FrameEntry {
    offset: u64,
    start_time: i64,
    stop_time: i64,
}

/// Sample-exact timeline that restarts its base whenever the sample rate
/// changes, so rounding never accumulates.
#[derive(Debug, Default)]
struct Timeline {
    base: i64,
    samples: u64,
    rate: u32,
}

impl Timeline {
    fn position(&self) -> i64 {
        if self.rate == 0 {
            self.base
        } else {
            self.base + rescale_to_ticks(self.samples, self.rate)
        }
    }

    fn advance(&mut self, rate: u32, samples: u64) -> (i64, i64) {
        if rate != self.rate {
            self.base = self.position();
            self.samples = 0;
            self.rate = rate;
        }
        let start = self.position();
        self.samples += samples;
        (start, self.position())
    }
}

struct Frame {
    offset: u64,
    header: ADTSHeader,
    payload: Packet,
}

/// Splits a byte source into ADTS frames, resynchronising over garbage.
///
/// Bytes read ahead are staged in a [`Packet`] whose head is trimmed as
/// frames are taken off it.
struct FrameReader<R> {
    reader: R,
    staging: Packet,
    chunk: Vec<u8>,
    /// Source offset of the first staged byte
    base: u64,
    eof: bool,
}

impl<R: AsyncRead + AsyncSeek + Unpin + Send> FrameReader<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            staging: Packet::default(),
            chunk: vec![0u8; READ_CHUNK_SIZE],
            base: 0,
            eof: false,
        }
    }

    async fn fill(&mut self) -> Result<()> {
        let n = self.reader.read(&mut self.chunk).await?;
        if n == 0 {
            self.eof = true;
        } else {
            self.staging.append_data(&self.chunk[..n]);
        }
        Ok(())
    }

    fn consume(&mut self, count: usize) {
        let count = count.min(self.staging.size());
        self.staging.remove_head(count);
        self.base += count as u64;
    }

    /// Drops staged bytes; the next read starts at `offset`.
    async fn reposition(&mut self, offset: u64) -> Result<()> {
        self.reader.seek(SeekFrom::Start(offset)).await?;
        self.staging.set_data_size(0);
        self.base = offset;
        self.eof = false;
        Ok(())
    }

    fn flush(&mut self) {
        let staged = self.staging.size();
        self.consume(staged);
    }

    async fn next_frame(&mut self, parser: &AACParser) -> Result<Option<Frame>> {
        loop {
            if !self.eof && self.staging.size() < MAX_FRAME_LENGTH {
                self.fill().await?;
                continue;
            }

            if self.staging.size() < ADTS_HEADER_SIZE {
                if !self.staging.is_empty() {
                    debug!("ignoring {} trailing bytes at {}", self.staging.size(), self.base);
                    self.flush();
                }
                return Ok(None);
            }

            match parser.parse_adts_header(self.staging.data()) {
                Ok(header) => {
                    let frame_len = header.frame_length as usize;
                    // Only reachable at end of input: either a truncated last
                    // frame or a false sync inside payload bytes
                    if frame_len > self.staging.size() {
                        warn!("ADTS frame at {} runs past end of input, resyncing", self.base);
                        self.consume(1);
                        continue;
                    }
                    let offset = self.base;
                    let payload = Packet::new(&self.staging.data()[header.header_len()..frame_len]);
                    self.consume(frame_len);
                    return Ok(Some(Frame {
                        offset,
                        header,
                        payload,
                    }));
                }
                Err(_) => {
                    let skip = parser
                        .find_sync(&self.staging.data()[1..])
                        .map_or(self.staging.size() - (ADTS_HEADER_SIZE - 1), |pos| pos + 1);
                    warn!("lost ADTS sync at {}, skipping {} bytes", self.base, skip);
                    self.consume(skip);
                }
            }
        }
    }
}

fn media_format(header: &ADTSHeader) -> MediaFormat {
    let config = header.config();
    MediaFormat::new(CodecType::AAC)
        .with_audio(header.sample_rate().unwrap_or(0), header.channel_configuration)
        .with_extra_data(config.audio_specific_config().to_vec())
}

/// Demuxer for raw AAC elementary streams framed with ADTS headers.
///
/// `open` scans the whole source once to build a frame index, which gives an
/// exact duration and sample-accurate seeking. Every frame is a sync point.
pub struct AdtsDemuxer<R> {
    shared: SharedStreams,
    state: DemuxState,
    frames: Option<FrameReader<R>>,
    parser: AACParser,
    index: Vec<FrameEntry>,
    next_frame: usize,
    duration: Option<i64>,
    discontinuity: bool,
}

impl<R: AsyncRead + AsyncSeek + Unpin + Send> AdtsDemuxer<R> {
    pub fn new(shared: SharedStreams) -> Self {
        Self {
            shared,
            state: DemuxState::Closed,
            frames: None,
            parser: AACParser::new(),
            index: Vec::new(),
            next_frame: 0,
            duration: None,
            discontinuity: false,
        }
    }

    /// Number of frames found by `open`.
    pub fn frame_count(&self) -> usize {
        self.index.len()
    }

    async fn open_source(&mut self, mut source: R) -> Result<()> {
        source.seek(SeekFrom::Start(0)).await?;
        let mut frames = FrameReader::new(source);
        let mut timeline = Timeline::default();
        let mut index = Vec::new();
        let mut first_header = None;

        while let Some(frame) = frames.next_frame(&self.parser).await? {
            if index.is_empty() && frame.offset != 0 {
                return Err(DemuxError::MalformedContainer(format!(
                    "no ADTS header at start of stream, first frame at {}",
                    frame.offset
                )));
            }
            let rate = frame
                .header
                .sample_rate()
                .ok_or_else(|| DemuxError::Parser("ADTS frame without sample rate".into()))?;
            let (start_time, stop_time) = timeline.advance(rate, frame.header.samples());
            index.push(FrameEntry {
                offset: frame.offset,
                start_time,
                stop_time,
            });
            first_header.get_or_insert(frame.header);
        }

        let header = first_header
            .ok_or_else(|| DemuxError::MalformedContainer("no ADTS frames found".into()))?;
        frames.reposition(0).await?;

        let descriptor = StreamDescriptor::new()
            .with_codec(CodecType::AAC)
            .with_name(format!(
                "AAC {} Hz {}ch",
                header.sample_rate().unwrap_or(0),
                header.channel_configuration
            ))
            .with_default(true);
        self.shared.lock().catalog.add_stream(
            Stream::new(ADTS_STREAM_PID, StreamType::Audio).with_descriptor(descriptor),
        )?;

        self.duration = index.last().map(|e| e.stop_time);
        info!(
            "opened ADTS stream: {} frames, duration {:?}",
            index.len(),
            self.duration.and_then(ticks_to_duration)
        );

        self.index = index;
        self.frames = Some(frames);
        self.next_frame = 0;
        self.discontinuity = true;
        self.parser.reset();
        Ok(())
    }

    /// Index of the last frame starting at or before `time`, or the frame
    /// count when `time` lies at or past the end.
    fn frame_for_time(&self, time: i64) -> usize {
        if self.duration.is_some_and(|d| time >= d) {
            return self.index.len();
        }
        self.index
            .partition_point(|e| e.start_time <= time)
            .saturating_sub(1)
    }

    async fn seek_to(&mut self, time: i64) -> Result<()> {
        let target = self.frame_for_time(time);
        let state = self.state;
        let frames = self.frames.as_mut().ok_or(DemuxError::InvalidState {
            operation: "seek",
            state,
        })?;

        match self.index.get(target) {
            Some(entry) => frames.reposition(entry.offset).await?,
            None => frames.flush(),
        }
        debug!("seek to {} resolved to frame {}/{}", time, target, self.index.len());

        self.next_frame = target;
        self.discontinuity = true;
        Ok(())
    }
}

impl AdtsDemuxer<File> {
    /// Opens an ADTS file from disk.
    pub async fn open_path<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = File::open(path.as_ref()).await?;
        self.open(file).await
    }
}

#[async_trait]
impl<R: AsyncRead + AsyncSeek + Unpin + Send> Demuxer for AdtsDemuxer<R> {
    type Source = R;

    async fn open(&mut self, source: R) -> Result<()> {
        self.state.begin_open()?;
        self.shared.reset_catalog();

        let result = self.open_source(source).await;
        if let Err(e) = &result {
            warn!("failed to open ADTS stream: {}", e);
            self.frames = None;
            self.index.clear();
        }
        self.state.finish_open(&result);
        result
    }

    fn duration(&self) -> Result<Option<i64>> {
        self.state.ensure_open("duration")?;
        Ok(self.duration)
    }

    async fn next_packet(&mut self) -> Result<Option<Packet>> {
        self.state.begin_read()?;

        let Some(entry) = self.index.get(self.next_frame).copied() else {
            return Ok(None);
        };
        let state = self.state;
        let frames = self.frames.as_mut().ok_or(DemuxError::InvalidState {
            operation: "next_packet",
            state,
        })?;

        let frame = frames.next_frame(&self.parser).await?.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("source ended before frame {}", self.next_frame),
            )
        })?;
        if frame.offset != entry.offset {
            warn!(
                "frame {} found at {}, index says {}",
                self.next_frame, frame.offset, entry.offset
            );
        }
        self.next_frame += 1;

        let mut packet = frame
            .payload
            .with_stream_id(ADTS_STREAM_PID)
            .with_times(entry.start_time, entry.stop_time)
            .with_sync_point(true)
            .with_discontinuity(std::mem::take(&mut self.discontinuity));
        if self.parser.update_config(&frame.header) {
            packet = packet.with_media_format(media_format(&frame.header));
        }

        trace!(
            "packet {} bytes, start {} stop {}",
            packet.size(),
            packet.start_time,
            packet.stop_time
        );
        Ok(Some(packet))
    }

    async fn seek(&mut self, time: i64) -> Result<()> {
        self.state.begin_seek()?;
        let result = self.seek_to(time).await;
        if let Err(e) = &result {
            warn!("seek to {} failed: {}", time, e);
        }
        self.state.finish_seek(&result);
        result
    }

    fn container_format(&self) -> &'static str {
        "adts"
    }

    fn state(&self) -> DemuxState {
        self.state
    }

    fn streams(&self) -> &SharedStreams {
        &self.shared
    }

    async fn close(&mut self) {
        self.frames = None;
        self.index.clear();
        self.next_frame = 0;
        self.duration = None;
        self.shared.reset_catalog();
        self.state.close();
    }
}
