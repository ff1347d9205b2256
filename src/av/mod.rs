//! Core media types shared by every demuxer.
//!
//! All timestamps and durations are expressed in 100 ns ticks
//! ([`TIME_BASE`] ticks per second). [`INVALID_TIME`] marks an unknown time
//! and is never a valid numeric value.

use std::fmt;
use std::time::Duration;

mod packet;
mod queue;
pub mod select;
mod stream;

pub use packet::*;
pub use queue::PacketQueue;
pub use select::{StreamSelection, SubtitleMode};
pub use stream::*;

/// Ticks per second for every timestamp and duration.
pub const TIME_BASE: i64 = 10_000_000;

/// Sentinel meaning "no time known".
pub const INVALID_TIME: i64 = i64::MIN;

/// Sentinel PID meaning "no subtitle stream selected".
pub const NO_SUBTITLE_PID: u32 = u32::MAX;

/// Converts a tick value to a `Duration`, or `None` for [`INVALID_TIME`] and
/// negative values.
pub fn ticks_to_duration(ticks: i64) -> Option<Duration> {
    if ticks == INVALID_TIME || ticks < 0 {
        return None;
    }
    let secs = ticks / TIME_BASE;
    let nanos = (ticks % TIME_BASE) * 100;
    Some(Duration::new(secs as u64, nanos as u32))
}

/// Rescales `value` expressed in units of `1/rate` seconds into ticks.
pub fn rescale_to_ticks(value: u64, rate: u32) -> i64 {
    (value as u128 * TIME_BASE as u128 / rate.max(1) as u128) as i64
}

/// Media type of an elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamType {
    Video,
    Audio,
    Subtitle,
    Unknown,
}

impl StreamType {
    pub const ALL: [StreamType; 4] = [
        StreamType::Video,
        StreamType::Audio,
        StreamType::Subtitle,
        StreamType::Unknown,
    ];

    /// Human readable name, for diagnostics only.
    pub fn display_name(self) -> &'static str {
        match self {
            StreamType::Video => "Video",
            StreamType::Audio => "Audio",
            StreamType::Subtitle => "Subtitle",
            StreamType::Unknown => "Unknown",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Codecs a [`MediaFormat`] can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodecType {
    AAC,
}

/// Format descriptor attached to the first packet of a stream and to every
/// packet at which the stream's format changes.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFormat {
    pub codec_type: CodecType,
    pub sample_rate: Option<u32>,
    pub channels: Option<u8>,
    /// Codec-specific extra data (e.g. AudioSpecificConfig)
    pub extra_data: Option<Vec<u8>>,
}

impl MediaFormat {
    pub fn new(codec_type: CodecType) -> Self {
        Self {
            codec_type,
            sample_rate: None,
            channels: None,
            extra_data: None,
        }
    }

    pub fn with_audio(mut self, sample_rate: u32, channels: u8) -> Self {
        self.sample_rate = Some(sample_rate);
        self.channels = Some(channels);
        self
    }

    pub fn with_extra_data(mut self, extra_data: impl Into<Vec<u8>>) -> Self {
        self.extra_data = Some(extra_data.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_conversions() {
        assert_eq!(ticks_to_duration(TIME_BASE), Some(Duration::from_secs(1)));
        assert_eq!(ticks_to_duration(15), Some(Duration::from_nanos(1500)));
        assert_eq!(ticks_to_duration(INVALID_TIME), None);
        assert_eq!(rescale_to_ticks(1024, 44100), 232_199);
        assert_eq!(rescale_to_ticks(48000, 48000), TIME_BASE);
    }

    #[test]
    fn test_display_names() {
        let names: Vec<_> = StreamType::ALL.iter().map(|t| t.to_string()).collect();
        assert_eq!(names, ["Video", "Audio", "Subtitle", "Unknown"]);
    }
}
