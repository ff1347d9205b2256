use super::types::{AACConfig, ADTSHeader, ADTS_HEADER_SIZE};
use crate::error::Result;

/// Stateful ADTS parser that remembers the last decoder configuration seen.
#[derive(Debug, Default)]
pub struct AACParser {
    config: Option<AACConfig>,
}

impl AACParser {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn parse_adts_header(&self, data: &[u8]) -> Result<ADTSHeader> {
        ADTSHeader::parse(data)
    }

    /// Records the configuration of `header`, returning true when it differs
    /// from the previous frame's (or this is the first frame).
    pub fn update_config(&mut self, header: &ADTSHeader) -> bool {
        let config = header.config();
        if self.config.as_ref() == Some(&config) {
            return false;
        }
        log::info!(
            "AAC config change: profile {:?}, {:?} Hz, {} channels",
            config.profile,
            config.sample_rate(),
            config.channel_configuration
        );
        self.config = Some(config);
        true
    }

    /// Byte offset of the first plausible ADTS header in `data`, if any.
    pub fn find_sync(&self, data: &[u8]) -> Option<usize> {
        if data.len() < ADTS_HEADER_SIZE {
            return None;
        }
        (0..=data.len() - ADTS_HEADER_SIZE).find(|&i| {
            data[i] == 0xFF && data[i + 1] & 0xF0 == 0xF0 && ADTSHeader::parse(&data[i..]).is_ok()
        })
    }

    pub fn reset(&mut self) {
        self.config = None;
    }
}
