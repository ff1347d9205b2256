//! AAC elementary stream framing (ADTS).

pub mod parser;
pub mod types;

pub use parser::AACParser;
pub use types::{
    AACConfig, ADTSHeader, ProfileType, ADTS_HEADER_SIZE, MAX_FRAME_LENGTH, SAMPLES_PER_FRAME,
};
