pub mod aac;

pub use aac::{AACConfig, AACParser, ADTSHeader};
