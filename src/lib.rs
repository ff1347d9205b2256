#![doc(html_root_url = "https://docs.rs/demuxkit/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::missing_crate_level_docs)]

//! # demuxkit - container demuxer core
//!
//! `demuxkit` holds the reusable interior of a media container demuxer: the
//! packet buffer that carries payload and timing from producer to consumer,
//! the catalog of elementary streams a container exposes, the policy that
//! picks which video, audio and subtitle streams should play, and the
//! [`Demuxer`](format::Demuxer) contract concrete demuxers implement.
//!
//! ## Features
//!
//! - Owned, resizable [`Packet`](av::Packet) buffers with discontinuity,
//!   sync-point and appendable flags
//! - [`StreamCatalog`](av::StreamCatalog) partitioned by media type, in
//!   container discovery order
//! - Language-driven audio selection and subtitle selection with
//!   none/forced/always modes
//! - A lock-guarded [`SharedStreams`](format::SharedStreams) handle so a
//!   controller can switch streams while the producer reads packets
//! - An ADTS (raw AAC) demuxer with exact duration and sample-accurate seeking
//!
//! All times are 100 ns ticks ([`av::TIME_BASE`] per second).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use demuxkit::config::DemuxSettings;
//! use demuxkit::format::{AdtsDemuxer, Demuxer, SharedStreams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let streams = SharedStreams::new();
//!     let mut demuxer = AdtsDemuxer::new(streams.clone());
//!     demuxer.open_path("input.aac").await?;
//!
//!     // Pick the streams to play
//!     let selection = streams.apply_selection(&DemuxSettings::load()?);
//!     println!("audio stream: {:?}", selection.audio);
//!
//!     while let Some(packet) = demuxer.next_packet().await? {
//!         println!("{} bytes at {}", packet.size(), packet.start_time);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - `av`: packets, stream catalog and stream selection
//! - `format`: the demuxer contract, its state machine and concrete demuxers
//! - `codec`: ADTS header parsing
//! - `config`: stream selection preferences
//! - `error`: error type and result alias
//! - `utils`: bit readers and writers

/// Packets, streams and selection policy
pub mod av;

/// Codec framing parsers
pub mod codec;

/// Error types and utilities
pub mod error;

/// Demuxer contract and container implementations
pub mod format;

/// Common utilities and helper functions
pub mod utils;

/// Configuration module
pub mod config;

pub use error::{DemuxError, Result};
