//! # Silk-Container: SILK v3 Container Framing and Loss-Resilient Decoding
//!
//! This library bridges raw linear-PCM audio and the SILK v3 framed
//! bitstream container. The signal-processing engine itself is an opaque
//! collaborator injected through the [`engine::SilkEngine`] trait; what
//! lives here is everything around it:
//!
//! - **Container framing**: the `#!SILK_V3` header with its optional
//!   variant byte, little-endian length-prefixed frame records and the
//!   `-1` terminator sentinel
//! - **Encoder pipeline**: chunking PCM into packet-duration blocks,
//!   driving the engine and flushing frame records
//! - **Decoder pipeline**: a fixed-depth jitter window that buffers
//!   lookahead frames so in-band FEC side information can resurrect a
//!   lost frame, with engine concealment as the fallback
//! - **Loss simulation**: deterministic pseudo-random frame dropping for
//!   reproducible resilience testing
//!
//! Both pipelines are one-shot batch transforms: a call consumes a whole
//! input buffer, owns its engine state exclusively, and releases it on
//! every exit path.
//!
//! ## Usage
//!
//! ```rust
//! use silk_container::engine::SimEngine;
//! use silk_container::{decode, encode, DecoderConfig, EncoderConfig};
//!
//! let engine = SimEngine::new();
//!
//! // 20 ms of silence at 24 kHz, 16-bit little-endian
//! let pcm = vec![0u8; 960];
//! let container = encode(&engine, &pcm, &EncoderConfig::default())?;
//! assert!(container.starts_with(b"#!SILK_V3"));
//!
//! let audio = decode(&engine, &container, &DecoderConfig::default())?;
//! # Ok::<(), silk_container::SilkError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `sim-engine`: deterministic pure-Rust engine stand-in (enabled by
//!   default); disable it when wiring in a real SILK DSP library

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod container;
pub mod decode;
pub mod encode;
pub mod engine;
pub mod error;
pub mod jitter;
pub mod loss;
pub mod stream;
pub mod types;
pub mod utils;

// Re-export commonly used types and entry points
pub use container::ContainerVariant;
pub use decode::decode;
pub use encode::encode;
pub use engine::{DecoderControl, EncoderControl, SilkDecoder, SilkEncoder, SilkEngine};
pub use error::{Result, SilkError};
pub use stream::ByteStream;
pub use types::{suggested_bitrate, DecoderConfig, EncoderConfig};

/// Version information for the container library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the container library
///
/// Installs the default tracing subscriber if none is set yet. Safe to
/// call multiple times; only the first call takes effect.
pub fn init() {
    let _ = tracing_subscriber::fmt::try_init();
    tracing::debug!("silk-container v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
