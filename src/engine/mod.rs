//! The codec engine seam
//!
//! The signal-processing engine that turns PCM blocks into compressed
//! payloads and back is an opaque external collaborator. This module
//! defines the capability interface the pipelines drive it through:
//! constructing an encoder or decoder session allocates and initializes the
//! engine's working state, and dropping the session releases it - on every
//! exit path, success or failure.
//!
//! [`EncoderControl`] and [`DecoderControl`] mirror the engine's control
//! structures: some fields are inputs, some are written back by the engine
//! on every call (`packet_size`, `frames_per_packet`,
//! `more_internal_frames`).

use crate::error::Result;

#[cfg(feature = "sim-engine")]
pub mod sim;

#[cfg(feature = "sim-engine")]
pub use sim::SimEngine;

/// Control structure threaded through encoder calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderControl {
    /// Sample rate of the PCM handed to [`SilkEncoder::encode`], in Hz
    pub api_sample_rate: u32,
    /// Highest sample rate the engine may use internally, in Hz
    pub max_internal_sample_rate: u32,
    /// Packet size in samples; the engine may write this back
    pub packet_size: usize,
    /// Target bitrate in bits per second
    pub bit_rate: u32,
    /// Expected network loss percentage (0-100)
    pub packet_loss_percentage: u8,
    /// Complexity mode (0, 1 or 2)
    pub complexity: u8,
    /// Embed redundant LBRR copies of earlier frames
    pub use_in_band_fec: bool,
    /// Suppress output during silence
    pub use_dtx: bool,
}

/// Control structure threaded through decoder calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderControl {
    /// Sample rate requested for decoded PCM, in Hz
    pub api_sample_rate: u32,
    /// Number of codec-internal frames in the last real packet; written by
    /// the engine, consumed by the concealment path
    pub frames_per_packet: usize,
    /// Whether the current payload holds further undecoded subframes;
    /// written by the engine after every decode call
    pub more_internal_frames: bool,
}

impl DecoderControl {
    /// Control state for the start of a decode call
    ///
    /// `frames_per_packet` starts at one so concealment works before the
    /// first packet has arrived.
    pub fn new(api_sample_rate: u32) -> Self {
        Self {
            api_sample_rate,
            frames_per_packet: 1,
            more_internal_frames: false,
        }
    }
}

/// One encoder session: engine state owned for the duration of one
/// pipeline call
pub trait SilkEncoder {
    /// Encode one block of samples, appending to the engine's current
    /// packet; returns the payload bytes emitted so far for this packet
    ///
    /// # Errors
    ///
    /// Engine-reported failures surface as
    /// [`SilkError::EngineEncodeFailed`](crate::SilkError::EngineEncodeFailed);
    /// they are never silently ignored.
    fn encode(&mut self, control: &mut EncoderControl, samples: &[i16]) -> Result<Vec<u8>>;
}

/// One decoder session: engine state owned for the duration of one
/// pipeline call
pub trait SilkDecoder {
    /// Decode one codec-internal frame from `payload`, or synthesize
    /// concealment audio when `lost` is set
    ///
    /// With `lost`, the payload is ignored and the engine produces one
    /// frame of plausible audio. Without it, repeated calls walk the
    /// payload's subframes until `control.more_internal_frames` clears.
    fn decode(&mut self, control: &mut DecoderControl, lost: bool, payload: &[u8])
        -> Result<Vec<i16>>;

    /// Scan a later packet's payload for FEC side information covering the
    /// frame `delay` packets earlier; returns a decodable payload on a hit
    fn search_fec(&self, payload: &[u8], delay: usize) -> Option<Vec<u8>>;
}

/// Factory for engine sessions
///
/// Construction performs the engine's state-size query, allocation and
/// reset in one step; a failure of any of them is
/// [`SilkError::EngineInitFailed`](crate::SilkError::EngineInitFailed).
pub trait SilkEngine: Send + Sync {
    /// Allocate and initialize a fresh encoder state
    fn encoder(&self, control: &EncoderControl) -> Result<Box<dyn SilkEncoder>>;

    /// Allocate and initialize a fresh decoder state
    fn decoder(&self, control: &DecoderControl) -> Result<Box<dyn SilkDecoder>>;
}
