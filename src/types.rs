//! Core types for the container library
//!
//! This module defines the configuration structs consumed by the encode and
//! decode pipelines, together with the fixed engine limits the container
//! format is built around.

use crate::error::{Result, SilkError};

/// Duration of one codec-internal frame in milliseconds
pub const FRAME_LENGTH_MS: u32 = 20;

/// Maximum number of codec-internal frames in one packet
pub const MAX_INPUT_FRAMES: usize = 5;

/// Jitter-window lookahead depth: how many packets of delay the in-band
/// FEC side information may span
pub const MAX_LBRR_DELAY: usize = 2;

/// Upper bound on one decoded frame record's payload, in bytes
pub const MAX_BYTES_PER_FRAME: usize = 1024;

/// Upper bound on one encoded frame record's payload, in bytes
/// (equals a peak bitrate of 100 kbps)
pub const ENCODE_MAX_BYTES_PER_FRAME: usize = 250;

/// Highest API sample rate, in kHz
pub const MAX_API_FS_KHZ: u32 = 48;

/// Sample rates accepted at the API boundary (encoder input, decoder output)
pub const SUPPORTED_API_RATES: &[u32] = &[8000, 12000, 16000, 24000, 32000, 44100, 48000];

/// Sample rates the engine may run internally
pub const SUPPORTED_INTERNAL_RATES: &[u32] = &[8000, 12000, 16000, 24000];

/// Packet durations one frame record may represent, in milliseconds
pub const SUPPORTED_PACKET_DURATIONS_MS: &[u32] = &[20, 40, 60, 80, 100];

/// Bitrate range the encoder clamps into, in bits per second
pub const BITRATE_RANGE_BPS: (u32, u32) = (5000, 100_000);

/// Encoder pipeline configuration
///
/// Mirrors the knobs of the wrapped engine's encoder control structure plus
/// the container-level variant selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Sample rate of the incoming PCM in Hz
    pub input_sample_rate: u32,
    /// Highest sample rate the engine may use internally, in Hz
    pub max_internal_sample_rate: u32,
    /// Target bitrate in bits per second (clamped into [5000, 100000])
    pub target_bitrate_bps: u32,
    /// Duration of one frame record in milliseconds
    pub packet_duration_ms: u32,
    /// Engine complexity mode (0, 1 or 2)
    pub complexity: u8,
    /// Expected network loss percentage passed to the engine (0-100)
    pub packet_loss_percent: u8,
    /// Embed redundant LBRR copies of earlier frames in later payloads
    pub use_in_band_fec: bool,
    /// Let the engine suppress output during silence
    pub use_dtx: bool,
    /// Container flavor to emit
    pub variant: crate::container::ContainerVariant,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            input_sample_rate: 24000,
            max_internal_sample_rate: 24000,
            target_bitrate_bps: 24000,
            packet_duration_ms: FRAME_LENGTH_MS,
            complexity: 2,
            packet_loss_percent: 0,
            use_in_band_fec: false,
            use_dtx: false,
            variant: crate::container::ContainerVariant::Standard,
        }
    }
}

impl EncoderConfig {
    /// Create a configuration with the default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input sample rate
    pub fn with_input_sample_rate(mut self, rate: u32) -> Self {
        self.input_sample_rate = rate;
        self
    }

    /// Set the maximum internal sample rate
    pub fn with_max_internal_sample_rate(mut self, rate: u32) -> Self {
        self.max_internal_sample_rate = rate;
        self
    }

    /// Set the target bitrate
    pub fn with_bitrate(mut self, bps: u32) -> Self {
        self.target_bitrate_bps = bps;
        self
    }

    /// Set the packet duration in milliseconds
    pub fn with_packet_duration_ms(mut self, ms: u32) -> Self {
        self.packet_duration_ms = ms;
        self
    }

    /// Set the complexity mode
    pub fn with_complexity(mut self, complexity: u8) -> Self {
        self.complexity = complexity;
        self
    }

    /// Set the expected packet loss percentage
    pub fn with_packet_loss_percent(mut self, percent: u8) -> Self {
        self.packet_loss_percent = percent;
        self
    }

    /// Enable or disable in-band FEC
    pub fn with_in_band_fec(mut self, enabled: bool) -> Self {
        self.use_in_band_fec = enabled;
        self
    }

    /// Enable or disable DTX
    pub fn with_dtx(mut self, enabled: bool) -> Self {
        self.use_dtx = enabled;
        self
    }

    /// Select the container variant
    pub fn with_variant(mut self, variant: crate::container::ContainerVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Number of PCM samples in one packet-duration block
    pub fn samples_per_block(&self) -> usize {
        (self.packet_duration_ms * self.input_sample_rate / 1000) as usize
    }

    /// Target bitrate clamped into the supported range
    pub fn clamped_bitrate(&self) -> u32 {
        self.target_bitrate_bps
            .clamp(BITRATE_RANGE_BPS.0, BITRATE_RANGE_BPS.1)
    }

    /// Validate the configuration
    ///
    /// All checks run before any engine state is allocated, so a rejected
    /// configuration leaves nothing to clean up.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_API_RATES.contains(&self.input_sample_rate) {
            return Err(SilkError::invalid_parameter(
                "input_sample_rate",
                i64::from(self.input_sample_rate),
                format!("supported: {:?}", SUPPORTED_API_RATES),
            ));
        }

        if !SUPPORTED_INTERNAL_RATES.contains(&self.max_internal_sample_rate) {
            return Err(SilkError::invalid_parameter(
                "max_internal_sample_rate",
                i64::from(self.max_internal_sample_rate),
                format!("supported: {:?}", SUPPORTED_INTERNAL_RATES),
            ));
        }

        if !SUPPORTED_PACKET_DURATIONS_MS.contains(&self.packet_duration_ms) {
            return Err(SilkError::invalid_parameter(
                "packet_duration_ms",
                i64::from(self.packet_duration_ms),
                format!("supported: {:?}", SUPPORTED_PACKET_DURATIONS_MS),
            ));
        }

        if self.complexity > 2 {
            return Err(SilkError::invalid_parameter(
                "complexity",
                i64::from(self.complexity),
                "must be 0, 1 or 2",
            ));
        }

        if self.packet_loss_percent > 100 {
            return Err(SilkError::invalid_parameter(
                "packet_loss_percent",
                i64::from(self.packet_loss_percent),
                "must be 0..=100",
            ));
        }

        Ok(())
    }
}

/// Decoder pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    /// Sample rate requested for the decoded PCM, in Hz
    pub output_sample_rate: u32,
    /// Probability in percent that an incoming frame is dropped by the
    /// loss simulator (0.0 disables loss injection)
    pub packet_loss: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            output_sample_rate: 24000,
            packet_loss: 0.0,
        }
    }
}

impl DecoderConfig {
    /// Create a configuration with the default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output sample rate
    pub fn with_output_sample_rate(mut self, rate: u32) -> Self {
        self.output_sample_rate = rate;
        self
    }

    /// Set the simulated loss probability in percent
    pub fn with_packet_loss(mut self, percent: f32) -> Self {
        self.packet_loss = percent;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_API_RATES.contains(&self.output_sample_rate) {
            return Err(SilkError::invalid_parameter(
                "output_sample_rate",
                i64::from(self.output_sample_rate),
                format!("supported: {:?}", SUPPORTED_API_RATES),
            ));
        }

        if !(0.0..=100.0).contains(&self.packet_loss) {
            return Err(SilkError::invalid_parameter(
                "packet_loss",
                self.packet_loss as i64,
                "must be within 0.0..=100.0",
            ));
        }

        Ok(())
    }
}

/// Suggest a bitrate that keeps the encoded size near 980 KiB
///
/// `pcm_len` is the raw input length in bytes (16-bit mono at 24 kHz
/// assumed, as produced by the usual transcoding front ends). With
/// `ios_adaptive` the cap drops to 24 kbps so older mobile clients keep
/// accepting the file.
pub fn suggested_bitrate(pcm_len: usize, ios_adaptive: bool) -> u32 {
    let cap: u64 = if ios_adaptive { 24000 } else { 100_000 };
    if pcm_len == 0 {
        return cap as u32;
    }
    // 980 KiB of output spread over the clip duration (pcm_len / 48000 s)
    let rate = 980u64 * 1024 * 8 * 48000 / pcm_len as u64;
    rate.min(cap) as u32
}
