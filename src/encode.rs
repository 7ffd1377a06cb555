//! Encoder pipeline: raw PCM in, container bytes out
//!
//! Chunks the input into packet-duration blocks, drives the engine one
//! block at a time, and flushes one frame record whenever a full packet
//! duration of samples has been accumulated. The whole input is processed
//! as one batch call with no persistent state across calls.

use tracing::{debug, trace};

use crate::container;
use crate::engine::{EncoderControl, SilkEngine};
use crate::error::Result;
use crate::stream::ByteStream;
use crate::types::{EncoderConfig, ENCODE_MAX_BYTES_PER_FRAME, MAX_INPUT_FRAMES};
use crate::utils::pcm;

/// Encode raw 16-bit little-endian PCM into a SILK v3 container
///
/// The final partial block is zero-padded to a full block because the
/// engine always consumes fixed-size blocks. Zero input samples still
/// produce a well-formed container: header plus terminator, or header
/// alone in the Tencent variant.
///
/// # Errors
///
/// Configuration errors surface as
/// [`SilkError::InvalidParameter`](crate::SilkError::InvalidParameter)
/// before any engine state is allocated. Engine failures are fatal and
/// return no partial output; the engine state is released on every exit
/// path.
pub fn encode(engine: &dyn SilkEngine, pcm_bytes: &[u8], config: &EncoderConfig) -> Result<Vec<u8>> {
    config.validate()?;

    let block_samples = config.samples_per_block();
    let block_bytes = block_samples * 2;
    let api_rate = config.input_sample_rate as usize;

    let mut stream = ByteStream::with_increment(
        ENCODE_MAX_BYTES_PER_FRAME * MAX_INPUT_FRAMES * 1000 / config.packet_duration_ms as usize,
    );
    container::write_header(&mut stream, config.variant);

    let mut control = EncoderControl {
        api_sample_rate: config.input_sample_rate,
        max_internal_sample_rate: config.max_internal_sample_rate,
        packet_size: block_samples,
        bit_rate: config.clamped_bitrate(),
        packet_loss_percentage: config.packet_loss_percent,
        complexity: config.complexity,
        use_in_band_fec: config.use_in_band_fec,
        use_dtx: config.use_dtx,
    };
    let mut encoder = engine.encoder(&control)?;

    debug!(
        input_bytes = pcm_bytes.len(),
        block_samples,
        bitrate = control.bit_rate,
        variant = ?config.variant,
        "encoding"
    );

    let mut pending: Vec<u8> = Vec::with_capacity(ENCODE_MAX_BYTES_PER_FRAME * MAX_INPUT_FRAMES);
    let mut samples_since_flush = 0usize;

    for chunk in pcm_bytes.chunks(block_bytes) {
        let block = pcm::bytes_to_samples_padded(chunk, block_samples);
        let payload = encoder.encode(&mut control, &block)?;
        pending.extend_from_slice(&payload);

        // The engine may have adjusted its packet size; flush on its terms
        let packet_ms = 1000 * control.packet_size / api_rate;
        samples_since_flush += block_samples;
        if 1000 * samples_since_flush / api_rate == packet_ms {
            trace!(bytes = pending.len(), "flushing frame record");
            container::write_frame(&mut stream, &pending)?;
            pending.clear();
            samples_since_flush = 0;
        }
    }

    container::write_terminator(&mut stream);
    if config.variant.retracts_terminator() {
        container::retract_terminator(&mut stream)?;
    }

    Ok(stream.into_vec())
}
