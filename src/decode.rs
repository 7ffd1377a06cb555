//! Decoder pipeline: container bytes in, raw PCM out
//!
//! Emulates a receiver sitting behind a short jitter buffer. Up to
//! [`MAX_LBRR_DELAY`] frame records are primed into the lookahead window
//! before steady-state decoding begins, so FEC side information embedded
//! in later frames is already buffered when an earlier frame turns out to
//! be lost. Each iteration decodes slot 0 - as the primary payload, as a
//! payload recovered from FEC, or as engine-synthesized concealment - then
//! shifts the window. After the container is exhausted the lookahead is
//! drained with exactly [`MAX_LBRR_DELAY`] further iterations.

use tracing::{debug, trace, warn};

use crate::container::{self, FrameRead};
use crate::engine::{DecoderControl, SilkDecoder, SilkEngine};
use crate::error::Result;
use crate::jitter::JitterWindow;
use crate::loss::LossSimulator;
use crate::stream::ByteStream;
use crate::types::{DecoderConfig, MAX_INPUT_FRAMES, MAX_LBRR_DELAY};
use crate::utils::pcm;

/// Decode a SILK v3 container into raw 16-bit little-endian PCM
///
/// Truncated or negative length fields stop the read cleanly: whatever
/// audio was produced up to that point is returned. A record too large for
/// the jitter window is the one fatal parse condition
/// ([`SilkError::BufferOverflow`](crate::SilkError::BufferOverflow)). With
/// `config.packet_loss` above zero, incoming frames are dropped by the
/// deterministic loss simulator to exercise recovery.
///
/// # Errors
///
/// [`SilkError::MalformedHeader`](crate::SilkError::MalformedHeader) if the
/// magic tag is missing; engine failures and window overflow abort the
/// call. The engine state is released on every exit path.
pub fn decode(engine: &dyn SilkEngine, data: &[u8], config: &DecoderConfig) -> Result<Vec<u8>> {
    config.validate()?;

    let mut cursor = container::read_header(data)?;
    let mut control = DecoderControl::new(config.output_sample_rate);
    let mut decoder = engine.decoder(&control)?;

    let mut window = JitterWindow::new();
    let mut loss = LossSimulator::new(config.packet_loss);
    // Grow by about one second of output audio at a time
    let mut out = ByteStream::with_increment(2 * config.output_sample_rate as usize);

    debug!(
        container_bytes = data.len(),
        output_rate = config.output_sample_rate,
        packet_loss = config.packet_loss,
        "decoding"
    );

    // Prime the lookahead, emulating the first packets' arrival delay
    for _ in 0..MAX_LBRR_DELAY {
        match container::read_frame(data, &mut cursor) {
            FrameRead::Frame(payload) => window.prime(payload)?,
            FrameRead::EndOfStream => break,
        }
    }

    // Steady state: one new record in, one decoded packet out
    loop {
        match container::read_frame(data, &mut cursor) {
            FrameRead::EndOfStream => break,
            FrameRead::Frame(payload) => {
                if loss.next_is_lost() {
                    trace!(bytes = payload.len(), "loss simulator dropped frame");
                    window.mark_incoming_lost();
                } else {
                    window.push_incoming(payload)?;
                }
            }
        }
        decode_front(decoder.as_mut(), &mut control, &window, &mut out)?;
        window.shift();
    }

    // Drain the lookahead
    for _ in 0..MAX_LBRR_DELAY {
        decode_front(decoder.as_mut(), &mut control, &window, &mut out)?;
        window.shift();
    }

    Ok(out.into_vec())
}

/// Decode slot 0 of the window and append the resulting PCM
///
/// Decision order: primary payload if slot 0 holds bytes; otherwise the
/// first FEC recovery candidate found in the lookahead slots, searched in
/// delay order; otherwise engine concealment covering one packet duration.
fn decode_front(
    decoder: &mut dyn SilkDecoder,
    control: &mut DecoderControl,
    window: &JitterWindow,
    out: &mut ByteStream,
) -> Result<()> {
    let mut recovered: Option<Vec<u8>> = None;
    let mut lost = window.front_is_empty();
    if lost {
        for delay in 1..=MAX_LBRR_DELAY {
            let candidate = window.lookahead(delay);
            if candidate.is_empty() {
                continue;
            }
            if let Some(fec) = decoder.search_fec(candidate, delay) {
                debug!(delay, "recovered lost frame from FEC side information");
                recovered = Some(fec);
                lost = false;
                break;
            }
        }
    }

    let mut samples: Vec<i16> = Vec::new();
    if lost {
        // No payload and no recovery: synthesize one packet duration
        trace!(
            frames = control.frames_per_packet,
            "concealing lost frame"
        );
        for _ in 0..control.frames_per_packet {
            let frame = decoder.decode(control, true, &[])?;
            samples.extend_from_slice(&frame);
        }
    } else {
        let payload: &[u8] = recovered.as_deref().unwrap_or_else(|| window.front());
        let mut frames = 0usize;
        loop {
            let frame = decoder.decode(control, false, payload)?;
            frames += 1;
            samples.extend_from_slice(&frame);
            if frames > MAX_INPUT_FRAMES {
                // Corrupt streams can promise more subframes than a packet
                // may hold; discard the accumulation and resynchronize
                warn!(frames, "too many subframes in one packet, discarding");
                samples.clear();
                frames = 0;
            }
            if !control.more_internal_frames {
                break;
            }
        }
    }

    out.append(&pcm::samples_to_bytes(&samples));
    Ok(())
}
