//! Deterministic simulation engine
//!
//! A pure-Rust stand-in for the proprietary SILK DSP library, in the same
//! spirit as a simulated codec build: payloads carry the PCM verbatim in
//! tagged subframe sections, plus an optional LBRR section replicating an
//! earlier packet. That is enough to exercise every container and
//! resilience path - multi-subframe decoding, FEC recovery at a configured
//! delay, concealment - with bit-exact, reproducible results.
//!
//! Payload layout (little-endian):
//!
//! ```text
//! 0xA5 | subframe count u8 | ( count u16, samples i16* )* |
//! [ 0x5A | delay u8 | count u16 | samples i16* ]
//! ```

use std::collections::VecDeque;

use bytes::Buf;

use crate::engine::{DecoderControl, EncoderControl, SilkDecoder, SilkEncoder, SilkEngine};
use crate::error::{Result, SilkError};

/// Tag byte opening every simulated payload
const PAYLOAD_TAG: u8 = 0xA5;

/// Tag byte opening the optional FEC section
const FEC_TAG: u8 = 0x5A;

/// Simulation engine factory
#[derive(Debug, Clone)]
pub struct SimEngine {
    fec_delay: usize,
}

impl SimEngine {
    /// Engine embedding FEC for the immediately preceding packet
    pub fn new() -> Self {
        Self { fec_delay: 1 }
    }

    /// Engine embedding FEC for the packet `delay` packets earlier
    pub fn with_fec_delay(delay: usize) -> Self {
        Self {
            fec_delay: delay.max(1),
        }
    }
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SilkEngine for SimEngine {
    fn encoder(&self, control: &EncoderControl) -> Result<Box<dyn SilkEncoder>> {
        Ok(Box::new(SimEncoder {
            use_fec: control.use_in_band_fec,
            fec_delay: self.fec_delay,
            history: VecDeque::new(),
        }))
    }

    fn decoder(&self, _control: &DecoderControl) -> Result<Box<dyn SilkDecoder>> {
        Ok(Box::new(SimDecoder {
            pending: VecDeque::new(),
            last_frame: Vec::new(),
        }))
    }
}

/// Simulated encoder session
struct SimEncoder {
    use_fec: bool,
    fec_delay: usize,
    /// Most recent packets, oldest first, capped at `fec_delay` entries
    history: VecDeque<Vec<i16>>,
}

impl SilkEncoder for SimEncoder {
    fn encode(&mut self, control: &mut EncoderControl, samples: &[i16]) -> Result<Vec<u8>> {
        let frame_samples = (control.api_sample_rate / 50).max(1) as usize;

        let subframes: Vec<&[i16]> = samples.chunks(frame_samples).collect();
        let fec_source = if self.use_fec && self.history.len() >= self.fec_delay {
            self.history.front().map(|packet| packet.as_slice())
        } else {
            None
        };
        let payload = build_payload(
            &subframes,
            fec_source.map(|samples| (self.fec_delay as u8, samples)),
        );

        self.history.push_back(samples.to_vec());
        while self.history.len() > self.fec_delay {
            self.history.pop_front();
        }

        Ok(payload)
    }
}

/// Simulated decoder session
struct SimDecoder {
    /// Subframes of the current payload not yet handed out
    pending: VecDeque<Vec<i16>>,
    /// Last decoded subframe, replayed with decay for concealment
    last_frame: Vec<i16>,
}

impl SilkDecoder for SimDecoder {
    fn decode(
        &mut self,
        control: &mut DecoderControl,
        lost: bool,
        payload: &[u8],
    ) -> Result<Vec<i16>> {
        if lost {
            self.pending.clear();
            let frame_samples = (control.api_sample_rate / 50).max(1) as usize;
            let concealed: Vec<i16> = if self.last_frame.is_empty() {
                vec![0; frame_samples]
            } else {
                self.last_frame.iter().map(|&s| s / 2).collect()
            };
            self.last_frame = concealed.clone();
            control.more_internal_frames = false;
            return Ok(concealed);
        }

        if self.pending.is_empty() {
            let parsed = parse_payload(payload)?;
            control.frames_per_packet = parsed.subframes.len();
            self.pending = parsed.subframes.into();
        }

        let subframe = self
            .pending
            .pop_front()
            .ok_or_else(|| SilkError::engine_decode_failed("payload holds no subframes"))?;
        self.last_frame = subframe.clone();
        control.more_internal_frames = !self.pending.is_empty();
        Ok(subframe)
    }

    fn search_fec(&self, payload: &[u8], delay: usize) -> Option<Vec<u8>> {
        let parsed = parse_payload(payload).ok()?;
        let (fec_delay, samples) = parsed.fec?;
        if fec_delay as usize != delay {
            return None;
        }
        Some(build_payload(&[samples.as_slice()], None))
    }
}

/// A parsed simulated payload
struct SimPayload {
    subframes: Vec<Vec<i16>>,
    fec: Option<(u8, Vec<i16>)>,
}

/// Build a simulated payload from subframe PCM and optional FEC section
///
/// Public so tests can hand-craft frame records - lossy windows, corrupt
/// subframe counts, FEC at a chosen delay - without running an encoder.
pub fn build_payload(subframes: &[&[i16]], fec: Option<(u8, &[i16])>) -> Vec<u8> {
    let mut payload = vec![PAYLOAD_TAG, subframes.len() as u8];
    for subframe in subframes {
        payload.extend_from_slice(&(subframe.len() as u16).to_le_bytes());
        for &sample in *subframe {
            payload.extend_from_slice(&sample.to_le_bytes());
        }
    }
    if let Some((delay, samples)) = fec {
        payload.push(FEC_TAG);
        payload.push(delay);
        payload.extend_from_slice(&(samples.len() as u16).to_le_bytes());
        for &sample in samples {
            payload.extend_from_slice(&sample.to_le_bytes());
        }
    }
    payload
}

fn parse_samples(buf: &mut &[u8]) -> Result<Vec<i16>> {
    if buf.len() < 2 {
        return Err(SilkError::engine_decode_failed("truncated sample count"));
    }
    let count = buf.get_u16_le() as usize;
    if buf.len() < count * 2 {
        return Err(SilkError::engine_decode_failed("truncated sample data"));
    }
    Ok((0..count).map(|_| buf.get_i16_le()).collect())
}

fn parse_payload(payload: &[u8]) -> Result<SimPayload> {
    let mut buf = payload;
    if buf.len() < 2 || buf.get_u8() != PAYLOAD_TAG {
        return Err(SilkError::engine_decode_failed("unrecognized payload tag"));
    }
    let subframe_count = buf.get_u8() as usize;

    let mut subframes = Vec::with_capacity(subframe_count);
    for _ in 0..subframe_count {
        subframes.push(parse_samples(&mut buf)?);
    }

    let fec = if buf.has_remaining() && buf.get_u8() == FEC_TAG {
        if !buf.has_remaining() {
            return Err(SilkError::engine_decode_failed("truncated FEC section"));
        }
        let delay = buf.get_u8();
        Some((delay, parse_samples(&mut buf)?))
    } else {
        None
    };

    Ok(SimPayload { subframes, fec })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder_control() -> EncoderControl {
        EncoderControl {
            api_sample_rate: 24000,
            max_internal_sample_rate: 24000,
            packet_size: 480,
            bit_rate: 24000,
            packet_loss_percentage: 0,
            complexity: 2,
            use_in_band_fec: false,
            use_dtx: false,
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let engine = SimEngine::new();
        let mut enc_control = encoder_control();
        let mut encoder = engine.encoder(&enc_control).unwrap();

        let samples: Vec<i16> = (0..480).map(|i| i as i16).collect();
        let payload = encoder.encode(&mut enc_control, &samples).unwrap();

        let mut dec_control = DecoderControl::new(24000);
        let mut decoder = engine.decoder(&dec_control).unwrap();
        let decoded = decoder.decode(&mut dec_control, false, &payload).unwrap();
        assert_eq!(decoded, samples);
        assert!(!dec_control.more_internal_frames);
        assert_eq!(dec_control.frames_per_packet, 1);
    }

    #[test]
    fn test_multi_subframe_packet_walks_all_subframes() {
        // 60 ms at 24 kHz: three 480-sample subframes
        let engine = SimEngine::new();
        let mut enc_control = encoder_control();
        enc_control.packet_size = 1440;
        let mut encoder = engine.encoder(&enc_control).unwrap();

        let samples: Vec<i16> = (0..1440).map(|i| (i % 100) as i16).collect();
        let payload = encoder.encode(&mut enc_control, &samples).unwrap();

        let mut dec_control = DecoderControl::new(24000);
        let mut decoder = engine.decoder(&dec_control).unwrap();

        let mut collected = Vec::new();
        loop {
            let subframe = decoder.decode(&mut dec_control, false, &payload).unwrap();
            collected.extend_from_slice(&subframe);
            if !dec_control.more_internal_frames {
                break;
            }
        }
        assert_eq!(collected, samples);
        assert_eq!(dec_control.frames_per_packet, 3);
    }

    #[test]
    fn test_fec_embedding_and_search() {
        let engine = SimEngine::with_fec_delay(2);
        let mut control = encoder_control();
        control.use_in_band_fec = true;
        let mut encoder = engine.encoder(&control).unwrap();

        let first: Vec<i16> = vec![7; 480];
        let second: Vec<i16> = vec![8; 480];
        let third: Vec<i16> = vec![9; 480];
        encoder.encode(&mut control, &first).unwrap();
        encoder.encode(&mut control, &second).unwrap();
        let carrying = encoder.encode(&mut control, &third).unwrap();

        let decoder = engine.decoder(&DecoderControl::new(24000)).unwrap();
        // The third packet carries the first packet's audio at delay 2
        assert!(decoder.search_fec(&carrying, 1).is_none());
        let recovered = decoder.search_fec(&carrying, 2).expect("FEC present");

        let mut dec_control = DecoderControl::new(24000);
        let mut session = engine.decoder(&dec_control).unwrap();
        let samples = session.decode(&mut dec_control, false, &recovered).unwrap();
        assert_eq!(samples, first);
    }

    #[test]
    fn test_concealment_decays_last_frame() {
        let engine = SimEngine::new();
        let mut dec_control = DecoderControl::new(24000);
        let mut decoder = engine.decoder(&dec_control).unwrap();

        let payload = build_payload(&[&[1000i16; 480]], None);
        decoder.decode(&mut dec_control, false, &payload).unwrap();

        let concealed = decoder.decode(&mut dec_control, true, &[]).unwrap();
        assert_eq!(concealed, vec![500i16; 480]);
        let concealed = decoder.decode(&mut dec_control, true, &[]).unwrap();
        assert_eq!(concealed, vec![250i16; 480]);
    }

    #[test]
    fn test_concealment_before_first_packet_is_silence() {
        let engine = SimEngine::new();
        let mut dec_control = DecoderControl::new(24000);
        let mut decoder = engine.decoder(&dec_control).unwrap();

        let concealed = decoder.decode(&mut dec_control, true, &[]).unwrap();
        assert_eq!(concealed, vec![0i16; 480]);
    }

    #[test]
    fn test_corrupt_payload_is_a_decode_error() {
        let engine = SimEngine::new();
        let mut dec_control = DecoderControl::new(24000);
        let mut decoder = engine.decoder(&dec_control).unwrap();

        let err = decoder
            .decode(&mut dec_control, false, &[0xFF, 0x01, 0x02])
            .unwrap_err();
        assert!(matches!(err, SilkError::EngineDecodeFailed { .. }));
    }
}
