//! Little-endian PCM byte plumbing
//!
//! The pipeline boundaries speak raw bytes; the engine speaks `i16`
//! samples. Conversions are little-endian on every platform, matching the
//! container's byte order.

/// Convert PCM bytes to samples, zero-padding to `samples` entries
///
/// The codec engine always consumes a full block, so the final partial
/// block of an input is padded with silence. A trailing odd byte is kept
/// as the low byte of one final sample.
pub fn bytes_to_samples_padded(bytes: &[u8], samples: usize) -> Vec<i16> {
    let mut out = Vec::with_capacity(samples);
    let mut chunks = bytes.chunks_exact(2);
    for pair in &mut chunks {
        out.push(i16::from_le_bytes([pair[0], pair[1]]));
    }
    if let [low] = chunks.remainder() {
        out.push(i16::from_le_bytes([*low, 0]));
    }
    out.resize(samples, 0);
    out
}

/// Convert samples to little-endian PCM bytes
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}
