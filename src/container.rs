//! SILK v3 container framing
//!
//! A container is `[variant byte?] + "#!SILK_V3" + frame records`, where a
//! frame record is a little-endian `i16` length followed by that many
//! payload bytes and a `-1` length terminates the stream. The permissive
//! reader accepts any one leading byte in `0x00..=0x03`; the writer emits
//! exactly `0x02` when the Tencent variant is selected, and that variant
//! also retracts the terminator after the last record.

use bytes::Buf;

use crate::error::{Result, SilkError};
use crate::stream::ByteStream;

/// The 9-byte magic tag every container carries
pub const MAGIC: &[u8; 9] = b"#!SILK_V3";

/// Variant byte emitted in front of the magic tag by the Tencent writer
pub const TENCENT_VARIANT_BYTE: u8 = 0x02;

/// Highest leading byte value the permissive reader accepts as a variant byte
const MAX_VARIANT_BYTE: u8 = 0x03;

/// Size of one frame record length field (and of the terminator), in bytes
pub const LENGTH_FIELD_SIZE: usize = 2;

/// Container flavor selection for the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerVariant {
    /// Magic tag only, terminator appended
    #[default]
    Standard,
    /// Leading `0x02` variant byte, terminator retracted
    Tencent,
}

impl ContainerVariant {
    /// The variant byte this flavor writes in front of the magic tag
    pub fn variant_byte(self) -> Option<u8> {
        match self {
            Self::Standard => None,
            Self::Tencent => Some(TENCENT_VARIANT_BYTE),
        }
    }

    /// Whether the terminator is retracted after the last frame record
    pub fn retracts_terminator(self) -> bool {
        matches!(self, Self::Tencent)
    }
}

/// Append the container header for the selected variant
pub fn write_header(stream: &mut ByteStream, variant: ContainerVariant) {
    if let Some(byte) = variant.variant_byte() {
        stream.append(&[byte]);
    }
    stream.append(MAGIC);
}

/// Locate the magic tag and return the offset of the first frame record
///
/// The tag must sit at offset 0, or at offset 1 behind a single variant
/// byte in `0x00..=0x03`. Anything else is a malformed header.
pub fn read_header(input: &[u8]) -> Result<usize> {
    if input.len() >= MAGIC.len() && input[..MAGIC.len()] == MAGIC[..] {
        return Ok(MAGIC.len());
    }
    if input.len() > MAGIC.len()
        && input[0] <= MAX_VARIANT_BYTE
        && input[1..=MAGIC.len()] == MAGIC[..]
    {
        return Ok(MAGIC.len() + 1);
    }
    Err(SilkError::MalformedHeader)
}

/// Outcome of reading one frame record
#[derive(Debug, PartialEq, Eq)]
pub enum FrameRead<'a> {
    /// A complete record; the slice borrows the payload bytes
    Frame(&'a [u8]),
    /// Terminator, truncated record, or end of input; the cursor was not
    /// advanced past the record
    EndOfStream,
}

/// Read one frame record at `cursor`
///
/// A negative length (the `-1` sentinel, or any other negative value), a
/// length field cut off by the end of input, or a payload that would read
/// past the end all yield [`FrameRead::EndOfStream`] with the cursor left
/// where it was. Truncation is a clean stop, not an error.
pub fn read_frame<'a>(input: &'a [u8], cursor: &mut usize) -> FrameRead<'a> {
    let Some(mut remaining) = input.get(*cursor..) else {
        return FrameRead::EndOfStream;
    };
    if remaining.len() < LENGTH_FIELD_SIZE {
        return FrameRead::EndOfStream;
    }

    let length = remaining.get_i16_le();
    if length < 0 {
        return FrameRead::EndOfStream;
    }
    let length = length as usize;
    if remaining.len() < length {
        return FrameRead::EndOfStream;
    }

    let start = *cursor + LENGTH_FIELD_SIZE;
    *cursor = start + length;
    FrameRead::Frame(&input[start..start + length])
}

/// Append one length-prefixed frame record
pub fn write_frame(stream: &mut ByteStream, payload: &[u8]) -> Result<()> {
    if payload.len() > i16::MAX as usize {
        return Err(SilkError::FrameTooLarge {
            size: payload.len(),
            max: i16::MAX as usize,
        });
    }
    stream.append(&(payload.len() as i16).to_le_bytes());
    stream.append(payload);
    Ok(())
}

/// Append the 2-byte `-1` terminator
pub fn write_terminator(stream: &mut ByteStream) {
    stream.append(&(-1i16).to_le_bytes());
}

/// Remove a previously written terminator
pub fn retract_terminator(stream: &mut ByteStream) -> Result<()> {
    stream.truncate_tail(LENGTH_FIELD_SIZE)
}
