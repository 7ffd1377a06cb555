//! Growable output buffer with increment-quantized growth
//!
//! Both pipeline directions write their result through [`ByteStream`]: the
//! encoder appends header, frame records and terminator, the decoder appends
//! decoded PCM. Capacity grows by whole multiples of a caller-chosen
//! increment so a long batch call settles into a predictable reallocation
//! cadence instead of doubling.

use crate::error::{Result, SilkError};

/// Growable byte buffer backing the pipeline outputs
///
/// Invariants: `len() <= capacity()` always; capacity only grows, in whole
/// increments, and only when an append does not fit. A trailing trim
/// zero-fills the vacated range before shrinking so stale bytes cannot leak
/// into a later append.
#[derive(Debug)]
pub struct ByteStream {
    data: Vec<u8>,
    growth_increment: usize,
}

impl ByteStream {
    /// Create an empty stream sized for at least one increment
    ///
    /// A zero increment is bumped to one byte so growth always terminates.
    pub fn with_increment(growth_increment: usize) -> Self {
        let growth_increment = growth_increment.max(1);
        Self {
            data: Vec::with_capacity(growth_increment),
            growth_increment,
        }
    }

    /// Append bytes, growing capacity in increment-sized steps
    ///
    /// Performs at most one reallocation per call: the target capacity is
    /// computed up front and reserved in one step.
    pub fn append(&mut self, bytes: &[u8]) {
        let needed = self.data.len() + bytes.len();
        if needed > self.data.capacity() {
            let mut target = self.data.capacity();
            while needed > target {
                target += self.growth_increment;
            }
            self.data.reserve_exact(target - self.data.len());
        }
        self.data.extend_from_slice(bytes);
    }

    /// Remove the last `n` bytes, zero-filling the vacated tail
    pub fn truncate_tail(&mut self, n: usize) -> Result<()> {
        if n > self.data.len() {
            return Err(SilkError::InvalidLength {
                requested: n,
                available: self.data.len(),
            });
        }
        let new_len = self.data.len() - n;
        self.data[new_len..].fill(0);
        self.data.truncate(new_len);
        Ok(())
    }

    /// Current size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the stream holds no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current capacity in bytes
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// View the written bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the stream, transferring ownership of the buffer
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
