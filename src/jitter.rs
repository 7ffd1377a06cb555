//! Fixed-depth jitter window for FEC lookback
//!
//! The decode pipeline keeps the next frame to decode plus
//! [`MAX_LBRR_DELAY`] lookahead frames in this window, emulating the
//! arrival delay a real jitter buffer would introduce. Slot 0 is always
//! the next frame to decode; slots `1..=MAX_LBRR_DELAY` are only searched
//! for FEC side information. All slots share one contiguous scratch buffer
//! addressed by per-slot byte lengths - an explicit, bounds-checked arena
//! rather than pointer arithmetic over a stack array.

use crate::error::{Result, SilkError};
use crate::types::{MAX_BYTES_PER_FRAME, MAX_INPUT_FRAMES, MAX_LBRR_DELAY};

/// Number of slots: the decode candidate plus the lookahead
pub const WINDOW_SLOTS: usize = MAX_LBRR_DELAY + 1;

/// Fixed byte capacity of the shared scratch buffer
pub const WINDOW_CAPACITY: usize = MAX_BYTES_PER_FRAME * MAX_INPUT_FRAMES * WINDOW_SLOTS;

/// Sliding window of buffered frame payloads
///
/// Invariants: at most [`WINDOW_SLOTS`] byte lengths are ever held; the
/// scratch buffer never exceeds [`WINDOW_CAPACITY`]; the bytes of slot `i`
/// start at the sum of the lengths of slots `0..i`. A length of zero marks
/// an empty slot - a lost frame or one never filled.
#[derive(Debug)]
pub struct JitterWindow {
    lengths: [usize; WINDOW_SLOTS],
    scratch: Vec<u8>,
    primed: usize,
}

impl JitterWindow {
    /// Create an empty window
    pub fn new() -> Self {
        Self {
            lengths: [0; WINDOW_SLOTS],
            scratch: Vec::with_capacity(WINDOW_CAPACITY),
            primed: 0,
        }
    }

    fn ensure_fits(&self, additional: usize) -> Result<()> {
        let size = self.scratch.len() + additional;
        if size > WINDOW_CAPACITY {
            return Err(SilkError::BufferOverflow {
                size,
                capacity: WINDOW_CAPACITY,
            });
        }
        Ok(())
    }

    /// Fill the next lookahead slot before steady-state decoding begins
    ///
    /// Must be called at most [`MAX_LBRR_DELAY`] times, in arrival order.
    pub fn prime(&mut self, payload: &[u8]) -> Result<()> {
        debug_assert!(self.primed < MAX_LBRR_DELAY, "window already primed");
        self.ensure_fits(payload.len())?;
        self.lengths[self.primed] = payload.len();
        self.scratch.extend_from_slice(payload);
        self.primed += 1;
        Ok(())
    }

    /// Place a newly arrived frame in the last slot
    pub fn push_incoming(&mut self, payload: &[u8]) -> Result<()> {
        self.ensure_fits(payload.len())?;
        self.lengths[WINDOW_SLOTS - 1] = payload.len();
        self.scratch.extend_from_slice(payload);
        Ok(())
    }

    /// Mark the last slot empty: the frame arrived but was dropped
    pub fn mark_incoming_lost(&mut self) {
        self.lengths[WINDOW_SLOTS - 1] = 0;
    }

    fn slot_offset(&self, slot: usize) -> usize {
        self.lengths[..slot].iter().sum()
    }

    /// Payload bytes of slot 0, the next frame to decode
    pub fn front(&self) -> &[u8] {
        &self.scratch[..self.lengths[0]]
    }

    /// Whether slot 0 holds no payload
    pub fn front_is_empty(&self) -> bool {
        self.lengths[0] == 0
    }

    /// Payload bytes of lookahead slot `slot` (1..=[`MAX_LBRR_DELAY`])
    pub fn lookahead(&self, slot: usize) -> &[u8] {
        debug_assert!((1..WINDOW_SLOTS).contains(&slot));
        let start = self.slot_offset(slot);
        &self.scratch[start..start + self.lengths[slot]]
    }

    /// Total bytes currently buffered across all slots
    pub fn buffered_bytes(&self) -> usize {
        self.scratch.len()
    }

    /// Shift the window left by one slot
    ///
    /// Removes slot 0's bytes from the scratch buffer, moves every length
    /// down one slot and clears the newly vacant last slot.
    pub fn shift(&mut self) {
        self.scratch.drain(..self.lengths[0]);
        self.lengths.rotate_left(1);
        self.lengths[WINDOW_SLOTS - 1] = 0;
    }
}

impl Default for JitterWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prime_fills_slots_in_order() {
        let mut window = JitterWindow::new();
        window.prime(&[1, 2, 3]).unwrap();
        window.prime(&[4, 5]).unwrap();

        assert_eq!(window.front(), &[1, 2, 3]);
        assert_eq!(window.lookahead(1), &[4, 5]);
        assert_eq!(window.lookahead(2), &[] as &[u8]);
        assert_eq!(window.buffered_bytes(), 5);
    }

    #[test]
    fn test_incoming_lands_in_last_slot() {
        let mut window = JitterWindow::new();
        window.prime(&[1]).unwrap();
        window.prime(&[2, 2]).unwrap();
        window.push_incoming(&[3, 3, 3]).unwrap();

        assert_eq!(window.front(), &[1]);
        assert_eq!(window.lookahead(1), &[2, 2]);
        assert_eq!(window.lookahead(2), &[3, 3, 3]);
    }

    #[test]
    fn test_shift_compacts_scratch() {
        let mut window = JitterWindow::new();
        window.prime(&[1, 1]).unwrap();
        window.prime(&[2]).unwrap();
        window.push_incoming(&[3, 3]).unwrap();

        window.shift();
        assert_eq!(window.front(), &[2]);
        assert_eq!(window.lookahead(1), &[3, 3]);
        assert_eq!(window.lookahead(2), &[] as &[u8]);
        assert_eq!(window.buffered_bytes(), 3);
    }

    #[test]
    fn test_lost_frame_leaves_empty_slot_and_no_bytes() {
        let mut window = JitterWindow::new();
        window.prime(&[1]).unwrap();
        window.prime(&[]).unwrap();
        window.mark_incoming_lost();

        assert!(!window.front_is_empty());
        assert!(window.lookahead(1).is_empty());
        assert!(window.lookahead(2).is_empty());
        assert_eq!(window.buffered_bytes(), 1);

        // After the empty slot reaches the front it decodes as lost
        window.shift();
        assert!(window.front_is_empty());
    }

    #[test]
    fn test_slot_addressing_skips_empty_slots() {
        let mut window = JitterWindow::new();
        window.prime(&[]).unwrap(); // slot 0 lost
        window.prime(&[7, 7]).unwrap();
        window.push_incoming(&[8]).unwrap();

        assert!(window.front_is_empty());
        assert_eq!(window.lookahead(1), &[7, 7]);
        assert_eq!(window.lookahead(2), &[8]);
    }

    #[test]
    fn test_overflow_is_fatal() {
        let mut window = JitterWindow::new();
        let big = vec![0u8; WINDOW_CAPACITY - 10];
        window.prime(&big).unwrap();

        let err = window.push_incoming(&[0u8; 11]).unwrap_err();
        assert!(matches!(err, SilkError::BufferOverflow { .. }));
    }

    #[test]
    fn test_shift_after_overflow_rejection_keeps_window_consistent() {
        let mut window = JitterWindow::new();
        window.prime(&[1, 2]).unwrap();
        window.prime(&[3]).unwrap();
        assert!(window.push_incoming(&vec![0u8; WINDOW_CAPACITY]).is_err());

        // The rejected frame left no partial state behind
        assert_eq!(window.buffered_bytes(), 3);
        window.shift();
        assert_eq!(window.front(), &[3]);
    }
}
