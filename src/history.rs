//! Fixed-capacity (x, y, z) history backing one graph segment.
//!
//! Values are written back-to-front: the first sample lands in the last slot
//! and each newer sample one slot lower, so slot 0 always holds the newest
//! value once the history is full. Unwritten slots read as zero.

use crate::types::Triple;
use std::ops::Index;

/// Slots per history: 32 line segments need 33 points.
pub const HISTORY_CAPACITY: usize = 33;

/// Display width of one full segment at one unit per sample.
pub const SEGMENT_WIDTH: f32 = (HISTORY_CAPACITY - 1) as f32;

/// One of the three parallel channel sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    X,
    Y,
    Z,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::X, Channel::Y, Channel::Z];
}

#[derive(Debug, Clone)]
pub struct SampleHistory {
    x: [f64; HISTORY_CAPACITY],
    y: [f64; HISTORY_CAPACITY],
    z: [f64; HISTORY_CAPACITY],
    /// Free slots remaining; the newest value lives at this index.
    cursor: usize,
}

impl SampleHistory {
    pub fn new() -> Self {
        Self {
            x: [0.0; HISTORY_CAPACITY],
            y: [0.0; HISTORY_CAPACITY],
            z: [0.0; HISTORY_CAPACITY],
            cursor: HISTORY_CAPACITY,
        }
    }

    /// Record one sample. Returns true when this sample filled the last slot.
    ///
    /// # Panics
    /// Panics if the history is already full; callers recycle first.
    pub fn append(&mut self, x: f64, y: f64, z: f64) -> bool {
        assert!(self.cursor > 0, "append to a full sample history");
        self.cursor -= 1;
        self.x[self.cursor] = x;
        self.y[self.cursor] = y;
        self.z[self.cursor] = z;
        self.cursor == 0
    }

    pub fn reset(&mut self) {
        self.x = [0.0; HISTORY_CAPACITY];
        self.y = [0.0; HISTORY_CAPACITY];
        self.z = [0.0; HISTORY_CAPACITY];
        self.cursor = HISTORY_CAPACITY;
    }

    pub fn is_full(&self) -> bool {
        self.cursor == 0
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == HISTORY_CAPACITY
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        HISTORY_CAPACITY - self.cursor
    }

    /// Free slots remaining (the fill cursor).
    pub fn remaining(&self) -> usize {
        self.cursor
    }

    /// Read one slot, populated or not. `None` past the end of the buffer.
    pub fn get(&self, slot: usize) -> Option<Triple> {
        if slot >= HISTORY_CAPACITY {
            return None;
        }
        Some(Triple::new(self.x[slot], self.y[slot], self.z[slot]))
    }

    /// The most recently appended sample, if any.
    pub fn latest(&self) -> Option<Triple> {
        if self.is_empty() {
            None
        } else {
            self.get(self.cursor)
        }
    }

    /// All slots of one channel, slot 0 first. Unwritten slots are zero.
    pub fn channel(&self, channel: Channel) -> &[f64; HISTORY_CAPACITY] {
        match channel {
            Channel::X => &self.x,
            Channel::Y => &self.y,
            Channel::Z => &self.z,
        }
    }

    /// Populated samples, newest first.
    pub fn iter(&self) -> impl Iterator<Item = Triple> + '_ {
        (self.cursor..HISTORY_CAPACITY).map(move |i| Triple::new(self.x[i], self.y[i], self.z[i]))
    }
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<(Channel, usize)> for SampleHistory {
    type Output = f64;

    fn index(&self, (channel, slot): (Channel, usize)) -> &f64 {
        &self.channel(channel)[slot]
    }
}
