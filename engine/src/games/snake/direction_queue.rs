use ringbuffer::{AllocRingBuffer, RingBuffer};

use super::types::Direction;

/// Pending turns the player has typed ahead of the movement tick.
///
/// The buffer is a sliding window: once full, a new turn evicts the oldest.
/// Every accepted entry differs from, and does not reverse, the direction
/// that precedes it (the previous entry, or the live heading).
pub struct DirectionQueue {
    buffer: AllocRingBuffer<Direction>,
}

impl DirectionQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: AllocRingBuffer::new(capacity.max(1)),
        }
    }

    /// Returns whether `candidate` was buffered.
    pub fn enqueue(&mut self, candidate: Direction, current_heading: Direction) -> bool {
        if candidate.is_none() {
            return false;
        }

        let reference = self.buffer.back().copied().unwrap_or(current_heading);
        if candidate == reference || candidate.is_opposite(&reference) {
            return false;
        }

        if self.buffer.is_full() {
            self.buffer.dequeue();
        }
        self.buffer.push(candidate);
        true
    }

    /// Oldest pending turn, or `Direction::None` to keep going straight.
    pub fn dequeue_next(&mut self) -> Direction {
        self.buffer.dequeue().unwrap_or(Direction::None)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn pending(&self) -> Vec<Direction> {
        self.buffer.iter().copied().collect()
    }
}
