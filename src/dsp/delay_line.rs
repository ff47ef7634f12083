use super::fixed_point::{Fixed18_14, Fixed50_14};

/// Circular history buffer for one delay channel.
///
/// The slot under `position` always holds the oldest sample: `read` returns it,
/// `write` replaces it and advances, wrapping at the buffer length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayLine {
    pub sample_count_max: i64,
    pub sample_count: i64,
    buffer: Vec<Fixed50_14>,
    position: usize,
    pub decay_rate: Fixed18_14,
}

impl DelayLine {
    /// Create a zeroed delay line holding `sample_count` samples (at least one slot)
    pub fn new(sample_count: i64, sample_count_max: i64) -> Self {
        let length = sample_count.max(1) as usize;
        Self {
            sample_count_max,
            sample_count,
            buffer: vec![Fixed50_14::ZERO; length],
            position: 0,
            decay_rate: Fixed18_14::ONE,
        }
    }

    #[inline]
    pub fn read(&self) -> Fixed50_14 {
        self.buffer[self.position]
    }

    #[inline]
    pub fn write(&mut self, value: Fixed50_14) {
        self.buffer[self.position] = value;
        self.position += 1;
        if self.position >= self.buffer.len() {
            self.position = 0;
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Clear history without resizing
    pub fn reset(&mut self) {
        self.buffer.fill(Fixed50_14::ZERO);
        self.position = 0;
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
