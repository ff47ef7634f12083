/// Shared mix buffer slots for one tick
///
/// Every slot holds `sample_count` signed 32-bit samples and is addressed by an
/// integer offset. The pool is allocated once and never resized while a tick is
/// in flight, so commands can hand samples to each other through it.
#[derive(Debug, Clone)]
pub struct MixBufferPool {
    samples: Vec<i32>,
    buffer_count: usize,
    sample_count: usize,
}

impl MixBufferPool {
    /// Create a zeroed pool
    ///
    /// # Arguments
    /// * `buffer_count` - Number of slots
    /// * `sample_count` - Samples per slot per tick
    pub fn new(buffer_count: usize, sample_count: usize) -> Self {
        Self {
            samples: vec![0; buffer_count * sample_count],
            buffer_count,
            sample_count,
        }
    }

    pub fn buffer_count(&self) -> usize {
        self.buffer_count
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Resolve a command's channel offset to a slot index, if it is inside the pool
    pub fn slot(&self, offset: i16) -> Option<usize> {
        usize::try_from(offset)
            .ok()
            .filter(|&slot| slot < self.buffer_count)
    }

    pub fn channel(&self, slot: usize) -> Option<&[i32]> {
        let start = slot.checked_mul(self.sample_count)?;
        self.samples.get(start..start + self.sample_count)
    }

    pub fn channel_mut(&mut self, slot: usize) -> Option<&mut [i32]> {
        let start = slot.checked_mul(self.sample_count)?;
        self.samples.get_mut(start..start + self.sample_count)
    }

    /// Read one sample. `slot` must have been resolved through [`Self::slot`].
    #[inline]
    pub fn sample(&self, slot: usize, index: usize) -> i32 {
        self.samples[slot * self.sample_count + index]
    }

    /// Write one sample. `slot` must have been resolved through [`Self::slot`].
    #[inline]
    pub fn set_sample(&mut self, slot: usize, index: usize, value: i32) {
        self.samples[slot * self.sample_count + index] = value;
    }

    /// Copy one slot into another. Aliasing slots are left alone.
    ///
    /// Returns false if either slot is outside the pool.
    pub fn copy_channel(&mut self, source: usize, destination: usize) -> bool {
        if source >= self.buffer_count || destination >= self.buffer_count {
            return false;
        }
        if source != destination {
            let start = source * self.sample_count;
            self.samples
                .copy_within(start..start + self.sample_count, destination * self.sample_count);
        }
        true
    }

    /// Zero every slot
    pub fn clear(&mut self) {
        self.samples.fill(0);
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.samples
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut self.samples
    }
}

impl Default for MixBufferPool {
    fn default() -> Self {
        // 24 slots of 240 samples: one 5ms tick at 48kHz
        Self::new(24, 240)
    }
}
