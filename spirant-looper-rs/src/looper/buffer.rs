use super::error::LooperError;

/// Fixed-capacity ring of audio samples.
///
/// The buffer owns no transport logic. Every access is reduced modulo the
/// loop length supplied by the caller, never modulo the capacity, so a
/// loop shorter than the buffer wraps where the loop ends.
///
/// Storage is borrowed so the engine can sit on top of a `'static` SDRAM
/// array on hardware and a small stack array in tests.
pub struct SampleBuffer<'a> {
    samples: &'a mut [f32],
}

impl<'a> SampleBuffer<'a> {
    /// Wrap caller-provided storage. Existing contents are kept; call
    /// [`clear()`](Self::clear) for a silent buffer.
    ///
    /// Returns [`LooperError::EmptyBuffer`] if `samples` is empty, since a
    /// zero capacity would make the default loop length zero.
    pub fn new(samples: &'a mut [f32]) -> Result<Self, LooperError> {
        if samples.is_empty() {
            return Err(LooperError::EmptyBuffer);
        }
        Ok(Self { samples })
    }

    /// Number of samples the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Store `value` at `position mod loop_length`.
    ///
    /// `loop_length` must be in `1..=capacity`; the engine guarantees this.
    #[inline]
    pub fn write(&mut self, position: usize, value: f32, loop_length: usize) {
        self.samples[position % loop_length] = value;
    }

    /// Read the sample at `position mod loop_length`.
    #[inline]
    pub fn read(&self, position: usize, loop_length: usize) -> f32 {
        self.samples[position % loop_length]
    }

    /// Zero every cell in `[0, capacity)`.
    ///
    /// O(capacity): several million stores for a five minute buffer.
    /// Only run from the explicit clear gesture.
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
    }

    /// Read-only view of the whole storage.
    pub fn as_slice(&self) -> &[f32] {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_storage() {
        let mut storage: [f32; 0] = [];
        assert_eq!(
            SampleBuffer::new(&mut storage).err(),
            Some(LooperError::EmptyBuffer)
        );
    }

    #[test]
    fn positions_wrap_at_loop_length_not_capacity() {
        let mut storage = [0.0f32; 8];
        let mut buf = SampleBuffer::new(&mut storage).unwrap();

        buf.write(5, 0.5, 4); // lands on index 1
        assert_eq!(buf.read(1, 4), 0.5);
        assert_eq!(buf.read(9, 4), 0.5);
        assert_eq!(buf.as_slice()[5], 0.0);
    }

    #[test]
    fn clear_zeroes_whole_capacity() {
        let mut storage = [0.25f32; 16];
        let mut buf = SampleBuffer::new(&mut storage).unwrap();
        assert_eq!(buf.capacity(), 16);

        buf.clear();
        assert!(buf.as_slice().iter().all(|&s| s == 0.0));
    }
}
