//! Batch accumulator
//!
//! Buffers parsed records and hands them out as fixed-size batches; the
//! final partial buffer is flushed at stream end. With capacity N, N+1
//! pushes produce exactly two batches: one of N and one of 1.

/// Fixed-capacity record buffer
#[derive(Debug)]
pub struct Batcher<T> {
    buf: Vec<T>,
    capacity: usize,
}

impl<T> Batcher<T> {
    /// `capacity` must be at least 1
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Add one record; returns a full batch when the buffer reaches
    /// capacity
    pub fn push(&mut self, item: T) -> Option<Vec<T>> {
        self.buf.push(item);
        if self.buf.len() >= self.capacity {
            Some(std::mem::replace(
                &mut self.buf,
                Vec::with_capacity(self.capacity),
            ))
        } else {
            None
        }
    }

    /// Flush the remaining partial batch at stream end
    pub fn finish(&mut self) -> Option<Vec<T>> {
        if self.buf.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buf))
        }
    }
}
