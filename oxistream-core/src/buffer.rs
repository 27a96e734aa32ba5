//! Owning, resizable byte buffer for stream windows.
//!
//! [`Buffer`] backs the internal windows of the buffered reader and writer
//! templates. Unlike `Vec<u8>` it has no length/capacity split: the whole
//! capacity is always addressable, and `reset` forgets the contents while
//! reusing the allocation when that is not wasteful.

/// Dynamically allocated byte buffer.
///
/// The capacity may exceed the requested minimum: requests are rounded up to
/// allocator-friendly sizes so that repeated `reset` calls with similar
/// requests settle on one allocation.
#[derive(Debug, Default)]
pub struct Buffer {
    data: Vec<u8>,
}

/// Round a requested capacity up to an allocator-friendly size.
#[inline]
fn rounded_capacity(min_capacity: usize) -> usize {
    const PAGE: usize = 4096;
    if min_capacity == 0 {
        0
    } else if min_capacity <= PAGE {
        min_capacity.next_power_of_two()
    } else {
        min_capacity.div_ceil(PAGE) * PAGE
    }
}

impl Buffer {
    /// Create an empty buffer with no allocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with at least `min_capacity` of addressable space.
    pub fn with_capacity(min_capacity: usize) -> Self {
        Self {
            data: vec![0; rounded_capacity(min_capacity)],
        }
    }

    /// Ensure at least `min_capacity` of space. Existing contents are lost.
    ///
    /// Keeps the current allocation unless it is too small or wasteful
    /// (more than twice the rounded request).
    pub fn reset(&mut self, min_capacity: usize) {
        let target = rounded_capacity(min_capacity);
        let wasteful = self.data.len() / 2 > target;
        if self.data.len() < target || wasteful {
            self.data = vec![0; target];
        }
    }

    /// The usable size. It can be greater than the requested size.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The full addressable contents.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The full addressable contents, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let buf = Buffer::new();
        assert_eq!(buf.capacity(), 0);
        assert!(buf.as_slice().is_empty());
    }

    #[test]
    fn test_capacity_rounding() {
        let buf = Buffer::with_capacity(1904);
        assert!(buf.capacity() >= 1904);
        assert_eq!(buf.capacity(), 2048);

        let buf = Buffer::with_capacity(6000);
        assert_eq!(buf.capacity(), 8192);
    }

    #[test]
    fn test_reset_reuses_allocation() {
        let mut buf = Buffer::with_capacity(4096);
        let cap = buf.capacity();
        buf.reset(1000);
        // 4096 is not wasteful for a 1024-byte request.
        assert_eq!(buf.capacity(), cap);

        buf.reset(8192);
        assert!(buf.capacity() >= 8192);
    }

    #[test]
    fn test_reset_drops_wasteful_allocation() {
        let mut buf = Buffer::with_capacity(1 << 20);
        buf.reset(64);
        assert!(buf.capacity() < 1 << 20);
        assert!(buf.capacity() >= 64);
    }
}
