//! Fixed-capacity circular byte buffer (C1 in the design doc): the sole
//! queueing primitive between transport I/O and the protocol codec.
//!
//! Storage is a plain `[u8; N]` owned by the ring itself (no allocation),
//! with `start`/`size` tracking the logical window the same way the
//! teacher's submission/completion queues track `head`/`tail` over a shared
//! mmap — except here the ring owns its backing array directly, so the
//! "first contiguous block" operations below can hand out plain borrowed
//! slices instead of raw pointers.

use crate::err::AscError;

/// A fixed-capacity FIFO of bytes with both byte-wise and block-wise
/// operations. `N` is the capacity; `0 <= size <= N` is maintained as an
/// invariant by every method (property R1 in spec §8.1).
pub struct ByteRing<const N: usize> {
    buf: [u8; N],
    start: usize,
    size: usize,
}

impl<const N: usize> Default for ByteRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteRing<N> {
    /// Capacity must be non-zero; an empty ring.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            start: 0,
            size: 0,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.size == N
    }

    pub fn clear(&mut self) {
        self.start = 0;
        self.size = 0;
    }

    fn stop(&self) -> usize {
        (self.start + self.size) % N
    }

    /// Appends `b` at the logical end. If the ring is full, evicts the
    /// oldest byte first — documented semantics, not an overflow error.
    pub fn push_back(&mut self, b: u8) {
        if self.is_full() {
            self.start = (self.start + 1) % N;
            self.size -= 1;
        }
        let stop = self.stop();
        self.buf[stop] = b;
        self.size += 1;
    }

    /// Prepends `b` at the logical start. If the ring is full, evicts the
    /// newest byte first.
    pub fn push_front(&mut self, b: u8) {
        if self.is_full() {
            self.size -= 1;
        }
        self.start = (self.start + N - 1) % N;
        self.buf[self.start] = b;
        self.size += 1;
    }

    pub fn pop_back(&mut self) -> Result<u8, AscError> {
        if self.is_empty() {
            return Err(AscError::CbPopEmpty);
        }
        self.size -= 1;
        Ok(self.buf[self.stop()])
    }

    pub fn pop_front(&mut self) -> Result<u8, AscError> {
        if self.is_empty() {
            return Err(AscError::CbPopEmpty);
        }
        let b = self.buf[self.start];
        self.start = (self.start + 1) % N;
        self.size -= 1;
        Ok(b)
    }

    /// Byte at logical offset `i`, `0 <= i < size`.
    pub fn get(&self, i: usize) -> Result<u8, AscError> {
        if i >= self.size {
            return Err(AscError::CbOob);
        }
        Ok(self.buf[(self.start + i) % N])
    }

    /// Logical index of the first occurrence of `v`, or `size()` if absent.
    #[must_use]
    pub fn find_first(&self, v: u8) -> usize {
        for i in 0..self.size {
            if self.buf[(self.start + i) % N] == v {
                return i;
            }
        }
        self.size
    }

    /// Logical index of the last occurrence of `v`, or `size()` if absent.
    #[must_use]
    pub fn find_last(&self, v: u8) -> usize {
        for i in (0..self.size).rev() {
            if self.buf[(self.start + i) % N] == v {
                return i;
            }
        }
        self.size
    }

    #[must_use]
    pub fn count(&self, v: u8) -> usize {
        (0..self.size)
            .filter(|&i| self.buf[(self.start + i) % N] == v)
            .count()
    }

    /// Drains from the front until `v` is found, consuming `v` itself iff
    /// `inclusive`. Empties the ring if `v` is not present.
    pub fn remove_front_to(&mut self, v: u8, inclusive: bool) {
        let idx = self.find_first(v);
        if idx == self.size {
            self.clear();
            return;
        }
        for _ in 0..idx {
            let _ = self.pop_front();
        }
        if inclusive {
            let _ = self.pop_front();
        }
    }

    /// Drains from the back until `v` is found, consuming `v` itself iff
    /// `inclusive`. Empties the ring if `v` is not present.
    pub fn remove_back_to(&mut self, v: u8, inclusive: bool) {
        let idx = self.find_last(v);
        if idx == self.size {
            self.clear();
            return;
        }
        let from_back = self.size - 1 - idx;
        for _ in 0..from_back {
            let _ = self.pop_back();
        }
        if inclusive {
            let _ = self.pop_back();
        }
    }

    /// The largest contiguous prefix of the ring as it sits in the backing
    /// array: `size` bytes if the logical window doesn't wrap, otherwise
    /// `capacity - start`. Lets callers do zero-copy I/O against transports
    /// that want `(ptr, len)` pairs without the ring losing wrap-transparency
    /// for ordinary byte-wise callers.
    #[must_use]
    pub fn first_block(&self) -> &[u8] {
        let len = core::cmp::min(self.size, N - self.start);
        &self.buf[self.start..self.start + len]
    }

    /// Removes exactly the bytes returned by the most recent [`Self::first_block`].
    pub fn delete_first_block(&mut self) {
        let len = core::cmp::min(self.size, N - self.start);
        if len == self.size {
            self.start = 0;
            self.size = 0;
        } else {
            self.start = (self.start + len) % N;
            self.size -= len;
        }
    }

    /// Pushes `src` byte by byte, evicting from the front as needed.
    pub fn push_back_block(&mut self, src: &[u8]) {
        for &b in src {
            self.push_back(b);
        }
    }

    /// Pushes bytes written by `read_fn` into the ring's contiguous tail
    /// region, up to `min(free space, contiguous free space)` bytes.
    /// `read_fn` receives a `&mut [u8]` of that length and returns how many
    /// bytes it actually wrote (must be `<=` the slice length); its error
    /// bubbles straight through.
    pub fn push_back_from_reader<E>(
        &mut self,
        read_fn: impl FnOnce(&mut [u8]) -> Result<usize, E>,
    ) -> Result<usize, E> {
        let free = N - self.size;
        if free == 0 {
            return Ok(0);
        }
        let stop = self.stop();
        let contig_free = core::cmp::min(free, N - stop);
        let n = read_fn(&mut self.buf[stop..stop + contig_free])?;
        let n = core::cmp::min(n, contig_free);
        self.size += n;
        Ok(n)
    }

    /// Hands `write_fn` the ring's contiguous head region (up to `size`
    /// bytes without wrapping) and advances the ring by however many bytes
    /// it reports consuming.
    pub fn pop_front_to_writer<E>(
        &mut self,
        write_fn: impl FnOnce(&[u8]) -> Result<usize, E>,
    ) -> Result<usize, E> {
        if self.is_empty() {
            return Ok(0);
        }
        let contig = core::cmp::min(self.size, N - self.start);
        let n = write_fn(&self.buf[self.start..self.start + contig])?;
        let n = core::cmp::min(n, contig);
        self.start = (self.start + n) % N;
        self.size -= n;
        Ok(n)
    }

    /// Pushes bytes from a NUL-terminated byte string, stopping before the
    /// NUL (which is not pushed).
    pub fn push_back_cstr(&mut self, s: &[u8]) {
        for &b in s {
            if b == 0 {
                break;
            }
            self.push_back(b);
        }
    }
}
