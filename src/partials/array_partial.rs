use std::cmp::min;
use std::fmt::{Debug, Formatter};
use std::ops::Index;

/// A fixed-capacity, inline compressed path segment.
///
/// Holds up to `N` bytes without touching the heap. Every operation is bounds-checked against
/// `N`, and writing past the capacity panics.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ArrPartial<const N: usize> {
    data: [u8; N],
    len: usize,
}

impl<const N: usize> Default for ArrPartial<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ArrPartial<N> {
    pub const CAPACITY: usize = N;

    pub fn new() -> Self {
        Self {
            data: [0; N],
            len: 0,
        }
    }

    pub fn from_slice(src: &[u8]) -> Self {
        let mut partial = Self::new();
        partial.copy_from(src, 0, src.len());
        partial
    }

    /// Replaces the contents with `count` bytes of `src` starting at `start`.
    pub fn copy_from(&mut self, src: &[u8], start: usize, count: usize) {
        assert!(
            count <= N,
            "partial of {count} bytes exceeds inline capacity {N}"
        );
        self.data[..count].copy_from_slice(&src[start..start + count]);
        self.len = count;
    }

    /// Drops the first `to_index` bytes, moving the remainder to the front.
    pub fn shift_left(&mut self, to_index: usize) {
        assert!(
            to_index <= self.len,
            "cannot shift {to_index} bytes out of a {} byte partial",
            self.len
        );
        self.data.copy_within(to_index..self.len, 0);
        self.len -= to_index;
    }

    /// Returns `self ++ [edge] ++ other`, or `None` when that would not fit inline.
    pub fn partial_extended_with(&self, edge: u8, other: &Self) -> Option<Self> {
        let len = self.len + 1 + other.len;
        if len > N {
            return None;
        }
        let mut data = [0; N];
        data[..self.len].copy_from_slice(self.as_ref());
        data[self.len] = edge;
        data[self.len + 1..len].copy_from_slice(other.as_ref());
        Some(Self { data, len })
    }

    #[inline(always)]
    pub fn at(&self, pos: usize) -> u8 {
        assert!(pos < self.len, "partial index {pos} out of bounds");
        self.data[pos]
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of leading bytes matching `key[depth..]`, capped at
    /// `min(self.len(), key.len() - depth)`.
    pub fn prefix_mismatch(&self, key: &[u8], depth: usize) -> usize {
        let remaining = key.len().saturating_sub(depth);
        let max_cmp = min(self.len, remaining);
        (0..max_cmp)
            .find(|&idx| self.data[idx] != key[depth + idx])
            .unwrap_or(max_cmp)
    }
}

impl<const N: usize> AsRef<[u8]> for ArrPartial<N> {
    fn as_ref(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl<const N: usize> Index<usize> for ArrPartial<N> {
    type Output = u8;

    fn index(&self, pos: usize) -> &Self::Output {
        assert!(pos < self.len, "partial index {pos} out of bounds");
        &self.data[pos]
    }
}

impl<const N: usize> Debug for ArrPartial<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_ref()).finish()
    }
}
