// Mon Feb 09 2026 - Alex

use crate::value::flags::MatchFlags;
use crate::value::scalar::ScanScalar;

pub const MEM64_CAPACITY: usize = 8;

/// A read-only window of up to 8 bytes of target memory plus a declared
/// valid length. Matchers only ever see one of these, never a raw pointer
/// into a mapped buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mem64 {
    buf: [u8; MEM64_CAPACITY],
    len: usize,
}

impl Mem64 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies up to 8 bytes out of `bytes`; longer slices are truncated.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let len = bytes.len().min(MEM64_CAPACITY);
        let mut buf = [0u8; MEM64_CAPACITY];
        buf[..len].copy_from_slice(&bytes[..len]);
        Self { buf, len }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Typed extraction; fails if the scalar is wider than the window.
    pub fn read<T: ScanScalar>(&self, reverse_endian: bool) -> Option<T> {
        T::decode(self, reverse_endian)
    }
}

/// Snapshot of a tracked cell handed to matchers during a narrowing scan:
/// the stored old bytes around the cell plus the flags it matched with.
#[derive(Debug, Clone, Copy, Default)]
pub struct OldValue {
    pub mem: Mem64,
    pub flags: MatchFlags,
}

impl OldValue {
    pub fn new(mem: Mem64, flags: MatchFlags) -> Self {
        Self { mem, flags }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_clamps() {
        let long = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let mem = Mem64::from_slice(&long);
        assert_eq!(mem.len(), 8);
        assert_eq!(mem.bytes(), &long[..8]);
    }

    #[test]
    fn test_typed_read() {
        let mem = Mem64::from_slice(&42i32.to_ne_bytes());
        assert_eq!(mem.read::<i32>(false), Some(42));
        assert_eq!(mem.read::<i16>(false), Some(42));
        assert_eq!(mem.read::<i64>(false), None);
    }

    #[test]
    fn test_read_too_wide_fails() {
        let mem = Mem64::from_slice(&[1u8]);
        assert_eq!(mem.read::<u16>(false), None);
        assert_eq!(mem.read::<u8>(false), Some(1));
    }

    #[test]
    fn test_empty_window() {
        let mem = Mem64::new();
        assert!(mem.is_empty());
        assert_eq!(mem.read::<u8>(false), None);
    }
}
