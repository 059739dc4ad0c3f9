// Wed Feb 11 2026 - Alex

use crate::scan::types::{FoundMatch, ScanMatchType, ScanRoutine};
use crate::value::flags::MatchFlags;
use crate::value::mem64::Mem64;

/// Compares `pattern` against the start of the window. Empty patterns and
/// patterns longer than the window never match.
pub fn compare_bytes(mem: &Mem64, pattern: &[u8], flags_out: Option<&mut MatchFlags>) -> usize {
    if pattern.is_empty() || pattern.len() > mem.len() {
        return 0;
    }
    if &mem.bytes()[..pattern.len()] != pattern {
        return 0;
    }
    if let Some(flags) = flags_out {
        *flags |= MatchFlags::BYTE_ARRAY;
    }
    pattern.len()
}

/// Masked comparison: `(byte & mask) == (pattern & mask)` per position.
/// A mask whose length differs from the pattern's never matches.
pub fn compare_bytes_masked(
    mem: &Mem64,
    pattern: &[u8],
    mask: &[u8],
    flags_out: Option<&mut MatchFlags>,
) -> usize {
    if pattern.is_empty() || pattern.len() > mem.len() || mask.len() != pattern.len() {
        return 0;
    }
    let window = mem.bytes();
    for i in 0..pattern.len() {
        if window[i] & mask[i] != pattern[i] & mask[i] {
            return 0;
        }
    }
    if let Some(flags) = flags_out {
        *flags |= MatchFlags::BYTE_ARRAY;
    }
    pattern.len()
}

/// First offset where `pattern` occurs as a contiguous substring of
/// `haystack`.
pub fn find_byte_pattern(haystack: &[u8], pattern: &[u8]) -> Option<FoundMatch> {
    if pattern.is_empty() || pattern.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(pattern.len())
        .position(|w| w == pattern)
        .map(|offset| FoundMatch {
            offset,
            length: pattern.len(),
        })
}

/// Masked variant of [`find_byte_pattern`].
pub fn find_byte_pattern_masked(
    haystack: &[u8],
    pattern: &[u8],
    mask: &[u8],
) -> Option<FoundMatch> {
    if pattern.is_empty() || pattern.len() > haystack.len() || mask.len() != pattern.len() {
        return None;
    }
    haystack
        .windows(pattern.len())
        .position(|w| {
            w.iter()
                .zip(pattern)
                .zip(mask)
                .all(|((&b, &p), &m)| b & m == p & m)
        })
        .map(|offset| FoundMatch {
            offset,
            length: pattern.len(),
        })
}

/// Byte-array matcher; picks the masked comparison when the user supplied
/// a mask.
pub fn make_bytearray_routine(match_type: ScanMatchType) -> ScanRoutine {
    Box::new(move |mem, _old, user, flags_out| match match_type {
        ScanMatchType::Any => {
            if mem.is_empty() {
                return 0;
            }
            if let Some(flags) = flags_out {
                *flags |= MatchFlags::BYTE_ARRAY;
            }
            mem.len()
        }
        ScanMatchType::EqualTo => {
            let Some(user) = user else { return 0 };
            if user.byte_mask.is_empty() {
                compare_bytes(mem, &user.bytes, flags_out)
            } else {
                compare_bytes_masked(mem, &user.bytes, &user.byte_mask, flags_out)
            }
        }
        _ => 0,
    })
}
