// Mon Feb 09 2026 - Alex

use crate::value::endian::ByteSwap;
use crate::value::flags::MatchFlags;
use crate::value::mem64::Mem64;
use crate::value::user_value::UserValue;

/// A scalar the scan engine can decode out of a window and compare against
/// a user value. Implemented for the eight integer shapes and both floats;
/// the matchers are generic over this so the hot path carries no type tags.
pub trait ScanScalar: Copy + PartialOrd + Send + Sync + 'static {
    const WIDTH: usize;
    const FLAG: MatchFlags;

    /// Decodes `WIDTH` bytes from the window in the active endianness.
    /// Fails when the window is narrower than the scalar.
    fn decode(mem: &Mem64, reverse_endian: bool) -> Option<Self>;

    /// Reads the user value (low bound) back at this width.
    fn from_user(user: &UserValue) -> Self;

    /// Reads the paired high bound; falls back to the low bound when the
    /// user supplied no range.
    fn from_user_high(user: &UserValue) -> Self;

    /// Equality; exact for integers, tolerant for floats.
    fn matches_eq(self, other: Self) -> bool;

    /// Whether `self - old == delta`, wrapping for integers.
    fn delta_matches(self, old: Self, delta: Self) -> bool;

    fn to_ne_byte_vec(self) -> Vec<u8>;
}

macro_rules! impl_scan_scalar_int {
    ($($t:ty => ($width:expr, $flag:expr, $from_user:ident)),*) => {
        $(
            impl ScanScalar for $t {
                const WIDTH: usize = $width;
                const FLAG: MatchFlags = $flag;

                fn decode(mem: &Mem64, reverse_endian: bool) -> Option<Self> {
                    let bytes = mem.bytes().get(..Self::WIDTH)?;
                    let value = <$t>::from_ne_bytes(bytes.try_into().ok()?);
                    Some(if reverse_endian { value.byte_swapped() } else { value })
                }

                fn from_user(user: &UserValue) -> Self {
                    user.scalar.$from_user() as $t
                }

                fn from_user_high(user: &UserValue) -> Self {
                    user.scalar_high.unwrap_or(user.scalar).$from_user() as $t
                }

                fn matches_eq(self, other: Self) -> bool {
                    self == other
                }

                fn delta_matches(self, old: Self, delta: Self) -> bool {
                    self.wrapping_sub(old) == delta
                }

                fn to_ne_byte_vec(self) -> Vec<u8> {
                    self.to_ne_bytes().to_vec()
                }
            }
        )*
    };
}

impl_scan_scalar_int!(
    i8 => (1, MatchFlags::B8, as_i64),
    u8 => (1, MatchFlags::B8, as_u64),
    i16 => (2, MatchFlags::B16, as_i64),
    u16 => (2, MatchFlags::B16, as_u64),
    i32 => (4, MatchFlags::B32, as_i64),
    u32 => (4, MatchFlags::B32, as_u64),
    i64 => (8, MatchFlags::B64, as_i64),
    u64 => (8, MatchFlags::B64, as_u64)
);

macro_rules! impl_scan_scalar_float {
    ($($t:ty => ($width:expr, $flag:expr, $eps:expr)),*) => {
        $(
            impl ScanScalar for $t {
                const WIDTH: usize = $width;
                const FLAG: MatchFlags = $flag;

                fn decode(mem: &Mem64, reverse_endian: bool) -> Option<Self> {
                    let bytes = mem.bytes().get(..Self::WIDTH)?;
                    let value = <$t>::from_ne_bytes(bytes.try_into().ok()?);
                    Some(if reverse_endian { value.byte_swapped() } else { value })
                }

                fn from_user(user: &UserValue) -> Self {
                    user.scalar.as_f64() as $t
                }

                fn from_user_high(user: &UserValue) -> Self {
                    user.scalar_high.unwrap_or(user.scalar).as_f64() as $t
                }

                fn matches_eq(self, other: Self) -> bool {
                    if self == other {
                        return true;
                    }
                    let tolerance = self.abs().max(other.abs()) * $eps;
                    (self - other).abs() <= tolerance
                }

                fn delta_matches(self, old: Self, delta: Self) -> bool {
                    (self - old).matches_eq(delta)
                }

                fn to_ne_byte_vec(self) -> Vec<u8> {
                    self.to_ne_bytes().to_vec()
                }
            }
        )*
    };
}

impl_scan_scalar_float!(
    f32 => (4, MatchFlags::F32, 1e-7),
    f64 => (8, MatchFlags::F64, 1e-13)
);
