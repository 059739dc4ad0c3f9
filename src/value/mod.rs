// Mon Feb 09 2026 - Alex

pub mod endian;
pub mod flags;
pub mod mem64;
pub mod scalar;
pub mod user_value;

pub use endian::ByteSwap;
pub use flags::MatchFlags;
pub use mem64::{Mem64, OldValue};
pub use scalar::ScanScalar;
pub use user_value::{Scalar, UserValue, ValueParseError};
