// Mon Feb 09 2026 - Alex

use crate::value::flags::MatchFlags;
use crate::value::mem64::MEM64_CAPACITY;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueParseError {
    #[error("not a number: {0}")]
    NotANumber(String),
    #[error("not a byte sequence: {0}")]
    NotBytes(String),
    #[error("mask length {mask} does not equal pattern length {pattern}")]
    MaskLengthMismatch { pattern: usize, mask: usize },
    #[error("byte pattern longer than the scan window")]
    PatternTooLong,
    #[error("empty value")]
    Empty,
}

/// One concrete numeric payload. Width conversions are explicit casts done
/// by the matchers; this only remembers what the user actually typed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::I64(0)
    }
}

impl Scalar {
    pub fn as_i64(self) -> i64 {
        match self {
            Scalar::I8(v) => v as i64,
            Scalar::U8(v) => v as i64,
            Scalar::I16(v) => v as i64,
            Scalar::U16(v) => v as i64,
            Scalar::I32(v) => v as i64,
            Scalar::U32(v) => v as i64,
            Scalar::I64(v) => v,
            Scalar::U64(v) => v as i64,
            Scalar::F32(v) => v as i64,
            Scalar::F64(v) => v as i64,
        }
    }

    pub fn as_u64(self) -> u64 {
        match self {
            Scalar::I8(v) => v as u64,
            Scalar::U8(v) => v as u64,
            Scalar::I16(v) => v as u64,
            Scalar::U16(v) => v as u64,
            Scalar::I32(v) => v as u64,
            Scalar::U32(v) => v as u64,
            Scalar::I64(v) => v as u64,
            Scalar::U64(v) => v,
            Scalar::F32(v) => v as u64,
            Scalar::F64(v) => v as u64,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::I8(v) => v as f64,
            Scalar::U8(v) => v as f64,
            Scalar::I16(v) => v as f64,
            Scalar::U16(v) => v as f64,
            Scalar::I32(v) => v as f64,
            Scalar::U32(v) => v as f64,
            Scalar::I64(v) => v as f64,
            Scalar::U64(v) => v as f64,
            Scalar::F32(v) => v as f64,
            Scalar::F64(v) => v,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Scalar::F32(_) | Scalar::F64(_))
    }

    /// Width flags the payload is representable at, used to preselect which
    /// widths an aggregated scan should try.
    pub fn fit_flags(self) -> MatchFlags {
        if self.is_float() {
            return MatchFlags::F32 | MatchFlags::F64;
        }
        let mut flags = MatchFlags::B64;
        let v = self.as_i64();
        if v < 0 && !matches!(self, Scalar::U64(_)) {
            if v >= i32::MIN as i64 {
                flags |= MatchFlags::B32;
            }
            if v >= i16::MIN as i64 {
                flags |= MatchFlags::B16;
            }
            if v >= i8::MIN as i64 {
                flags |= MatchFlags::B8;
            }
        } else {
            let u = self.as_u64();
            if u <= u32::MAX as u64 {
                flags |= MatchFlags::B32;
            }
            if u <= u16::MAX as u64 {
                flags |= MatchFlags::B16;
            }
            if u <= u8::MAX as u64 {
                flags |= MatchFlags::B8;
            }
        }
        flags
    }
}

/// Tagged value supplied by the user: a scalar (with an optional paired high
/// bound for range queries), a byte vector with an optional equal-length
/// mask, or a string. Never mutated by the engine.
#[derive(Debug, Clone, Default)]
pub struct UserValue {
    pub scalar: Scalar,
    pub scalar_high: Option<Scalar>,
    pub bytes: Vec<u8>,
    pub byte_mask: Vec<u8>,
    pub string: String,
    pub flags: MatchFlags,
}

impl UserValue {
    pub fn from_scalar(scalar: Scalar) -> Self {
        Self {
            scalar,
            flags: scalar.fit_flags(),
            ..Default::default()
        }
    }

    pub fn from_range(low: Scalar, high: Scalar) -> Self {
        let mut value = Self::from_scalar(low);
        value.scalar_high = Some(high);
        value.flags = low.fit_flags() | high.fit_flags();
        value
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            flags: MatchFlags::BYTE_ARRAY,
            ..Default::default()
        }
    }

    pub fn from_string(string: impl Into<String>) -> Self {
        Self {
            string: string.into(),
            flags: MatchFlags::STRING,
            ..Default::default()
        }
    }

    pub fn with_mask(mut self, mask: Vec<u8>) -> Self {
        self.byte_mask = mask;
        self
    }

    pub fn with_flags(mut self, flags: MatchFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn has_range(&self) -> bool {
        self.scalar_high.is_some()
    }

    /// Parses a numeric token. Decimal first, then `0x` hex; floats keep
    /// their own payload so tolerant comparison can kick in later.
    pub fn parse_number(text: &str) -> Result<Self, ValueParseError> {
        let token = text.trim();
        if token.is_empty() {
            return Err(ValueParseError::Empty);
        }
        Ok(Self::from_scalar(Self::parse_scalar(token)?))
    }

    pub fn parse_range(low: &str, high: &str) -> Result<Self, ValueParseError> {
        let low = Self::parse_scalar(low.trim())?;
        let high = Self::parse_scalar(high.trim())?;
        Ok(Self::from_range(low, high))
    }

    /// Parses whitespace-separated hex byte pairs, `??` meaning wildcard.
    /// `AA ?? BB` produces pattern {AA,00,BB} and mask {FF,00,FF}.
    pub fn parse_bytes(text: &str) -> Result<Self, ValueParseError> {
        let mut bytes = Vec::new();
        let mut mask = Vec::new();
        let mut wildcards = false;
        for token in text.split_whitespace() {
            if token == "??" || token == "?" {
                bytes.push(0);
                mask.push(0);
                wildcards = true;
            } else {
                let byte = u8::from_str_radix(token, 16)
                    .map_err(|_| ValueParseError::NotBytes(token.to_string()))?;
                bytes.push(byte);
                mask.push(0xFF);
            }
        }
        if bytes.is_empty() {
            return Err(ValueParseError::Empty);
        }
        if bytes.len() > MEM64_CAPACITY {
            return Err(ValueParseError::PatternTooLong);
        }
        let value = Self::from_bytes(bytes);
        Ok(if wildcards { value.with_mask(mask) } else { value })
    }

    /// Checks the masked-pattern invariant: |mask| == |bytes| when a mask is
    /// present.
    pub fn validate_mask(&self) -> Result<(), ValueParseError> {
        if !self.byte_mask.is_empty() && self.byte_mask.len() != self.bytes.len() {
            return Err(ValueParseError::MaskLengthMismatch {
                pattern: self.bytes.len(),
                mask: self.byte_mask.len(),
            });
        }
        Ok(())
    }

    fn parse_scalar(token: &str) -> Result<Scalar, ValueParseError> {
        if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            return u64::from_str_radix(hex, 16)
                .map(Scalar::U64)
                .map_err(|_| ValueParseError::NotANumber(token.to_string()));
        }
        if let Ok(v) = token.parse::<i64>() {
            return Ok(Scalar::I64(v));
        }
        if let Ok(v) = token.parse::<u64>() {
            return Ok(Scalar::U64(v));
        }
        if let Ok(v) = token.parse::<f64>() {
            return Ok(Scalar::F64(v));
        }
        Err(ValueParseError::NotANumber(token.to_string()))
    }
}
