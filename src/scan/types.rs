// Wed Feb 11 2026 - Alex

use crate::memory::error::MemoryError;
use crate::memory::filter::RegionFilterConfig;
use crate::memory::maps::RegionScanLevel;
use crate::value::flags::MatchFlags;
use crate::value::mem64::{Mem64, OldValue};
use crate::value::user_value::{UserValue, ValueParseError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_BLOCK_SIZE: u32 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanDataType {
    Integer8,
    Integer16,
    Integer32,
    Integer64,
    Float32,
    Float64,
    AnyInteger,
    AnyFloat,
    #[default]
    AnyNumber,
    Bytes,
    String,
}

impl ScanDataType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "i8" | "int8" => Some(Self::Integer8),
            "i16" | "int16" => Some(Self::Integer16),
            "i32" | "int32" => Some(Self::Integer32),
            "i64" | "int64" => Some(Self::Integer64),
            "f32" | "float32" => Some(Self::Float32),
            "f64" | "float64" => Some(Self::Float64),
            "int" => Some(Self::AnyInteger),
            "float" => Some(Self::AnyFloat),
            "number" => Some(Self::AnyNumber),
            "bytes" => Some(Self::Bytes),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Bytes | Self::String)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMatchType {
    #[default]
    Any,
    EqualTo,
    NotEqualTo,
    GreaterThan,
    LessThan,
    Range,
    Update,
    NotChanged,
    Changed,
    Increased,
    Decreased,
    IncreasedBy,
    DecreasedBy,
    Regex,
}

impl ScanMatchType {
    pub fn needs_user_value(self) -> bool {
        matches!(
            self,
            Self::EqualTo
                | Self::NotEqualTo
                | Self::GreaterThan
                | Self::LessThan
                | Self::Range
                | Self::IncreasedBy
                | Self::DecreasedBy
                | Self::Regex
        )
    }

    pub fn uses_old_value(self) -> bool {
        matches!(
            self,
            Self::Update
                | Self::NotChanged
                | Self::Changed
                | Self::Increased
                | Self::Decreased
                | Self::IncreasedBy
                | Self::DecreasedBy
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub data_type: ScanDataType,
    pub match_type: ScanMatchType,
    pub reverse_endianness: bool,
    /// Address stride; 1 scans every byte, 4 or 8 suit aligned numerics.
    pub step: u32,
    pub block_size: u32,
    pub region_level: RegionScanLevel,
    pub region_filter: Option<RegionFilterConfig>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            data_type: ScanDataType::default(),
            match_type: ScanMatchType::default(),
            reverse_endianness: false,
            step: 1,
            block_size: DEFAULT_BLOCK_SIZE,
            region_level: RegionScanLevel::default(),
            region_filter: None,
        }
    }
}

impl ScanOptions {
    pub fn with_data_type(mut self, data_type: ScanDataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_match_type(mut self, match_type: ScanMatchType) -> Self {
        self.match_type = match_type;
        self
    }

    pub fn with_step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    pub fn with_region_level(mut self, level: RegionScanLevel) -> Self {
        self.region_level = level;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub regions_visited: u64,
    pub bytes_scanned: u64,
    pub matches: u64,
}

/// Cooperative cancellation, polled once per block and once per region.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn rearm(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Offset and length of a located sub-pattern inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundMatch {
    pub offset: usize,
    pub length: usize,
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("no prior scan to narrow")]
    NoPriorScan,
    #[error("scan cancelled")]
    Cancelled,
    #[error("scanner is faulted; reset required")]
    Faulted,
    #[error("this match type requires a value")]
    MissingUserValue,
    #[error("malformed value: {0}")]
    MalformedValue(#[from] ValueParseError),
    #[error("unsupported combination: {data_type:?} with {match_type:?}")]
    UnsupportedCombination {
        data_type: ScanDataType,
        match_type: ScanMatchType,
    },
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl ScanError {
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ScanError::NoPriorScan
                | ScanError::MissingUserValue
                | ScanError::MalformedValue(_)
                | ScanError::UnsupportedCombination { .. }
        )
    }
}

/// A compiled matcher. Returns the width in bytes at which the window
/// matches, 0 for no match; on a positive match the corresponding width
/// bits are set through `flags_out` when one is supplied.
pub type ScanRoutine = Box<
    dyn Fn(&Mem64, Option<&OldValue>, Option<&UserValue>, Option<&mut MatchFlags>) -> usize
        + Send
        + Sync,
>;
