// Mon Feb 09 2026 - Alex

#![allow(unused_variables)]
#![allow(unused_mut)]
#![allow(dead_code)]
#![allow(unreachable_patterns)]

pub mod config;
pub mod memory;
pub mod scan;
pub mod scanner;
pub mod ui;
pub mod utils;
pub mod value;

pub use config::AppConfig;
pub use memory::{MemoryError, ProcMem, Region, RegionClassifier, RegionType};
pub use scan::{
    CancelToken, MatchesAndOldValuesArray, ScanDataType, ScanError, ScanMatchType, ScanOptions,
    ScanStats,
};
pub use scanner::{
    collect, format_value, MatchCollectionOptions, MatchCollector, MatchEntry, Scanner,
};
pub use value::{MatchFlags, Mem64, UserValue};
