// Wed Feb 11 2026 - Alex

pub mod bytes;
pub mod engine;
pub mod factory;
pub mod numeric;
pub mod parallel;
pub mod storage;
pub mod string;
#[cfg(test)]
pub(crate) mod testutil;
pub mod types;

pub use engine::{narrow_scan, run_scan};
pub use factory::get_scan_routine;
pub use parallel::run_scan_parallel;
pub use storage::{MatchesAndOldValuesArray, OldValueAndMatchInfo, Swath};
pub use types::{
    CancelToken, FoundMatch, ScanDataType, ScanError, ScanMatchType, ScanOptions, ScanRoutine,
    ScanStats,
};
