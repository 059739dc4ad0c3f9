// Fri Feb 13 2026 - Alex

pub mod collector;
pub mod formatter;
pub mod scanner;

pub use collector::{collect, MatchCollectionOptions, MatchCollector, MatchEntry};
pub use formatter::format_value;
pub use scanner::{Scanner, ScannerState};
