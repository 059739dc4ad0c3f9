// Tue Feb 10 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid pid: {0}")]
    InvalidPid(i32),
    #[error("process {0} not found")]
    ProcessNotFound(i32),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("interrupted while accessing process memory")]
    Interrupted,
    #[error("memory handle not open")]
    NotOpen,
    #[error("read failed at address 0x{0:x}")]
    ReadFailed(u64),
    #[error("write failed at address 0x{0:x}")]
    WriteFailed(u64),
    #[error("malformed maps line: {0}")]
    MalformedMaps(String),
}

impl MemoryError {
    /// Handle-level errors poison the scanner; region-level ones are
    /// recovered locally by skipping the region.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MemoryError::InvalidPid(_)
                | MemoryError::ProcessNotFound(_)
                | MemoryError::PermissionDenied(_)
                | MemoryError::NotOpen
        )
    }
}
