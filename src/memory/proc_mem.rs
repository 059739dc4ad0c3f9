// Tue Feb 10 2026 - Alex

use crate::memory::error::MemoryError;
use crate::value::scalar::ScanScalar;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::os::unix::fs::FileExt;

/// Handle onto another process's address space, backed by the kernel's
/// process-memory interface. Positional reads and writes take target
/// virtual addresses as offsets, so no cursor is shared between callers.
#[derive(Debug)]
pub struct ProcMem {
    pid: libc::pid_t,
    file: Option<File>,
    writable: bool,
}

impl ProcMem {
    pub fn new(pid: i32) -> Self {
        Self {
            pid,
            file: None,
            writable: false,
        }
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Opens `/proc/<pid>/mem`, read-only by default, read-write on demand.
    pub fn open(&mut self, writable: bool) -> Result<(), MemoryError> {
        if self.pid <= 0 {
            return Err(MemoryError::InvalidPid(self.pid));
        }
        let path = format!("/proc/{}/mem", self.pid);
        let file = OpenOptions::new()
            .read(true)
            .write(writable)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => MemoryError::ProcessNotFound(self.pid),
                ErrorKind::PermissionDenied => MemoryError::PermissionDenied(path.clone()),
                _ => MemoryError::Io(e),
            })?;
        self.file = Some(file);
        self.writable = writable;
        Ok(())
    }

    pub fn close(&mut self) {
        self.file = None;
        self.writable = false;
    }

    /// A fresh handle with its own file descriptor and the same access,
    /// for parallel workers whose reads must not share kernel state.
    pub fn reopen(&self) -> Result<ProcMem, MemoryError> {
        let mut clone = ProcMem::new(self.pid);
        clone.open(self.writable)?;
        Ok(clone)
    }

    /// Reads up to `buf.len()` bytes at the target virtual address `addr`.
    /// Short reads are reported truthfully; `EINTR` is retried once.
    pub fn read(&self, addr: u64, buf: &mut [u8]) -> Result<usize, MemoryError> {
        let file = self.file.as_ref().ok_or(MemoryError::NotOpen)?;
        match file.read_at(buf, addr) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => match file.read_at(buf, addr) {
                Ok(n) => Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => Err(MemoryError::Interrupted),
                Err(_) => Err(MemoryError::ReadFailed(addr)),
            },
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                Err(MemoryError::PermissionDenied(format!("read at 0x{:x}", addr)))
            }
            Err(_) => Err(MemoryError::ReadFailed(addr)),
        }
    }

    /// Writes `buf` at the target virtual address `addr`. Atomic only at
    /// whatever granularity the kernel provides.
    pub fn write(&self, addr: u64, buf: &[u8]) -> Result<usize, MemoryError> {
        let file = self.file.as_ref().ok_or(MemoryError::NotOpen)?;
        match file.write_at(buf, addr) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => match file.write_at(buf, addr) {
                Ok(n) => Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => Err(MemoryError::Interrupted),
                Err(_) => Err(MemoryError::WriteFailed(addr)),
            },
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                Err(MemoryError::PermissionDenied(format!("write at 0x{:x}", addr)))
            }
            Err(_) => Err(MemoryError::WriteFailed(addr)),
        }
    }

    /// One read of `size_of::<T>()` bytes; anything short is a failure.
    pub fn read_scalar<T: ScanScalar>(&self, addr: u64) -> Result<T, MemoryError> {
        let mut buf = [0u8; 8];
        let n = self.read(addr, &mut buf[..T::WIDTH])?;
        if n != T::WIDTH {
            return Err(MemoryError::ReadFailed(addr));
        }
        let mem = crate::value::mem64::Mem64::from_slice(&buf[..T::WIDTH]);
        T::decode(&mem, false).ok_or(MemoryError::ReadFailed(addr))
    }

    pub fn write_scalar<T: ScanScalar>(&self, addr: u64, value: T) -> Result<(), MemoryError> {
        let bytes = value.to_ne_byte_vec();
        let n = self.write(addr, &bytes)?;
        if n != bytes.len() {
            return Err(MemoryError::WriteFailed(addr));
        }
        Ok(())
    }
}
