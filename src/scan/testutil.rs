// Thu Feb 12 2026 - Alex
// Shared fixtures for engine-level tests.

use crate::scan::storage::{MatchesAndOldValuesArray, Swath};
use crate::value::flags::MatchFlags;
use std::process::{Child, Command};
use std::thread;
use std::time::Duration;

/// Dedicated anonymous page in our own address space; shows up as an
/// anonymous rw region so a MiscRw scan-time filter can reach it.
pub(crate) struct TestPage {
    base: *mut u8,
    size: usize,
}

impl TestPage {
    pub(crate) fn new() -> Self {
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
        let base = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        assert_ne!(base, libc::MAP_FAILED);
        Self {
            base: base as *mut u8,
            size,
        }
    }

    pub(crate) fn addr(&self, offset: usize) -> u64 {
        self.base as u64 + offset as u64
    }

    pub(crate) fn write_i32(&self, offset: usize, value: i32) {
        assert!(offset + 4 <= self.size);
        unsafe {
            std::ptr::copy_nonoverlapping(value.to_ne_bytes().as_ptr(), self.base.add(offset), 4)
        };
    }

    pub(crate) fn read_byte(&self, offset: usize) -> u8 {
        assert!(offset < self.size);
        unsafe { std::ptr::read_volatile(self.base.add(offset)) }
    }

    /// Storage cells for the first `count` bytes of the page, flagged B32
    /// on every 4-byte boundary, the way a stride-4 Integer32 scan would
    /// have recorded them.
    pub(crate) fn synthetic_matches(&self, count: usize) -> MatchesAndOldValuesArray {
        let mut swath = Swath::new(self.addr(0));
        for offset in 0..count {
            let flags = if offset % 4 == 0 {
                MatchFlags::B32
            } else {
                MatchFlags::EMPTY
            };
            swath.set_cell(self.addr(offset), self.read_byte(offset), flags);
        }
        let mut array = MatchesAndOldValuesArray::new();
        array.push_swath(swath);
        array
    }
}

impl Drop for TestPage {
    fn drop(&mut self) {
        unsafe { libc::munmap(self.base as *mut libc::c_void, self.size) };
    }
}

/// A small quiescent external target, killed on drop. Memory layout stays
/// put between scans, which the determinism tests rely on.
pub(crate) struct SleepChild {
    child: Child,
}

impl SleepChild {
    pub(crate) fn spawn() -> Self {
        let child = Command::new("sleep")
            .arg("60")
            .spawn()
            .expect("failed to spawn sleep");
        // Give it a moment to finish exec and settle.
        thread::sleep(Duration::from_millis(100));
        Self { child }
    }

    pub(crate) fn pid(&self) -> i32 {
        self.child.id() as i32
    }
}

impl Drop for SleepChild {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
