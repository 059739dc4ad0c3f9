// Fri Feb 13 2026 - Alex

use std::fs;

/// Whether `pid` names a live process we could conceivably target. EPERM
/// still means the process exists, just owned by someone else.
pub fn is_running(pid: i32) -> bool {
    if pid <= 0 {
        return false;
    }
    let ret = unsafe { libc::kill(pid, 0) };
    if ret == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// The short command name the kernel records for `pid`.
pub fn process_comm(pid: i32) -> Option<String> {
    fs::read_to_string(format!("/proc/{}/comm", pid))
        .ok()
        .map(|s| s.trim_end().to_string())
}
