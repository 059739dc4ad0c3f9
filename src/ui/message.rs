// Fri Feb 13 2026 - Alex

use colored::*;
use std::sync::atomic::{AtomicBool, Ordering};

static BACKEND: AtomicBool = AtomicBool::new(false);
static DEBUG: AtomicBool = AtomicBool::new(false);

/// Backend (machine-readable) mode suppresses the user channel entirely;
/// only structured results go to stdout.
pub fn set_backend_mode(enabled: bool) {
    BACKEND.store(enabled, Ordering::SeqCst);
    if enabled {
        colored::control::set_override(false);
    }
}

pub fn backend_mode() -> bool {
    BACKEND.load(Ordering::SeqCst)
}

/// Gates the `debug:` channel. This is the user-facing diagnostics toggle;
/// the `log` facade keeps its own level filtering.
pub fn set_debug_mode(enabled: bool) {
    DEBUG.store(enabled, Ordering::SeqCst);
}

pub fn debug_mode() -> bool {
    DEBUG.load(Ordering::SeqCst)
}

pub fn info(msg: &str) {
    if !backend_mode() {
        eprintln!("{} {}", "info:".cyan(), msg);
    }
}

pub fn warn(msg: &str) {
    if !backend_mode() {
        eprintln!("{} {}", "warn:".yellow(), msg);
    }
}

pub fn error(msg: &str) {
    if !backend_mode() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    }
}

pub fn success(msg: &str) {
    if !backend_mode() {
        eprintln!("{} {}", "success:".green(), msg);
    }
}

pub fn debug(msg: &str) {
    if debug_mode() && !backend_mode() {
        eprintln!("{} {}", "debug:".blue(), msg);
    }
}

/// Result lines go to stdout in both modes.
pub fn result(line: &str) {
    println!("{}", line);
}
