// Fri Feb 13 2026 - Alex

pub mod message;
pub mod repl;

pub use repl::Repl;
