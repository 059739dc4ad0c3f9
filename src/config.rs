// Mon Feb 09 2026 - Alex

/// Settings resolved from the command line before the scanner starts.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub pid: Option<i32>,
    pub debug: bool,
    /// Machine-readable mode: user-channel output suppressed, results as
    /// structured JSON.
    pub backend: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.pid.is_none());
        assert!(!config.debug);
        assert!(!config.backend);
    }
}
