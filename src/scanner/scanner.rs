// Fri Feb 13 2026 - Alex

use crate::memory::classifier::RegionClassifier;
use crate::memory::filter::RegionFilterConfig;
use crate::memory::proc_mem::ProcMem;
use crate::scan::engine;
use crate::scan::parallel;
use crate::scan::storage::MatchesAndOldValuesArray;
use crate::scan::types::{CancelToken, ScanError, ScanOptions, ScanStats};
use crate::value::user_value::UserValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScannerState {
    #[default]
    Fresh,
    HasMatches,
    Faulted,
}

/// Per-target façade tying maps, process I/O, the engines and the match
/// storage together. Owns the memory handle and the matches exclusively.
pub struct Scanner {
    pid: i32,
    mem: ProcMem,
    classifier: Option<RegionClassifier>,
    matches: MatchesAndOldValuesArray,
    region_filter: Option<RegionFilterConfig>,
    cancel: Option<CancelToken>,
    state: ScannerState,
}

impl Scanner {
    pub fn new(pid: i32) -> Self {
        Self {
            pid,
            mem: ProcMem::new(pid),
            classifier: None,
            matches: MatchesAndOldValuesArray::new(),
            region_filter: None,
            cancel: None,
            state: ScannerState::Fresh,
        }
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    pub fn matches(&self) -> &MatchesAndOldValuesArray {
        &self.matches
    }

    pub fn matches_mut(&mut self) -> &mut MatchesAndOldValuesArray {
        &mut self.matches
    }

    pub fn match_count(&self) -> u64 {
        self.matches.match_count()
    }

    pub fn set_region_filter(&mut self, config: Option<RegionFilterConfig>) {
        self.region_filter = config;
    }

    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = Some(token);
    }

    /// Lazily created classifier over the target's full map.
    pub fn classifier(&mut self) -> Result<&RegionClassifier, ScanError> {
        if self.classifier.is_none() {
            self.classifier = Some(RegionClassifier::create(self.pid)?);
        }
        Ok(self.classifier.as_ref().expect("classifier just created"))
    }

    pub fn take_classifier(&mut self) -> Result<RegionClassifier, ScanError> {
        self.classifier()?;
        Ok(self.classifier.take().expect("classifier just created"))
    }

    /// First scan: replaces the matches wholesale on success.
    pub fn first_scan(
        &mut self,
        opts: &ScanOptions,
        user: Option<&UserValue>,
    ) -> Result<ScanStats, ScanError> {
        self.ensure_not_faulted()?;
        self.ensure_open(false)?;
        let opts = self.effective_options(opts);
        let result = engine::run_scan_with(&self.mem, &opts, user, self.cancel.as_ref());
        self.install_first_scan(result)
    }

    /// First scan on the partitioned parallel engine; same outputs as
    /// [`Scanner::first_scan`] for a quiescent target.
    pub fn first_scan_parallel(
        &mut self,
        opts: &ScanOptions,
        user: Option<&UserValue>,
        workers: Option<usize>,
    ) -> Result<ScanStats, ScanError> {
        self.ensure_not_faulted()?;
        if self.pid <= 0 {
            return Err(crate::memory::MemoryError::InvalidPid(self.pid).into());
        }
        let opts = self.effective_options(opts);
        let result =
            parallel::run_scan_parallel(self.pid, &opts, user, self.cancel.as_ref(), workers);
        self.install_first_scan(result)
    }

    /// Narrowing scan: refines the installed matches in place. Requires a
    /// prior first scan.
    pub fn narrow_scan(
        &mut self,
        opts: &ScanOptions,
        user: Option<&UserValue>,
    ) -> Result<ScanStats, ScanError> {
        self.ensure_not_faulted()?;
        if self.state != ScannerState::HasMatches {
            return Err(ScanError::NoPriorScan);
        }
        self.ensure_open(false)?;
        let opts = self.effective_options(opts);
        // Narrow a working copy so a cancelled or failed pass never
        // surfaces a half-narrowed set.
        let mut working = self.matches.clone();
        let result = engine::narrow_scan(&self.mem, &mut working, &opts, user, self.cancel.as_ref());
        match result {
            Ok(stats) => {
                self.matches = working;
                Ok(stats)
            }
            Err(e) => Err(self.note_failure(e)),
        }
    }

    /// Overwrites target memory at `addr`. Reopens the handle read-write on
    /// first use.
    pub fn write(&mut self, addr: u64, bytes: &[u8]) -> Result<usize, ScanError> {
        self.ensure_open(true)?;
        let written = self.mem.write(addr, bytes)?;
        Ok(written)
    }

    /// Removes matches by their global indices, as `list` numbers them.
    pub fn delete_matches(&mut self, indices: &[usize]) {
        self.matches.delete_matches(indices);
    }

    /// Drops the matches and returns to `Fresh`; the only way out of
    /// `Faulted`.
    pub fn reset(&mut self) {
        self.matches.clear();
        self.state = ScannerState::Fresh;
    }

    fn install_first_scan(
        &mut self,
        result: Result<(MatchesAndOldValuesArray, ScanStats), ScanError>,
    ) -> Result<ScanStats, ScanError> {
        match result {
            Ok((matches, stats)) => {
                self.matches = matches;
                self.state = ScannerState::HasMatches;
                Ok(stats)
            }
            Err(e) => Err(self.note_failure(e)),
        }
    }

    /// Usage errors and cancellation leave the state machine alone; fatal
    /// handle-level I/O moves to `Faulted` with the matches preserved.
    fn note_failure(&mut self, error: ScanError) -> ScanError {
        if let ScanError::Memory(mem_err) = &error {
            if mem_err.is_fatal() {
                self.state = ScannerState::Faulted;
            }
        }
        if matches!(error, ScanError::Internal(_)) {
            self.state = ScannerState::Faulted;
        }
        error
    }

    fn ensure_not_faulted(&self) -> Result<(), ScanError> {
        if self.state == ScannerState::Faulted {
            return Err(ScanError::Faulted);
        }
        Ok(())
    }

    fn ensure_open(&mut self, writable: bool) -> Result<(), ScanError> {
        if self.mem.is_open() && (!writable || self.mem.is_writable()) {
            return Ok(());
        }
        match self.mem.open(writable) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.note_failure(e.into())),
        }
    }

    /// A scanner-level region filter applies when the per-scan options
    /// carry none.
    fn effective_options(&self, opts: &ScanOptions) -> ScanOptions {
        let mut opts = opts.clone();
        if opts.region_filter.is_none() {
            opts.region_filter = self.region_filter.clone();
        }
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::filter::{RegionFilter, RegionFilterConfig, RegionFilterMode};
    use crate::memory::region::RegionType;
    use crate::scan::testutil::{SleepChild, TestPage};
    use crate::scan::types::{ScanDataType, ScanMatchType};
    use crate::value::flags::MatchFlags;
    use crate::value::user_value::Scalar;

    fn misc_rw_options() -> ScanOptions {
        ScanOptions {
            data_type: ScanDataType::Integer32,
            match_type: ScanMatchType::Any,
            step: 4,
            region_filter: Some(RegionFilterConfig {
                mode: RegionFilterMode::ScanTime,
                filter: RegionFilter::new([RegionType::MiscRw, RegionType::Bss].into()),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_narrow_without_prior_scan_fails() {
        let mut scanner = Scanner::new(std::process::id() as i32);
        let result = scanner.narrow_scan(&misc_rw_options(), None);
        assert!(matches!(result, Err(ScanError::NoPriorScan)));
        assert_eq!(scanner.state(), ScannerState::Fresh);
        assert_eq!(scanner.match_count(), 0);
    }

    #[test]
    fn test_full_then_filtered_then_reset() {
        let target = SleepChild::spawn();
        let mut scanner = Scanner::new(target.pid());

        let full_opts = ScanOptions {
            data_type: ScanDataType::Integer8,
            match_type: ScanMatchType::Any,
            step: 16,
            ..Default::default()
        };
        scanner.first_scan(&full_opts, None).unwrap();
        assert_eq!(scanner.state(), ScannerState::HasMatches);
        let full_count = scanner.match_count();
        assert!(full_count > 0);

        let user = UserValue::from_scalar(Scalar::I64(42));
        let narrow_opts = ScanOptions {
            data_type: ScanDataType::Integer8,
            match_type: ScanMatchType::EqualTo,
            step: 16,
            ..Default::default()
        };
        scanner.narrow_scan(&narrow_opts, Some(&user)).unwrap();
        let narrowed = scanner.match_count();
        assert!(narrowed <= full_count);
        assert_eq!(scanner.state(), ScannerState::HasMatches);

        // A new full scan replaces the narrowed set.
        scanner.first_scan(&full_opts, None).unwrap();
        assert!(scanner.match_count() >= narrowed);

        scanner.reset();
        assert_eq!(scanner.state(), ScannerState::Fresh);
        assert_eq!(scanner.match_count(), 0);
    }

    #[test]
    fn test_scan_then_narrow_known_cells() {
        let page = TestPage::new();
        page.write_i32(0, 42);

        let mut scanner = Scanner::new(std::process::id() as i32);
        let opts = misc_rw_options().with_match_type(ScanMatchType::EqualTo);
        let user = UserValue::from_scalar(Scalar::I64(42));
        scanner.first_scan(&opts, Some(&user)).unwrap();
        assert!(scanner
            .matches()
            .flags_at(page.addr(0))
            .contains(MatchFlags::B32));

        page.write_i32(0, 43);
        let changed = misc_rw_options().with_match_type(ScanMatchType::Changed);
        scanner.narrow_scan(&changed, None).unwrap();
        assert!(scanner
            .matches()
            .flags_at(page.addr(0))
            .contains(MatchFlags::B32));

        let unchanged = misc_rw_options().with_match_type(ScanMatchType::NotChanged);
        scanner.narrow_scan(&unchanged, None).unwrap();
        assert!(scanner.matches().flags_at(page.addr(0)).is_empty());
    }

    #[test]
    fn test_delete_matches_reduces_count() {
        let page = TestPage::new();
        page.write_i32(0, 424242);
        page.write_i32(8, 424242);

        let mut scanner = Scanner::new(std::process::id() as i32);
        let opts = misc_rw_options().with_match_type(ScanMatchType::EqualTo);
        let user = UserValue::from_scalar(Scalar::I64(424242));
        scanner.first_scan(&opts, Some(&user)).unwrap();
        let before = scanner.match_count();
        assert!(before >= 2);

        scanner.delete_matches(&[0]);
        assert_eq!(scanner.match_count(), before - 1);
    }

    #[test]
    fn test_write_round_trip() {
        let page = TestPage::new();
        let mut scanner = Scanner::new(std::process::id() as i32);
        let written = scanner
            .write(page.addr(0), &100i32.to_ne_bytes())
            .unwrap();
        assert_eq!(written, 4);
        assert_eq!(
            i32::from_ne_bytes([
                page.read_byte(0),
                page.read_byte(1),
                page.read_byte(2),
                page.read_byte(3)
            ]),
            100
        );
    }

    #[test]
    fn test_write_to_invalid_pid_is_usage_error() {
        let mut scanner = Scanner::new(-1);
        let result = scanner.write(0x1000, &100i32.to_ne_bytes());
        assert!(matches!(
            result,
            Err(ScanError::Memory(crate::memory::MemoryError::InvalidPid(-1)))
        ));
    }

    #[test]
    fn test_faulted_scanner_requires_reset() {
        let mut scanner = Scanner::new(-1);
        assert!(scanner.first_scan(&misc_rw_options(), None).is_err());
        assert_eq!(scanner.state(), ScannerState::Faulted);
        assert!(matches!(
            scanner.first_scan(&misc_rw_options(), None),
            Err(ScanError::Faulted)
        ));
        scanner.reset();
        assert_eq!(scanner.state(), ScannerState::Fresh);
    }

    #[test]
    fn test_cancelled_narrow_preserves_matches() {
        let page = TestPage::new();
        page.write_i32(0, 42);
        let mut scanner = Scanner::new(std::process::id() as i32);
        let opts = misc_rw_options().with_match_type(ScanMatchType::EqualTo);
        let user = UserValue::from_scalar(Scalar::I64(42));
        scanner.first_scan(&opts, Some(&user)).unwrap();
        let before = scanner.match_count();
        assert!(before > 0);

        let token = CancelToken::new();
        token.cancel();
        scanner.set_cancel_token(token);
        let narrow = misc_rw_options().with_match_type(ScanMatchType::NotChanged);
        let result = scanner.narrow_scan(&narrow, None);
        assert!(matches!(result, Err(ScanError::Cancelled)));
        assert_eq!(scanner.match_count(), before);
        assert_eq!(scanner.state(), ScannerState::HasMatches);
    }

    #[test]
    fn test_parallel_first_scan_installs_matches() {
        let target = SleepChild::spawn();
        let mut scanner = Scanner::new(target.pid());
        let opts = ScanOptions {
            data_type: ScanDataType::AnyNumber,
            match_type: ScanMatchType::Any,
            step: 16,
            ..Default::default()
        };
        let stats = scanner.first_scan_parallel(&opts, None, Some(2)).unwrap();
        assert!(stats.matches > 0);
        assert_eq!(scanner.state(), ScannerState::HasMatches);
        assert_eq!(scanner.match_count(), stats.matches);
    }
}
