// Sat Feb 14 2026 - Alex

use crate::config::AppConfig;
use crate::scan::types::{CancelToken, ScanDataType, ScanError, ScanMatchType, ScanOptions};
use crate::scanner::collector::{collect, MatchCollectionOptions};
use crate::scanner::formatter::format_value;
use crate::scanner::scanner::{Scanner, ScannerState};
use crate::ui::message;
use crate::utils::sets::parse_uintset;
use crate::value::endian::ByteSwap;
use crate::value::user_value::UserValue;
use indicatif::ProgressBar;
use std::io::{self, BufRead};
use std::time::Duration;

const DEFAULT_LIST_LIMIT: usize = 20;

/// Interactive command loop. This is a thin client of the scanner core:
/// it parses one command per line, turns it into a scan, a write or a
/// collection, and prints the outcome.
pub struct Repl {
    scanner: Scanner,
    data_type: ScanDataType,
    reverse_endian: bool,
    step: u32,
    backend: bool,
    cancel: CancelToken,
}

impl Repl {
    pub fn new(config: &AppConfig, pid: i32, cancel: CancelToken) -> Self {
        let mut scanner = Scanner::new(pid);
        scanner.set_cancel_token(cancel.clone());
        Self {
            scanner,
            data_type: ScanDataType::AnyNumber,
            reverse_endian: false,
            step: 1,
            backend: config.backend,
            cancel,
        }
    }

    /// Runs until `quit` or end of input; the return value is the process
    /// exit code.
    pub fn run(&mut self) -> i32 {
        message::info(&format!(
            "attached to pid {}; type `help` for commands",
            self.scanner.pid()
        ));
        let stdin = io::stdin();
        loop {
            self.prompt();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => return 0,
                Ok(_) => {}
                Err(e) => {
                    message::error(&format!("stdin: {}", e));
                    return 1;
                }
            }
            if !self.dispatch(line.trim()) {
                return 0;
            }
        }
    }

    fn prompt(&self) {
        if !self.backend {
            use std::io::Write;
            eprint!("{}> ", self.scanner.match_count());
            let _ = io::stderr().flush();
        }
    }

    /// Returns false when the loop should exit.
    fn dispatch(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return true;
        }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };
        match command {
            "quit" | "exit" | "q" => return false,
            "help" => self.help(),
            "list" | "l" => self.list(rest),
            "type" => self.set_type(rest),
            "step" => self.set_step(rest),
            "reset" => {
                self.scanner.reset();
                message::info("matches dropped");
            }
            "delete" | "d" => self.delete_matches(rest),
            "set" => self.write_value(rest),
            "snapshot" => {
                self.scanner.reset();
                self.run_predicate(ScanMatchType::Any, None);
            }
            "update" => self.run_predicate(ScanMatchType::Update, None),
            "changed" => self.run_predicate(ScanMatchType::Changed, None),
            "unchanged" => self.run_predicate(ScanMatchType::NotChanged, None),
            "increased" => self.run_predicate(ScanMatchType::Increased, None),
            "decreased" => self.run_predicate(ScanMatchType::Decreased, None),
            "=" => self.predicate_with_value(ScanMatchType::EqualTo, rest),
            "!=" => self.predicate_with_value(ScanMatchType::NotEqualTo, rest),
            ">" => self.predicate_with_value(ScanMatchType::GreaterThan, rest),
            "<" => self.predicate_with_value(ScanMatchType::LessThan, rest),
            "+" => self.predicate_with_value(ScanMatchType::IncreasedBy, rest),
            "-" => self.predicate_with_value(ScanMatchType::DecreasedBy, rest),
            "range" => self.range_predicate(rest),
            "regex" => self.regex_predicate(rest),
            _ => {
                // A bare value means "equal to", the most common search.
                if self.parse_value(line).is_ok() {
                    self.predicate_with_value(ScanMatchType::EqualTo, line);
                } else {
                    message::error(&format!("unknown command: {}", command));
                }
            }
        }
        true
    }

    fn help(&self) {
        for line in [
            "commands:",
            "  <value> | = <value>      search cells equal to value",
            "  != > < + - <value>       relational / delta searches",
            "  range <low> <high>       value within [low, high]",
            "  regex <pattern>          regex search (string type)",
            "  snapshot                 capture everything for later diffs",
            "  changed unchanged increased decreased update",
            "  list [n]                 show surviving matches",
            "  delete <set>             drop matches by index, e.g. 0,2,5..7 or !3",
            "  set <addr> <value>       overwrite target memory",
            "  type <i8|i16|i32|i64|f32|f64|int|float|number|bytes|string>",
            "  step <n>                 scan stride",
            "  reset                    drop matches",
            "  quit",
        ] {
            message::result(line);
        }
    }

    fn options(&self, match_type: ScanMatchType) -> ScanOptions {
        ScanOptions {
            data_type: self.data_type,
            match_type,
            reverse_endianness: self.reverse_endian,
            step: self.step,
            ..Default::default()
        }
    }

    fn parse_value(&self, text: &str) -> Result<UserValue, ScanError> {
        let value = match self.data_type {
            ScanDataType::Bytes => UserValue::parse_bytes(text)?,
            ScanDataType::String => UserValue::from_string(text),
            _ => UserValue::parse_number(text)?,
        };
        Ok(value)
    }

    fn predicate_with_value(&mut self, match_type: ScanMatchType, rest: &str) {
        match self.parse_value(rest) {
            Ok(user) => self.run_predicate(match_type, Some(user)),
            Err(e) => message::error(&e.to_string()),
        }
    }

    fn range_predicate(&mut self, rest: &str) {
        let mut parts = rest.split_whitespace();
        let (Some(low), Some(high)) = (parts.next(), parts.next()) else {
            message::error("usage: range <low> <high>");
            return;
        };
        match UserValue::parse_range(low, high) {
            Ok(user) => self.run_predicate(ScanMatchType::Range, Some(user)),
            Err(e) => message::error(&e.to_string()),
        }
    }

    fn regex_predicate(&mut self, rest: &str) {
        if rest.is_empty() {
            message::error("usage: regex <pattern>");
            return;
        }
        if self.data_type != ScanDataType::String {
            message::error("regex search requires `type string`");
            return;
        }
        self.run_predicate(ScanMatchType::Regex, Some(UserValue::from_string(rest)));
    }

    fn run_predicate(&mut self, match_type: ScanMatchType, user: Option<UserValue>) {
        if self.scanner.state() != ScannerState::HasMatches && match_type.uses_old_value() {
            message::error("no prior scan; search for a value or take a snapshot first");
            return;
        }
        self.cancel.rearm();
        let opts = self.options(match_type);
        message::debug(&format!(
            "scan: {:?} {:?} step {} endian-reversed {}",
            opts.data_type, opts.match_type, opts.step, opts.reverse_endianness
        ));
        let spinner = self.spinner();
        let result = if self.scanner.state() == ScannerState::HasMatches {
            self.scanner.narrow_scan(&opts, user.as_ref())
        } else {
            self.scanner.first_scan_parallel(&opts, user.as_ref(), None)
        };
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        match result {
            Ok(stats) => message::info(&format!(
                "{} matches ({} regions, {} bytes scanned)",
                stats.matches, stats.regions_visited, stats.bytes_scanned
            )),
            Err(ScanError::Cancelled) => message::warn("scan cancelled"),
            Err(e) => message::error(&e.to_string()),
        }
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if self.backend {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_message("scanning...");
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }

    fn list(&mut self, rest: &str) {
        let limit = if rest.is_empty() {
            DEFAULT_LIST_LIMIT
        } else {
            match rest.parse::<usize>() {
                Ok(n) => n,
                Err(_) => {
                    message::error("usage: list [count]");
                    return;
                }
            }
        };
        let opts = MatchCollectionOptions {
            limit,
            collect_region: true,
            region_filter: None,
            data_type: self.data_type,
            reverse_endianness: self.reverse_endian,
        };
        let (entries, total) = collect(&mut self.scanner, &opts);
        if self.backend {
            match serde_json::to_string(&serde_json::json!({
                "total": total,
                "matches": entries,
            })) {
                Ok(json) => message::result(&json),
                Err(e) => message::error(&format!("encode failed: {}", e)),
            }
            return;
        }
        for entry in &entries {
            message::result(&format!(
                "[{:>4}] 0x{:012x} {:>16} {}",
                entry.index,
                entry.address,
                format_value(&entry.value, self.data_type, self.reverse_endian),
                entry.region
            ));
        }
        message::info(&format!("{} of {} matches shown", entries.len(), total));
    }

    fn delete_matches(&mut self, rest: &str) {
        if rest.is_empty() {
            message::error("usage: delete <set>");
            return;
        }
        let total = self.scanner.match_count() as usize;
        if total == 0 {
            message::error("no matches to delete");
            return;
        }
        match parse_uintset(rest, total) {
            Ok(indices) => {
                self.scanner.delete_matches(&indices);
                message::success(&format!(
                    "{} matches deleted; {} left",
                    indices.len(),
                    self.scanner.match_count()
                ));
            }
            Err(e) => message::error(&e.to_string()),
        }
    }

    fn set_type(&mut self, rest: &str) {
        match ScanDataType::from_name(rest) {
            Some(data_type) => {
                self.data_type = data_type;
                message::info(&format!("scan type set to {:?}", data_type));
            }
            None => message::error("unknown type; see `help`"),
        }
    }

    fn set_step(&mut self, rest: &str) {
        match rest.parse::<u32>() {
            Ok(step) if step > 0 => {
                self.step = step;
                message::info(&format!("scan stride set to {}", step));
            }
            _ => message::error("usage: step <positive integer>"),
        }
    }

    fn write_value(&mut self, rest: &str) {
        let Some((addr_text, value_text)) = rest.split_once(char::is_whitespace) else {
            message::error("usage: set <addr> <value>");
            return;
        };
        let addr_text = addr_text
            .strip_prefix("0x")
            .or_else(|| addr_text.strip_prefix("0X"))
            .unwrap_or(addr_text);
        let Ok(addr) = u64::from_str_radix(addr_text, 16) else {
            message::error("bad address; expected hex");
            return;
        };
        let bytes = match self.encode_for_write(value_text.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                message::error(&e);
                return;
            }
        };
        match self.scanner.write(addr, &bytes) {
            Ok(written) => {
                message::success(&format!("{} bytes written to 0x{:x}", written, addr))
            }
            Err(e) => message::error(&e.to_string()),
        }
    }

    /// Encodes a value at the active type's width, honoring reverse
    /// endianness. Aggregated types are ambiguous for writes.
    fn encode_for_write(&self, text: &str) -> Result<Vec<u8>, String> {
        fn scalar_bytes<T: ByteSwap>(value: T, reverse: bool) -> T {
            if reverse {
                value.byte_swapped()
            } else {
                value
            }
        }
        let numeric = || {
            UserValue::parse_number(text)
                .map(|u| u.scalar)
                .map_err(|e| e.to_string())
        };
        let reverse = self.reverse_endian;
        match self.data_type {
            ScanDataType::Integer8 => {
                Ok(scalar_bytes(numeric()?.as_i64() as i8, reverse).to_ne_bytes().to_vec())
            }
            ScanDataType::Integer16 => {
                Ok(scalar_bytes(numeric()?.as_i64() as i16, reverse).to_ne_bytes().to_vec())
            }
            ScanDataType::Integer32 => {
                Ok(scalar_bytes(numeric()?.as_i64() as i32, reverse).to_ne_bytes().to_vec())
            }
            ScanDataType::Integer64 => {
                Ok(scalar_bytes(numeric()?.as_i64(), reverse).to_ne_bytes().to_vec())
            }
            ScanDataType::Float32 => {
                Ok(scalar_bytes(numeric()?.as_f64() as f32, reverse).to_ne_bytes().to_vec())
            }
            ScanDataType::Float64 => {
                Ok(scalar_bytes(numeric()?.as_f64(), reverse).to_ne_bytes().to_vec())
            }
            ScanDataType::Bytes => {
                let user = UserValue::parse_bytes(text).map_err(|e| e.to_string())?;
                if !user.byte_mask.is_empty() {
                    return Err("wildcards make no sense in a write".to_string());
                }
                Ok(user.bytes)
            }
            ScanDataType::String => Ok(text.as_bytes().to_vec()),
            _ => Err("set requires a fixed-width type; see `type`".to_string()),
        }
    }
}
