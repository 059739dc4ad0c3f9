// Wed Feb 11 2026 - Alex

use crate::scan::types::{FoundMatch, ScanMatchType, ScanRoutine};
use crate::value::flags::MatchFlags;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use regex::bytes::Regex;
use std::collections::HashMap;
use std::sync::Arc;

lazy_static! {
    /// Process-wide pattern cache: compile under the writer lock, hit under
    /// the reader lock. Invalid patterns are cached too so a bad pattern is
    /// only reported once per compile attempt.
    static ref REGEX_CACHE: RwLock<HashMap<String, Option<Arc<Regex>>>> =
        RwLock::new(HashMap::new());
}

/// The compiled form of `pattern`, None when it does not compile.
pub fn cached_regex(pattern: &str) -> Option<Arc<Regex>> {
    if let Some(entry) = REGEX_CACHE.read().get(pattern) {
        return entry.clone();
    }
    let compiled = match Regex::new(pattern) {
        Ok(regex) => Some(Arc::new(regex)),
        Err(e) => {
            log::warn!("invalid regex pattern {:?}: {}", pattern, e);
            None
        }
    };
    REGEX_CACHE
        .write()
        .insert(pattern.to_string(), compiled.clone());
    compiled
}

/// First regex match inside `haystack`.
pub fn find_regex_pattern(haystack: &[u8], pattern: &str) -> Option<FoundMatch> {
    let regex = cached_regex(pattern)?;
    regex.find(haystack).map(|m| FoundMatch {
        offset: m.start(),
        length: m.len(),
    })
}

/// String matchers. `Any` reports the whole window as a byte-wise hit;
/// `EqualTo` requires the window to start with the pattern; `Regex`
/// reports the length of the first in-window match.
pub fn make_string_routine(match_type: ScanMatchType) -> ScanRoutine {
    Box::new(move |mem, _old, user, flags_out| match match_type {
        ScanMatchType::Any => {
            if mem.is_empty() {
                return 0;
            }
            if let Some(flags) = flags_out {
                *flags |= MatchFlags::B8;
            }
            mem.len()
        }
        ScanMatchType::EqualTo => {
            let Some(user) = user else { return 0 };
            let pattern = user.string.as_bytes();
            if pattern.is_empty() || pattern.len() > mem.len() {
                return 0;
            }
            if &mem.bytes()[..pattern.len()] != pattern {
                return 0;
            }
            if let Some(flags) = flags_out {
                *flags |= MatchFlags::STRING;
            }
            pattern.len()
        }
        ScanMatchType::Regex => {
            let Some(user) = user else { return 0 };
            let Some(found) = find_regex_pattern(mem.bytes(), &user.string) else {
                return 0;
            };
            if found.length == 0 {
                return 0;
            }
            if let Some(flags) = flags_out {
                *flags |= MatchFlags::STRING;
            }
            found.length
        }
        _ => 0,
    })
}
