// Thu Feb 12 2026 - Alex

use crate::memory::maps::read_process_maps;
use crate::memory::proc_mem::ProcMem;
use crate::memory::region::Region;
use crate::memory::RegionFilterMode;
use crate::scan::factory::{get_scan_routine, validate_user_value};
use crate::scan::storage::{MatchesAndOldValuesArray, Swath, MAX_SWATH_GAP};
use crate::scan::types::{
    CancelToken, ScanError, ScanMatchType, ScanOptions, ScanRoutine, ScanStats,
};
use crate::value::flags::MatchFlags;
use crate::value::mem64::{Mem64, OldValue, MEM64_CAPACITY};
use crate::value::user_value::UserValue;

/// Blocks are read with this much extra tail so windows near a block
/// boundary still see `min(8, region_end - addr)` bytes.
const WINDOW_TAIL: u64 = (MEM64_CAPACITY - 1) as u64;

pub(crate) fn user_width_flags(user: Option<&UserValue>) -> MatchFlags {
    user.map(|u| u.flags).unwrap_or(MatchFlags::EMPTY)
}

/// The region list a scan will visit: maps filtered by scan level, then by
/// the scan-time region filter when one is configured.
pub(crate) fn selected_regions(pid: i32, opts: &ScanOptions) -> Result<Vec<Region>, ScanError> {
    let regions = read_process_maps(pid, opts.region_level)?;
    match &opts.region_filter {
        Some(cfg) if cfg.mode == RegionFilterMode::ScanTime => {
            Ok(cfg.filter.filter_regions(&regions))
        }
        _ => Ok(regions),
    }
}

fn check_cancel(cancel: Option<&CancelToken>) -> Result<(), ScanError> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(ScanError::Cancelled),
        _ => Ok(()),
    }
}

/// Appends a hit to the open swath, starting a new one when the gap to the
/// previous tracked byte grows past the padding bound. The whole window is
/// recorded so narrowing can rebuild old values at any width.
fn record_match(
    out: &mut MatchesAndOldValuesArray,
    current: &mut Option<Swath>,
    addr: u64,
    window: &[u8],
    flags: MatchFlags,
) {
    let start_new = match current {
        Some(swath) => addr > swath.end_address() + MAX_SWATH_GAP,
        None => true,
    };
    if start_new {
        if let Some(finished) = current.take() {
            out.push_swath(finished);
        }
        *current = Some(Swath::new(addr));
    }
    current
        .as_mut()
        .expect("swath just installed")
        .append_range(addr, window, flags);
}

/// First-scan walk of one region. Reads `block_size` bytes at a time (plus
/// window tail), visits each address on the step grid in increasing order,
/// and records hits. A short read ends the region; a failed read skips it.
pub(crate) fn scan_region(
    mem: &ProcMem,
    region: &Region,
    routine: &ScanRoutine,
    user: Option<&UserValue>,
    opts: &ScanOptions,
    cancel: Option<&CancelToken>,
    out: &mut MatchesAndOldValuesArray,
    stats: &mut ScanStats,
) -> Result<(), ScanError> {
    let step = opts.step.max(1) as u64;
    let block_size = opts.block_size.max(MEM64_CAPACITY as u32) as u64;
    let mut buf = vec![0u8; (block_size + WINDOW_TAIL) as usize];
    let mut current: Option<Swath> = None;
    let mut visited = false;
    let mut base = region.start;

    while base < region.end {
        check_cancel(cancel)?;
        let want = (region.end - base).min(block_size + WINDOW_TAIL) as usize;
        let n = match mem.read(base, &mut buf[..want]) {
            Ok(n) => n,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                log::debug!(
                    "region 0x{:x}: read at 0x{:x} failed: {}",
                    region.start,
                    base,
                    e
                );
                break;
            }
        };
        if n == 0 {
            break;
        }
        let short = n < want;
        let eval_len = if short { n } else { n.min(block_size as usize) };

        // The step grid is anchored at the region start, not at the block.
        let mut off = ((step - (base - region.start) % step) % step) as usize;
        while off < eval_len {
            let window_end = (off + MEM64_CAPACITY).min(n);
            let window = Mem64::from_slice(&buf[off..window_end]);
            let mut flags = MatchFlags::EMPTY;
            let matched = routine(&window, None, user, Some(&mut flags));
            if matched > 0 && !flags.is_empty() {
                record_match(
                    out,
                    &mut current,
                    base + off as u64,
                    &buf[off..window_end],
                    flags,
                );
            }
            off += step as usize;
        }

        stats.bytes_scanned += eval_len as u64;
        visited = true;
        if short {
            break;
        }
        base += block_size;
    }

    if let Some(finished) = current.take() {
        out.push_swath(finished);
    }
    if visited {
        stats.regions_visited += 1;
    }
    Ok(())
}

/// Sequential first scan against an already-open handle.
pub fn run_scan_with(
    mem: &ProcMem,
    opts: &ScanOptions,
    user: Option<&UserValue>,
    cancel: Option<&CancelToken>,
) -> Result<(MatchesAndOldValuesArray, ScanStats), ScanError> {
    validate_user_value(opts.data_type, opts.match_type, user)?;
    let routine = get_scan_routine(
        opts.data_type,
        opts.match_type,
        user_width_flags(user),
        opts.reverse_endianness,
    )?;
    let regions = selected_regions(mem.pid(), opts)?;

    let mut out = MatchesAndOldValuesArray::new();
    let mut stats = ScanStats::default();
    for region in &regions {
        check_cancel(cancel)?;
        scan_region(mem, region, &routine, user, opts, cancel, &mut out, &mut stats)?;
    }
    stats.matches = out.match_count();
    Ok((out, stats))
}

/// Sequential first scan; opens its own read-only handle onto the target.
pub fn run_scan(
    pid: i32,
    opts: &ScanOptions,
    user: Option<&UserValue>,
    cancel: Option<&CancelToken>,
) -> Result<(MatchesAndOldValuesArray, ScanStats), ScanError> {
    let mut mem = ProcMem::new(pid);
    mem.open(false)?;
    run_scan_with(&mem, opts, user, cancel)
}

/// Narrowing scan: walks the existing storage, re-reads the current bytes
/// (one coalesced read per swath), and keeps only cells that still satisfy
/// the new predicate. Old bytes are refreshed only for `Update`.
pub fn narrow_scan(
    mem: &ProcMem,
    matches: &mut MatchesAndOldValuesArray,
    opts: &ScanOptions,
    user: Option<&UserValue>,
    cancel: Option<&CancelToken>,
) -> Result<ScanStats, ScanError> {
    validate_user_value(opts.data_type, opts.match_type, user)?;
    let routine = get_scan_routine(
        opts.data_type,
        opts.match_type,
        user_width_flags(user),
        opts.reverse_endianness,
    )?;

    let mut stats = ScanStats::default();
    for swath in &mut matches.swaths {
        check_cancel(cancel)?;
        let len = swath.data.len();
        let mut fresh = vec![0u8; len];
        let n = match mem.read(swath.first_byte_in_child, &mut fresh) {
            Ok(n) => n,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                log::debug!(
                    "swath 0x{:x}: re-read failed: {}",
                    swath.first_byte_in_child,
                    e
                );
                0
            }
        };
        if n > 0 {
            stats.regions_visited += 1;
            stats.bytes_scanned += n as u64;
        }

        for idx in 0..len {
            if swath.data[idx].match_info.is_empty() {
                continue;
            }
            if idx >= n {
                swath.data[idx].match_info = MatchFlags::EMPTY;
                continue;
            }
            let window_end = (idx + MEM64_CAPACITY).min(n);
            let window = Mem64::from_slice(&fresh[idx..window_end]);
            let old = OldValue::new(swath.old_window_at(idx), swath.data[idx].match_info);
            let mut flags = MatchFlags::EMPTY;
            let matched = routine(&window, Some(&old), user, Some(&mut flags));
            if matched == 0 || flags.is_empty() {
                swath.data[idx].match_info = MatchFlags::EMPTY;
            } else {
                swath.data[idx].match_info = flags;
                if opts.match_type == ScanMatchType::Update {
                    let end = (idx + matched).min(n).min(len);
                    for i in idx..end {
                        swath.data[i].old_byte = fresh[i];
                    }
                }
            }
        }
    }

    matches.prune_empty_swaths();
    stats.matches = matches.match_count();
    Ok(stats)
}
