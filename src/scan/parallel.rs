// Thu Feb 12 2026 - Alex

use crate::memory::proc_mem::ProcMem;
use crate::memory::region::Region;
use crate::scan::engine::{scan_region, selected_regions, user_width_flags};
use crate::scan::factory::{get_scan_routine, validate_user_value};
use crate::scan::storage::MatchesAndOldValuesArray;
use crate::scan::types::{CancelToken, ScanError, ScanOptions, ScanStats};
use crate::value::user_value::UserValue;
use rayon::prelude::*;

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Partitioned parallel first scan. The region list is split into at most
/// `workers` contiguous chunks; each worker runs the sequential per-region
/// code against its own handle and private storage, and the driver
/// concatenates the results in region order. For the same inputs on a
/// quiescent target the output is identical to the sequential engine's.
pub fn run_scan_parallel(
    pid: i32,
    opts: &ScanOptions,
    user: Option<&UserValue>,
    cancel: Option<&CancelToken>,
    workers: Option<usize>,
) -> Result<(MatchesAndOldValuesArray, ScanStats), ScanError> {
    validate_user_value(opts.data_type, opts.match_type, user)?;
    let routine = get_scan_routine(
        opts.data_type,
        opts.match_type,
        user_width_flags(user),
        opts.reverse_endianness,
    )?;
    let regions = selected_regions(pid, opts)?;
    if regions.is_empty() {
        return Ok((MatchesAndOldValuesArray::new(), ScanStats::default()));
    }

    let workers = workers.unwrap_or_else(default_worker_count).max(1);
    let chunk_size = regions.len().div_ceil(workers);
    let chunks: Vec<&[Region]> = regions.chunks(chunk_size).collect();

    let results: Vec<Result<(MatchesAndOldValuesArray, ScanStats), ScanError>> = chunks
        .par_iter()
        .map(|part| {
            let mut mem = ProcMem::new(pid);
            mem.open(false)?;
            let mut out = MatchesAndOldValuesArray::new();
            let mut stats = ScanStats::default();
            for region in *part {
                scan_region(&mem, region, &routine, user, opts, cancel, &mut out, &mut stats)?;
            }
            Ok((out, stats))
        })
        .collect();

    let mut out = MatchesAndOldValuesArray::new();
    let mut stats = ScanStats::default();
    for result in results {
        let (part_out, part_stats) = result?;
        out.swaths.extend(part_out.swaths);
        stats.regions_visited += part_stats.regions_visited;
        stats.bytes_scanned += part_stats.bytes_scanned;
    }
    stats.matches = out.match_count();
    Ok((out, stats))
}
