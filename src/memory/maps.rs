// Tue Feb 10 2026 - Alex

use crate::memory::error::MemoryError;
use crate::memory::region::{Protection, Region, RegionType};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;

/// Selects which regions a scan visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionScanLevel {
    /// Heap, stack and bss only.
    HeapStackOnly,
    /// Everything readable and writable.
    #[default]
    AllRw,
    /// Everything readable.
    All,
}

impl RegionScanLevel {
    pub fn admits(self, region: &Region) -> bool {
        match self {
            RegionScanLevel::HeapStackOnly => matches!(
                region.region_type,
                RegionType::Heap | RegionType::Stack | RegionType::Bss
            ),
            RegionScanLevel::AllRw => region.is_readable() && region.is_writable(),
            RegionScanLevel::All => region.is_readable(),
        }
    }
}

/// Resolves the target's executable path from the proc filesystem; used to
/// tell the main image apart from mapped libraries.
pub fn exe_path_for_pid(pid: i32) -> Option<String> {
    fs::read_link(format!("/proc/{}/exe", pid))
        .ok()
        .map(|p| p.to_string_lossy().into_owned())
}

/// Reads and classifies the target's memory map, keeping only regions the
/// scan level admits. Never returns a partial list: an unopenable maps file
/// is a typed error.
pub fn read_process_maps(pid: i32, level: RegionScanLevel) -> Result<Vec<Region>, MemoryError> {
    if pid <= 0 {
        return Err(MemoryError::InvalidPid(pid));
    }
    let path = format!("/proc/{}/maps", pid);
    let text = fs::read_to_string(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => MemoryError::ProcessNotFound(pid),
        ErrorKind::PermissionDenied => MemoryError::PermissionDenied(path.clone()),
        _ => MemoryError::Io(e),
    })?;
    let exe_path = exe_path_for_pid(pid).unwrap_or_default();
    let regions = parse_maps_buffer(&text, &exe_path)?;
    Ok(regions.into_iter().filter(|r| level.admits(r)).collect())
}

/// Parses a whole maps buffer: one region per line, then a second pass that
/// computes per-filename load addresses and attaches region types.
pub fn parse_maps_buffer(text: &str, exe_path: &str) -> Result<Vec<Region>, MemoryError> {
    let mut regions = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        regions.push(parse_maps_line(line)?);
    }

    let mut load_addrs: HashMap<&str, u64> = HashMap::new();
    for region in &regions {
        if region.filename.is_empty() {
            continue;
        }
        let entry = load_addrs
            .entry(region.filename.as_str())
            .or_insert(region.start);
        *entry = (*entry).min(region.start);
    }
    let load_addrs: HashMap<String, u64> = load_addrs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

    let mut prev_exe_backed = false;
    for region in &mut regions {
        region.load_addr = load_addrs
            .get(&region.filename)
            .copied()
            .unwrap_or(region.start);
        region.region_type = classify(region, exe_path, prev_exe_backed);
        prev_exe_backed = !exe_path.is_empty() && region.filename == exe_path;
    }
    Ok(regions)
}

/// Parses `start-end prot offset dev inode [path]`. Addresses are bare
/// lowercase hex; the path field is optional and may contain spaces.
fn parse_maps_line(line: &str) -> Result<Region, MemoryError> {
    let malformed = || MemoryError::MalformedMaps(line.to_string());
    let mut fields = line.split_whitespace();

    let range = fields.next().ok_or_else(malformed)?;
    let (start, end) = range.split_once('-').ok_or_else(malformed)?;
    let start = u64::from_str_radix(start, 16).map_err(|_| malformed())?;
    let end = u64::from_str_radix(end, 16).map_err(|_| malformed())?;
    if start >= end {
        return Err(malformed());
    }

    let protection = fields
        .next()
        .and_then(Protection::from_maps_field)
        .ok_or_else(malformed)?;
    let offset = fields
        .next()
        .and_then(|f| u64::from_str_radix(f, 16).ok())
        .ok_or_else(malformed)?;
    let device = fields.next().ok_or_else(malformed)?.to_string();
    let inode = fields
        .next()
        .and_then(|f| f.parse::<u64>().ok())
        .ok_or_else(malformed)?;
    let filename = fields.collect::<Vec<_>>().join(" ");

    Ok(Region {
        start,
        end,
        protection,
        offset,
        device,
        inode,
        filename,
        load_addr: start,
        region_type: RegionType::Unknown,
    })
}

/// Classification rules, applied in order. `prev_exe_backed` feeds the bss
/// heuristic: an anonymous rw mapping right after the main image.
fn classify(region: &Region, exe_path: &str, prev_exe_backed: bool) -> RegionType {
    let prot = region.protection;
    let path = region.filename.as_str();

    if !exe_path.is_empty() && path == exe_path {
        return if prot.execute {
            RegionType::Exe
        } else {
            RegionType::Code
        };
    }
    if path == "[heap]" {
        return RegionType::Heap;
    }
    if path == "[stack]" || path.starts_with("[stack:") {
        return RegionType::Stack;
    }
    // Kernel-provided pseudo-mappings are not file-backed code.
    if matches!(path, "[vdso]" | "[vvar]" | "[vsyscall]") {
        return RegionType::Unknown;
    }
    if path.is_empty() && prot.read && prot.write && !prot.execute && !prot.shared {
        return if prev_exe_backed {
            RegionType::Bss
        } else {
            RegionType::MiscRw
        };
    }
    if prot.read && !prot.write && !prot.execute && !prot.shared {
        return if path.is_empty() {
            RegionType::MiscRo
        } else {
            RegionType::MappedFile
        };
    }
    if prot.read && !prot.write && prot.execute && !prot.shared && !path.is_empty() {
        return RegionType::Code;
    }
    RegionType::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
    00400000-0040c000 r-xp 00000000 08:02 123 /usr/bin/myprog
    0060b000-0060c000 r--p 0000b000 08:02 123 /usr/bin/myprog
    0060c000-0060d000 rw-p 0000c000 08:02 123 /usr/bin/myprog
    00e0c000-00e2d000 rw-p 00000000 00:00 0 [heap]
    7f7a3c000000-7f7a3c75d000 r-xp 00000000 08:02 654 /lib/x86_64-linux-gnu/libc-2.35.so
    ";

    #[test]
    fn test_parse_synthetic_maps() {
        let regions = parse_maps_buffer(SAMPLE, "/usr/bin/myprog").unwrap();
        assert_eq!(regions.len(), 5);

        let exe: Vec<_> = regions
            .iter()
            .filter(|r| r.region_type == RegionType::Exe)
            .collect();
        assert_eq!(exe.len(), 1);
        assert!(exe[0].is_executable());
        assert_eq!(exe[0].filename, "/usr/bin/myprog");

        let heap: Vec<_> = regions
            .iter()
            .filter(|r| r.region_type == RegionType::Heap)
            .collect();
        assert_eq!(heap.len(), 1);
        assert_eq!(heap[0].load_addr, heap[0].start);

        let prog_regions: Vec<_> = regions
            .iter()
            .filter(|r| r.filename == "/usr/bin/myprog")
            .collect();
        assert_eq!(prog_regions.len(), 3);
        for r in &prog_regions {
            assert_eq!(r.load_addr, 0x400000);
        }
    }

    #[test]
    fn test_regions_sorted_and_disjoint() {
        let regions = parse_maps_buffer(SAMPLE, "/usr/bin/myprog").unwrap();
        for pair in regions.windows(2) {
            assert!(pair[0].start < pair[0].end);
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_stack_pseudo_paths() {
        let text = "7ffd0000-7ffe0000 rw-p 00000000 00:00 0 [stack]\n\
                    7ffe0000-7fff0000 rw-p 00000000 00:00 0 [stack:1234]\n";
        let regions = parse_maps_buffer(text, "").unwrap();
        assert!(regions
            .iter()
            .all(|r| r.region_type == RegionType::Stack));
    }

    #[test]
    fn test_kernel_pseudo_mappings_stay_unknown() {
        let text = "7fff000000-7fff001000 r-xp 00000000 00:00 0 [vdso]\n\
                    7fff001000-7fff002000 r--p 00000000 00:00 0 [vvar]\n\
                    ffffffffff600000-ffffffffff601000 --xp 00000000 00:00 0 [vsyscall]\n";
        let regions = parse_maps_buffer(text, "").unwrap();
        assert!(regions
            .iter()
            .all(|r| r.region_type == RegionType::Unknown));
    }

    #[test]
    fn test_anonymous_classification() {
        let text = "10000-20000 rw-p 00000000 00:00 0\n\
                    20000-30000 r--p 00000000 00:00 0\n";
        let regions = parse_maps_buffer(text, "").unwrap();
        assert_eq!(regions[0].region_type, RegionType::MiscRw);
        assert_eq!(regions[1].region_type, RegionType::MiscRo);
    }

    #[test]
    fn test_bss_follows_exe_image() {
        let text = "00400000-00500000 r-xp 00000000 08:02 1 /usr/bin/myprog\n\
                    00500000-00510000 rw-p 00000000 00:00 0\n";
        let regions = parse_maps_buffer(text, "/usr/bin/myprog").unwrap();
        assert_eq!(regions[1].region_type, RegionType::Bss);
    }

    #[test]
    fn test_malformed_line_is_error() {
        assert!(parse_maps_buffer("not a maps line at all", "").is_err());
        assert!(parse_maps_buffer("00400000 r-xp 0 08:02 1 /x", "").is_err());
    }

    #[test]
    fn test_scan_level_admits() {
        let regions = parse_maps_buffer(SAMPLE, "/usr/bin/myprog").unwrap();
        let heap_stack: Vec<_> = regions
            .iter()
            .filter(|r| RegionScanLevel::HeapStackOnly.admits(r))
            .collect();
        assert_eq!(heap_stack.len(), 1);
        let rw: Vec<_> = regions
            .iter()
            .filter(|r| RegionScanLevel::AllRw.admits(r))
            .collect();
        assert_eq!(rw.len(), 2);
        let all: Vec<_> = regions
            .iter()
            .filter(|r| RegionScanLevel::All.admits(r))
            .collect();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_read_self_maps() {
        let regions =
            read_process_maps(std::process::id() as i32, RegionScanLevel::All).unwrap();
        assert!(!regions.is_empty());
        let exe = std::fs::read_link("/proc/self/exe").unwrap();
        let exe = exe.to_string_lossy();
        assert!(regions.iter().any(|r| r.filename == exe.as_ref()
            && matches!(r.region_type, RegionType::Exe | RegionType::Code)));
        assert!(regions
            .iter()
            .any(|r| r.region_type == RegionType::Stack));
    }

    #[test]
    fn test_invalid_pid_rejected() {
        assert!(matches!(
            read_process_maps(-1, RegionScanLevel::All),
            Err(MemoryError::InvalidPid(-1))
        ));
    }
}
