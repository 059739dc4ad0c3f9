// Tue Feb 10 2026 - Alex

use crate::memory::error::MemoryError;
use crate::memory::maps::{read_process_maps, RegionScanLevel};
use crate::memory::region::{Region, RegionType};

/// Snapshot of the target's full memory map used to attach a category label
/// to arbitrary addresses after a scan.
#[derive(Debug, Clone)]
pub struct RegionClassifier {
    regions: Vec<Region>,
}

impl RegionClassifier {
    pub fn create(pid: i32) -> Result<Self, MemoryError> {
        let regions = read_process_maps(pid, RegionScanLevel::All)?;
        Ok(Self::from_regions(regions))
    }

    pub fn from_regions(mut regions: Vec<Region>) -> Self {
        regions.sort_by_key(|r| r.start);
        Self { regions }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// The region containing `addr`, if any. Regions are sorted and
    /// non-overlapping, so a binary search suffices.
    pub fn region_at(&self, addr: u64) -> Option<&Region> {
        let idx = self.regions.partition_point(|r| r.end <= addr);
        self.regions.get(idx).filter(|r| r.contains(addr))
    }

    pub fn type_at(&self, addr: u64) -> RegionType {
        self.region_at(addr)
            .map(|r| r.region_type)
            .unwrap_or(RegionType::Unknown)
    }

    /// Short label for display, `"unk"` when the address is unmapped.
    pub fn classify(&self, addr: u64) -> String {
        match self.region_at(addr) {
            Some(region) if !region.filename.is_empty() => {
                format!("{} {}", region.region_type.name(), region.filename)
            }
            Some(region) => region.region_type.name().to_string(),
            None => "unk".to_string(),
        }
    }
}
