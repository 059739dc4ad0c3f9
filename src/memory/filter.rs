// Tue Feb 10 2026 - Alex

use crate::memory::region::{Region, RegionType};
use std::collections::HashSet;

/// When a configured region filter is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionFilterMode {
    #[default]
    Disabled,
    /// Regions outside the allowed set are never scanned.
    ScanTime,
    /// Matches in disallowed regions are dropped when collected.
    ExportTime,
}

/// Allow/deny by region category. An inactive filter allows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionFilter {
    allowed: Option<HashSet<RegionType>>,
}

impl RegionFilter {
    pub fn new(allowed: HashSet<RegionType>) -> Self {
        Self {
            allowed: Some(allowed),
        }
    }

    /// Builds a filter from type names; unrecognized names are skipped.
    pub fn from_type_names<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        let allowed = names
            .into_iter()
            .filter_map(|n| RegionType::from_name(n.as_ref()))
            .collect();
        Self {
            allowed: Some(allowed),
        }
    }

    pub fn is_active(&self) -> bool {
        self.allowed.is_some()
    }

    pub fn is_type_allowed(&self, region_type: RegionType) -> bool {
        match &self.allowed {
            Some(set) => set.contains(&region_type),
            None => true,
        }
    }

    pub fn add_type(&mut self, region_type: RegionType) {
        self.allowed
            .get_or_insert_with(HashSet::new)
            .insert(region_type);
    }

    pub fn remove_type(&mut self, region_type: RegionType) {
        if let Some(set) = &mut self.allowed {
            set.remove(&region_type);
        }
    }

    pub fn filter_regions(&self, regions: &[Region]) -> Vec<Region> {
        regions
            .iter()
            .filter(|r| self.is_type_allowed(r.region_type))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionFilterConfig {
    pub mode: RegionFilterMode,
    pub filter: RegionFilter,
}
