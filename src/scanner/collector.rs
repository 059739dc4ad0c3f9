// Fri Feb 13 2026 - Alex

use crate::memory::classifier::RegionClassifier;
use crate::memory::filter::{RegionFilterConfig, RegionFilterMode};
use crate::scan::storage::MatchesAndOldValuesArray;
use crate::scan::types::ScanDataType;
use crate::scanner::scanner::Scanner;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct MatchCollectionOptions {
    /// Upper bound on returned entries; 0 means unbounded.
    pub limit: usize,
    pub collect_region: bool,
    pub region_filter: Option<RegionFilterConfig>,
    pub data_type: ScanDataType,
    pub reverse_endianness: bool,
}

impl Default for MatchCollectionOptions {
    fn default() -> Self {
        Self {
            limit: 0,
            collect_region: false,
            region_filter: None,
            data_type: ScanDataType::default(),
            reverse_endianness: false,
        }
    }
}

/// One surviving cell, decoded far enough for display or export. `index`
/// is the cell's global position across all swaths after filtering.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MatchEntry {
    pub index: u64,
    pub address: u64,
    pub value: Vec<u8>,
    pub region: String,
}

/// Enumerates surviving cells out of a matches array. Export-time region
/// filtering happens here, before counting and indexing, so limits and
/// totals reflect what the user would actually see.
pub struct MatchCollector {
    classifier: Option<RegionClassifier>,
}

impl MatchCollector {
    pub fn new(classifier: Option<RegionClassifier>) -> Self {
        Self { classifier }
    }

    pub fn collect(
        &self,
        matches: &MatchesAndOldValuesArray,
        opts: &MatchCollectionOptions,
    ) -> (Vec<MatchEntry>, u64) {
        let export_filter = opts
            .region_filter
            .as_ref()
            .filter(|cfg| cfg.mode == RegionFilterMode::ExportTime && cfg.filter.is_active());

        let mut entries = Vec::new();
        let mut total: u64 = 0;
        for swath in &matches.swaths {
            for (idx, cell) in swath.data.iter().enumerate() {
                if cell.match_info.is_empty() {
                    continue;
                }
                let address = swath.remote_address(idx);
                if let Some(cfg) = export_filter {
                    let region_type = self
                        .classifier
                        .as_ref()
                        .map(|c| c.type_at(address))
                        .unwrap_or(crate::memory::region::RegionType::Unknown);
                    if !cfg.filter.is_type_allowed(region_type) {
                        continue;
                    }
                }
                if opts.limit == 0 || entries.len() < opts.limit {
                    let width = cell.match_info.widest_width().max(1);
                    let end = (idx + width).min(swath.data.len());
                    let value: Vec<u8> =
                        swath.data[idx..end].iter().map(|c| c.old_byte).collect();
                    let region = if opts.collect_region {
                        self.classifier
                            .as_ref()
                            .map(|c| c.classify(address))
                            .unwrap_or_else(|| "unk".to_string())
                    } else {
                        String::new()
                    };
                    entries.push(MatchEntry {
                        index: total,
                        address,
                        value,
                        region,
                    });
                }
                total += 1;
            }
        }
        (entries, total)
    }
}

/// Convenience wrapper used by the CLI: collects out of a scanner with its
/// lazily built classifier.
pub fn collect(
    scanner: &mut Scanner,
    opts: &MatchCollectionOptions,
) -> (Vec<MatchEntry>, u64) {
    let needs_classifier = opts.collect_region
        || opts
            .region_filter
            .as_ref()
            .is_some_and(|cfg| cfg.mode == RegionFilterMode::ExportTime);
    let classifier = if needs_classifier {
        scanner.take_classifier().ok()
    } else {
        None
    };
    let collector = MatchCollector::new(classifier);
    collector.collect(scanner.matches(), opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::filter::RegionFilter;
    use crate::memory::maps::parse_maps_buffer;
    use crate::memory::region::RegionType;
    use crate::scan::storage::{MatchesAndOldValuesArray, Swath};
    use crate::value::flags::MatchFlags;

    fn synthetic_classifier() -> RegionClassifier {
        let text = "1000-2000 rw-p 00000000 00:00 0 [heap]\n\
                    7ff0000000-7ff0100000 rw-p 00000000 00:00 0 [stack]\n";
        RegionClassifier::from_regions(parse_maps_buffer(text, "").unwrap())
    }

    /// Eight cells on the synthetic stack, every other one still a match.
    fn stack_matches() -> MatchesAndOldValuesArray {
        let mut swath = Swath::new(0x7ff0000000);
        for i in 0..8u64 {
            let flags = if i % 2 == 0 {
                MatchFlags::B8
            } else {
                MatchFlags::EMPTY
            };
            swath.set_cell(0x7ff0000000 + i, (10 * (i + 1)) as u8, flags);
        }
        let mut array = MatchesAndOldValuesArray::new();
        array.push_swath(swath);
        array
    }

    fn export_filter(names: &[&str]) -> Option<RegionFilterConfig> {
        Some(RegionFilterConfig {
            mode: RegionFilterMode::ExportTime,
            filter: RegionFilter::from_type_names(names.iter().copied()),
        })
    }

    #[test]
    fn test_export_time_filter_stack_allowed() {
        let collector = MatchCollector::new(Some(synthetic_classifier()));
        let opts = MatchCollectionOptions {
            limit: 100,
            collect_region: true,
            region_filter: export_filter(&["stack"]),
            ..Default::default()
        };
        let (entries, total) = collector.collect(&stack_matches(), &opts);

        assert_eq!(total, 4);
        assert_eq!(entries.len(), 4);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.index, i as u64);
            assert!(entry.region.contains("stack"));
            assert_eq!(entry.value.len(), 1);
        }
        assert_eq!(entries[0].value, vec![10]);
        assert_eq!(entries[1].address, 0x7ff0000002);
    }

    #[test]
    fn test_export_time_filter_heap_only_drops_stack() {
        let collector = MatchCollector::new(Some(synthetic_classifier()));
        let opts = MatchCollectionOptions {
            limit: 100,
            collect_region: true,
            region_filter: export_filter(&["heap"]),
            ..Default::default()
        };
        let (entries, total) = collector.collect(&stack_matches(), &opts);
        assert_eq!(total, 0);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_limit_bounds_entries_not_total() {
        let collector = MatchCollector::new(Some(synthetic_classifier()));
        let opts = MatchCollectionOptions {
            limit: 2,
            collect_region: false,
            ..Default::default()
        };
        let (entries, total) = collector.collect(&stack_matches(), &opts);
        assert_eq!(total, 4);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 0);
        assert_eq!(entries[1].index, 1);
    }

    #[test]
    fn test_value_width_follows_widest_flag() {
        let mut swath = Swath::new(0x1000);
        swath.append_range(0x1000, &42i32.to_ne_bytes(), MatchFlags::B8 | MatchFlags::B32);
        let mut array = MatchesAndOldValuesArray::new();
        array.push_swath(swath);

        let collector = MatchCollector::new(None);
        let opts = MatchCollectionOptions::default();
        let (entries, total) = collector.collect(&array, &opts);
        assert_eq!(total, 1);
        assert_eq!(entries[0].value, 42i32.to_ne_bytes().to_vec());
    }

    #[test]
    fn test_without_classifier_region_is_unk() {
        let collector = MatchCollector::new(None);
        let opts = MatchCollectionOptions {
            collect_region: true,
            ..Default::default()
        };
        let (entries, _) = collector.collect(&stack_matches(), &opts);
        assert!(entries.iter().all(|e| e.region == "unk"));
    }

    #[test]
    fn test_global_index_spans_swaths() {
        let mut array = MatchesAndOldValuesArray::new();
        let mut a = Swath::new(0x1000);
        a.set_cell(0x1000, 1, MatchFlags::B8);
        let mut b = Swath::new(0x2000);
        b.set_cell(0x2000, 2, MatchFlags::B8);
        b.set_cell(0x2001, 3, MatchFlags::B8);
        array.push_swath(a);
        array.push_swath(b);

        let collector = MatchCollector::new(None);
        let (entries, total) = collector.collect(&array, &MatchCollectionOptions::default());
        assert_eq!(total, 3);
        let indices: Vec<u64> = entries.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(entries[2].address, 0x2001);
    }
}
