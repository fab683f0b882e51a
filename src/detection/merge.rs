//! Fusion of adjacent regions into fragmented pseudogene candidates.
//!
//! Two regions are fused when they are close, on the same strand and share a
//! large enough fraction of their database hits. The engine walks a
//! start-sorted worklist with a cursor; after every fusion the fused region is
//! put back into the list and the cursor steps back one position so it can
//! chain with its left neighbour. Looking one region past the immediate
//! neighbour tolerates a single unrelated ORF between two fragments.

use std::collections::HashSet;

use tracing::info;

use crate::core::hit::{sort_hits_by_evalue, Hit};
use crate::core::region::{Annotation, PseudoReason, Region, PLACEHOLDER_QUERY};
use crate::core::stats::ContigStatistics;

/// Maximum gap between two regions that may still be fused
pub const PROXIMITY_THRESHOLD: i64 = 1000;

#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

#[inline]
fn coordinate(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Distance from the end of the earlier region to the start of the later one.
///
/// Negative when the regions overlap.
#[must_use]
pub fn region_gap(r1: &Region, r2: &Region) -> i64 {
    let (earlier, later) = if r1.start <= r2.start { (r1, r2) } else { (r2, r1) };
    coordinate(later.start) - coordinate(earlier.end)
}

/// Number of distinct accessions hit by both regions
#[must_use]
pub fn number_of_matching_hits(r1: &Region, r2: &Region) -> usize {
    let r1_accessions: HashSet<&str> = r1.hits.iter().map(|h| h.accession.as_str()).collect();
    let r2_accessions: HashSet<&str> = r2.hits.iter().map(|h| h.accession.as_str()).collect();
    r1_accessions.intersection(&r2_accessions).count()
}

/// Whether two regions share enough hits to be fused.
///
/// Shared accessions are divided by the hit count of the region with fewer
/// hits. Regions without hits never match.
#[must_use]
pub fn matching_hit_criteria(r1: &Region, r2: &Region, cutoff: f64) -> bool {
    if r1.hits.is_empty() || r2.hits.is_empty() {
        return false;
    }

    let fewest = r1.hits.len().min(r2.hits.len());
    count_to_f64(number_of_matching_hits(r1, r2)) / count_to_f64(fewest) >= cutoff
}

/// Proximity, strand and shared-hit checks combined
#[must_use]
pub fn regions_mergeable(r1: &Region, r2: &Region, cutoff: f64) -> bool {
    region_gap(r1, r2) < PROXIMITY_THRESHOLD
        && r1.strand == r2.strand
        && matching_hit_criteria(r1, r2, cutoff)
}

/// Fuse two regions into a fragmented candidate.
///
/// The result spans both regions, keeps the strand of the earlier one and
/// carries the union of their hits ordered by e-value.
#[must_use]
pub fn join_regions(r1: &Region, r2: &Region) -> Region {
    let (earlier, later) = if r1.start <= r2.start { (r1, r2) } else { (r2, r1) };

    let mut seen: HashSet<&Hit> = HashSet::new();
    let mut hits: Vec<Hit> = earlier
        .hits
        .iter()
        .chain(later.hits.iter())
        .filter(|h| seen.insert(*h))
        .cloned()
        .collect();
    sort_hits_by_evalue(&mut hits);

    Region {
        contig: earlier.contig.clone(),
        query: PLACEHOLDER_QUERY.to_string(),
        start: earlier.start.min(later.start),
        end: earlier.end.max(later.end),
        strand: earlier.strand,
        hits,
        annotation: Annotation::flagged(PseudoReason::Fragmented),
    }
}

/// Result of scanning one contig for fragmented pseudogenes
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Truncated candidates that were not absorbed into a fusion
    pub individual: Vec<Region>,
    /// Fused candidates
    pub fragmented: Vec<Region>,
    pub stats: ContigStatistics,
    /// Number of fusions performed
    pub fuses: usize,
}

/// Start-sorted regions with a cursor that steps back after each fusion
struct Worklist {
    regions: Vec<Region>,
    cursor: usize,
}

impl Worklist {
    fn new(regions: &[Region]) -> Self {
        let mut regions = regions.to_vec();
        sort_by_start(&mut regions);
        Self { regions, cursor: 0 }
    }

    fn has_pair(&self) -> bool {
        self.cursor + 1 < self.regions.len()
    }

    fn current(&self) -> &Region {
        &self.regions[self.cursor]
    }

    fn ahead(&self, offset: usize) -> Option<&Region> {
        self.regions.get(self.cursor + offset)
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Replace the regions from the cursor through `cursor + offset` with
    /// `fused` and step back one position. Returns the removed regions.
    fn fuse(&mut self, offset: usize, fused: Region) -> Vec<Region> {
        let absorbed: Vec<Region> = self
            .regions
            .drain(self.cursor..=self.cursor + offset)
            .collect();
        self.regions.push(fused);
        sort_by_start(&mut self.regions);
        self.cursor = self.cursor.saturating_sub(1);
        absorbed
    }

    /// Regions the cursor never moved past
    fn remaining(&self) -> &[Region] {
        self.regions.get(self.cursor..).unwrap_or_default()
    }
}

fn sort_by_start(regions: &mut [Region]) {
    regions.sort_by_key(|r| r.start);
}

/// Keep one entry per start coordinate, the newest winning
fn insert_by_start(list: &mut Vec<Region>, region: Region) {
    list.retain(|r| r.start != region.start);
    list.push(region);
}

/// Scan a contig's regions for fragmented pseudogenes.
///
/// Returns the standalone truncated candidates and the fused candidates as
/// two disjoint lists, plus the contig's counters. Every fusion shrinks the
/// worklist, so the scan performs at most `regions.len() - 1` fusions.
pub fn check_adjacent_regions(regions: &[Region], cutoff: f64) -> MergeOutcome {
    let mut list = Worklist::new(regions);
    let mut outcome = MergeOutcome::default();

    while list.has_pair() {
        let fusion = {
            let current = list.current();
            [1, 2].into_iter().find_map(|offset| {
                list.ahead(offset)
                    .filter(|candidate| regions_mergeable(current, candidate, cutoff))
                    .map(|candidate| (offset, join_regions(current, candidate)))
            })
        };

        match fusion {
            Some((offset, fused)) => {
                info!(
                    "Regions merged and flagged on contig {}, location {}-{}",
                    fused.contig, fused.start, fused.end
                );

                let absorbed = list.fuse(offset, fused.clone());
                outcome.fuses += 1;
                outcome.stats.fragmented_orfs += absorbed
                    .iter()
                    .filter(|r| !r.is_fragmentation_product())
                    .count();

                outcome.individual.retain(|r| !absorbed.contains(r));
                outcome.fragmented.retain(|r| !absorbed.contains(r));
                insert_by_start(&mut outcome.fragmented, fused);
            }
            None => {
                if list.current().is_truncated_candidate() {
                    insert_by_start(&mut outcome.individual, list.current().clone());
                }
                list.advance();
            }
        }
    }

    // The final region is never the left side of a pair
    for region in list.remaining() {
        if region.is_truncated_candidate() {
            insert_by_start(&mut outcome.individual, region.clone());
        }
    }

    outcome.stats.pseudogenes_short = outcome.individual.len();
    outcome.stats.pseudogenes_fragmented = outcome.fragmented.len();
    outcome
}
