use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::hit::Hit;
use crate::core::region::Region;

/// All regions parsed for one source sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contig {
    pub name: String,
    pub regions: Vec<Region>,
}

impl Contig {
    pub fn new(name: impl Into<String>, regions: Vec<Region>) -> Self {
        Self {
            name: name.into(),
            regions,
        }
    }
}

/// Group regions by contig name.
///
/// Every region lands in exactly one contig; regions keep their input order
/// within a contig and contigs are returned sorted by name so runs are
/// reproducible.
pub fn partition_by_contig(regions: Vec<Region>) -> Vec<Contig> {
    let mut by_name: BTreeMap<String, Vec<Region>> = BTreeMap::new();

    for region in regions {
        by_name.entry(region.contig.clone()).or_default().push(region);
    }

    by_name
        .into_iter()
        .map(|(name, regions)| Contig::new(name, regions))
        .collect()
}

/// Absolute span covered by hits of a window-relative search.
///
/// Hit coordinates are local to the extracted window, so the tightest span
/// with evidence is `window_start + min(start) + 1 ..= window_start + max(end) + 1`.
/// Returns `None` when there are no hits or the result does not fit in a `u64`.
pub fn resolve_window_coordinates(window_start: u64, hits: &[Hit]) -> Option<(u64, u64)> {
    let min_start = hits.iter().map(|h| h.target_start).min()?;
    let max_end = hits.iter().map(|h| h.target_end).max()?;

    let offset = |local: u64| window_start.checked_add(local)?.checked_add(1);
    Some((offset(min_start)?, offset(max_end)?))
}
