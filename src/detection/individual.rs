use tracing::{debug, info};

use crate::core::region::{PseudoReason, Region};

/// Fewer hits than this make the mean hit length unreliable
pub const MIN_HITS_FOR_AVERAGE: usize = 3;

#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

#[inline]
fn length_to_f64(length: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        length as f64
    }
}

/// Ratio of a region's length to the mean target length of its hits.
///
/// Returns `None` when the region has fewer than [`MIN_HITS_FOR_AVERAGE`]
/// hits or its hits have no length.
#[must_use]
pub fn length_ratio(region: &Region) -> Option<f64> {
    if region.hits.len() < MIN_HITS_FOR_AVERAGE {
        return None;
    }

    let total: u64 = region.hits.iter().map(|h| h.target_length).sum();
    let mean = length_to_f64(total) / count_to_f64(region.hits.len());
    if mean <= 0.0 {
        return None;
    }

    Some(length_to_f64(region.span()) / mean)
}

/// Flag regions that are short compared to the database entries they hit.
///
/// Only the flagged regions are returned, each as a new region carrying a
/// [`PseudoReason::Truncated`] annotation. Neighbouring regions are never
/// consulted.
pub fn check_individual_regions(regions: &[Region], length_cutoff: f64) -> Vec<Region> {
    let mut flagged = Vec::new();

    for region in regions {
        let Some(ratio) = length_ratio(region) else {
            debug!(
                "Region {} on {} has {} hits; skipping length check",
                region.query,
                region.contig,
                region.hits.len()
            );
            continue;
        };

        if ratio < length_cutoff {
            info!(
                "Individual gene flagged on contig {}, location {}-{}",
                region.contig, region.start, region.end
            );
            let percent_of_hits = (ratio * 1000.0).round() / 10.0;
            flagged.push(region.flagged_as(PseudoReason::Truncated { percent_of_hits }));
        }
    }

    flagged
}

/// Substitute flagged copies into the full region list.
///
/// Order is preserved; a region is replaced by the first flagged region with
/// the same start, otherwise it passes through unchanged.
pub fn replace_flagged(flagged: &[Region], regions: &[Region]) -> Vec<Region> {
    regions
        .iter()
        .map(|region| {
            flagged
                .iter()
                .find(|pseudo| pseudo.start == region.start)
                .unwrap_or(region)
                .clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hit::Hit;
    use crate::core::types::Strand;

    fn region_with_hits(start: u64, end: u64, lengths: &[u64]) -> Region {
        let hits = lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| Hit::new(format!("acc{i}"), len, 1, 100, 1e-10))
            .collect();
        Region::new("C1", format!("orf_{start}"), start, end, Strand::Forward, hits)
    }

    #[test]
    fn test_flags_short_region() {
        let region = region_with_hits(1000, 1150, &[300, 300, 300, 300, 300]);
        let flagged = check_individual_regions(&[region], 0.60);

        assert_eq!(flagged.len(), 1);
        assert!(flagged[0].is_truncated_candidate());
        assert!(flagged[0]
            .annotation
            .to_string()
            .contains("ORF is 50.0% of the average length"));
    }

    #[test]
    fn test_two_hits_never_flagged() {
        let region = region_with_hits(1000, 1010, &[3000, 3000]);
        assert_eq!(length_ratio(&region), None);
        assert!(check_individual_regions(&[region], 0.60).is_empty());
    }

    #[test]
    fn test_long_region_passes() {
        let region = region_with_hits(0, 290, &[300, 300, 300]);
        assert!(check_individual_regions(&[region], 0.60).is_empty());
    }

    #[test]
    fn test_shorter_region_stays_flagged() {
        let lengths = [250, 300, 350, 300];
        let mut previous = f64::INFINITY;
        for span in (10..=120).rev().step_by(10) {
            let region = region_with_hits(500, 500 + span, &lengths);
            let ratio = length_ratio(&region).unwrap();
            assert!(ratio < previous);
            previous = ratio;
            assert_eq!(check_individual_regions(&[region], 0.60).len(), 1);
        }
    }

    #[test]
    fn test_percentage_rounded_to_one_decimal() {
        let region = region_with_hits(0, 100, &[300, 300, 300]);
        let flagged = check_individual_regions(&[region], 0.60);
        assert_eq!(
            flagged[0].annotation.reason,
            Some(PseudoReason::Truncated {
                percent_of_hits: 33.3
            })
        );
    }

    #[test]
    fn test_replace_flagged_preserves_order() {
        let a = region_with_hits(100, 400, &[]);
        let b = region_with_hits(500, 550, &[300, 300, 300]);
        let c = region_with_hits(900, 1200, &[]);
        let regions = vec![a.clone(), b.clone(), c.clone()];

        let flagged = check_individual_regions(&regions, 0.60);
        let updated = replace_flagged(&flagged, &regions);

        assert_eq!(updated.len(), 3);
        assert_eq!(updated[0], a);
        assert!(updated[1].is_truncated_candidate());
        assert_eq!(updated[1].start, b.start);
        assert_eq!(updated[2], c);
    }
}
