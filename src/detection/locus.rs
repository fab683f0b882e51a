use crate::core::region::Region;

/// Format the locus tag for the `number`-th candidate on a contig
#[must_use]
pub fn locus_tag(contig: &str, number: usize) -> String {
    format!("{contig}_{number:04}")
}

/// Sort candidates by start and tag them `<contig>_0001`, `<contig>_0002`, ...
pub fn add_locus_tags(mut regions: Vec<Region>, contig: &str) -> Vec<Region> {
    regions.sort_by_key(|r| r.start);

    regions
        .iter()
        .enumerate()
        .map(|(i, region)| region.with_locus_tag(locus_tag(contig, i + 1)))
        .collect()
}
