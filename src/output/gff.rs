use std::io::{self, Write};

use crate::core::region::Region;

/// Value of the GFF `source` column
pub const GFF_SOURCE: &str = "pseudo_finder";

/// Feature type written for every candidate
pub const GFF_FEATURE: &str = "gene";

/// Write the GFF3 preamble
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_header<W: Write>(out: &mut W, timestamp: &str) -> io::Result<()> {
    writeln!(out, "##gff-version 3")?;
    writeln!(out, "#!annotation-date\t{timestamp}")
}

/// Render one candidate as a tab-separated GFF3 feature line (no newline)
#[must_use]
pub fn format_feature(region: &Region) -> String {
    format!(
        "{}\t{GFF_SOURCE}\t{GFF_FEATURE}\t{}\t{}\t.\t{}\t.\t{}",
        region.contig, region.start, region.end, region.strand, region.annotation
    )
}

/// Write a full GFF3 document: preamble followed by one line per candidate
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_gff<'a, W, I>(out: &mut W, candidates: I, timestamp: &str) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Region>,
{
    write_header(out, timestamp)?;
    for region in candidates {
        writeln!(out, "{}", format_feature(region))?;
    }
    out.flush()
}
