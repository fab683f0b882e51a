//! Parsers for BLAST similarity-search reports.
//!
//! This module provides:
//!
//! - **Tabular reports with comments** (`-outfmt 7`): recover one
//!   [`Region`](crate::core::region::Region) per query that received hits
//! - **Query collection**: the ordered list of `# Query:` identifiers, used
//!   both to validate report order and to count input ORFs
//!
//! ## Example
//!
//! ```rust
//! use pseudofinder::core::types::SearchKind;
//! use pseudofinder::parsing::blast_report::parse_report_text;
//!
//! let report = concat!(
//!     "# Query: Q1 contig_1 [100:400](+)\n",
//!     "# 1 hits found\n",
//!     "Q1\tsp|P1|A\t47.9\t169\t81\t5\t61\t225\t25\t190\t192\t1e-40\t140\n",
//! );
//! let parsed = parse_report_text(report, SearchKind::Blastp).unwrap();
//! assert_eq!(parsed.regions.len(), 1);
//! ```
//!
//! ## Consumed Columns
//!
//! | Index | Field | Use |
//! |--------|-------|-----|
//! | 1 | sseqid | Hit accession |
//! | 8 | sstart | Alignment start on subject |
//! | 9 | send | Alignment end on subject |
//! | 10 | slen | Subject length (scaled to nucleotides) |
//! | 11 | evalue | Ranking of merged hits |

pub mod blast_report;
