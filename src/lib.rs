//! # pseudofinder
//!
//! A library for flagging candidate pseudogenes in a genome annotation from
//! BLAST homology reports.
//!
//! Predicted ORFs (and optionally intergenic windows) are searched against a
//! protein database. A gene that has decayed into a pseudogene tends to leave
//! one of two traces in those results:
//!
//! - **Truncation**: the ORF is much shorter than the proteins it hits
//! - **Fragmentation**: neighbouring ORFs on the same strand hit the same
//!   proteins, because a frameshift or stop codon split one gene in pieces
//!
//! `pseudofinder` parses the reports, groups regions by contig, flags both
//! kinds of candidate and assigns each a locus tag.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use pseudofinder::{detect_pseudogenes, DetectionConfig, SearchKind};
//! use pseudofinder::parsing::blast_report::parse_report_file;
//!
//! let report = parse_report_file(Path::new("proteome.blastp.tsv"), SearchKind::Blastp).unwrap();
//! let input_orfs = report.query_ids.len();
//!
//! let result = detect_pseudogenes(report.regions, input_orfs, &DetectionConfig::default());
//! for candidate in result.candidates() {
//!     println!("{}:{}-{} {}", candidate.contig, candidate.start, candidate.end, candidate.annotation);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Hits, regions, contigs and run statistics
//! - [`parsing`]: BLAST tabular report parser
//! - [`detection`]: Truncation and fragmentation detection
//! - [`output`]: GFF3 and summary writers
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod detection;
pub mod output;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::contig::Contig;
pub use core::hit::Hit;
pub use core::region::{Annotation, PseudoReason, Region};
pub use core::stats::{ContigStatistics, RunStatistics};
pub use core::types::*;
pub use detection::{detect_pseudogenes, DetectionConfig, DetectionResult};
