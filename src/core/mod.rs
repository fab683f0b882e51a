//! Core data types for pseudogene detection.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Hit`](hit::Hit): One BLAST match of a region against a database entry
//! - [`Region`](region::Region): A predicted ORF or intergenic window with its hits
//! - [`Annotation`](region::Annotation): The structured note carried by candidates
//! - [`Contig`](contig::Contig): Regions grouped by source sequence
//! - [`RunStatistics`](stats::RunStatistics): Counters reported at the end of a run
//!
//! ## Coordinates
//!
//! Region coordinates are taken verbatim from the `# Query:` lines of the
//! report. They are consistent within a run but their base is whatever the
//! upstream extraction used; nothing here assumes `start < end`.

pub mod contig;
pub mod hit;
pub mod region;
pub mod stats;
pub mod types;
