//! Command-line interface for pseudofinder.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **annotate**: Detect pseudogene candidates from BLAST reports
//! - **regions**: Parse a BLAST report and list the regions with hits
//!
//! ## Usage
//!
//! ```text
//! # Detect candidates from a proteome search
//! pseudofinder annotate --blastp proteome.blastp.tsv --output run1
//!
//! # Include an intergenic search and stricter cutoffs
//! pseudofinder annotate --blastp proteome.blastp.tsv --blastx intergenic.blastx.tsv \
//!     --length-pseudo 0.5 --shared-hits 0.4 --output run1
//!
//! # JSON output for scripting
//! pseudofinder annotate --blastp proteome.blastp.tsv --format json
//!
//! # Inspect what the parser extracts from a report
//! pseudofinder regions proteome.blastp.tsv.gz --format tsv
//! ```

use clap::{Parser, Subcommand};

pub mod annotate;
pub mod regions;

#[derive(Parser)]
#[command(name = "pseudofinder")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Flag candidate pseudogenes from BLAST homology reports")]
#[command(
    long_about = "pseudofinder reads BLAST tabular reports for a genome's predicted ORFs (and optionally its intergenic regions) and flags likely pseudogenes:\n- ORFs much shorter than the proteins they hit\n- Neighbouring ORFs that hit the same proteins and look like fragments of one gene\n\nCandidates are written as GFF3 together with a summary log."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect pseudogene candidates and write GFF and summary files
    Annotate(annotate::AnnotateArgs),

    /// Parse a BLAST report and print its regions
    Regions(regions::RegionsArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
