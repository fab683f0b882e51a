use serde::{Deserialize, Serialize};

/// Strand of a region on its contig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    /// Parse a strand token (`+`, `-`, `1` or `-1`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "+" | "1" => Some(Self::Forward),
            "-" | "-1" => Some(Self::Reverse),
            _ => None,
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "+"),
            Self::Reverse => write!(f, "-"),
        }
    }
}

/// Subject lengths reported by protein databases are in residues
pub const PROTEIN_LENGTH_SCALE: u64 = 3;

/// The BLAST program that produced a tabular report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// Proteome (translated CDS) against a protein database
    Blastp,
    /// Intergenic nucleotide windows against a protein database
    Blastx,
    /// Nucleotide against a nucleotide database
    Blastn,
}

impl SearchKind {
    /// Factor applied to `slen` so target lengths are in nucleotides
    #[must_use]
    pub fn target_length_scale(self) -> u64 {
        match self {
            Self::Blastp | Self::Blastx => PROTEIN_LENGTH_SCALE,
            Self::Blastn => 1,
        }
    }

    /// Whether query coordinates are relative to an extracted window
    /// and must be remapped from the hits
    #[must_use]
    pub fn is_window_relative(self) -> bool {
        matches!(self, Self::Blastx)
    }
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blastp => write!(f, "BlastP"),
            Self::Blastx => write!(f, "BlastX"),
            Self::Blastn => write!(f, "BlastN"),
        }
    }
}
