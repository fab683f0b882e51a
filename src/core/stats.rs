use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Counters produced by detection on a single contig
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContigStatistics {
    /// Input ORFs absorbed into fragmented candidates
    pub fragmented_orfs: usize,
    /// Standalone "too short" candidates
    pub pseudogenes_short: usize,
    /// Fused fragmented candidates
    pub pseudogenes_fragmented: usize,
}

impl ContigStatistics {
    #[must_use]
    pub fn pseudogenes_total(&self) -> usize {
        self.pseudogenes_short + self.pseudogenes_fragmented
    }
}

impl Add for ContigStatistics {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            fragmented_orfs: self.fragmented_orfs + rhs.fragmented_orfs,
            pseudogenes_short: self.pseudogenes_short + rhs.pseudogenes_short,
            pseudogenes_fragmented: self.pseudogenes_fragmented + rhs.pseudogenes_fragmented,
        }
    }
}

impl AddAssign for ContigStatistics {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for ContigStatistics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Totals for a whole run, as written to the summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Queries declared in the proteome report, with or without hits
    pub input_orfs: usize,
    /// Contigs carrying at least one region with hits
    pub contigs: usize,
    pub fragmented_orfs: usize,
    pub pseudogenes_total: usize,
    pub pseudogenes_short: usize,
    pub pseudogenes_fragmented: usize,
}

impl RunStatistics {
    #[must_use]
    pub fn new(input_orfs: usize, contigs: usize) -> Self {
        Self {
            input_orfs,
            contigs,
            ..Self::default()
        }
    }

    /// Fold a contig's counters into the run totals
    pub fn record(&mut self, delta: ContigStatistics) {
        self.fragmented_orfs += delta.fragmented_orfs;
        self.pseudogenes_short += delta.pseudogenes_short;
        self.pseudogenes_fragmented += delta.pseudogenes_fragmented;
        self.pseudogenes_total += delta.pseudogenes_total();
    }

    /// Input ORFs that were neither merged nor flagged as too short
    #[must_use]
    pub fn functional_genes(&self) -> usize {
        self.input_orfs
            .saturating_sub(self.fragmented_orfs)
            .saturating_sub(self.pseudogenes_short)
    }
}
