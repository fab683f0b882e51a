use std::fmt;
use std::path::PathBuf;

use crate::core::stats::RunStatistics;
use crate::detection::DetectionConfig;

/// Everything recorded in the run log
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub timestamp: String,
    pub blastp: PathBuf,
    pub blastx: Option<PathBuf>,
    pub config: DetectionConfig,
    pub stats: RunStatistics,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blastx = self
            .blastx
            .as_ref()
            .map_or_else(|| "None".to_string(), |p| p.display().to_string());

        writeln!(f, "####### Summary from pseudofinder #######")?;
        writeln!(f)?;
        writeln!(f, "Date/time:\t\t{}", self.timestamp)?;
        writeln!(f)?;

        writeln!(f, "#######    Files   #######")?;
        writeln!(f, "BlastP:\t\t\t{}", self.blastp.display())?;
        writeln!(f, "BlastX:\t\t\t{blastx}")?;
        writeln!(f)?;

        writeln!(f, "#######  Settings  #######")?;
        writeln!(f, "Length_pseudo:\t\t{}", self.config.length_cutoff)?;
        writeln!(f, "Shared_hits:\t\t{}", self.config.shared_hits_cutoff)?;
        writeln!(f)?;

        writeln!(f, "####### Statistics #######")?;
        writeln!(f, "#Input:")?;
        writeln!(f, "Initial ORFs:\t\t\t{}", self.stats.input_orfs)?;
        writeln!(f, "Number of contigs:\t\t{}", self.stats.contigs)?;
        writeln!(f, "#Output:")?;
        writeln!(f, "Initial ORFs joined:\t\t{}", self.stats.fragmented_orfs)?;
        writeln!(f, "Pseudogenes (total):\t\t{}", self.stats.pseudogenes_total)?;
        writeln!(f, "Pseudogenes (too short):\t{}", self.stats.pseudogenes_short)?;
        writeln!(
            f,
            "Pseudogenes (fragmented):\t{}",
            self.stats.pseudogenes_fragmented
        )?;
        writeln!(f, "Functional genes:\t\t{}", self.stats.functional_genes())?;
        writeln!(f)?;

        writeln!(f, "####### Output Key #######")?;
        writeln!(
            f,
            "Initial ORFs joined:\t\tThe number of input open reading frames that have been merged and flagged as a fragmented pseudogene."
        )?;
        writeln!(
            f,
            "Pseudogenes (too short):\tORFs shorter than the \"Length_pseudo\" fraction of the average length of their hits."
        )?;
        writeln!(
            f,
            "Pseudogenes (fragmented):\tPseudogenes composed of merging 2 or more input ORFs."
        )?;
        writeln!(
            f,
            "Functional genes:\t\t[Initial ORFs] - [Initial ORFs joined] - [Pseudogenes (too short)]"
        )
    }
}
