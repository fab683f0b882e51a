//! Pseudogene detection over parsed regions.
//!
//! Detection runs contig by contig:
//!
//! 1. [`individual`]: flag ORFs much shorter than the mean length of their hits
//! 2. [`merge`]: fuse neighbouring ORFs that look like fragments of one gene
//! 3. [`locus`]: order the candidates and assign locus tags
//!
//! Contigs share no state, so they are processed in parallel and their
//! counters are summed once all of them are done.

pub mod individual;
pub mod locus;
pub mod merge;

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::contig::{partition_by_contig, Contig};
use crate::core::region::Region;
use crate::core::stats::{ContigStatistics, RunStatistics};
use crate::utils::validation::{validate_fraction, ValidationError};

use self::individual::{check_individual_regions, replace_flagged};
use self::locus::add_locus_tags;
use self::merge::check_adjacent_regions;

/// Default maximum length ratio for a "too short" ORF
pub const DEFAULT_LENGTH_CUTOFF: f64 = 0.60;

/// Default minimum shared-hit fraction for fusing neighbours
pub const DEFAULT_SHARED_HITS_CUTOFF: f64 = 0.30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid config")]
    Invalid(#[from] ValidationError),
}

/// Cutoffs used by detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// ORFs shorter than this fraction of their mean hit length are flagged
    pub length_cutoff: f64,
    /// Fraction of hits two neighbours must share to be fused
    pub shared_hits_cutoff: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            length_cutoff: DEFAULT_LENGTH_CUTOFF,
            shared_hits_cutoff: DEFAULT_SHARED_HITS_CUTOFF,
        }
    }
}

impl DetectionConfig {
    /// Check both cutoffs lie in `(0, 1]`
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::FractionOutOfRange` naming the offending cutoff.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fraction("length_cutoff", self.length_cutoff)?;
        validate_fraction("shared_hits_cutoff", self.shared_hits_cutoff)?;
        Ok(())
    }

    /// Load and validate a JSON config file; missing fields take defaults
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, is not valid JSON, or
    /// holds out-of-range cutoffs.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file without validating it.
    ///
    /// For callers that apply overrides before calling [`Self::validate`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or is not valid JSON.
    pub fn read_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_json(&content)
    }

    /// Parse and validate a JSON config
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for invalid JSON or
    /// `ConfigError::Invalid` for out-of-range cutoffs.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_json(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config without validating it
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for invalid JSON.
    pub fn parse_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Tagged candidates and counters for one contig
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContigReport {
    pub contig: String,
    pub candidates: Vec<Region>,
    pub stats: ContigStatistics,
}

/// Candidates for every contig plus run totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Per-contig results, ordered by contig name
    pub contigs: Vec<ContigReport>,
    pub stats: RunStatistics,
}

impl DetectionResult {
    /// All candidates in output order
    pub fn candidates(&self) -> impl Iterator<Item = &Region> {
        self.contigs.iter().flat_map(|c| c.candidates.iter())
    }
}

/// Run individual classification, neighbour fusion and tagging on one contig
#[must_use]
pub fn annotate_contig(contig: &Contig, config: &DetectionConfig) -> ContigReport {
    let flagged = check_individual_regions(&contig.regions, config.length_cutoff);
    let updated = replace_flagged(&flagged, &contig.regions);

    let outcome = check_adjacent_regions(&updated, config.shared_hits_cutoff);

    let mut candidates = outcome.individual;
    candidates.extend(outcome.fragmented);

    ContigReport {
        contig: contig.name.clone(),
        candidates: add_locus_tags(candidates, &contig.name),
        stats: outcome.stats,
    }
}

/// Detect pseudogene candidates across all contigs.
///
/// `input_orfs` is the number of queries in the proteome report, including
/// those without hits.
#[must_use]
pub fn detect_pseudogenes(
    regions: Vec<Region>,
    input_orfs: usize,
    config: &DetectionConfig,
) -> DetectionResult {
    let contigs = partition_by_contig(regions);
    let total = contigs.len();

    let reports: Vec<ContigReport> = contigs
        .par_iter()
        .enumerate()
        .map(|(i, contig)| {
            debug!("Checking contig {} / {total} for pseudogenes", i + 1);
            annotate_contig(contig, config)
        })
        .collect();

    let mut stats = RunStatistics::new(input_orfs, total);
    stats.record(reports.iter().map(|r| r.stats).sum());

    DetectionResult {
        contigs: reports,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hit::Hit;
    use crate::core::types::Strand;

    fn hits(accessions: &[&str], length: u64) -> Vec<Hit> {
        accessions
            .iter()
            .map(|acc| Hit::new(*acc, length, 1, 100, 1e-20))
            .collect()
    }

    #[test]
    fn test_config_defaults() {
        let config = DetectionConfig::default();
        assert!((config.length_cutoff - 0.60).abs() < f64::EPSILON);
        assert!((config.shared_hits_cutoff - 0.30).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config = DetectionConfig::from_json(r#"{"length_cutoff": 0.5}"#).unwrap();
        assert!((config.length_cutoff - 0.5).abs() < f64::EPSILON);
        assert!((config.shared_hits_cutoff - DEFAULT_SHARED_HITS_CUTOFF).abs() < f64::EPSILON);

        assert!(matches!(
            DetectionConfig::from_json(r#"{"shared_hits_cutoff": 30}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DetectionConfig::from_json("not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_json_defers_validation() {
        let config = DetectionConfig::parse_json(r#"{"shared_hits_cutoff": 30}"#).unwrap();
        assert!((config.shared_hits_cutoff - 30.0).abs() < f64::EPSILON);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_config_message_not_repeated() {
        let err = DetectionConfig::from_json(r#"{"length_cutoff": 2.5}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid config");

        let source = std::error::Error::source(&err).unwrap().to_string();
        assert!(source.contains("length_cutoff"));
        assert_eq!(format!("{:#}", anyhow::Error::from(err)).matches("2.5").count(), 1);
    }

    #[test]
    fn test_annotate_contig_mixed_candidates() {
        let regions = vec![
            // Too short: 150 / 300
            Region::new("C1", "q1", 100, 250, Strand::Forward, hits(&["x", "y", "z"], 300)),
            // Two fragments of one gene
            Region::new("C1", "q2", 5000, 5600, Strand::Reverse, hits(&["a", "b"], 3000)),
            Region::new("C1", "q3", 5650, 6300, Strand::Reverse, hits(&["a", "b"], 3000)),
            // Intact gene
            Region::new("C1", "q4", 9000, 9900, Strand::Forward, hits(&["m", "n", "o"], 900)),
        ];
        let report = annotate_contig(&Contig::new("C1", regions), &DetectionConfig::default());

        assert_eq!(report.candidates.len(), 2);
        assert_eq!(report.candidates[0].start, 100);
        assert!(report.candidates[0].is_truncated_candidate());
        assert_eq!(
            report.candidates[0].annotation.locus_tag.as_deref(),
            Some("C1_0001")
        );
        assert_eq!(
            (report.candidates[1].start, report.candidates[1].end),
            (5000, 6300)
        );
        assert!(report.candidates[1].is_fragmentation_product());
        assert_eq!(
            report.candidates[1].annotation.locus_tag.as_deref(),
            Some("C1_0002")
        );
        assert_eq!(report.stats.fragmented_orfs, 2);
        assert_eq!(report.stats.pseudogenes_short, 1);
        assert_eq!(report.stats.pseudogenes_fragmented, 1);
    }

    #[test]
    fn test_two_hit_region_still_merges() {
        // Short enough to be flagged, but only two hits: no length check, still fusable
        let regions = vec![
            Region::new("C1", "q1", 100, 130, Strand::Forward, hits(&["a", "b"], 3000)),
            Region::new("C1", "q2", 200, 260, Strand::Forward, hits(&["a", "b"], 3000)),
        ];
        let report = annotate_contig(&Contig::new("C1", regions), &DetectionConfig::default());
        assert_eq!(report.stats.pseudogenes_short, 0);
        assert_eq!(report.stats.pseudogenes_fragmented, 1);
    }

    #[test]
    fn test_detect_pseudogenes_sums_contigs() {
        let regions = vec![
            Region::new("B", "q1", 100, 400, Strand::Forward, hits(&["a", "b"], 900)),
            Region::new("B", "q2", 450, 700, Strand::Forward, hits(&["a", "b"], 900)),
            Region::new("A", "q3", 100, 150, Strand::Forward, hits(&["c", "d", "e"], 900)),
            Region::new("A", "q4", 5000, 5900, Strand::Forward, hits(&["f", "g", "h"], 900)),
        ];

        let result = detect_pseudogenes(regions, 6, &DetectionConfig::default());

        assert_eq!(result.stats.input_orfs, 6);
        assert_eq!(result.stats.contigs, 2);
        assert_eq!(result.contigs[0].contig, "A");
        assert_eq!(result.contigs[1].contig, "B");
        assert_eq!(result.stats.pseudogenes_short, 1);
        assert_eq!(result.stats.pseudogenes_fragmented, 1);
        assert_eq!(result.stats.pseudogenes_total, 2);
        assert_eq!(result.stats.fragmented_orfs, 2);
        assert_eq!(result.stats.functional_genes(), 3);
        assert_eq!(result.candidates().count(), 2);
    }
}
