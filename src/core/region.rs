use serde::{Deserialize, Serialize};

use crate::core::hit::Hit;
use crate::core::types::Strand;

/// Query name given to regions created by the detector until a locus tag is assigned
pub const PLACEHOLDER_QUERY: &str = "locus_tag=pseudo_uniqueID";

/// Artemis colour attribute appended to every candidate
const CANDIDATE_COLOUR: &str = "colour=229 204 255";

/// Why a region was flagged as a pseudogene candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PseudoReason {
    /// ORF is short relative to the mean length of its hits
    Truncated {
        /// Region length as a percentage of the mean hit length, one decimal
        percent_of_hits: f64,
    },
    /// Adjacent ORFs merged into a single interrupted gene
    Fragmented,
}

impl std::fmt::Display for PseudoReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated { percent_of_hits } => write!(
                f,
                "ORF is {percent_of_hits:.1}% of the average length of hits to this gene."
            ),
            Self::Fragmented => write!(f, "Predicted fragmentation of a single gene."),
        }
    }
}

/// Structured note attached to a region, rendered as GFF attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<PseudoReason>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locus_tag: Option<String>,
}

impl Annotation {
    #[must_use]
    pub fn flagged(reason: PseudoReason) -> Self {
        Self {
            reason: Some(reason),
            locus_tag: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reason.is_none() && self.locus_tag.is_none()
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(reason) = &self.reason {
            parts.push(format!("Note=pseudogene candidate. Reason: {reason}"));
            parts.push(CANDIDATE_COLOUR.to_string());
        }
        if let Some(tag) = &self.locus_tag {
            parts.push(format!("locus_tag={tag}"));
        }
        write!(f, "{}", parts.join(";"))
    }
}

/// A predicted ORF or intergenic window together with its BLAST hits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub contig: String,
    pub query: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub hits: Vec<Hit>,
    #[serde(default, skip_serializing_if = "Annotation::is_empty")]
    pub annotation: Annotation,
}

impl Region {
    pub fn new(
        contig: impl Into<String>,
        query: impl Into<String>,
        start: u64,
        end: u64,
        strand: Strand,
        hits: Vec<Hit>,
    ) -> Self {
        Self {
            contig: contig.into(),
            query: query.into(),
            start,
            end,
            strand,
            hits,
            annotation: Annotation::default(),
        }
    }

    /// Length of the region regardless of coordinate orientation
    #[must_use]
    pub fn span(&self) -> u64 {
        self.end.abs_diff(self.start)
    }

    /// Copy of this region flagged with the given reason
    #[must_use]
    pub fn flagged_as(&self, reason: PseudoReason) -> Self {
        Self {
            query: PLACEHOLDER_QUERY.to_string(),
            annotation: Annotation::flagged(reason),
            ..self.clone()
        }
    }

    /// Copy of this region carrying a locus tag
    #[must_use]
    pub fn with_locus_tag(&self, tag: impl Into<String>) -> Self {
        let mut tagged = self.clone();
        tagged.annotation.locus_tag = Some(tag.into());
        tagged
    }

    #[must_use]
    pub fn is_truncated_candidate(&self) -> bool {
        matches!(self.annotation.reason, Some(PseudoReason::Truncated { .. }))
    }

    #[must_use]
    pub fn is_fragmentation_product(&self) -> bool {
        matches!(self.annotation.reason, Some(PseudoReason::Fragmented))
    }
}
