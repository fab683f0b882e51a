use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A single database match of a region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    /// Subject accession (sseqid)
    pub accession: String,

    /// Subject length in nucleotides (slen, scaled for protein databases)
    pub target_length: u64,

    /// Alignment start on the subject (sstart)
    pub target_start: u64,

    /// Alignment end on the subject (send)
    pub target_end: u64,

    /// Expect value
    pub evalue: f64,
}

impl Hit {
    pub fn new(
        accession: impl Into<String>,
        target_length: u64,
        target_start: u64,
        target_end: u64,
        evalue: f64,
    ) -> Self {
        Self {
            accession: accession.into(),
            target_length,
            target_start,
            target_end,
            evalue,
        }
    }
}

// Structural equality; e-values compare by bit pattern so identical report
// rows dedupe and `Eq`/`Hash` stay consistent.
impl PartialEq for Hit {
    fn eq(&self, other: &Self) -> bool {
        self.accession == other.accession
            && self.target_length == other.target_length
            && self.target_start == other.target_start
            && self.target_end == other.target_end
            && self.evalue.to_bits() == other.evalue.to_bits()
    }
}

impl Eq for Hit {}

impl Hash for Hit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.accession.hash(state);
        self.target_length.hash(state);
        self.target_start.hash(state);
        self.target_end.hash(state);
        self.evalue.to_bits().hash(state);
    }
}

/// Sort hits by e-value, best (lowest) first
pub fn sort_hits_by_evalue(hits: &mut [Hit]) {
    hits.sort_by(|a, b| a.evalue.total_cmp(&b.evalue));
}
