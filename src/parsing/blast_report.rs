//! Parser for BLAST tabular reports with comment lines (`-outfmt 7`).
//!
//! The report is expected to be produced with the field list
//! `qseqid sseqid pident length mismatch gapopen qstart qend sstart send slen evalue bitscore`
//! and query deflines of the form `<id> <contig> [<start>:<end>](<strand>)`, so
//! every query block looks like:
//!
//! ```text
//! # BLASTP 2.6.0+
//! # Query: COGCCIIJ_00002 COGCCIIJ_1 [250:826](+)
//! # Database: swissprot
//! # Fields: query acc.ver, subject acc.ver, % identity, ...
//! # 2 hits found
//! COGCCIIJ_00002	sp|P86052|CYC4_THIRO	47.929	169	81	5	61	225	25	190	192	1.33e-40	140
//! COGCCIIJ_00002	sp|P25938|C554_HALNE	32.632	95	45	3	41	125	3	88	91	8.85e-05	43.5
//! ```
//!
//! Queries are processed strictly in the order their `# Query:` lines appear.
//! A query whose block reports `# 0 hits found` is dropped; a query with hits
//! ends at the first comment line following one of its hit rows.

use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::contig::resolve_window_coordinates;
use crate::core::hit::Hit;
use crate::core::region::Region;
use crate::core::types::{SearchKind, Strand};
use crate::utils::validation::{check_query_limit, MAX_QUERIES};

const QUERY_PREFIX: &str = "# Query:";
const ZERO_HITS_PREFIX: &str = "# 0 hits found";

/// Minimum number of fields in a hit row (bitscore may be missing)
const MIN_HIT_FIELDS: usize = 12;

// Column positions in a hit row
const COL_ACCESSION: usize = 1;
const COL_SSTART: usize = 8;
const COL_SEND: usize = 9;
const COL_SLEN: usize = 10;
const COL_EVALUE: usize = 11;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid BLAST report format: {0}")]
    InvalidFormat(String),

    #[error("Line {line}: expected '# Query:' for '{expected}' but found '{found}'")]
    QueryOrder {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("Line {line}: hit row for unexpected query '{found}'")]
    UnexpectedQuery { line: usize, found: String },

    #[error("Line {line}: hit row for '{query}' appears before its '# Query:' line")]
    MissingHeader { line: usize, query: String },

    #[error("Too many queries: {0} exceeds maximum allowed ({max})", max = MAX_QUERIES)]
    TooManyQueries(usize),
}

/// Regions recovered from one report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedReport {
    pub kind: SearchKind,

    /// Every query declared in the report, in order, with or without hits
    pub query_ids: Vec<String>,

    /// One region per query that received at least one hit
    pub regions: Vec<Region>,
}

impl ParsedReport {
    /// Number of queries that were dropped because they had no hits
    #[must_use]
    pub fn queries_without_hits(&self) -> usize {
        self.query_ids.len().saturating_sub(self.regions.len())
    }
}

/// Coordinate record established by a `# Query:` line
#[derive(Debug, Clone, PartialEq, Eq)]
struct QueryLine<'a> {
    id: &'a str,
    contig: &'a str,
    start: u64,
    end: u64,
    strand: Strand,
}

/// A query whose header has been read and whose hits are being collected
#[derive(Debug)]
struct PendingQuery {
    id: String,
    contig: String,
    start: u64,
    end: u64,
    strand: Strand,
    hits: Vec<Hit>,
}

impl PendingQuery {
    fn into_region(self, kind: SearchKind) -> Result<Option<Region>, ParseError> {
        if self.hits.is_empty() {
            return Ok(None);
        }

        let (start, end) = if kind.is_window_relative() {
            resolve_window_coordinates(self.start, &self.hits).ok_or_else(|| {
                ParseError::InvalidFormat(format!(
                    "Hit coordinates of query '{}' overflow window starting at {}",
                    self.id, self.start
                ))
            })?
        } else {
            (self.start, self.end)
        };

        Ok(Some(Region::new(
            self.contig,
            self.id,
            start,
            end,
            self.strand,
            self.hits,
        )))
    }
}

/// Line-driven state machine over a report
struct ReportParser<'a> {
    query_ids: &'a [String],
    kind: SearchKind,
    /// Index of the query currently expected
    index: usize,
    pending: Option<PendingQuery>,
    /// Whether the previous non-blank line was a hit row
    after_hit_row: bool,
    regions: Vec<Region>,
}

impl<'a> ReportParser<'a> {
    fn new(query_ids: &'a [String], kind: SearchKind) -> Self {
        Self {
            query_ids,
            kind,
            index: 0,
            pending: None,
            after_hit_row: false,
            regions: Vec::new(),
        }
    }

    fn expected_id(&self) -> Option<&'a str> {
        self.query_ids.get(self.index).map(String::as_str)
    }

    fn feed(&mut self, line_num: usize, line: &str) -> Result<(), ParseError> {
        let line = line.trim_end();
        if line.trim().is_empty() {
            return Ok(());
        }

        if line.starts_with('#') {
            if self.after_hit_row {
                self.finish_query()?;
            }
            self.after_hit_row = false;

            if line.starts_with(QUERY_PREFIX) {
                self.read_query_line(line_num, line)?;
            } else if line.starts_with(ZERO_HITS_PREFIX) {
                if let Some(id) = self.expected_id() {
                    debug!("Query {id} has no hits, skipping");
                }
                self.pending = None;
                self.index += 1;
            }
            return Ok(());
        }

        self.read_hit_row(line_num, line)?;
        self.after_hit_row = true;
        Ok(())
    }

    fn read_query_line(&mut self, line_num: usize, line: &str) -> Result<(), ParseError> {
        let header = parse_query_line(line).ok_or_else(|| {
            ParseError::InvalidFormat(format!("Line {line_num}: malformed query line '{line}'"))
        })?;

        let expected = self.expected_id().ok_or_else(|| ParseError::UnexpectedQuery {
            line: line_num,
            found: header.id.to_string(),
        })?;

        if header.id != expected {
            return Err(ParseError::QueryOrder {
                line: line_num,
                expected: expected.to_string(),
                found: header.id.to_string(),
            });
        }

        // A repeated header for the same query only refreshes its coordinates
        let hits = self.pending.take().map(|p| p.hits).unwrap_or_default();
        self.pending = Some(PendingQuery {
            id: header.id.to_string(),
            contig: header.contig.to_string(),
            start: header.start,
            end: header.end,
            strand: header.strand,
            hits,
        });
        Ok(())
    }

    fn read_hit_row(&mut self, line_num: usize, line: &str) -> Result<(), ParseError> {
        let fields = split_fields(line);
        let found = fields.first().copied().unwrap_or_default();

        if self.expected_id() != Some(found) {
            return Err(ParseError::UnexpectedQuery {
                line: line_num,
                found: found.to_string(),
            });
        }

        let hit = parse_hit(&fields, self.kind.target_length_scale(), line_num)?;

        let pending = self
            .pending
            .as_mut()
            .ok_or_else(|| ParseError::MissingHeader {
                line: line_num,
                query: found.to_string(),
            })?;
        pending.hits.push(hit);
        Ok(())
    }

    /// Close the current query and move on to the next one
    fn finish_query(&mut self) -> Result<(), ParseError> {
        self.emit_pending()?;
        self.index += 1;
        Ok(())
    }

    fn emit_pending(&mut self) -> Result<(), ParseError> {
        if let Some(pending) = self.pending.take() {
            if let Some(region) = pending.into_region(self.kind)? {
                self.regions.push(region);
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Region>, ParseError> {
        self.emit_pending()?;
        Ok(self.regions)
    }
}

fn is_field_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '[' | ']' | ':' | '(' | ')')
}

/// Split a line on whitespace, brackets, colons and parentheses, dropping empty fields
fn split_fields(line: &str) -> Vec<&str> {
    line.split(is_field_delimiter)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a coordinate block such as `[115:223](+)` or `115-223 +`.
///
/// A hyphen directly after a digit separates start from end; any other
/// hyphen is kept so a `-` strand survives.
fn split_coordinate_fields(text: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut field_start = 0;
    let mut prev: Option<char> = None;

    for (idx, c) in text.char_indices() {
        let range_hyphen = c == '-' && prev.is_some_and(|p| p.is_ascii_digit());
        if is_field_delimiter(c) || range_hyphen {
            if idx > field_start {
                fields.push(&text[field_start..idx]);
            }
            field_start = idx + c.len_utf8();
        }
        prev = Some(c);
    }
    if field_start < text.len() {
        fields.push(&text[field_start..]);
    }

    fields
}

/// Identifier declared by a `# Query:` line
fn query_line_id(line: &str) -> Option<&str> {
    line.strip_prefix(QUERY_PREFIX)?.split_whitespace().next()
}

/// Parse `# Query: <id> <contig> [<start>:<end>](<strand>)`
fn parse_query_line(line: &str) -> Option<QueryLine<'_>> {
    let body = line.strip_prefix(QUERY_PREFIX)?.trim();
    let (id, rest) = body.split_once(char::is_whitespace)?;
    let (contig, coordinates) = rest.trim_start().split_once(char::is_whitespace)?;

    let fields = split_coordinate_fields(coordinates);
    let [start, end, strand, ..] = fields.as_slice() else {
        return None;
    };

    Some(QueryLine {
        id,
        contig,
        start: start.parse().ok()?,
        end: end.parse().ok()?,
        strand: Strand::parse(strand)?,
    })
}

fn parse_hit(fields: &[&str], length_scale: u64, line_num: usize) -> Result<Hit, ParseError> {
    if fields.len() < MIN_HIT_FIELDS {
        return Err(ParseError::InvalidFormat(format!(
            "Line {line_num} has {} fields, expected at least {MIN_HIT_FIELDS}",
            fields.len()
        )));
    }

    let parse_u64 = |col: usize, name: &str| -> Result<u64, ParseError> {
        fields[col].parse().map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid {name} on line {line_num}: '{}'",
                fields[col]
            ))
        })
    };

    let evalue: f64 = fields[COL_EVALUE].parse().map_err(|_| {
        ParseError::InvalidFormat(format!(
            "Invalid evalue on line {line_num}: '{}'",
            fields[COL_EVALUE]
        ))
    })?;
    if evalue.is_nan() || evalue < 0.0 {
        return Err(ParseError::InvalidFormat(format!(
            "Negative or NaN evalue on line {line_num}: '{}'",
            fields[COL_EVALUE]
        )));
    }

    let target_length = parse_u64(COL_SLEN, "slen")?
        .checked_mul(length_scale)
        .ok_or_else(|| {
            ParseError::InvalidFormat(format!(
                "slen on line {line_num} is too large: '{}'",
                fields[COL_SLEN]
            ))
        })?;

    Ok(Hit::new(
        fields[COL_ACCESSION],
        target_length,
        parse_u64(COL_SSTART, "sstart")?,
        parse_u64(COL_SEND, "send")?,
        evalue,
    ))
}

/// Collect the identifiers of every `# Query:` line, in order
pub fn collect_query_ids(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(query_line_id)
        .map(str::to_string)
        .collect()
}

/// Parse report text into regions with hits
///
/// # Errors
///
/// Returns `ParseError::QueryOrder` or `ParseError::UnexpectedQuery` when the
/// report does not follow its own query order, `ParseError::MissingHeader` when
/// hit rows precede their query line, `ParseError::InvalidFormat` for malformed
/// lines or a report without queries, and `ParseError::TooManyQueries` if the
/// limit is exceeded.
pub fn parse_report_text(text: &str, kind: SearchKind) -> Result<ParsedReport, ParseError> {
    let query_ids = collect_query_ids(text);

    if query_ids.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No '# Query:' lines found in report".to_string(),
        ));
    }
    if check_query_limit(query_ids.len()).is_some() {
        return Err(ParseError::TooManyQueries(query_ids.len()));
    }

    let mut parser = ReportParser::new(&query_ids, kind);
    for (i, line) in text.lines().enumerate() {
        // Line numbers in errors are 1-based
        parser.feed(i + 1, line)?;
    }
    let regions = parser.finish()?;

    info!(
        "Extracted {} regions with hits from {} {kind} queries",
        regions.len(),
        query_ids.len()
    );

    Ok(ParsedReport {
        kind,
        query_ids,
        regions,
    })
}

/// Parse a report file, transparently decompressing `.gz` input
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or any error from
/// [`parse_report_text`].
pub fn parse_report_file(path: &Path, kind: SearchKind) -> Result<ParsedReport, ParseError> {
    info!("Extracting information from {kind} file {}", path.display());

    let text = if is_gzipped(path) {
        let mut decoder = GzDecoder::new(std::fs::File::open(path)?);
        let mut text = String::new();
        decoder.read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(path)?
    };

    parse_report_text(&text, kind)
}

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "# BLASTP 2.6.0+
# Query: Q1 C1 [100:400](+)
# Database: swissprot
# Fields: query acc.ver, subject acc.ver, % identity, alignment length, mismatches, gap opens, q. start, q. end, s. start, s. end, subject length, evalue, bit score
# 2 hits found
Q1\tsp|P1|A\t47.9\t169\t81\t5\t61\t225\t25\t190\t192\t1.33e-40\t140
Q1\tsp|P2|B\t32.6\t95\t45\t3\t41\t125\t3\t88\t91\t8.85e-05\t43.5
# BLASTP 2.6.0+
# Query: Q2 C1 [500:900](-)
# Database: swissprot
# 0 hits found
# BLASTP 2.6.0+
# Query: Q3 C2 [10:310](-)
# Database: swissprot
# Fields: query acc.ver, subject acc.ver
# 1 hits found
Q3\tsp|P3|C\t60.0\t100\t40\t0\t1\t100\t1\t100\t120\t2e-30\t99.1
# BLAST processed 3 queries
";

    #[test]
    fn test_collect_query_ids() {
        assert_eq!(collect_query_ids(REPORT), vec!["Q1", "Q2", "Q3"]);
    }

    #[test]
    fn test_parse_report() {
        let report = parse_report_text(REPORT, SearchKind::Blastp).unwrap();
        assert_eq!(report.query_ids.len(), 3);
        assert_eq!(report.regions.len(), 2);
        assert_eq!(report.queries_without_hits(), 1);

        let q1 = &report.regions[0];
        assert_eq!(q1.query, "Q1");
        assert_eq!(q1.contig, "C1");
        assert_eq!((q1.start, q1.end), (100, 400));
        assert_eq!(q1.strand, Strand::Forward);
        assert_eq!(q1.hits.len(), 2);
        assert_eq!(q1.hits[0].accession, "sp|P1|A");
        assert_eq!(q1.hits[0].target_length, 192 * 3);
        assert_eq!(q1.hits[0].target_start, 25);
        assert_eq!(q1.hits[0].target_end, 190);
        assert!((q1.hits[0].evalue - 1.33e-40).abs() < 1e-45);

        let q3 = &report.regions[1];
        assert_eq!(q3.query, "Q3");
        assert_eq!(q3.strand, Strand::Reverse);
        assert_eq!(q3.hits.len(), 1);
    }

    #[test]
    fn test_zero_hit_query_omitted() {
        let report = parse_report_text(REPORT, SearchKind::Blastp).unwrap();
        assert!(report.regions.iter().all(|r| r.query != "Q2"));
    }

    #[test]
    fn test_nucleotide_search_not_scaled() {
        let report = parse_report_text(REPORT, SearchKind::Blastn).unwrap();
        assert_eq!(report.regions[0].hits[0].target_length, 192);
    }

    #[test]
    fn test_round_trip_counts() {
        let mut text = String::new();
        let mut with_hits = 0;
        for i in 0..20 {
            text.push_str("# BLASTP 2.6.0+\n");
            text.push_str(&format!("# Query: q{i} ctg{} [{}:{}](+)\n", i % 3, i * 1000, i * 1000 + 600));
            if i % 4 == 0 {
                text.push_str("# 0 hits found\n");
            } else {
                with_hits += 1;
                text.push_str(&format!("# {} hits found\n", i % 5 + 1));
                for h in 0..(i % 5 + 1) {
                    text.push_str(&format!(
                        "q{i}\tacc{h}\t50.0\t100\t50\t0\t1\t100\t1\t100\t300\t1e-{}\t80\n",
                        h + 5
                    ));
                }
            }
        }
        text.push_str("# BLAST processed 20 queries\n");

        let report = parse_report_text(&text, SearchKind::Blastp).unwrap();
        assert_eq!(report.query_ids.len(), 20);
        assert_eq!(report.regions.len(), with_hits);
        for region in &report.regions {
            let i: usize = region.query[1..].parse().unwrap();
            assert_eq!(region.contig, format!("ctg{}", i % 3));
            assert_eq!(region.start, (i * 1000) as u64);
            assert_eq!(region.end, (i * 1000 + 600) as u64);
            assert_eq!(region.hits.len(), i % 5 + 1);
        }
    }

    #[test]
    fn test_last_query_without_trailer_is_emitted() {
        let text = "# Query: Q1 C1 [1:301](+)\nQ1\tacc\t50\t1\t1\t1\t1\t1\t1\t100\t100\t1e-5\t50\n";
        let report = parse_report_text(text, SearchKind::Blastp).unwrap();
        assert_eq!(report.regions.len(), 1);
        assert_eq!(report.regions[0].hits.len(), 1);
    }

    #[test]
    fn test_first_line_comment_is_not_end_of_hits() {
        let text = "# BLASTP 2.6.0+\n# Query: Q1 C1 [1:301](+)\n# 1 hits found\nQ1\tacc\t50\t1\t1\t1\t1\t1\t1\t100\t100\t1e-5\t50\n";
        let report = parse_report_text(text, SearchKind::Blastp).unwrap();
        assert_eq!(report.regions.len(), 1);
        assert_eq!(report.regions[0].query, "Q1");
    }

    #[test]
    fn test_hit_row_for_wrong_query_is_error() {
        let text = "# Query: Q1 C1 [1:301](+)\n# Query: Q2 C1 [400:700](+)\nQ2\tacc\t50\t1\t1\t1\t1\t1\t1\t100\t100\t1e-5\t50\n";
        let err = parse_report_text(text, SearchKind::Blastp).unwrap_err();
        assert!(matches!(err, ParseError::QueryOrder { line: 2, .. }));
    }

    #[test]
    fn test_unrecognised_query_rows_are_error() {
        let text = "# Query: Q1 C1 [1:301](+)\nQX\tacc\t50\t1\t1\t1\t1\t1\t1\t100\t100\t1e-5\t50\n";
        let err = parse_report_text(text, SearchKind::Blastp).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedQuery { line: 2, .. }));
    }

    #[test]
    fn test_malformed_hit_row() {
        let text = "# Query: Q1 C1 [1:301](+)\nQ1\tacc\t50\t1\t1\t1\t1\t1\tx\t100\t100\t1e-5\t50\n";
        let err = parse_report_text(text, SearchKind::Blastp).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));
    }

    #[test]
    fn test_no_queries_is_error() {
        assert!(parse_report_text("# BLASTP 2.6.0+\n", SearchKind::Blastp).is_err());
    }

    #[test]
    fn test_window_relative_coordinates() {
        let text = "# BLASTX 2.6.0+
# Query: C1_ign_1 C1 1000-2000 +
# 2 hits found
C1_ign_1\tacc1\t50\t1\t1\t1\t1\t1\t20\t150\t100\t1e-5\t50
C1_ign_1\tacc2\t50\t1\t1\t1\t1\t1\t10\t120\t100\t1e-4\t50
# BLAST processed 1 queries
";
        let report = parse_report_text(text, SearchKind::Blastx).unwrap();
        let region = &report.regions[0];
        assert_eq!((region.start, region.end), (1011, 1151));
        assert_eq!(region.strand, Strand::Forward);
    }

    #[test]
    fn test_parse_query_line_forms() {
        let bracketed = parse_query_line("# Query: COGCCIIJ_00001 COGCCIIJ_1 [115:223](-)").unwrap();
        assert_eq!(bracketed.id, "COGCCIIJ_00001");
        assert_eq!(bracketed.contig, "COGCCIIJ_1");
        assert_eq!((bracketed.start, bracketed.end), (115, 223));
        assert_eq!(bracketed.strand, Strand::Reverse);

        let ranged = parse_query_line("# Query: c_ign_3 c 31-90 -").unwrap();
        assert_eq!((ranged.start, ranged.end), (31, 90));
        assert_eq!(ranged.strand, Strand::Reverse);

        assert!(parse_query_line("# Query: lonely").is_none());
    }

    #[test]
    fn test_repeated_query_line_refreshes_coordinates() {
        let text = "# Query: Q1 C1 [1:301](+)\n\
                    # Query: Q1 C1 [5:400](-)\n\
                    # 1 hits found\n\
                    Q1\tacc\t50\t1\t1\t1\t1\t1\t1\t100\t100\t1e-5\t50\n";
        let report = parse_report_text(text, SearchKind::Blastp).unwrap();
        assert_eq!(report.regions.len(), 1);
        let region = &report.regions[0];
        assert_eq!((region.start, region.end), (5, 400));
        assert_eq!(region.strand, Strand::Reverse);
        assert_eq!(region.hits.len(), 1);
    }

    #[test]
    fn test_hit_row_before_its_query_line() {
        let text = "# Query: Q1 C1 [1:301](+)\n\
                    # 0 hits found\n\
                    Q2\tacc\t50\t1\t1\t1\t1\t1\t1\t100\t100\t1e-5\t50\n\
                    # Query: Q2 C1 [400:700](+)\n";
        let err = parse_report_text(text, SearchKind::Blastp).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingHeader { line: 3, ref query } if query == "Q2"
        ));
    }

    #[test]
    fn test_too_many_queries() {
        let text = "# Query: q c [1:2](+)\n".repeat(MAX_QUERIES + 1);
        let err = parse_report_text(&text, SearchKind::Blastp).unwrap_err();
        assert!(matches!(err, ParseError::TooManyQueries(n) if n == MAX_QUERIES + 1));
        assert!(err.to_string().contains(&MAX_QUERIES.to_string()));
    }

    #[test]
    fn test_oversized_slen_is_invalid_format() {
        let text = "# Query: Q1 C1 [1:301](+)\n\
                    Q1\tacc\t50\t1\t1\t1\t1\t1\t1\t100\t7000000000000000000\t1e-5\t50\n";
        let err = parse_report_text(text, SearchKind::Blastp).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(ref msg) if msg.contains("slen")));

        // Unscaled nucleotide lengths still fit
        let report = parse_report_text(text, SearchKind::Blastn).unwrap();
        assert_eq!(report.regions[0].hits[0].target_length, 7_000_000_000_000_000_000);
    }

    #[test]
    fn test_window_overflow_is_invalid_format() {
        let text = "# Query: W1 C1 [18446744073709551000:18446744073709551600](+)\n\
                    W1\tacc\t50\t1\t1\t1\t1\t1\t1000\t1200\t100\t1e-5\t50\n";
        let err = parse_report_text(text, SearchKind::Blastx).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(ref msg) if msg.contains("W1")));
    }
}
