use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::hit::Hit;
use crate::core::region::Region;
use crate::core::types::SearchKind;
use crate::parsing::blast_report::{parse_report_file, ParsedReport};

#[derive(Args)]
pub struct RegionsArgs {
    /// BLAST report (outfmt 7, optionally gzipped)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Search program that produced the report
    #[arg(short, long, value_enum, default_value = "blastp")]
    pub kind: SearchKind,
}

/// Execute regions subcommand
///
/// # Errors
///
/// Returns an error if the report cannot be read or parsed.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RegionsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let report = parse_report_file(&args.input, args.kind)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;

    if verbose {
        eprintln!(
            "{} queries, {} with hits, {} without",
            report.query_ids.len(),
            report.regions.len(),
            report.queries_without_hits()
        );
    }

    match format {
        OutputFormat::Text => print_text_results(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Tsv => print_tsv_results(&report),
    }

    Ok(())
}

fn best_hit(region: &Region) -> Option<&Hit> {
    region
        .hits
        .iter()
        .min_by(|a, b| a.evalue.total_cmp(&b.evalue))
}

fn print_text_results(report: &ParsedReport) {
    println!(
        "{} report: {} queries, {} regions with hits",
        report.kind,
        report.query_ids.len(),
        report.regions.len()
    );

    for region in &report.regions {
        println!(
            "\n   {}  {}:{}-{} ({})",
            region.query, region.contig, region.start, region.end, region.strand
        );
        if let Some(best) = best_hit(region) {
            println!(
                "      {} hits, best {} (e-value {:e}, length {})",
                region.hits.len(),
                best.accession,
                best.evalue,
                best.target_length
            );
        }
    }
}

fn print_tsv_results(report: &ParsedReport) {
    println!("query\tcontig\tstart\tend\tstrand\thits\tbest_hit\tbest_evalue");
    for region in &report.regions {
        let (accession, evalue) = best_hit(region)
            .map(|h| (h.accession.as_str(), format!("{:e}", h.evalue)))
            .unwrap_or_default();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{accession}\t{evalue}",
            region.query,
            region.contig,
            region.start,
            region.end,
            region.strand,
            region.hits.len()
        );
    }
}
