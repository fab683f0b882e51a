use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::region::{PseudoReason, Region};
use crate::core::types::SearchKind;
use crate::detection::{detect_pseudogenes, DetectionConfig, DetectionResult};
use crate::output::gff::write_gff;
use crate::output::summary::RunSummary;
use crate::output::current_timestamp;
use crate::parsing::blast_report::parse_report_file;
use crate::utils::validation::validate_output_prefix;

#[derive(Args)]
pub struct AnnotateArgs {
    /// BLASTP report for the predicted ORFs (outfmt 7, optionally gzipped)
    #[arg(long, required = true)]
    pub blastp: PathBuf,

    /// BLASTX report for the intergenic regions (outfmt 7, optionally gzipped)
    #[arg(long)]
    pub blastx: Option<PathBuf>,

    /// Prefix for the output files (<PREFIX>_pseudos.gff, <PREFIX>_log.txt)
    #[arg(short, long, default_value = "pseudofinder")]
    pub output: String,

    /// Flag ORFs shorter than this fraction of the mean length of their hits
    /// (default 0.60)
    #[arg(long)]
    pub length_pseudo: Option<f64>,

    /// Fraction of hits two neighbouring ORFs must share to be fused
    /// (default 0.30)
    #[arg(long)]
    pub shared_hits: Option<f64>,

    /// JSON file with detection cutoffs; command-line flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Paths written by a run
struct OutputFiles {
    gff: PathBuf,
    log: PathBuf,
}

impl OutputFiles {
    fn from_prefix(prefix: &str) -> Self {
        Self {
            gff: PathBuf::from(format!("{prefix}_pseudos.gff")),
            log: PathBuf::from(format!("{prefix}_log.txt")),
        }
    }
}

/// Execute annotate subcommand
///
/// # Errors
///
/// Returns an error if the settings are invalid, a report cannot be parsed,
/// or an output file cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AnnotateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let prefix = validate_output_prefix(&args.output)?;
    let outputs = OutputFiles::from_prefix(prefix);

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let proteome = parse_report_file(&args.blastp, SearchKind::Blastp)
        .with_context(|| format!("Failed to parse {}", args.blastp.display()))?;
    let input_orfs = proteome.query_ids.len();

    if verbose {
        eprintln!(
            "Parsed {} ORFs with hits from {input_orfs} queries ({} without hits)",
            proteome.regions.len(),
            proteome.queries_without_hits()
        );
    }

    let mut regions = proteome.regions;
    if let Some(path) = &args.blastx {
        let intergenic = parse_report_file(path, SearchKind::Blastx)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if verbose {
            eprintln!(
                "Parsed {} intergenic regions with hits",
                intergenic.regions.len()
            );
        }
        regions.extend(intergenic.regions);
    }

    let result = detect_pseudogenes(regions, input_orfs, &config);

    let timestamp = current_timestamp();
    write_gff_file(&outputs.gff, &result, &timestamp)?;
    let summary = RunSummary {
        timestamp,
        blastp: args.blastp.clone(),
        blastx: args.blastx.clone(),
        config: config.clone(),
        stats: result.stats,
    };
    std::fs::write(&outputs.log, summary.to_string())
        .with_context(|| format!("Failed to write {}", outputs.log.display()))?;

    if verbose {
        eprintln!("Wrote {}", outputs.gff.display());
        eprintln!("Wrote {}", outputs.log.display());
    }

    match format {
        OutputFormat::Text => print_text_results(&result, &outputs),
        OutputFormat::Json => print_json_results(&result, &config, &outputs)?,
        OutputFormat::Tsv => print_tsv_results(&result),
    }

    Ok(())
}

/// Config file (if any), then command-line overrides, then validation
fn resolve_config(args: &AnnotateArgs) -> anyhow::Result<DetectionConfig> {
    let mut config = match &args.config {
        Some(path) => DetectionConfig::read_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DetectionConfig::default(),
    };

    if let Some(length_pseudo) = args.length_pseudo {
        config.length_cutoff = length_pseudo;
    }
    if let Some(shared_hits) = args.shared_hits {
        config.shared_hits_cutoff = shared_hits;
    }

    config.validate()?;
    Ok(config)
}

fn write_gff_file(path: &Path, result: &DetectionResult, timestamp: &str) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_gff(&mut out, result.candidates(), timestamp)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn reason_kind(region: &Region) -> &'static str {
    match region.annotation.reason {
        Some(PseudoReason::Truncated { .. }) => "truncated",
        Some(PseudoReason::Fragmented) => "fragmented",
        None => "none",
    }
}

fn print_text_results(result: &DetectionResult, outputs: &OutputFiles) {
    let stats = &result.stats;

    println!(
        "Pseudogene candidates: {} ({} too short, {} fragmented)",
        stats.pseudogenes_total, stats.pseudogenes_short, stats.pseudogenes_fragmented
    );

    for region in result.candidates() {
        let tag = region.annotation.locus_tag.as_deref().unwrap_or("-");
        println!(
            "\n   {tag}  {}:{}-{} ({})",
            region.contig, region.start, region.end, region.strand
        );
        if let Some(reason) = &region.annotation.reason {
            println!("      {reason}");
        }
        println!("      Hits: {}", region.hits.len());
    }

    println!("\nStatistics:");
    println!("   Initial ORFs:        {}", stats.input_orfs);
    println!("   Contigs:             {}", stats.contigs);
    println!("   ORFs joined:         {}", stats.fragmented_orfs);
    println!("   Functional genes:    {}", stats.functional_genes());

    println!("\nOutput:");
    println!("   GFF:     {}", outputs.gff.display());
    println!("   Summary: {}", outputs.log.display());
}

fn print_json_results(
    result: &DetectionResult,
    config: &DetectionConfig,
    outputs: &OutputFiles,
) -> anyhow::Result<()> {
    let candidates: Vec<serde_json::Value> = result
        .candidates()
        .map(|r| {
            let percent_of_hits = match r.annotation.reason {
                Some(PseudoReason::Truncated { percent_of_hits }) => Some(percent_of_hits),
                _ => None,
            };
            serde_json::json!({
                "locus_tag": r.annotation.locus_tag,
                "contig": r.contig,
                "start": r.start,
                "end": r.end,
                "strand": r.strand.to_string(),
                "kind": reason_kind(r),
                "percent_of_hits": percent_of_hits,
                "note": r.annotation.to_string(),
                "hits": r.hits.len(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "settings": config,
        "statistics": {
            "input_orfs": result.stats.input_orfs,
            "contigs": result.stats.contigs,
            "fragmented_orfs": result.stats.fragmented_orfs,
            "pseudogenes_total": result.stats.pseudogenes_total,
            "pseudogenes_short": result.stats.pseudogenes_short,
            "pseudogenes_fragmented": result.stats.pseudogenes_fragmented,
            "functional_genes": result.stats.functional_genes(),
        },
        "candidates": candidates,
        "outputs": {
            "gff": outputs.gff.display().to_string(),
            "summary": outputs.log.display().to_string(),
        },
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_results(result: &DetectionResult) {
    println!("locus_tag\tcontig\tstart\tend\tstrand\tkind\tpercent_of_hits\thits");
    for r in result.candidates() {
        let percent_of_hits = match r.annotation.reason {
            Some(PseudoReason::Truncated { percent_of_hits }) => format!("{percent_of_hits:.1}"),
            _ => String::new(),
        };
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{percent_of_hits}\t{}",
            r.annotation.locus_tag.as_deref().unwrap_or(""),
            r.contig,
            r.start,
            r.end,
            r.strand,
            reason_kind(r),
            r.hits.len()
        );
    }
}
