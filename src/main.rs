//! # gencode-gtf
//!
//! Decode GENCODE GTF files into gene trees and write them back out.
//!
//! ## Features
//!
//! - Validates the five-line GENCODE header
//! - Detects the attribute schema (hg19 legacy or hg38 current) from the first gene
//! - Assembles gene > transcript > exon > CDS/codon trees, with UTRs and
//!   Selenocysteines attached to their transcript
//! - Re-serializes every gene with attributes in canonical order
//! - Reads plain and gzip-compressed input, several files in parallel
//!
//! ## Usage
//!
//! ```bash
//! gencode-gtf -i <GTF>[,<GTF>...] [OPTIONS]
//!
//! Required arguments:
//!   -i, --input <GTF>          Path(s) to GENCODE GTF files
//!
//! Optional arguments:
//!   -o, --outdir <DIR>         Directory for canonical GTF output
//!   -t, --threads <THREADS>    Number of threads (default: CPU count)
//!       --skip-header-check    Do not require a GENCODE header
//!   -v, --verbose              Verbose logging
//!   -h, --help                 Print help
//!   -V, --version              Print version
//! ```
//!
//! ## Examples
//!
//! ### Check and count a release
//!
//! ```bash
//! gencode-gtf -i gencode.v43.annotation.gtf.gz
//! ```
//!
//! ### Rewrite two releases in canonical form
//!
//! ```bash
//! gencode-gtf -i gencode.v19.annotation.gtf,gencode.v43.annotation.gtf -o canonical/
//! ```
use clap::Parser;
use colored::Colorize;
use gencode_gtf::{run, Args, Config};
use log::Level;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let level = if args.verbose { Level::Debug } else { Level::Info };
    simple_logger::init_with_level(level)?;

    args.check()?;
    log::debug!("{:?}", args);

    let config = Config::from_args(&args);
    log::info!("Using {} threads", config.threads);

    let stats = run(&config)?;

    for file in &stats.files {
        let build = file
            .genome_build
            .map_or_else(|| "none".dimmed(), |build| build.as_str().cyan().bold());
        println!(
            "{} {} [{}]",
            "decoded".green().bold(),
            file.path.display(),
            build
        );
        println!(
            "  genes: {}  transcripts: {}  exons: {}  CDS: {}",
            file.genes, file.transcripts, file.exons, file.cds
        );
        println!(
            "  start_codon: {}  stop_codon: {}  UTR: {}  Selenocysteine: {}",
            file.start_codons, file.stop_codons, file.utrs, file.selenocysteines
        );
        if let Some(output) = &file.output {
            println!("  {} {}", "wrote".yellow(), output.display());
        }
    }

    log::info!("Elapsed: {:.4?} secs", stats.elapsed.as_secs_f32());
    log::info!("Memory: {:.2} MB", stats.mem_delta_mb);

    Ok(())
}
