use crate::assembler::HierarchyAssembler;
use crate::config::Config;
use crate::error::Result;
use crate::header::{check_header, read_header};
use crate::memory::max_mem_usage_mb;
use crate::model::Gene;
use crate::schema::GenomeBuild;
use crate::serialize::write_gene;
use crate::source::open_path;
use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Feature counts for one decoded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    /// Input path.
    pub path: PathBuf,
    /// Build detected from the first gene; `None` for files without genes.
    pub genome_build: Option<GenomeBuild>,
    pub genes: usize,
    pub transcripts: usize,
    pub exons: usize,
    pub cds: usize,
    pub start_codons: usize,
    pub stop_codons: usize,
    pub utrs: usize,
    pub selenocysteines: usize,
    /// Canonical GTF written for this input, if an output directory was set.
    pub output: Option<PathBuf>,
}

impl FileSummary {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            genome_build: None,
            genes: 0,
            transcripts: 0,
            exons: 0,
            cds: 0,
            start_codons: 0,
            stop_codons: 0,
            utrs: 0,
            selenocysteines: 0,
            output: None,
        }
    }

    fn add(&mut self, gene: &Gene) {
        self.genes += 1;
        for tx in gene.transcripts() {
            self.transcripts += 1;
            self.utrs += tx.utrs().len();
            self.selenocysteines += tx.selenocysteines().len();
            for exon in tx.exons() {
                self.exons += 1;
                self.cds += usize::from(exon.cds().is_some());
                self.start_codons += usize::from(exon.start_codon().is_some());
                self.stop_codons += usize::from(exon.stop_codon().is_some());
            }
        }
    }
}

/// Summary statistics for a run.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Wall clock time spent decoding.
    pub elapsed: Duration,
    /// Delta in maximum RSS memory usage, in MB.
    pub mem_delta_mb: f64,
    /// One summary per input, in input order.
    pub files: Vec<FileSummary>,
}

/// Decodes every input of `config`, one independent assembler per file.
///
/// Files are processed in parallel on a dedicated Rayon pool. When
/// `config.outdir` is set, each input is re-serialized there as
/// `<name>.canonical.gtf`, header included. Inputs sharing a name get
/// their position in `config.inputs` added: `<name>.<index>.canonical.gtf`.
///
/// # Errors
///
/// Returns the first header, line format, hierarchy or I/O error found.
///
/// # Example
///
/// ```rust, ignore
/// use gencode_gtf::{run, Config};
/// use std::path::PathBuf;
///
/// let config = Config {
///     inputs: vec![PathBuf::from("gencode.v43.annotation.gtf.gz")],
///     outdir: None,
///     threads: 4,
///     skip_header_check: false,
/// };
/// let stats = run(&config)?;
/// println!("{} genes", stats.files[0].genes);
/// ```
pub fn run(config: &Config) -> Result<RunStats> {
    let start = Instant::now();
    let start_mem = max_mem_usage_mb();

    let outputs: Vec<Option<PathBuf>> = match &config.outdir {
        Some(outdir) => {
            std::fs::create_dir_all(outdir)?;
            output_paths(outdir, &config.inputs)
                .into_iter()
                .map(Some)
                .collect()
        }
        None => vec![None; config.inputs.len()],
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let files = pool.install(|| {
        config
            .inputs
            .par_iter()
            .zip(outputs.into_par_iter())
            .map(|(path, output)| process_file(path, output, config.skip_header_check))
            .collect::<Result<Vec<_>>>()
    })?;

    let elapsed = start.elapsed();
    let mem_delta = (max_mem_usage_mb() - start_mem).max(0.0);

    Ok(RunStats {
        elapsed,
        mem_delta_mb: mem_delta,
        files,
    })
}

/// Decodes a single file into a summary, optionally writing canonical GTF to `output`.
fn process_file(
    path: &Path,
    output: Option<PathBuf>,
    skip_header_check: bool,
) -> Result<FileSummary> {
    let mut source = open_path(path)?;
    let header = read_header(&mut source)?;
    if !skip_header_check {
        check_header(&header)?;
    }

    let mut summary = FileSummary::new(path);
    let mut writer = match output {
        Some(output) => {
            let mut writer = BufWriter::with_capacity(256 * 1024, File::create(&output)?);
            for line in &header {
                writeln!(writer, "{line}")?;
            }
            summary.output = Some(output);
            Some(writer)
        }
        None => None,
    };

    let mut assembler = HierarchyAssembler::new(source);
    while let Some(gene) = assembler.decode()? {
        summary.add(&gene);
        if let Some(writer) = writer.as_mut() {
            write_gene(&gene, writer)?;
        }
    }
    summary.genome_build = assembler.genome_build();

    if let Some(mut writer) = writer {
        writer.flush()?;
    }

    log::info!(
        "{}: {} genes, {} transcripts ({})",
        path.display(),
        summary.genes,
        summary.transcripts,
        summary
            .genome_build
            .map_or("no genes", |build| build.as_str())
    );
    Ok(summary)
}

/// One output path per input, all distinct.
///
/// `<name>` is the file name without `.gtf`/`.gtf.gz`. Names shared by
/// several inputs are suffixed with the input index; the index is the last
/// dot-separated part, so suffixed names cannot collide with each other.
fn output_paths(outdir: &Path, inputs: &[PathBuf]) -> Vec<PathBuf> {
    let stems = inputs.iter().map(|input| output_stem(input)).collect::<Vec<_>>();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for stem in &stems {
        *counts.entry(stem.as_str()).or_insert(0) += 1;
    }
    let mut names = stems
        .iter()
        .enumerate()
        .map(|(idx, stem)| match counts.get(stem.as_str()) {
            Some(&count) if count > 1 => format!("{stem}.{idx}"),
            _ => stem.clone(),
        })
        .collect::<Vec<_>>();

    // a plain name can still equal a suffixed one, e.g. `x.0.gtf` next to two `x.gtf`
    if names.iter().collect::<HashSet<_>>().len() != names.len() {
        names = stems
            .iter()
            .enumerate()
            .map(|(idx, stem)| format!("{stem}.{idx}"))
            .collect();
    }

    names
        .into_iter()
        .map(|name| outdir.join(format!("{name}.canonical.gtf")))
        .collect()
}

/// File name of `input` without its `.gtf`, `.gtf.gz` or `.gtf.gzip` suffix.
fn output_stem(input: &Path) -> String {
    let name = input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("input.gtf");
    let lower = name.to_ascii_lowercase();
    let stem_len = [".gtf.gzip", ".gtf.gz", ".gtf"]
        .iter()
        .find(|suffix| lower.ends_with(*suffix))
        .map_or(name.len(), |suffix| name.len() - suffix.len());
    name[..stem_len].to_string()
}
