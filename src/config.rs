use crate::cli::Args;
use std::path::PathBuf;

/// Normalized configuration for a decoding run.
#[derive(Clone, Debug)]
pub struct Config {
    /// Input GENCODE GTF paths (plain or gzip).
    pub inputs: Vec<PathBuf>,
    /// Directory for canonical re-serialized output, if any.
    pub outdir: Option<PathBuf>,
    /// Number of threads to use.
    pub threads: usize,
    /// Decode files even if their header is not a GENCODE header.
    pub skip_header_check: bool,
}

impl Config {
    /// Builds a run config from CLI arguments.
    ///
    /// Threads are capped at the number of inputs since each file is
    /// decoded by a single assembler.
    pub fn from_args(args: &Args) -> Self {
        Self {
            inputs: args.inputs.clone(),
            outdir: args.outdir.clone(),
            threads: args.threads.min(args.inputs.len()).max(1),
            skip_header_check: args.skip_header_check,
        }
    }
}
