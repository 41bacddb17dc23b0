//! Decode GENCODE GTF files into gene trees and write them back
//! Alejandro Gonzales-Irribarren, 2025

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

use crate::detect::detect_compression;

#[derive(Parser, Debug)]
#[clap(
    name = "gencode-gtf",
    version = env!("CARGO_PKG_VERSION"),
    author = "Alejandro Gonzales-Irribarren <alejandrxgzi@gmail.com>",
    about = "decode GENCODE GTF files into gene trees and write them back"
)]
pub struct Args {
    /// GENCODE GTF files to decode.
    ///
    /// Plain `.gtf` or gzip-compressed `.gtf.gz` files. Several files may be
    /// given, comma-separated or by repeating the flag; they are decoded in
    /// parallel.
    #[clap(
        short = 'i',
        long = "input",
        help = "Path(s) to GENCODE GTF files",
        value_name = "GTF",
        value_delimiter = ',',
        num_args = 1..,
        required = true
    )]
    pub inputs: Vec<PathBuf>,

    /// Output directory; non-required argument.
    ///
    /// When given, every input is written back as `<name>.canonical.gtf`
    /// with attributes in canonical order. Inputs sharing a file name are
    /// written as `<name>.<index>.canonical.gtf`.
    #[clap(
        short = 'o',
        long = "outdir",
        help = "Directory for canonical GTF output",
        value_name = "DIR"
    )]
    pub outdir: Option<PathBuf>,

    /// Number of threads to use; default is the number of logical CPUs.
    #[clap(
        short = 't',
        long,
        help = "Number of threads",
        value_name = "THREADS",
        default_value_t = num_cpus::get()
    )]
    pub threads: usize,

    /// Decode inputs whose header is missing or not GENCODE.
    #[clap(long = "skip-header-check", help = "Do not require a GENCODE header")]
    pub skip_header_check: bool,

    /// Log at debug level.
    #[clap(short = 'v', long, help = "Verbose logging")]
    pub verbose: bool,
}

impl Args {
    /// Checks all the arguments for validity using validate_args()
    pub fn check(&self) -> Result<(), ArgError> {
        self.validate_args()
    }

    /// Every input must exist, be non-empty and carry a GTF extension.
    fn check_inputs(&self) -> Result<(), ArgError> {
        for input in &self.inputs {
            if !input.exists() {
                let err = format!("file {:?} does not exist", input);
                return Err(ArgError::InvalidInput(err));
            }
            let is_empty = std::fs::metadata(input)
                .map(|meta| meta.len() == 0)
                .map_err(|e| ArgError::InvalidInput(format!("file {:?}: {}", input, e)))?;
            if is_empty {
                let err = format!("file {:?} is empty", input);
                return Err(ArgError::InvalidInput(err));
            }
            if detect_compression(input).is_err() {
                let err = format!("file {:?} is not a GTF file", input);
                return Err(ArgError::InvalidInput(err));
            }
        }
        Ok(())
    }

    /// The output path, if given, must not be an existing regular file.
    fn check_outdir(&self) -> Result<(), ArgError> {
        match &self.outdir {
            Some(dir) if dir.is_file() => {
                let err = format!("{:?} is a file, not a directory", dir);
                Err(ArgError::InvalidOutput(err))
            }
            _ => Ok(()),
        }
    }

    /// Checks the number of threads for validity. The number of threads must be greater than 0
    /// and less than or equal to the number of logical CPUs.
    fn check_threads(&self) -> Result<(), ArgError> {
        if self.threads == 0 {
            let err = "number of threads must be greater than 0".to_string();
            Err(ArgError::InvalidThreads(err))
        } else if self.threads > num_cpus::get() {
            let err = "number of threads must be less than or equal to the number of logical CPUs"
                .to_string();
            Err(ArgError::InvalidThreads(err))
        } else {
            Ok(())
        }
    }

    /// Validates all the arguments
    fn validate_args(&self) -> Result<(), ArgError> {
        self.check_inputs()?;
        self.check_outdir()?;
        self.check_threads()?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ArgError {
    /// An input file does not exist or is not a GTF file.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The output directory is not usable.
    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    /// The number of threads is invalid.
    #[error("Invalid number of threads: {0}")]
    InvalidThreads(String),
}
