use thiserror::Error;

use crate::gtf::{FeatureType, ParseError, Strand};

/// Error type for gencode-gtf operations.
#[derive(Debug, Error)]
pub enum GencodeError {
    /// Leading comment block is not a GENCODE header.
    #[error("invalid GENCODE header: {0}")]
    Header(#[from] HeaderError),
    /// A data line could not be parsed into a record.
    #[error("line {line}: {source}")]
    LineFormat {
        line: usize,
        #[source]
        source: ParseError,
    },
    /// A record does not fit into the gene tree being assembled.
    #[error("line {line}: {source}")]
    Hierarchy {
        line: usize,
        #[source]
        source: HierarchyError,
    },
    /// Input extension is missing or not supported.
    #[error("unsupported input extension: {0}")]
    UnsupportedExtension(String),
    /// Failed to build a Rayon thread pool.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// Wraps standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a header block is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("expected 5 header lines, found {0}")]
    LineCount(usize),
    #[error("header line {index} should start with '{expected}', found '{found}'")]
    Prefix {
        index: usize,
        expected: &'static str,
        found: String,
    },
    #[error("header line {index} has an empty value")]
    EmptyValue { index: usize },
    #[error("contact address '{0}' is not a GENCODE address")]
    Contact(String),
}

/// Structural violations found while attaching a record to a gene tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("{0} record found before any gene record")]
    NoOpenGene(FeatureType),
    #[error("{0} record found outside of a transcript")]
    NoOpenTranscript(FeatureType),
    #[error("gene_id mismatch: expected '{expected}', found '{found}'")]
    GeneIdMismatch { expected: String, found: String },
    #[error("transcript_id mismatch: expected '{expected}', found '{found}'")]
    TranscriptIdMismatch { expected: String, found: String },
    #[error("contig mismatch in gene '{gene_id}': expected '{expected}', found '{found}'")]
    ContigMismatch {
        gene_id: String,
        expected: String,
        found: String,
    },
    #[error("strand mismatch in gene '{gene_id}': expected '{expected}', found '{found}'")]
    StrandMismatch {
        gene_id: String,
        expected: Strand,
        found: Strand,
    },
    #[error("transcript '{transcript_id}' appears twice in gene '{gene_id}'")]
    DuplicateTranscript {
        gene_id: String,
        transcript_id: String,
    },
    #[error("exon_number {exon_number} appears twice in transcript '{transcript_id}'")]
    DuplicateExonNumber {
        transcript_id: String,
        exon_number: u32,
    },
    #[error("{feature} references exon_number {exon_number} not yet seen in transcript '{transcript_id}'")]
    ExonNotFound {
        feature: FeatureType,
        transcript_id: String,
        exon_number: u32,
    },
    #[error("exon {exon_number} of transcript '{transcript_id}' already has a {feature}")]
    DuplicateExonChild {
        feature: FeatureType,
        transcript_id: String,
        exon_number: u32,
    },
}

/// Result alias for gencode-gtf operations.
pub type Result<T> = std::result::Result<T, GencodeError>;
