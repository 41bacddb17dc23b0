//! # gencode-gtf
//!
//! Decoder and encoder for GENCODE GTF annotation files.
//!
//! A GENCODE GTF is a flat list of tab-separated lines, ordered so that
//! every gene is followed by its transcripts, every transcript by its exons,
//! and every exon by its CDS and codon features. This crate validates the
//! GENCODE header, detects whether the file uses the legacy (hg19) or the
//! current (hg38) attribute schema, and assembles the lines into owned
//! [`Gene`] trees that can be serialized back with attributes in canonical
//! order.
//!
//! ## Usage
//!
//! ```rust, ignore
//! use gencode_gtf::{can_decode, open_path, read_header, HierarchyAssembler};
//! use std::path::Path;
//!
//! let path = Path::new("gencode.v43.annotation.gtf.gz");
//! assert!(can_decode(path));
//!
//! let mut source = open_path(path)?;
//! let _header = read_header(&mut source)?;
//! for gene in HierarchyAssembler::new(source) {
//!     let gene = gene?;
//!     println!("{} has {} transcripts", gene.gene_id(), gene.transcripts().len());
//! }
//! ```
//!
//! ## Examples
//!
//! ### Decoding from memory and writing back
//!
//! ```rust, ignore
//! use gencode_gtf::{decode, serialize, DecodeState, TextLines};
//!
//! let text = "chr1\tENSEMBL\tgene\t30366\t30503\t.\t+\t.\tgene_id \"ENSG00000284332.1\"; gene_type \"miRNA\"; gene_name \"MIR1302-2\"; level 3;\n";
//! let mut source = TextLines::new(text.as_bytes());
//! let mut state = DecodeState::new();
//!
//! let gene = decode(&mut source, &mut state)?.unwrap();
//! assert_eq!(serialize(&gene), text);
//! assert_eq!(state.genome_build().unwrap().as_str(), "hg38");
//! ```
//!
//! ### Batch runs
//!
//! ```rust, ignore
//! use gencode_gtf::{run, Config};
//! use std::path::PathBuf;
//!
//! let config = Config {
//!     inputs: vec![PathBuf::from("gencode.v19.annotation.gtf")],
//!     outdir: Some(PathBuf::from("canonical")),
//!     threads: 1,
//!     skip_header_check: false,
//! };
//!
//! let stats = run(&config)?;
//! println!("Decoded in {:?}", stats.elapsed);
//! ```

pub mod assembler;
pub mod cli;
pub mod config;
pub mod convert;
pub mod detect;
pub mod error;
pub mod gtf;
pub mod header;
pub mod memory;
pub mod model;
pub mod schema;
pub mod serialize;
pub mod source;

pub use assembler::{decode, AssemblyState, DecodeState, HierarchyAssembler};
pub use cli::Args;
pub use config::Config;
pub use convert::{run, FileSummary, RunStats};
pub use detect::{can_decode, detect_compression, Compression};
pub use error::{GencodeError, HeaderError, HierarchyError, Result};
pub use gtf::{
    AnnotationSource, Attribute, Attributes, FeatureType, GtfRecord, ParseError, Phase, Strand,
};
pub use header::{check_header, read_header, validate_header};
pub use memory::max_mem_usage_mb;
pub use model::{
    Cds, Exon, Feature, Gene, Locatable, Selenocysteine, StartCodon, StopCodon, Transcript, Utr,
};
pub use schema::{GenomeBuild, SchemaVersion};
pub use serialize::{serialize, write_gene};
pub use source::{open_path, FileLines, LineSource, TextLines};
