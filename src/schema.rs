//! GENCODE attribute schemas and genome-build detection.
//!
//! GENCODE releases for GRCh37 carry `gene_status`/`transcript_status` on
//! every line; releases for GRCh38 dropped both. Which one a file uses is
//! decided from its first gene record and then fixed for the whole file.

use std::fmt;

use crate::gtf::{Attributes, FeatureType};

pub const GENE_ID: &str = "gene_id";
pub const TRANSCRIPT_ID: &str = "transcript_id";
pub const GENE_TYPE: &str = "gene_type";
pub const GENE_STATUS: &str = "gene_status";
pub const GENE_NAME: &str = "gene_name";
pub const TRANSCRIPT_TYPE: &str = "transcript_type";
pub const TRANSCRIPT_STATUS: &str = "transcript_status";
pub const TRANSCRIPT_NAME: &str = "transcript_name";
pub const EXON_NUMBER: &str = "exon_number";
pub const EXON_ID: &str = "exon_id";
pub const LEVEL: &str = "level";

// canonical attribute order, per feature type and schema
const GENE_CURRENT: &[&str] = &[GENE_ID, GENE_TYPE, GENE_NAME, LEVEL];
const GENE_LEGACY: &[&str] = &[GENE_ID, GENE_TYPE, GENE_STATUS, GENE_NAME, LEVEL];
const TRANSCRIPT_CURRENT: &[&str] = &[
    GENE_ID,
    TRANSCRIPT_ID,
    GENE_TYPE,
    GENE_NAME,
    TRANSCRIPT_TYPE,
    TRANSCRIPT_NAME,
    LEVEL,
];
const TRANSCRIPT_LEGACY: &[&str] = &[
    GENE_ID,
    TRANSCRIPT_ID,
    GENE_TYPE,
    GENE_STATUS,
    GENE_NAME,
    TRANSCRIPT_TYPE,
    TRANSCRIPT_STATUS,
    TRANSCRIPT_NAME,
    LEVEL,
];
const EXON_CURRENT: &[&str] = &[
    GENE_ID,
    TRANSCRIPT_ID,
    GENE_TYPE,
    GENE_NAME,
    TRANSCRIPT_TYPE,
    TRANSCRIPT_NAME,
    EXON_NUMBER,
    EXON_ID,
    LEVEL,
];
const EXON_LEGACY: &[&str] = &[
    GENE_ID,
    TRANSCRIPT_ID,
    GENE_TYPE,
    GENE_STATUS,
    GENE_NAME,
    TRANSCRIPT_TYPE,
    TRANSCRIPT_STATUS,
    TRANSCRIPT_NAME,
    EXON_NUMBER,
    EXON_ID,
    LEVEL,
];

/// Attribute column layout of a GENCODE release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// Pre-2014 layout with `gene_status` and `transcript_status`.
    Legacy,
    /// Current layout without status keys.
    Current,
}

impl SchemaVersion {
    /// Classifies a file from the attributes of its first gene record.
    pub fn detect(gene_attributes: &Attributes) -> Self {
        if gene_attributes.contains(GENE_STATUS) {
            SchemaVersion::Legacy
        } else {
            SchemaVersion::Current
        }
    }

    pub fn genome_build(self) -> GenomeBuild {
        match self {
            SchemaVersion::Legacy => GenomeBuild::Hg19,
            SchemaVersion::Current => GenomeBuild::Hg38,
        }
    }
}

/// Reference assembly an annotation file was produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenomeBuild {
    Hg19,
    Hg38,
}

impl GenomeBuild {
    pub fn as_str(self) -> &'static str {
        match self {
            GenomeBuild::Hg19 => "hg19",
            GenomeBuild::Hg38 => "hg38",
        }
    }
}

impl fmt::Display for GenomeBuild {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys rendered before any optional attribute, in output order.
///
/// Not every canonical key is required: legacy gene lines repeat the
/// transcript keys, and UTR and Selenocysteine lines carry
/// `exon_number`/`exon_id` when the feature falls inside a single exon.
pub fn canonical_keys(feature: FeatureType, schema: SchemaVersion) -> &'static [&'static str] {
    match (feature, schema) {
        (FeatureType::Gene, SchemaVersion::Current) => GENE_CURRENT,
        (FeatureType::Gene | FeatureType::Transcript, SchemaVersion::Legacy) => TRANSCRIPT_LEGACY,
        (FeatureType::Transcript, SchemaVersion::Current) => TRANSCRIPT_CURRENT,
        (_, SchemaVersion::Current) => EXON_CURRENT,
        (_, SchemaVersion::Legacy) => EXON_LEGACY,
    }
}

/// Keys a record of `feature` must carry under `schema`.
pub fn required_keys(feature: FeatureType, schema: SchemaVersion) -> &'static [&'static str] {
    match feature {
        FeatureType::Gene => match schema {
            SchemaVersion::Current => GENE_CURRENT,
            SchemaVersion::Legacy => GENE_LEGACY,
        },
        FeatureType::Utr | FeatureType::Selenocysteine => match schema {
            SchemaVersion::Current => TRANSCRIPT_CURRENT,
            SchemaVersion::Legacy => TRANSCRIPT_LEGACY,
        },
        _ => canonical_keys(feature, schema),
    }
}

/// Keys whose values GENCODE writes without quotes.
pub fn is_bare_key(key: &str) -> bool {
    key == EXON_NUMBER || key == LEVEL
}
