//! Typed GENCODE gene trees.
//!
//! A [`Gene`] owns its [`Transcript`]s, a transcript owns its [`Exon`]s,
//! [`Utr`]s and [`Selenocysteine`]s, and an exon owns at most one [`Cds`],
//! [`StartCodon`] and [`StopCodon`]. Children never point back to their
//! parents; use `gene_id()`/`transcript_id()` as lookup keys instead.
//!
//! Trees are only built by the assembler and are read-only afterwards.

use std::ops::Deref;

use crate::gtf::{
    AnnotationSource, Attribute, Attributes, FeatureType, GtfRecord, ParseError, Phase, Strand,
};
use crate::schema::{self, GenomeBuild, SchemaVersion};

/// Anything with a genomic interval. This is what interval indexes consume.
pub trait Locatable {
    fn contig(&self) -> &str;
    /// 1-based, inclusive.
    fn start(&self) -> u64;
    /// 1-based, inclusive.
    fn end(&self) -> u64;
    fn strand(&self) -> Strand;

    fn span(&self) -> u64 {
        self.end() - self.start() + 1
    }
}

/// Fields shared by every GENCODE feature line.
///
/// Attributes are stored once: the canonical keys of the feature type come
/// first, in output order, followed by every other key in file order. The
/// typed accessors below read from that same multimap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    contig: String,
    source: AnnotationSource,
    feature_type: FeatureType,
    start: u64,
    end: u64,
    strand: Strand,
    phase: Phase,
    attributes: Attributes,
    canonical_len: usize,
    schema: SchemaVersion,
}

impl Feature {
    /// Promotes a parsed line to a feature of a file with the given schema.
    pub(crate) fn from_record(record: GtfRecord, schema: SchemaVersion) -> Result<Self, ParseError> {
        let GtfRecord {
            contig,
            source,
            feature_type,
            start,
            end,
            strand,
            phase,
            mut attributes,
        } = record;

        for &key in schema::required_keys(feature_type, schema) {
            if !attributes.contains(key) {
                return Err(ParseError::MissingAttribute {
                    key,
                    feature: feature_type,
                });
            }
        }

        let mut ordered = Attributes::new();
        for &key in schema::canonical_keys(feature_type, schema) {
            if let Some(attr) = attributes.take(key) {
                ordered.push(attr.with_quoting(!schema::is_bare_key(key)));
            }
        }
        let canonical_len = ordered.len();
        ordered.extend(attributes);

        Ok(Self {
            contig,
            source,
            feature_type,
            start,
            end,
            strand,
            phase,
            attributes: ordered,
            canonical_len,
            schema,
        })
    }

    pub fn contig(&self) -> &str {
        &self.contig
    }

    pub fn source(&self) -> AnnotationSource {
        self.source
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    /// Genome-build tag of the file this feature was decoded from.
    pub fn genome_build(&self) -> GenomeBuild {
        self.schema.genome_build()
    }

    /// Every attribute, canonical keys first.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Attributes with a fixed position in the output line.
    pub fn canonical_attributes(&self) -> &[Attribute] {
        &self.attributes.as_slice()[..self.canonical_len]
    }

    /// Open-vocabulary attributes, in the order they were read.
    pub fn optional_attributes(&self) -> &[Attribute] {
        &self.attributes.as_slice()[self.canonical_len..]
    }

    pub fn gene_id(&self) -> &str {
        self.attributes.get(schema::GENE_ID).unwrap_or_default()
    }

    pub fn transcript_id(&self) -> Option<&str> {
        self.attributes.get(schema::TRANSCRIPT_ID)
    }

    pub fn gene_type(&self) -> &str {
        self.attributes.get(schema::GENE_TYPE).unwrap_or_default()
    }

    pub fn gene_name(&self) -> &str {
        self.attributes.get(schema::GENE_NAME).unwrap_or_default()
    }

    /// Only present in legacy-schema files.
    pub fn gene_status(&self) -> Option<&str> {
        self.canonical(schema::GENE_STATUS)
    }

    pub fn transcript_type(&self) -> Option<&str> {
        self.attributes.get(schema::TRANSCRIPT_TYPE)
    }

    /// Only present in legacy-schema files.
    pub fn transcript_status(&self) -> Option<&str> {
        self.canonical(schema::TRANSCRIPT_STATUS)
    }

    pub fn transcript_name(&self) -> Option<&str> {
        self.attributes.get(schema::TRANSCRIPT_NAME)
    }

    pub fn exon_number(&self) -> Option<u32> {
        self.attributes
            .get(schema::EXON_NUMBER)
            .and_then(|n| n.parse().ok())
    }

    pub fn exon_id(&self) -> Option<&str> {
        self.attributes.get(schema::EXON_ID)
    }

    /// Locus level; historically 1 to 3, kept as text.
    pub fn level(&self) -> &str {
        self.attributes.get(schema::LEVEL).unwrap_or_default()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.attributes.get_all("tag")
    }

    pub fn protein_id(&self) -> Option<&str> {
        self.attributes.get("protein_id")
    }

    pub fn ccds_id(&self) -> Option<&str> {
        self.attributes.get("ccdsid")
    }

    pub fn havana_gene(&self) -> Option<&str> {
        self.attributes.get("havana_gene")
    }

    pub fn havana_transcript(&self) -> Option<&str> {
        self.attributes.get("havana_transcript")
    }

    pub fn transcript_support_level(&self) -> Option<&str> {
        self.attributes.get("transcript_support_level")
    }

    fn canonical(&self, key: &str) -> Option<&str> {
        self.canonical_attributes()
            .iter()
            .find(|attr| attr.key() == key)
            .map(|attr| attr.value())
    }
}

impl Locatable for Feature {
    fn contig(&self) -> &str {
        &self.contig
    }

    fn start(&self) -> u64 {
        self.start
    }

    fn end(&self) -> u64 {
        self.end
    }

    fn strand(&self) -> Strand {
        self.strand
    }
}

macro_rules! leaf_feature {
    ($( $(#[$meta:meta])* $name:ident; )+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub struct $name(Feature);

            impl $name {
                pub(crate) fn new(feature: Feature) -> Self {
                    Self(feature)
                }

                pub fn feature(&self) -> &Feature {
                    &self.0
                }
            }

            impl Deref for $name {
                type Target = Feature;

                fn deref(&self) -> &Feature {
                    &self.0
                }
            }
        )+
    };
}

leaf_feature! {
    /// Coding segment of an exon.
    Cds;
    /// First three coding bases of a transcript.
    StartCodon;
    /// Last three coding bases of a transcript.
    StopCodon;
    /// Untranslated region, owned by the transcript.
    Utr;
    /// Codon read as selenocysteine instead of a stop.
    Selenocysteine;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exon {
    pub(crate) feature: Feature,
    pub(crate) cds: Option<Cds>,
    pub(crate) start_codon: Option<StartCodon>,
    pub(crate) stop_codon: Option<StopCodon>,
}

impl Exon {
    pub(crate) fn new(feature: Feature) -> Self {
        Self {
            feature,
            cds: None,
            start_codon: None,
            stop_codon: None,
        }
    }

    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    /// Position in emission order; on the reverse strand exon 1 is the rightmost.
    pub fn exon_number(&self) -> u32 {
        self.feature.exon_number().unwrap_or_default()
    }

    pub fn cds(&self) -> Option<&Cds> {
        self.cds.as_ref()
    }

    pub fn start_codon(&self) -> Option<&StartCodon> {
        self.start_codon.as_ref()
    }

    pub fn stop_codon(&self) -> Option<&StopCodon> {
        self.stop_codon.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub(crate) feature: Feature,
    pub(crate) exons: Vec<Exon>,
    pub(crate) utrs: Vec<Utr>,
    pub(crate) selenocysteines: Vec<Selenocysteine>,
}

impl Transcript {
    pub(crate) fn new(feature: Feature) -> Self {
        Self {
            feature,
            exons: Vec::new(),
            utrs: Vec::new(),
            selenocysteines: Vec::new(),
        }
    }

    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    /// Transcript id; always present on transcript records.
    pub fn id(&self) -> &str {
        self.feature.transcript_id().unwrap_or_default()
    }

    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    pub fn exon(&self, exon_number: u32) -> Option<&Exon> {
        self.exons
            .iter()
            .find(|exon| exon.exon_number() == exon_number)
    }

    pub fn utrs(&self) -> &[Utr] {
        &self.utrs
    }

    pub fn selenocysteines(&self) -> &[Selenocysteine] {
        &self.selenocysteines
    }

    /// Coding segments in exon order.
    pub fn coding_segments(&self) -> impl Iterator<Item = &Cds> {
        self.exons.iter().filter_map(Exon::cds)
    }

    pub fn is_coding(&self) -> bool {
        self.exons.iter().any(|exon| exon.cds.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    pub(crate) feature: Feature,
    pub(crate) transcripts: Vec<Transcript>,
}

impl Gene {
    pub(crate) fn new(feature: Feature) -> Self {
        Self {
            feature,
            transcripts: Vec::new(),
        }
    }

    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    pub fn transcript(&self, transcript_id: &str) -> Option<&Transcript> {
        self.transcripts.iter().find(|tx| tx.id() == transcript_id)
    }

    /// Every node of the tree in output order: the gene, then per transcript
    /// the transcript, its selenocysteines, each exon followed by its CDS,
    /// start codon and stop codon, and finally its UTRs.
    pub fn features(&self) -> Vec<&Feature> {
        let mut features = vec![&self.feature];
        for tx in &self.transcripts {
            features.push(&tx.feature);
            features.extend(tx.selenocysteines.iter().map(Selenocysteine::feature));
            for exon in &tx.exons {
                features.push(&exon.feature);
                features.extend(exon.cds.as_ref().map(Cds::feature));
                features.extend(exon.start_codon.as_ref().map(StartCodon::feature));
                features.extend(exon.stop_codon.as_ref().map(StopCodon::feature));
            }
            features.extend(tx.utrs.iter().map(Utr::feature));
        }
        features
    }
}

macro_rules! node_deref {
    ($($name:ty),+ $(,)?) => {
        $(
            impl Deref for $name {
                type Target = Feature;

                fn deref(&self) -> &Feature {
                    &self.feature
                }
            }
        )+
    };
}

node_deref!(Gene, Transcript, Exon);

macro_rules! impl_locatable {
    ($($name:ty),+ $(,)?) => {
        $(
            impl Locatable for $name {
                fn contig(&self) -> &str {
                    self.feature().contig()
                }

                fn start(&self) -> u64 {
                    self.feature().start()
                }

                fn end(&self) -> u64 {
                    self.feature().end()
                }

                fn strand(&self) -> Strand {
                    self.feature().strand()
                }
            }
        )+
    };
}

impl_locatable!(Gene, Transcript, Exon, Cds, StartCodon, StopCodon, Utr, Selenocysteine);

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(line: &str, schema: SchemaVersion) -> Feature {
        Feature::from_record(GtfRecord::parse(line).unwrap(), schema).unwrap()
    }

    #[test]
    fn test_attributes_are_canonicalized() {
        let line = "chr1\tHAVANA\texon\t65419\t65433\t.\t+\t.\ttranscript_id \"ENST00000641515.2\"; gene_id \"ENSG00000186092.7\"; tag \"basic\"; gene_type \"protein_coding\"; gene_name \"OR4F5\"; transcript_type \"protein_coding\"; transcript_name \"OR4F5-201\"; exon_number \"1\"; exon_id \"ENSE00003812156.1\"; level 2; tag \"CCDS\";";
        let exon = feature(line, SchemaVersion::Current);

        let canonical = exon
            .canonical_attributes()
            .iter()
            .map(|a| a.key())
            .collect::<Vec<_>>();
        assert_eq!(
            canonical,
            vec![
                "gene_id",
                "transcript_id",
                "gene_type",
                "gene_name",
                "transcript_type",
                "transcript_name",
                "exon_number",
                "exon_id",
                "level"
            ]
        );
        assert!(!exon.canonical_attributes()[6].is_quoted());
        assert_eq!(exon.tags().collect::<Vec<_>>(), vec!["basic", "CCDS"]);
        assert_eq!(exon.optional_attributes().len(), 2);
        assert_eq!(exon.exon_number(), Some(1));
        assert_eq!(exon.genome_build(), GenomeBuild::Hg38);
    }

    #[test]
    fn test_legacy_requires_status() {
        let line = "chr1\tHAVANA\tgene\t11869\t14412\t.\t+\t.\tgene_id \"ENSG00000223972.4\"; gene_type \"pseudogene\"; gene_name \"DDX11L1\"; level 2;";
        let err = Feature::from_record(GtfRecord::parse(line).unwrap(), SchemaVersion::Legacy)
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingAttribute {
                key: "gene_status",
                feature: FeatureType::Gene
            }
        );
    }

    #[test]
    fn test_status_is_optional_in_current_schema() {
        let line = "chr1\tHAVANA\tgene\t11869\t14412\t.\t+\t.\tgene_id \"g\"; gene_type \"pseudogene\"; gene_name \"DDX11L1\"; level 2; gene_status \"KNOWN\";";
        let gene = feature(line, SchemaVersion::Current);
        assert_eq!(gene.gene_status(), None);
        assert_eq!(gene.optional_attributes()[0].key(), "gene_status");
    }

    #[test]
    fn test_locatable() {
        let line = "chr7\tENSEMBL\tSelenocysteine\t100\t102\t.\t-\t.\tgene_id \"g\"; transcript_id \"t\"; gene_type \"protein_coding\"; gene_name \"SELENOP\"; transcript_type \"protein_coding\"; transcript_name \"SELENOP-201\"; level 2;";
        let sec = Selenocysteine::new(feature(line, SchemaVersion::Current));
        assert_eq!(Locatable::contig(&sec), "chr7");
        assert_eq!(sec.span(), 3);
        assert_eq!(Locatable::strand(&sec), Strand::Reverse);
    }
}
