//! Gene tree assembly.
//!
//! GENCODE emits each gene as a contiguous block: the gene line, then for
//! every transcript its transcript line followed by exon, CDS, codon, UTR and
//! Selenocysteine lines. [`decode`] consumes one such block per call and
//! returns the finished [`Gene`]. It peeks at the first line of the next
//! block without consuming it, so the following call starts there.
//!
//! All decode state lives in [`DecodeState`], which is threaded through each
//! call. One state (and one source) per file: the detected schema is fixed
//! by the first gene record and reused for the rest of the file.

use hashbrown::{HashMap, HashSet};
use log::{debug, trace};

use crate::error::{GencodeError, HierarchyError, Result};
use crate::gtf::{FeatureType, GtfRecord};
use crate::model::{
    Cds, Exon, Feature, Gene, Selenocysteine, StartCodon, StopCodon, Transcript, Utr,
};
use crate::schema::{GenomeBuild, SchemaVersion};
use crate::source::LineSource;

/// Coarse position of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    Idle,
    BuildingGene,
    BuildingTranscript,
}

struct OpenGene {
    gene: Gene,
    transcript_ids: HashSet<String>,
}

struct OpenTranscript {
    transcript: Transcript,
    // exon_number -> index into transcript.exons
    exons: HashMap<u32, usize>,
}

/// Cursor over a single GENCODE file.
#[derive(Default)]
pub struct DecodeState {
    schema: Option<SchemaVersion>,
    gene: Option<OpenGene>,
    transcript: Option<OpenTranscript>,
}

impl DecodeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AssemblyState {
        match (&self.gene, &self.transcript) {
            (None, _) => AssemblyState::Idle,
            (Some(_), None) => AssemblyState::BuildingGene,
            (Some(_), Some(_)) => AssemblyState::BuildingTranscript,
        }
    }

    /// Schema detected from the first gene record, if one was seen.
    pub fn schema(&self) -> Option<SchemaVersion> {
        self.schema
    }

    pub fn genome_build(&self) -> Option<GenomeBuild> {
        self.schema.map(SchemaVersion::genome_build)
    }

    pub fn has_open_gene(&self) -> bool {
        self.gene.is_some()
    }

    /// Feeds one record into the tree under construction.
    ///
    /// A gene record arriving while another gene is open closes that gene
    /// and returns it. `line` is only used for error reporting.
    pub fn push(&mut self, record: GtfRecord, line: usize) -> Result<Option<Gene>> {
        match record.feature_type {
            FeatureType::Gene => return self.open_gene(record, line),
            FeatureType::Transcript => {
                let feature = self.child_feature(record, line)?;
                self.open_transcript(feature, line)?;
            }
            FeatureType::Exon => {
                let feature = self.child_feature(record, line)?;
                let open = self.current_transcript(&feature, line)?;
                let exon_number = feature.exon_number().unwrap_or_default();
                if open.exons.contains_key(&exon_number) {
                    return Err(hierarchy(
                        line,
                        HierarchyError::DuplicateExonNumber {
                            transcript_id: open.transcript.id().to_string(),
                            exon_number,
                        },
                    ));
                }
                open.exons.insert(exon_number, open.transcript.exons.len());
                open.transcript.exons.push(Exon::new(feature));
            }
            FeatureType::Cds | FeatureType::StartCodon | FeatureType::StopCodon => {
                let feature = self.child_feature(record, line)?;
                let open = self.current_transcript(&feature, line)?;
                attach_to_exon(open, feature).map_err(|e| hierarchy(line, e))?;
            }
            FeatureType::Utr => {
                let feature = self.child_feature(record, line)?;
                let open = self.current_transcript(&feature, line)?;
                open.transcript.utrs.push(Utr::new(feature));
            }
            FeatureType::Selenocysteine => {
                let feature = self.child_feature(record, line)?;
                let open = self.current_transcript(&feature, line)?;
                open.transcript
                    .selenocysteines
                    .push(Selenocysteine::new(feature));
            }
        }

        Ok(None)
    }

    /// Closes any open transcript and gene and returns the gene.
    pub fn finish(&mut self) -> Option<Gene> {
        self.close_transcript();
        let open = self.gene.take()?;
        trace!(
            "assembled gene {} with {} transcripts",
            open.gene.gene_id(),
            open.gene.transcripts.len()
        );
        Some(open.gene)
    }

    /// Starts a new gene, closing and returning the previous one.
    fn open_gene(&mut self, record: GtfRecord, line: usize) -> Result<Option<Gene>> {
        let schema = *self.schema.get_or_insert_with(|| {
            let schema = SchemaVersion::detect(&record.attributes);
            debug!(
                "detected {:?} GENCODE schema ({}) at line {}",
                schema,
                schema.genome_build(),
                line
            );
            schema
        });
        let feature = promote(record, schema, line)?;
        let completed = self.finish();
        self.gene = Some(OpenGene {
            gene: Gene::new(feature),
            transcript_ids: HashSet::new(),
        });
        Ok(completed)
    }

    /// Promotes a non-gene record after checking it belongs to the open gene.
    fn child_feature(&self, record: GtfRecord, line: usize) -> Result<Feature> {
        let (Some(open), Some(schema)) = (self.gene.as_ref(), self.schema) else {
            return Err(hierarchy(line, HierarchyError::NoOpenGene(record.feature_type)));
        };
        check_gene_membership(&open.gene, &record).map_err(|e| hierarchy(line, e))?;
        promote(record, schema, line)
    }

    fn open_transcript(&mut self, feature: Feature, line: usize) -> Result<()> {
        self.close_transcript();
        let Some(open) = self.gene.as_mut() else {
            return Err(hierarchy(line, HierarchyError::NoOpenGene(FeatureType::Transcript)));
        };

        let transcript_id = feature.transcript_id().unwrap_or_default().to_string();
        if !open.transcript_ids.insert(transcript_id.clone()) {
            return Err(hierarchy(
                line,
                HierarchyError::DuplicateTranscript {
                    gene_id: open.gene.gene_id().to_string(),
                    transcript_id,
                },
            ));
        }

        self.transcript = Some(OpenTranscript {
            transcript: Transcript::new(feature),
            exons: HashMap::new(),
        });
        Ok(())
    }

    fn close_transcript(&mut self) {
        if let (Some(open), Some(tx)) = (self.gene.as_mut(), self.transcript.take()) {
            open.gene.transcripts.push(tx.transcript);
        }
    }

    fn current_transcript(&mut self, feature: &Feature, line: usize) -> Result<&mut OpenTranscript> {
        let open = self
            .transcript
            .as_mut()
            .ok_or_else(|| hierarchy(line, HierarchyError::NoOpenTranscript(feature.feature_type())))?;

        let expected = open.transcript.id();
        let found = feature.transcript_id().unwrap_or_default();
        if expected != found {
            return Err(hierarchy(
                line,
                HierarchyError::TranscriptIdMismatch {
                    expected: expected.to_string(),
                    found: found.to_string(),
                },
            ));
        }
        Ok(open)
    }
}

/// Decodes the next gene from `source`.
///
/// Returns `Ok(None)` once the source is exhausted. Blank lines and `#`
/// comment lines are skipped. After an error the state is undefined and the
/// source should not be decoded further.
///
/// # Example
///
/// ```rust, ignore
/// use gencode_gtf::{decode, DecodeState, TextLines};
///
/// let mut source = TextLines::new(text.as_bytes());
/// let mut state = DecodeState::new();
/// while let Some(gene) = decode(&mut source, &mut state)? {
///     println!("{} has {} transcripts", gene.gene_id(), gene.transcripts().len());
/// }
/// ```
pub fn decode<S: LineSource + ?Sized>(source: &mut S, state: &mut DecodeState) -> Result<Option<Gene>> {
    loop {
        let line_number = source.line_number();
        let Some(line) = source.peek_line()? else {
            return Ok(state.finish());
        };
        if is_skippable(line) {
            source.consume();
            continue;
        }

        let record = GtfRecord::parse(line).map_err(|source| GencodeError::LineFormat {
            line: line_number,
            source,
        })?;
        if record.feature_type == FeatureType::Gene && state.has_open_gene() {
            // leave the line for the next call
            return Ok(state.finish());
        }

        source.consume();
        if let Some(gene) = state.push(record, line_number)? {
            return Ok(Some(gene));
        }
    }
}

/// Pull-based decoder over one source, yielding one [`Gene`] per item.
///
/// The iterator stops after the first error.
pub struct HierarchyAssembler<S> {
    source: S,
    state: DecodeState,
    failed: bool,
}

impl<S: LineSource> HierarchyAssembler<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: DecodeState::new(),
            failed: false,
        }
    }

    /// Decodes the next gene; see [`decode`].
    pub fn decode(&mut self) -> Result<Option<Gene>> {
        if self.failed {
            return Ok(None);
        }
        let result = decode(&mut self.source, &mut self.state);
        self.failed = result.is_err();
        result
    }

    pub fn state(&self) -> AssemblyState {
        self.state.state()
    }

    pub fn genome_build(&self) -> Option<GenomeBuild> {
        self.state.genome_build()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: LineSource> Iterator for HierarchyAssembler<S> {
    type Item = Result<Gene>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode().transpose()
    }
}

#[inline(always)]
fn is_skippable(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with('#')
}

#[inline(always)]
fn hierarchy(line: usize, source: HierarchyError) -> GencodeError {
    GencodeError::Hierarchy { line, source }
}

fn promote(record: GtfRecord, schema: SchemaVersion, line: usize) -> Result<Feature> {
    Feature::from_record(record, schema).map_err(|source| GencodeError::LineFormat { line, source })
}

fn check_gene_membership(gene: &Gene, record: &GtfRecord) -> std::result::Result<(), HierarchyError> {
    if record.gene_id() != gene.gene_id() {
        return Err(HierarchyError::GeneIdMismatch {
            expected: gene.gene_id().to_string(),
            found: record.gene_id().to_string(),
        });
    }
    if record.contig != gene.contig() {
        return Err(HierarchyError::ContigMismatch {
            gene_id: gene.gene_id().to_string(),
            expected: gene.contig().to_string(),
            found: record.contig.clone(),
        });
    }
    if record.strand != gene.strand() {
        return Err(HierarchyError::StrandMismatch {
            gene_id: gene.gene_id().to_string(),
            expected: gene.strand(),
            found: record.strand,
        });
    }
    Ok(())
}

fn attach_to_exon(open: &mut OpenTranscript, feature: Feature) -> std::result::Result<(), HierarchyError> {
    let feature_type = feature.feature_type();
    let exon_number = feature.exon_number().unwrap_or_default();
    let Some(&idx) = open.exons.get(&exon_number) else {
        return Err(HierarchyError::ExonNotFound {
            feature: feature_type,
            transcript_id: open.transcript.id().to_string(),
            exon_number,
        });
    };

    let exon = &mut open.transcript.exons[idx];
    let occupied = match feature_type {
        FeatureType::Cds => exon.cds.replace(Cds::new(feature)).is_some(),
        FeatureType::StartCodon => exon.start_codon.replace(StartCodon::new(feature)).is_some(),
        _ => exon.stop_codon.replace(StopCodon::new(feature)).is_some(),
    };

    if occupied {
        return Err(HierarchyError::DuplicateExonChild {
            feature: feature_type,
            transcript_id: open.transcript.id().to_string(),
            exon_number,
        });
    }
    Ok(())
}
