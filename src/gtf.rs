mod attr;
pub use attr::*;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::schema::{self, SchemaVersion};

/// Number of tab-separated columns in a GTF data line.
pub const GTF_FIELDS: usize = 9;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

impl Strand {
    pub fn as_char(self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unknown => '.',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Strand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." => Ok(Strand::Unknown),
            _ => Err(ParseError::InvalidStrand(s.to_string())),
        }
    }
}

/// Reading frame of a coding segment.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Phase {
    Zero,
    One,
    Two,
    Absent,
}

impl Phase {
    pub fn value(self) -> Option<u8> {
        match self {
            Phase::Zero => Some(0),
            Phase::One => Some(1),
            Phase::Two => Some(2),
            Phase::Absent => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "."),
        }
    }
}

impl FromStr for Phase {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Phase::Zero),
            "1" => Ok(Phase::One),
            "2" => Ok(Phase::Two),
            "." => Ok(Phase::Absent),
            _ => Err(ParseError::InvalidPhase(s.to_string())),
        }
    }
}

/// Annotation pipeline that produced a line (2nd column).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum AnnotationSource {
    Ensembl,
    Havana,
}

impl fmt::Display for AnnotationSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnnotationSource::Ensembl => write!(f, "ENSEMBL"),
            AnnotationSource::Havana => write!(f, "HAVANA"),
        }
    }
}

impl FromStr for AnnotationSource {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENSEMBL" => Ok(AnnotationSource::Ensembl),
            "HAVANA" => Ok(AnnotationSource::Havana),
            _ => Err(ParseError::InvalidSource(s.to_string())),
        }
    }
}

/// Feature kinds found in the 3rd column of a GENCODE GTF.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum FeatureType {
    Gene,
    Transcript,
    Exon,
    Cds,
    StartCodon,
    StopCodon,
    Utr,
    Selenocysteine,
}

impl FeatureType {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureType::Gene => "gene",
            FeatureType::Transcript => "transcript",
            FeatureType::Exon => "exon",
            FeatureType::Cds => "CDS",
            FeatureType::StartCodon => "start_codon",
            FeatureType::StopCodon => "stop_codon",
            FeatureType::Utr => "UTR",
            FeatureType::Selenocysteine => "Selenocysteine",
        }
    }

    /// True for features that belong to a single exon and must carry its exon_number.
    pub fn is_exon_bound(self) -> bool {
        matches!(
            self,
            FeatureType::Exon | FeatureType::Cds | FeatureType::StartCodon | FeatureType::StopCodon
        )
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeatureType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gene" => Ok(FeatureType::Gene),
            "transcript" => Ok(FeatureType::Transcript),
            "exon" => Ok(FeatureType::Exon),
            "CDS" => Ok(FeatureType::Cds),
            "start_codon" => Ok(FeatureType::StartCodon),
            "stop_codon" => Ok(FeatureType::StopCodon),
            "UTR" => Ok(FeatureType::Utr),
            "Selenocysteine" => Ok(FeatureType::Selenocysteine),
            _ => Err(ParseError::InvalidFeatureType(s.to_string())),
        }
    }
}

/// One flat, typed GTF data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GtfRecord {
    pub contig: String,
    pub source: AnnotationSource,
    pub feature_type: FeatureType,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub phase: Phase,
    pub attributes: Attributes,
}

impl GtfRecord {
    /// Parses a single data line.
    ///
    /// Structural columns are validated strictly; the attribute column only
    /// has to contain the keys every GENCODE record of this feature type
    /// carries, everything else is kept as-is.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        let fields: [&str; GTF_FIELDS] = line
            .split('\t')
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|fields: Vec<&str>| ParseError::FieldCount(fields.len()))?;
        let [contig, source, feature, start, end, score, strand, phase, attr] = fields;

        if contig.is_empty() {
            return Err(ParseError::EmptyContig);
        }
        if score != "." {
            return Err(ParseError::InvalidScore(score.to_string()));
        }

        let start = parse_coordinate(start)?;
        let end = parse_coordinate(end)?;
        if start > end {
            return Err(ParseError::StartAfterEnd { start, end });
        }

        let feature_type = feature.parse::<FeatureType>()?;
        let attributes = Attributes::parse(attr)?;

        for &key in schema::required_keys(feature_type, SchemaVersion::Current) {
            if !attributes.contains(key) {
                return Err(ParseError::MissingAttribute {
                    key,
                    feature: feature_type,
                });
            }
        }
        if let Some(number) = attributes.get(schema::EXON_NUMBER) {
            if feature_type.is_exon_bound() && !matches!(number.parse::<u32>(), Ok(n) if n > 0) {
                return Err(ParseError::InvalidExonNumber(number.to_string()));
            }
        }

        Ok(Self {
            contig: contig.to_string(),
            source: source.parse()?,
            feature_type,
            start,
            end,
            strand: strand.parse()?,
            phase: phase.parse()?,
            attributes,
        })
    }

    #[inline(always)]
    pub fn gene_id(&self) -> &str {
        self.attributes.get(schema::GENE_ID).unwrap_or_default()
    }

    #[inline(always)]
    pub fn transcript_id(&self) -> Option<&str> {
        self.attributes.get(schema::TRANSCRIPT_ID)
    }

    #[inline(always)]
    pub fn exon_number(&self) -> Option<u32> {
        self.attributes
            .get(schema::EXON_NUMBER)
            .and_then(|n| n.parse().ok())
    }
}

fn parse_coordinate(token: &str) -> Result<u64, ParseError> {
    match token.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ParseError::InvalidCoordinate(token.to_string())),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty line")]
    Empty,
    #[error("expected 9 tab-separated fields, found {0}")]
    FieldCount(usize),
    #[error("empty contig name")]
    EmptyContig,
    #[error("unknown annotation source '{0}'")]
    InvalidSource(String),
    #[error("unknown feature type '{0}'")]
    InvalidFeatureType(String),
    #[error("invalid coordinate '{0}'")]
    InvalidCoordinate(String),
    #[error("start {start} is greater than end {end}")]
    StartAfterEnd { start: u64, end: u64 },
    #[error("invalid score '{0}', expected '.'")]
    InvalidScore(String),
    #[error("invalid strand '{0}'")]
    InvalidStrand(String),
    #[error("invalid phase '{0}'")]
    InvalidPhase(String),
    #[error("Empty attribute column")]
    EmptyAttributes,
    #[error("empty attribute key in '{0}'")]
    EmptyAttributeKey(String),
    #[error("attribute '{0}' has no value")]
    MissingAttributeValue(String),
    #[error("attribute '{0}' is not terminated by ';'")]
    UnterminatedAttribute(String),
    #[error("attribute '{0}' has an unbalanced quote")]
    UnbalancedQuote(String),
    #[error("{feature} record is missing required attribute '{key}'")]
    MissingAttribute {
        key: &'static str,
        feature: FeatureType,
    },
    #[error("exon_number '{0}' is not a positive integer")]
    InvalidExonNumber(String),
}
