use std::fmt;
use std::io::{self, Write};

use crate::model::{Feature, Gene};

/// Renders a whole gene tree as GTF text, one newline-terminated line per node.
///
/// Nodes are written in [`Gene::features`] order.
///
/// # Example
///
/// ```rust, ignore
/// use gencode_gtf::serialize;
///
/// let text = serialize(&gene);
/// assert!(text.starts_with("chr1\tENSEMBL\tgene\t"));
/// ```
pub fn serialize(gene: &Gene) -> String {
    let features = gene.features();
    let mut buffer = String::with_capacity(features.len() * 256);
    for feature in features {
        buffer.push_str(&feature.to_string());
        buffer.push('\n');
    }
    buffer
}

/// Writes a gene tree to `writer`; same output as [`serialize`].
pub fn write_gene<W: Write>(gene: &Gene, writer: &mut W) -> io::Result<()> {
    for feature in gene.features() {
        writeln!(writer, "{feature}")?;
    }
    Ok(())
}

/// A single GTF line, without the trailing newline.
///
/// The 9th column lists the canonical keys of the feature type in fixed
/// order (`gene_id`, `transcript_id`, `gene_type`, `gene_status`,
/// `gene_name`, `transcript_type`, `transcript_status`, `transcript_name`,
/// `exon_number`, `exon_id`, `level`, as far as they apply), then the
/// remaining attributes in the order they were read.
impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t.\t{}\t{}\t",
            self.contig(),
            self.source(),
            self.feature_type(),
            self.start(),
            self.end(),
            self.strand(),
            self.phase(),
        )?;

        let attributes = self
            .canonical_attributes()
            .iter()
            .chain(self.optional_attributes());
        for (idx, attr) in attributes.enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{attr}")?;
        }
        Ok(())
    }
}
