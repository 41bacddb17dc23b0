use flate2::write::GzEncoder;
use flate2::Compression as GzCompression;
use gencode_gtf::detect::{detect_compression, Compression};
use gencode_gtf::{can_decode, validate_header};
use indoc::indoc;
use std::io::Write;
use std::path::{Path, PathBuf};

const GENCODE_HEADER: &str = indoc! {"
    ##description: evidence-based annotation of the human genome (GRCh38), version 43 (Ensembl 109)
    ##provider: GENCODE
    ##contact: gencode-help@ebi.ac.uk
    ##format: gtf
    ##date: 2022-11-29
"};

const ENSEMBL_HEADER: &str = indoc! {"
    #!genome-build GRCh38.p13
    #!genome-version GRCh38
    #!genome-date 2013-12
    #!genome-build-accession NCBI:GCA_000001405.28
    #!genebuild-last-updated 2019-06
"};

const GENE: &str = "chr1\tENSEMBL\tgene\t30366\t30503\t.\t+\t.\tgene_id \"ENSG00000284332.1\"; gene_type \"miRNA\"; gene_name \"MIR1302-2\"; level 3;\n";

/// Writes a file to the temporary directory and returns its path.
fn write_temp_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Writes gz-compressed contents to a file and returns its path.
fn write_gzip_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let mut encoder = GzEncoder::new(Vec::new(), GzCompression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    let gz = encoder.finish().unwrap();

    let path = dir.join(name);
    std::fs::write(&path, gz).unwrap();
    path
}

/// Ensures plain and gzip GTF extensions are recognized.
#[test]
fn detect_gtf_extensions() {
    assert_eq!(
        detect_compression(Path::new("gencode.v43.annotation.gtf")).unwrap(),
        Compression::None
    );
    let gz = detect_compression(Path::new("gencode.v43.annotation.gtf.gz")).unwrap();
    assert_eq!(gz, Compression::Gzip);
    assert!(gz.is_compressed());
    assert_eq!(
        detect_compression(Path::new("sample.gtf.gzip")).unwrap(),
        Compression::Gzip
    );
}

/// Rejects other annotation formats by extension.
#[test]
fn detect_rejects_other_formats() {
    assert!(detect_compression(Path::new("gencode.v43.annotation.gff3")).is_err());
    assert!(detect_compression(Path::new("sample.bed.gz")).is_err());
    assert!(detect_compression(Path::new("sample.gtf.zst")).is_err());
    assert!(detect_compression(Path::new("sample")).is_err());
}

/// A readable GTF with a GENCODE header is accepted.
#[test]
fn can_decode_gencode_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp_file(
        dir.path(),
        "gencode.v43.gtf",
        &format!("{GENCODE_HEADER}{GENE}"),
    );
    assert!(can_decode(&path));
}

/// Gzip input is inspected after decompression.
#[test]
fn can_decode_gzipped_gencode_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gzip_file(
        dir.path(),
        "gencode.v43.gtf.gz",
        &format!("{GENCODE_HEADER}{GENE}"),
    );
    assert!(can_decode(&path));
}

/// An Ensembl header is a valid GTF header but not a GENCODE one.
#[test]
fn can_decode_rejects_ensembl_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp_file(
        dir.path(),
        "Homo_sapiens.GRCh38.112.gtf",
        &format!("{ENSEMBL_HEADER}{GENE}"),
    );
    assert!(!can_decode(&path));

    let lines = ENSEMBL_HEADER.lines().collect::<Vec<_>>();
    assert!(!validate_header(&lines));
}

/// The extension alone is not enough.
#[test]
fn can_decode_rejects_missing_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp_file(dir.path(), "no_header.gtf", GENE);
    assert!(!can_decode(&path));

    let truncated = GENCODE_HEADER.lines().take(4).collect::<Vec<_>>().join("\n");
    let path = write_temp_file(dir.path(), "short.gtf", &format!("{truncated}\n{GENE}"));
    assert!(!can_decode(&path));
}

/// A GENCODE file under a non-GTF name is rejected.
#[test]
fn can_decode_rejects_wrong_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp_file(
        dir.path(),
        "gencode.v43.gff3",
        &format!("{GENCODE_HEADER}{GENE}"),
    );
    assert!(!can_decode(&path));
}
