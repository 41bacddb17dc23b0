use flate2::write::GzEncoder;
use flate2::Compression as GzCompression;
use gencode_gtf::{run, Config, GencodeError, GenomeBuild, HeaderError};
use indoc::indoc;
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER: &str = indoc! {"
    ##description: evidence-based annotation of the human genome (GRCh38), version 43 (Ensembl 109)
    ##provider: GENCODE
    ##contact: gencode-help@ebi.ac.uk
    ##format: gtf
    ##date: 2022-11-29
"};

const LEGACY_HEADER: &str = indoc! {"
    ##description: evidence-based annotation of the human genome (GRCh37), version 19 (Ensembl 74)
    ##provider: GENCODE
    ##contact: gencode@sanger.ac.uk
    ##format: gtf
    ##date: 2013-12-05
"};

// canonical attribute order already, so output equals input
const GENES: &str = indoc! {"
    chr1\tENSEMBL\tgene\t30366\t30503\t.\t+\t.\tgene_id \"ENSG00000284332.1\"; gene_type \"miRNA\"; gene_name \"MIR1302-2\"; level 3;
    chr1\tENSEMBL\ttranscript\t30366\t30503\t.\t+\t.\tgene_id \"ENSG00000284332.1\"; transcript_id \"ENST00000607096.1\"; gene_type \"miRNA\"; gene_name \"MIR1302-2\"; transcript_type \"miRNA\"; transcript_name \"MIR1302-2-201\"; level 3; tag \"basic\";
    chr1\tENSEMBL\texon\t30366\t30503\t.\t+\t.\tgene_id \"ENSG00000284332.1\"; transcript_id \"ENST00000607096.1\"; gene_type \"miRNA\"; gene_name \"MIR1302-2\"; transcript_type \"miRNA\"; transcript_name \"MIR1302-2-201\"; exon_number 1; exon_id \"ENSE00003695741.1\"; level 3; tag \"basic\";
    chr1\tHAVANA\tgene\t65419\t71585\t.\t+\t.\tgene_id \"ENSG00000186092.7\"; gene_type \"protein_coding\"; gene_name \"OR4F5\"; level 2;
    chr1\tHAVANA\ttranscript\t65419\t71585\t.\t+\t.\tgene_id \"ENSG00000186092.7\"; transcript_id \"ENST00000641515.2\"; gene_type \"protein_coding\"; gene_name \"OR4F5\"; transcript_type \"protein_coding\"; transcript_name \"OR4F5-201\"; level 2; protein_id \"ENSP00000493376.2\";
    chr1\tHAVANA\texon\t65419\t65433\t.\t+\t.\tgene_id \"ENSG00000186092.7\"; transcript_id \"ENST00000641515.2\"; gene_type \"protein_coding\"; gene_name \"OR4F5\"; transcript_type \"protein_coding\"; transcript_name \"OR4F5-201\"; exon_number 1; exon_id \"ENSE00003812156.1\"; level 2;
    chr1\tHAVANA\texon\t65520\t65573\t.\t+\t.\tgene_id \"ENSG00000186092.7\"; transcript_id \"ENST00000641515.2\"; gene_type \"protein_coding\"; gene_name \"OR4F5\"; transcript_type \"protein_coding\"; transcript_name \"OR4F5-201\"; exon_number 2; exon_id \"ENSE00003813641.1\"; level 2;
    chr1\tHAVANA\tCDS\t65565\t65573\t.\t+\t0\tgene_id \"ENSG00000186092.7\"; transcript_id \"ENST00000641515.2\"; gene_type \"protein_coding\"; gene_name \"OR4F5\"; transcript_type \"protein_coding\"; transcript_name \"OR4F5-201\"; exon_number 2; exon_id \"ENSE00003813641.1\"; level 2; protein_id \"ENSP00000493376.2\";
    chr1\tHAVANA\tstart_codon\t65565\t65567\t.\t+\t0\tgene_id \"ENSG00000186092.7\"; transcript_id \"ENST00000641515.2\"; gene_type \"protein_coding\"; gene_name \"OR4F5\"; transcript_type \"protein_coding\"; transcript_name \"OR4F5-201\"; exon_number 2; exon_id \"ENSE00003813641.1\"; level 2;
    chr1\tHAVANA\tUTR\t65419\t65433\t.\t+\t.\tgene_id \"ENSG00000186092.7\"; transcript_id \"ENST00000641515.2\"; gene_type \"protein_coding\"; gene_name \"OR4F5\"; transcript_type \"protein_coding\"; transcript_name \"OR4F5-201\"; exon_number 1; exon_id \"ENSE00003812156.1\"; level 2;
"};

const LEGACY_GENE: &str = indoc! {"
    chr1\tHAVANA\tgene\t11869\t14412\t.\t+\t.\tgene_id \"ENSG00000223972.4\"; transcript_id \"ENSG00000223972.4\"; gene_type \"pseudogene\"; gene_status \"KNOWN\"; gene_name \"DDX11L1\"; transcript_type \"pseudogene\"; transcript_status \"KNOWN\"; transcript_name \"DDX11L1\"; level 2;
"};

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

/// Decodes a plain GTF, counts its features and writes it back unchanged.
#[test]
fn convert_plain_gtf() {
    let dir = tempfile::tempdir().unwrap();
    let contents = format!("{HEADER}{GENES}");
    let input = write_temp_file(dir.path(), "gencode.v43.annotation.gtf", &contents);
    let outdir = dir.path().join("out");

    let config = Config {
        inputs: vec![input.clone()],
        outdir: Some(outdir.clone()),
        threads: 1,
        skip_header_check: false,
    };
    let stats = run(&config).unwrap();

    assert_eq!(stats.files.len(), 1);
    let summary = &stats.files[0];
    assert_eq!(summary.path, input);
    assert_eq!(summary.genome_build, Some(GenomeBuild::Hg38));
    assert_eq!(summary.genes, 2);
    assert_eq!(summary.transcripts, 2);
    assert_eq!(summary.exons, 3);
    assert_eq!(summary.cds, 1);
    assert_eq!(summary.start_codons, 1);
    assert_eq!(summary.stop_codons, 0);
    assert_eq!(summary.utrs, 1);
    assert_eq!(summary.selenocysteines, 0);

    let output = outdir.join("gencode.v43.annotation.canonical.gtf");
    assert_eq!(summary.output.as_deref(), Some(output.as_path()));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), contents);
}

/// Decodes a gzipped GTF next to a legacy one, results in input order.
#[test]
fn convert_gzip_and_legacy_in_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let current = write_gzip_file(
        dir.path(),
        "gencode.v43.annotation.gtf.gz",
        &format!("{HEADER}{GENES}"),
    );
    let legacy = write_temp_file(
        dir.path(),
        "gencode.v19.annotation.gtf",
        &format!("{LEGACY_HEADER}{LEGACY_GENE}"),
    );
    let outdir = dir.path().join("out");

    let config = Config {
        inputs: vec![current, legacy],
        outdir: Some(outdir.clone()),
        threads: 2,
        skip_header_check: false,
    };
    let stats = run(&config).unwrap();

    assert_eq!(stats.files[0].genome_build, Some(GenomeBuild::Hg38));
    assert_eq!(stats.files[0].genes, 2);
    assert_eq!(stats.files[1].genome_build, Some(GenomeBuild::Hg19));
    assert_eq!(stats.files[1].genes, 1);
    assert_eq!(stats.files[1].transcripts, 0);

    let output = std::fs::read_to_string(outdir.join("gencode.v43.annotation.canonical.gtf")).unwrap();
    assert_eq!(output, format!("{HEADER}{GENES}"));
    let output = std::fs::read_to_string(outdir.join("gencode.v19.annotation.canonical.gtf")).unwrap();
    assert_eq!(output, format!("{LEGACY_HEADER}{LEGACY_GENE}"));
}

/// Without an output directory nothing is written.
#[test]
fn convert_without_outdir() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp_file(dir.path(), "a.gtf", &format!("{HEADER}{GENES}"));

    let config = Config {
        inputs: vec![input],
        outdir: None,
        threads: 1,
        skip_header_check: false,
    };
    let stats = run(&config).unwrap();

    assert!(stats.files[0].output.is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

/// A missing header fails the run unless the check is skipped.
#[test]
fn convert_headerless_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp_file(dir.path(), "headerless.gtf", GENES);

    let mut config = Config {
        inputs: vec![input],
        outdir: None,
        threads: 1,
        skip_header_check: false,
    };
    let err = run(&config).unwrap_err();
    assert!(matches!(err, GencodeError::Header(HeaderError::LineCount(0))));

    config.skip_header_check = true;
    let stats = run(&config).unwrap();
    assert_eq!(stats.files[0].genes, 2);
}

/// Structural errors abort the run with the offending line.
#[test]
fn convert_reports_hierarchy_error() {
    let dir = tempfile::tempdir().unwrap();
    let orphan = GENES.lines().skip(1).collect::<Vec<_>>().join("\n");
    let input = write_temp_file(dir.path(), "orphan.gtf", &format!("{HEADER}{orphan}\n"));

    let config = Config {
        inputs: vec![input],
        outdir: None,
        threads: 1,
        skip_header_check: false,
    };
    let err = run(&config).unwrap_err();
    assert!(matches!(err, GencodeError::Hierarchy { line: 6, .. }));
}

/// Unsupported extensions are rejected before opening.
#[test]
fn convert_rejects_gff3() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_temp_file(dir.path(), "a.gff3", &format!("{HEADER}{GENES}"));

    let config = Config {
        inputs: vec![input],
        outdir: None,
        threads: 1,
        skip_header_check: true,
    };
    assert!(matches!(
        run(&config).unwrap_err(),
        GencodeError::UnsupportedExtension(_)
    ));
}

/// Inputs with the same file name in different directories get distinct outputs.
#[test]
fn convert_same_name_inputs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("a")).unwrap();
    std::fs::create_dir(dir.path().join("b")).unwrap();

    let mut lines = GENES.lines();
    let first = lines.by_ref().take(3).collect::<Vec<_>>().join("\n");
    let second = lines.collect::<Vec<_>>().join("\n");
    let first = format!("{HEADER}{first}\n");
    let second = format!("{HEADER}{second}\n");
    let a = write_temp_file(&dir.path().join("a"), "x.gtf", &first);
    let b = write_temp_file(&dir.path().join("b"), "x.gtf", &second);
    let outdir = dir.path().join("out");

    let config = Config {
        inputs: vec![a, b],
        outdir: Some(outdir.clone()),
        threads: 2,
        skip_header_check: false,
    };
    let stats = run(&config).unwrap();

    let outputs = stats
        .files
        .iter()
        .map(|summary| summary.output.clone().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(outputs[0], outdir.join("x.0.canonical.gtf"));
    assert_eq!(outputs[1], outdir.join("x.1.canonical.gtf"));

    assert_eq!(std::fs::read_to_string(&outputs[0]).unwrap(), first);
    assert_eq!(std::fs::read_to_string(&outputs[1]).unwrap(), second);
    assert_eq!(std::fs::read_dir(&outdir).unwrap().count(), 2);
}
