//! GENCODE header validation.
//!
//! A GENCODE GTF starts with exactly five comment lines:
//!
//! ```text
//! ##description: evidence-based annotation of the human genome (GRCh38), version 43 (Ensembl 109)
//! ##provider: GENCODE
//! ##contact: gencode-help@ebi.ac.uk
//! ##format: gtf
//! ##date: 2022-11-29
//! ```
//!
//! Other GTF producers use the same `#` convention with different keys
//! (Ensembl writes `#!genome-build ...`); those files are not GENCODE and are
//! rejected here.

use std::io;

use crate::error::HeaderError;
use crate::source::LineSource;

/// Number of lines in a GENCODE header.
pub const HEADER_LINES: usize = 5;

const DESCRIPTION: &str = "##description:";
const PROVIDER: &str = "##provider: GENCODE";
const CONTACT: &str = "##contact:";
const FORMAT: &str = "##format: gtf";
const DATE: &str = "##date:";

const CONTACT_DOMAINS: [&str; 2] = ["sanger.ac.uk", "ebi.ac.uk"];

/// Returns true if `lines` form a GENCODE header.
pub fn validate_header<S: AsRef<str>>(lines: &[S]) -> bool {
    check_header(lines).is_ok()
}

/// Validates a header block and reports the first deviation found.
pub fn check_header<S: AsRef<str>>(lines: &[S]) -> Result<(), HeaderError> {
    if lines.len() != HEADER_LINES {
        return Err(HeaderError::LineCount(lines.len()));
    }
    let lines = lines
        .iter()
        .map(|line| line.as_ref().trim_end())
        .collect::<Vec<_>>();

    keyed_value(lines[0], 0, DESCRIPTION)?;
    literal(lines[1], 1, PROVIDER)?;

    let address = keyed_value(lines[2], 2, CONTACT)?;
    let domain_ok = address
        .rsplit_once('@')
        .filter(|(user, _)| !user.is_empty())
        .map(|(_, domain)| {
            CONTACT_DOMAINS
                .iter()
                .any(|accepted| domain == *accepted || domain.ends_with(&format!(".{accepted}")))
        })
        .unwrap_or(false);
    if !domain_ok {
        return Err(HeaderError::Contact(address.to_string()));
    }

    literal(lines[3], 3, FORMAT)?;
    keyed_value(lines[4], 4, DATE)?;

    Ok(())
}

/// Reads the leading comment block of a source.
///
/// Consumes every line starting with `#` before the first data line and
/// returns them; the source is left positioned at the first data line.
pub fn read_header<S: LineSource + ?Sized>(source: &mut S) -> io::Result<Vec<String>> {
    let mut header = Vec::with_capacity(HEADER_LINES);
    while let Some(line) = source.peek_line()? {
        if !line.starts_with('#') {
            break;
        }
        header.push(line.to_string());
        source.consume();
    }
    Ok(header)
}

fn keyed_value<'a>(
    line: &'a str,
    index: usize,
    prefix: &'static str,
) -> Result<&'a str, HeaderError> {
    let value = line
        .strip_prefix(prefix)
        .ok_or_else(|| HeaderError::Prefix {
            index,
            expected: prefix,
            found: line.to_string(),
        })?
        .trim();

    if value.is_empty() {
        return Err(HeaderError::EmptyValue { index });
    }
    Ok(value)
}

fn literal(line: &str, index: usize, expected: &'static str) -> Result<(), HeaderError> {
    if line == expected {
        Ok(())
    } else {
        Err(HeaderError::Prefix {
            index,
            expected,
            found: line.to_string(),
        })
    }
}
