use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::detect::{detect_compression, Compression};
use crate::error::Result;

/// Line iterator with one line of lookahead.
///
/// The assembler peeks at the next line to find where a gene ends without
/// consuming the first line of the following gene.
pub trait LineSource {
    /// Returns the next line, without its terminator, leaving it unconsumed.
    fn peek_line(&mut self) -> io::Result<Option<&str>>;

    /// Drops the line returned by the last `peek_line`.
    fn consume(&mut self);

    /// 1-based number of the line `peek_line` returns.
    fn line_number(&self) -> usize;

    fn next_line(&mut self) -> io::Result<Option<String>> {
        let line = self.peek_line()?.map(str::to_owned);
        if line.is_some() {
            self.consume();
        }
        Ok(line)
    }
}

/// [`LineSource`] over any buffered reader.
///
/// # Example
///
/// ```rust, ignore
/// use gencode_gtf::{LineSource, TextLines};
///
/// let mut lines = TextLines::new("a\nb\n".as_bytes());
/// assert_eq!(lines.peek_line()?, Some("a"));
/// assert_eq!(lines.next_line()?, Some("a".to_string()));
/// assert_eq!(lines.line_number(), 2);
/// ```
pub struct TextLines<R> {
    reader: R,
    buffer: String,
    peeked: bool,
    eof: bool,
    consumed: usize,
}

impl<R: BufRead> TextLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::with_capacity(512),
            peeked: false,
            eof: false,
            consumed: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> LineSource for TextLines<R> {
    fn peek_line(&mut self) -> io::Result<Option<&str>> {
        if !self.peeked && !self.eof {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                self.eof = true;
            } else {
                let trimmed = self.buffer.trim_end_matches(['\n', '\r']).len();
                self.buffer.truncate(trimmed);
                self.peeked = true;
            }
        }

        if self.eof {
            Ok(None)
        } else {
            Ok(Some(self.buffer.as_str()))
        }
    }

    fn consume(&mut self) {
        if self.peeked {
            self.peeked = false;
            self.consumed += 1;
        }
    }

    fn line_number(&self) -> usize {
        self.consumed + 1
    }
}

/// Boxed reader used for files on disk.
pub type FileLines = TextLines<Box<dyn BufRead + Send>>;

/// Opens a GTF file, plain or gzip-compressed, as a line source.
///
/// # Errors
///
/// Returns an error if the extension is not a GTF extension or the file
/// cannot be opened.
pub fn open_path(path: &Path) -> Result<FileLines> {
    let compression = detect_compression(path)?;
    let file = File::open(path)?;
    let reader: Box<dyn BufRead + Send> = match compression {
        Compression::None => Box::new(BufReader::with_capacity(128 * 1024, file)),
        Compression::Gzip => Box::new(BufReader::with_capacity(
            128 * 1024,
            MultiGzDecoder::new(file),
        )),
    };
    Ok(TextLines::new(reader))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let mut lines = TextLines::new("first\r\nsecond\n\nlast".as_bytes());

        assert_eq!(lines.line_number(), 1);
        assert_eq!(lines.peek_line().unwrap(), Some("first"));
        assert_eq!(lines.peek_line().unwrap(), Some("first"));
        assert_eq!(lines.next_line().unwrap(), Some("first".to_string()));
        assert_eq!(lines.line_number(), 2);
        assert_eq!(lines.next_line().unwrap(), Some("second".to_string()));
        assert_eq!(lines.next_line().unwrap(), Some(String::new()));
        assert_eq!(lines.next_line().unwrap(), Some("last".to_string()));
        assert_eq!(lines.peek_line().unwrap(), None);
        assert_eq!(lines.next_line().unwrap(), None);
        assert_eq!(lines.line_number(), 5);
    }

    #[test]
    fn test_consume_without_peek_is_noop() {
        let mut lines = TextLines::new("a\nb\n".as_bytes());
        lines.consume();
        assert_eq!(lines.next_line().unwrap(), Some("a".to_string()));
    }
}
