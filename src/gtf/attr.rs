use std::fmt;

use super::ParseError;

/// A single `key value;` pair from the attribute column.
///
/// The quoting of the value is remembered so that open-vocabulary keys are
/// written back exactly as they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    key: String,
    value: String,
    quoted: bool,
}

impl Attribute {
    /// Creates a pair rendered as `key "value";`.
    pub fn quoted(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            quoted: true,
        }
    }

    /// Creates a pair rendered as `key value;`.
    pub fn bare(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            quoted: false,
        }
    }

    #[inline(always)]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline(always)]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline(always)]
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    pub(crate) fn with_quoting(mut self, quoted: bool) -> Self {
        self.quoted = quoted;
        self
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.quoted {
            write!(f, "{} \"{}\";", self.key, self.value)
        } else {
            write!(f, "{} {};", self.key, self.value)
        }
    }
}

/// Ordered, duplicate-permitting multimap over the attribute column.
///
/// Keys are never checked against a vocabulary: `tag` may repeat and any
/// future key is carried verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pairs: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the 9th GTF column.
    ///
    /// Every pair must be terminated by `;`. Values are either double-quoted
    /// (any text without a `"`) or bare tokens such as `level 2`.
    ///
    /// # Example
    ///
    /// ```rust, ignore
    /// use gencode_gtf::gtf::Attributes;
    ///
    /// let attrs = Attributes::parse("gene_id \"ENSG00000223972.5\"; level 2; tag \"basic\";")?;
    /// assert_eq!(attrs.get("level"), Some("2"));
    /// ```
    pub fn parse(line: &str) -> Result<Attributes, ParseError> {
        let line = line.trim_end();
        if line.is_empty() {
            return Err(ParseError::EmptyAttributes);
        }

        let bytes = line.as_bytes();
        let len = bytes.len();
        let mut pairs = Vec::new();
        let mut pos = skip_whitespace(bytes, 0);

        while pos < len {
            let key_start = pos;
            while pos < len
                && !bytes[pos].is_ascii_whitespace()
                && bytes[pos] != b';'
                && bytes[pos] != b'"'
            {
                pos += 1;
            }
            let key = &line[key_start..pos];
            if key.is_empty() {
                return Err(ParseError::EmptyAttributeKey(line.to_string()));
            }

            pos = skip_whitespace(bytes, pos);
            if pos >= len || bytes[pos] == b';' {
                return Err(ParseError::MissingAttributeValue(key.to_string()));
            }

            let (value, quoted) = if bytes[pos] == b'"' {
                let open = pos + 1;
                let close = bytes[open..]
                    .iter()
                    .position(|b| *b == b'"')
                    .ok_or_else(|| ParseError::UnbalancedQuote(key.to_string()))?
                    + open;
                pos = close + 1;
                (&line[open..close], true)
            } else {
                let value_start = pos;
                while pos < len && bytes[pos] != b';' && bytes[pos] != b'"' {
                    pos += 1;
                }
                if pos < len && bytes[pos] == b'"' {
                    return Err(ParseError::UnbalancedQuote(key.to_string()));
                }
                (line[value_start..pos].trim_end(), false)
            };

            pos = skip_whitespace(bytes, pos);
            if pos >= len || bytes[pos] != b';' {
                return Err(ParseError::UnterminatedAttribute(key.to_string()));
            }
            pos = skip_whitespace(bytes, pos + 1);

            pairs.push(Attribute {
                key: key.to_string(),
                value: value.to_string(),
                quoted,
            });
        }

        Ok(Attributes { pairs })
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }

    /// Every value stored under `key`, in file order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |attr| attr.key == key)
            .map(|attr| attr.value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|attr| attr.key == key)
    }

    pub fn push(&mut self, attr: Attribute) {
        self.pairs.push(attr);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Removes and returns the first pair stored under `key`.
    pub(crate) fn take(&mut self, key: &str) -> Option<Attribute> {
        let idx = self.pairs.iter().position(|attr| attr.key == key)?;
        Some(self.pairs.remove(idx))
    }

    pub(crate) fn as_slice(&self) -> &[Attribute] {
        &self.pairs
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl Extend<Attribute> for Attributes {
    fn extend<I: IntoIterator<Item = Attribute>>(&mut self, iter: I) {
        self.pairs.extend(iter);
    }
}

impl IntoIterator for Attributes {
    type Item = Attribute;
    type IntoIter = std::vec::IntoIter<Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

#[inline(always)]
fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}
