//! Compiled regular-expression values (`pattern`, §3).

use std::fmt;
use std::sync::Arc;

use crate::error::ValueError;

/// A compiled regex plus its retained source text, so `Pattern` can be
/// compared and displayed without re-parsing or re-printing the `Regex`
/// internals (`regex::Regex` implements neither `PartialEq` nor
/// `Display`).
#[derive(Clone)]
pub struct Pattern {
    source: Arc<str>,
    compiled: Arc<regex::Regex>,
}

impl Pattern {
    pub fn new(source: impl AsRef<str>) -> Result<Self, ValueError> {
        let source = source.as_ref();
        let compiled = regex::Regex::new(source)
            .map_err(|e| ValueError::InvalidPattern(source.to_string(), e))?;
        Ok(Self {
            source: Arc::from(source),
            compiled: Arc::new(compiled),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.compiled.is_match(haystack)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern(/{}/)", self.source)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_against_haystack() {
        let p = Pattern::new("http.*").unwrap();
        assert!(p.is_match("http_req"));
        assert!(!p.is_match("dns"));
    }

    #[test]
    fn equality_is_source_based() {
        let a = Pattern::new("a.*").unwrap();
        let b = Pattern::new("a.*").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(Pattern::new("(unclosed").is_err());
    }
}
