//! Noise filtering for device-generated churn (timestamps, counters,
//! serials) that changes on every poll.

use regex::Regex;

use crate::error::{CfgDiffError, Result};

/// Compiled, ordered set of "trash line" patterns.
///
/// Patterns use search semantics: a line is noise when any pattern matches
/// anywhere in it, markers included.
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    patterns: Vec<Regex>,
}

impl NoiseFilter {
    /// Compile `patterns` in order. Fails on the first invalid pattern.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|source| CfgDiffError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// A filter that matches nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_noise(&self, line: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(line))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
