//! Device hostname discovery from config or diff text.

use regex::Regex;

use crate::error::{CfgDiffError, Result};

/// Hostname reported when no pattern matches.
pub const UNKNOWN_HOSTNAME: &str = "HOSTNAME-IS-UNKNOW";

/// Ordered hostname patterns; the first capture group is the name.
#[derive(Debug, Clone, Default)]
pub struct HostnameMatcher {
    patterns: Vec<Regex>,
}

impl HostnameMatcher {
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

    /// First hostname found scanning `text` line by line, patterns in order
    /// per line. Surrounding `"` and `;` are stripped (Junos style).
    pub fn find(&self, text: &str) -> Option<String> {
        for line in text.split('\n') {
            for re in &self.patterns {
                let name = re
                    .captures(line)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().trim_matches(|c| c == '"' || c == ';'));
                if let Some(name) = name {
                    return Some(name.to_string());
                }
            }
        }
        None
    }

    /// Like [`find`](Self::find) but falls back to [`UNKNOWN_HOSTNAME`].
    pub fn find_or_unknown(&self, text: &str) -> String {
        self.find(text)
            .unwrap_or_else(|| UNKNOWN_HOSTNAME.to_string())
    }
}
