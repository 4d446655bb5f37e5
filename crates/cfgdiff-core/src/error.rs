//! Error taxonomy for cfgdiff.

/// cfgdiff errors.
#[derive(Debug, thiserror::Error)]
pub enum CfgDiffError {
    /// A VLAN range token is neither an integer nor a `lo-hi` pair.
    #[error("malformed VLAN range token: {token:?}")]
    MalformedRange { token: String },

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("settings error: {0}")]
    Settings(String),

    #[error("settings parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("diff command failed for {file}: {stderr}")]
    DiffCommand { file: String, stderr: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CfgDiffError {
    pub(crate) fn malformed(token: &str) -> Self {
        CfgDiffError::MalformedRange {
            token: token.to_string(),
        }
    }
}

/// Result type for cfgdiff operations.
pub type Result<T> = std::result::Result<T, CfgDiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_range_display() {
        let err = CfgDiffError::malformed("10-x");
        assert!(err.to_string().contains("malformed VLAN range"));
        assert!(err.to_string().contains("10-x"));
    }

    #[test]
    fn test_invalid_pattern_keeps_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = CfgDiffError::InvalidPattern {
            pattern: "(".to_string(),
            source,
        };
        assert!(err.to_string().contains("invalid pattern"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_diff_command_error() {
        let err = CfgDiffError::DiffCommand {
            file: "core-sw1.cfg".to_string(),
            stderr: "fatal: bad revision 'HEAD^'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("core-sw1.cfg"));
        assert!(msg.contains("bad revision"));
    }
}
