// Error types for loading and resolving cty.dat / grid.dat data

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or reloading the reference data files
#[derive(Debug, Error)]
pub enum CtyError {
    /// The configured file could not be opened for reading
    #[error("cannot open {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Read failure part way through a stream
    #[error("read error: {0}")]
    Io(#[from] io::Error),

    /// A zone, coordinate or UTC offset field in an entity header did not parse
    #[error("invalid number in cty.dat line {line}: {text}")]
    InvalidNumber { line: usize, text: String },

    #[error("invalid continent id '{code}' in cty.dat line {line}")]
    UnknownContinent { code: String, line: usize },

    #[error("invalid override in cty.dat line {line} for prefix {prefix}: {source}")]
    InvalidOverride {
        prefix: String,
        line: usize,
        #[source]
        source: OverrideError,
    },

    #[error("duplicate prefix {key} in cty.dat line {line}")]
    DuplicatePrefix { key: String, line: usize },

    #[error("duplicate primary prefix {prefix} in cty.dat line {line}")]
    DuplicateEntity { prefix: String, line: usize },

    /// End of stream reached before a prefix list was closed with ';'
    #[error("unterminated prefix list starting at cty.dat line {line}")]
    UnterminatedPrefixList { line: usize },

    #[error("invalid cell in grid.dat line {line}: {text}")]
    InvalidGridCell { line: usize, text: String },
}

impl CtyError {
    /// True for malformed file content, false for I/O and availability failures
    pub fn is_data_format(&self) -> bool {
        !matches!(self, CtyError::Unavailable { .. } | CtyError::Io(_))
    }
}

/// Why an inline override annotation on a prefix could not be parsed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverrideError {
    #[error("{field} override '{value}' is not a number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("location override '{0}' is not lat/long")]
    InvalidLocation(String),

    #[error(transparent)]
    Continent(#[from] UnknownContinent),
}

/// Continent code outside AF, AN, AS, EU, NA, OC, SA
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid continent id: {0}")]
pub struct UnknownContinent(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_format_classification() {
        let missing = CtyError::Unavailable {
            path: PathBuf::from("/nope/cty.dat"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(!missing.is_data_format());

        let bad = CtyError::InvalidNumber { line: 12, text: "X:1:2".to_string() };
        assert!(bad.is_data_format());
        assert_eq!(bad.to_string(), "invalid number in cty.dat line 12: X:1:2");
    }

    #[test]
    fn test_override_error_message_names_prefix() {
        let err = CtyError::InvalidOverride {
            prefix: "KH6(3x)".to_string(),
            line: 4,
            source: OverrideError::InvalidNumber { field: "CQ zone", value: "3x".to_string() },
        };
        let msg = err.to_string();
        assert!(msg.contains("KH6(3x)"));
        assert!(msg.contains("line 4"));
    }
}
