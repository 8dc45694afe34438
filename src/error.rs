//! Error and warning types for the remapping pipeline.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::mapping::Tier;

/// Fatal errors. Anything here stops the run.
#[derive(Debug, Error)]
pub enum RemapError {
    /// An input, mapping, corpus or dictionary path is missing or unreadable.
    #[error("cannot read {}: {source}", .path.display())]
    Configuration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// An output or report file could not be written.
    #[error("cannot write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The reference corpus folder held no readable text.
    #[error("reference corpus {} contains no readable text files", .path.display())]
    EmptyCorpus { path: PathBuf },
}

impl RemapError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Configuration {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }
}

/// Which key of a rule collided with an earlier rule in the same tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedefinedKey {
    Token,
    Code,
}

impl fmt::Display for RedefinedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token => write!(f, "input token"),
            Self::Code => write!(f, "code"),
        }
    }
}

/// Recoverable problems found while loading a mapping file.
///
/// The offending line is skipped (or, for redefinitions, overrides the
/// earlier rule) and loading carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleWarning {
    #[error("line {line}: no '~' between input and output token in {text:?}, rule skipped")]
    MissingTokenSeparator { line: usize, text: String },
    #[error("line {line}: empty code, rule skipped")]
    EmptyCode { line: usize },
    #[error("line {line}: empty input token, rule skipped")]
    EmptyToken { line: usize },
    #[error("line {line}: {tier} {kind} {value:?} redefined, later rule wins")]
    Redefined {
        line: usize,
        tier: Tier,
        kind: RedefinedKey,
        value: String,
    },
}

impl RuleWarning {
    pub fn line(&self) -> usize {
        match self {
            Self::MissingTokenSeparator { line, .. }
            | Self::EmptyCode { line }
            | Self::EmptyToken { line }
            | Self::Redefined { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_path() {
        let err = RemapError::read(
            "missing/mapping.txt",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("missing/mapping.txt"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_redefined_warning_message() {
        let w = RuleWarning::Redefined {
            line: 7,
            tier: Tier::Initial,
            kind: RedefinedKey::Token,
            value: "4o".to_string(),
        };
        assert_eq!(w.line(), 7);
        assert_eq!(
            w.to_string(),
            "line 7: initial input token \"4o\" redefined, later rule wins"
        );
    }
}
