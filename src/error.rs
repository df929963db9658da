//! Error types shared by the analysis and rewrite pipeline.

use thiserror::Error;

/// Errors raised while splicing text into a source file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectError {
    #[error("insertion offset {offset} is past the end of the text ({len} bytes)")]
    OffsetOutOfBounds { offset: usize, len: usize },
    #[error("insertion offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// Per-file failures. None of them abort a batch.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{path}: syntax error near line {line}")]
    Parse { path: String, line: usize },

    #[error("{0}: no analyzer registered for this file type")]
    UnsupportedLanguage(String),

    #[error("{path}: {message}")]
    Analysis { path: String, message: String },

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Inject {
        path: String,
        #[source]
        source: InjectError,
    },
}

impl PipelineError {
    /// Create an I/O error scoped to a file.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an analysis error from any displayable failure.
    pub fn analysis(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Analysis {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Short category name, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Parse { .. } => "parse",
            PipelineError::UnsupportedLanguage(_) => "unsupported",
            PipelineError::Analysis { .. } => "analysis",
            PipelineError::Io { .. } => "io",
            PipelineError::Inject { .. } => "inject",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PipelineError::Parse {
            path: "Foo.cs".to_string(),
            line: 12,
        };
        assert_eq!(err.to_string(), "Foo.cs: syntax error near line 12");
        assert_eq!(err.kind(), "parse");

        let err = PipelineError::Inject {
            path: "Foo.cs".to_string(),
            source: InjectError::OffsetOutOfBounds { offset: 10, len: 4 },
        };
        assert!(err.to_string().contains("past the end"));
    }
}
