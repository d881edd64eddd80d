//! Error types for query validation and corpus access.

use serde::Serialize;

/// What went wrong with a single parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Malformed or out of range
    Invalid,
    /// Speaker selector names nobody in the roster or corpus
    UnknownSpeaker,
}

/// One offending field / 单个字段错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub kind: IssueKind,
    pub message: String,
}

impl FieldIssue {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            kind: IssueKind::Invalid,
            message: message.into(),
        }
    }

    pub fn repeated(field: &'static str) -> Self {
        Self::invalid(field, "given more than once")
    }

    pub fn unknown_speaker(name: &str) -> Self {
        Self {
            field: "speaker",
            kind: IssueKind::UnknownSpeaker,
            message: format!("unknown speaker `{}`", name),
        }
    }
}

/// Every violated field of a request, in parameter order / 参数校验错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.summary())]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// `field: message` per line
    pub fn summary(&self) -> String {
        self.issues
            .iter()
            .map(|issue| format!("{}: {}", issue.field, issue.message))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_unknown_speaker(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.kind == IssueKind::UnknownSpeaker)
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.issues.iter().map(|issue| issue.field).collect()
    }
}

/// Corpus store failures / 语料库错误
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be queried (connectivity, corruption)
    #[error("corpus store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}
