use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum AggregateError {
    #[error("{key} not in valid options ({})", crate::scope::VALID_OPTIONS.join(", "))]
    InvalidOption { key: String },

    #[error("team name {team} is invalid; teams: {}", valid.join(", "))]
    InvalidTeam { team: String, valid: Vec<String> },

    #[error("invalid {option}: {reason}")]
    InvalidRange { option: &'static str, reason: String },

    #[error("there are no fixtures corresponding with the query (after {option})")]
    EmptyResult { option: &'static str },

    #[error("missing artifact {}: {source}", path.display())]
    MissingArtifact {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed artifact {artifact}: {reason}")]
    MalformedArtifact { artifact: String, reason: String },
}

impl AggregateError {
    pub fn malformed(artifact: impl Into<String>, reason: impl ToString) -> Self {
        AggregateError::MalformedArtifact {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }

    pub fn range(option: &'static str, reason: impl Into<String>) -> Self {
        AggregateError::InvalidRange {
            option,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AggregateError>;
