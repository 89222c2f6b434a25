use std::fmt;
use std::fmt::Formatter;

use serde::Deserialize;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Body of a publish request, as sent by the submission form.
/// The form also sends `contentType`, which is ignored.
#[derive(Deserialize, Debug, Default)]
pub struct PostSubmission {
    pub title: Option<String>,
    pub theme: Option<String>,
    pub content: Option<String>,
    pub passkey: Option<String>,
}

/// A submission that passed the passkey and required field checks
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSubmission {
    pub title: String,
    pub theme: String,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Invalid passkey")]
    InvalidPasskey,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid theme: {0}")]
    InvalidTheme(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

/// Shared secret every submission has to carry
#[derive(Clone)]
pub struct Passkey(String);

impl Passkey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Constant-time equality, so response timing says nothing about the secret
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl fmt::Debug for Passkey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Passkey(***)")
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// A theme names one directory under `blogs/` and one page at the site root
fn is_valid_theme(theme: &str) -> bool {
    theme != "." && theme != ".." && !theme.contains(['/', '\\'])
}

impl PostSubmission {
    pub fn from_json(body: &[u8]) -> Result<Self, SubmissionError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Passkey first, then the required fields
    pub fn validate(self, passkey: &Passkey) -> Result<ValidSubmission, SubmissionError> {
        match self.passkey {
            Some(ref candidate) if passkey.matches(candidate) => {}
            _ => return Err(SubmissionError::InvalidPasskey),
        }

        match (non_empty(self.title), non_empty(self.theme), non_empty(self.content)) {
            (Some(_), Some(theme), Some(_)) if !is_valid_theme(&theme) => Err(SubmissionError::InvalidTheme(theme)),
            (Some(title), Some(theme), Some(content)) => Ok(ValidSubmission { title, theme, content }),
            _ => Err(SubmissionError::MissingFields),
        }
    }
}
