#![forbid(unsafe_code)]

use ob_core::SlugError;
use ob_core::ids::ClientId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt row: {0}")]
    CorruptRow(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("invalid step {0} (expected 1..=6)")]
    InvalidStep(i64),
    #[error("invalid slug: {0}")]
    InvalidSlug(#[from] SlugError),
    #[error("unknown client {0}")]
    UnknownClient(ClientId),
    #[error("slug already in use: {0}")]
    DuplicateSlug(String),
    #[error("client {0} already has a form")]
    DuplicateForm(ClientId),
    #[error("attachment already stored as {0}")]
    DuplicateAttachment(String),
}

/// Coarse failure classes callers map onto their own responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Duplicate,
    Storage,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::InvalidStep(_) | Self::InvalidSlug(_) => {
                ErrorKind::Validation
            }
            Self::UnknownClient(_) => ErrorKind::NotFound,
            Self::DuplicateSlug(_) | Self::DuplicateForm(_) | Self::DuplicateAttachment(_) => {
                ErrorKind::Duplicate
            }
            Self::Io(_) | Self::Sql(_) | Self::Json(_) | Self::CorruptRow(_) => ErrorKind::Storage,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::Sql(_) => "SQLITE",
            Self::Json(_) => "JSON",
            Self::CorruptRow(_) => "CORRUPT_ROW",
            Self::InvalidInput(message) if message.starts_with("RESET_REQUIRED") => {
                "RESET_REQUIRED"
            }
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidStep(_) => "INVALID_STEP",
            Self::InvalidSlug(_) => "INVALID_SLUG",
            Self::UnknownClient(_) => "UNKNOWN_CLIENT",
            Self::DuplicateSlug(_) => "DUPLICATE_SLUG",
            Self::DuplicateForm(_) => "DUPLICATE_FORM",
            Self::DuplicateAttachment(_) => "DUPLICATE_ATTACHMENT",
        }
    }
}
