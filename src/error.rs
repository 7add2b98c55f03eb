// ===============================
// src/error.rs
// ===============================
use thiserror::Error;

use crate::config::ConfigError;
use crate::ingest::InputError;

/// Tag untuk membedakan jenis kegagalan valuasi tanpa inspeksi tipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    DomainRejection,
    ParseFailure,
}

impl ErrorKind {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::DomainRejection => "rejected",
            ErrorKind::ParseFailure => "malformed",
        }
    }
}

/// Failure of one bond's request -> response pipeline.
#[derive(Debug, Error)]
pub enum ValuationError {
    /// Network failure or non-2xx status from SBCPrice.
    #[error("transport error: {message}")]
    Transport { status: Option<u16>, message: String },

    /// The calculator answered but refused the bond parameters.
    #[error("rejected by calculator: {message}")]
    Rejected { message: String },

    /// Response matched neither the results table nor the error list.
    #[error("malformed calculator response: {0}")]
    Malformed(String),
}

impl ValuationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValuationError::Transport { .. } => ErrorKind::Transport,
            ValuationError::Rejected { .. } => ErrorKind::DomainRejection,
            ValuationError::Malformed(_) => ErrorKind::ParseFailure,
        }
    }

    /// HTTP status when the calculator answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ValuationError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

/// Everything `main` can surface to the user.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Valuation(#[from] ValuationError),
    #[error("output failed: {0}")]
    Output(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_each_variant() {
        let t = ValuationError::Transport { status: Some(503), message: "HTTP 503".into() };
        let r = ValuationError::Rejected { message: "Invalid serial number".into() };
        let m = ValuationError::Malformed("no table".into());
        assert_eq!(t.kind(), ErrorKind::Transport);
        assert_eq!(r.kind(), ErrorKind::DomainRejection);
        assert_eq!(m.kind(), ErrorKind::ParseFailure);
        assert_eq!(r.kind().label(), "rejected");
    }

    #[test]
    fn rejection_message_is_carried_verbatim() {
        let r = ValuationError::Rejected { message: "Invalid serial number".into() };
        assert!(r.to_string().ends_with("Invalid serial number"));
    }
}
