use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::drafts::DraftError;

/// Detail the backend sends when the bearer token is past its TTL.
pub const TOKEN_EXPIRED: &str = "Authorisation token expired";

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unauthorized{}", suffix(.0))]
    Unauthorized(Option<String>),
    #[error("forbidden{}", suffix(.0))]
    Forbidden(Option<String>),
    #[error("not found{}", suffix(.0))]
    NotFound(Option<String>),
    #[error("conflict{}", suffix(.0))]
    Conflict(Option<String>),
    #[error("validation error{}", suffix(.0))]
    Validation(Option<String>),
    #[error("{status}{}", suffix(.detail))]
    Server {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("session expired, please log in again")]
    SessionExpired,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("session storage error: {0}")]
    SessionIo(#[from] std::io::Error),
    #[error("session format error: {0}")]
    SessionFormat(#[from] serde_json::Error),
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

fn suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

/// What the user was doing when an error surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Adding,
    Edit,
    Delete,
    Loading,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Adding => "Adding",
            Self::Edit => "Edit",
            Self::Delete => "Delete",
            Self::Loading => "Loading",
        };
        f.write_str(label)
    }
}

impl ClientError {
    pub(crate) fn from_status(status: StatusCode, detail: Option<String>) -> Self {
        match status.as_u16() {
            401 => Self::Unauthorized(detail),
            403 => Self::Forbidden(detail),
            404 => Self::NotFound(detail),
            409 => Self::Conflict(detail),
            422 => Self::Validation(detail),
            _ => Self::Server { status, detail },
        }
    }

    /// The `detail` string reported by the backend, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(detail)
            | Self::Forbidden(detail)
            | Self::NotFound(detail)
            | Self::Conflict(detail)
            | Self::Validation(detail)
            | Self::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_token_expired(&self) -> bool {
        matches!(self, Self::Unauthorized(Some(detail)) if detail == TOKEN_EXPIRED)
    }

    /// One-line status text for a failed user action.
    ///
    /// Draft errors are shown verbatim, backend errors as
    /// `"<action> failed: <detail>"` or `"<action> failed"` without a detail.
    pub fn status_message(&self, action: Action) -> String {
        if let Self::Draft(err) = self {
            return err.to_string();
        }
        match self.detail() {
            Some(detail) => format!("{action} failed: {detail}"),
            None => format!("{action} failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_variant() {
        let err = ClientError::from_status(StatusCode::NOT_FOUND, Some("x".to_string()));
        assert!(matches!(err, ClientError::NotFound(Some(_))));
        let err = ClientError::from_status(StatusCode::UNPROCESSABLE_ENTITY, None);
        assert!(matches!(err, ClientError::Validation(None)));
        let err = ClientError::from_status(StatusCode::BAD_GATEWAY, None);
        assert!(matches!(err, ClientError::Server { .. }));
    }

    #[test]
    fn only_the_expiry_detail_counts_as_expired() {
        assert!(ClientError::Unauthorized(Some(TOKEN_EXPIRED.to_string())).is_token_expired());
        assert!(
            !ClientError::Unauthorized(Some("Insufficient permission".to_string()))
                .is_token_expired()
        );
        assert!(!ClientError::Unauthorized(None).is_token_expired());
    }

    #[test]
    fn status_message_uses_detail_when_present() {
        let err = ClientError::Conflict(Some("Account already exists".to_string()));
        assert_eq!(
            err.status_message(Action::Adding),
            "Adding failed: Account already exists"
        );
        let err = ClientError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: None,
        };
        assert_eq!(err.status_message(Action::Delete), "Delete failed");
    }

    #[test]
    fn status_message_shows_draft_errors_verbatim() {
        let err = ClientError::from(DraftError::MissingTransferEnds);
        assert_eq!(
            err.status_message(Action::Adding),
            "The Transfer must have a source and a target"
        );
    }

    #[tokio::test]
    async fn panicked_task_becomes_an_error() {
        let join_err = tokio::spawn(async {
            if true {
                panic!("boom");
            }
        }).await.unwrap_err();
        let err = ClientError::from(join_err);
        assert!(matches!(err, ClientError::Task(_)));
        assert_eq!(err.status_message(Action::Loading), "Loading failed");
    }
}
