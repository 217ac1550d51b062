use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rooranking_core::{AuthError, AvatarError, DatabaseError, RankingError, StorageError};
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

/// Hard failures. Validation and not-found outcomes that the caller can
/// correct are returned as soft `{success: false}` bodies by the handlers
/// instead of going through this type.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{resource}:{identifier} not found")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Admin access required")]
    AdminRequired,
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::AdminRequired => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.as_status_code(), self.to_string()).into_response()
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
            },
            DatabaseError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::NotAuthenticated => Self::NotAuthenticated,
            AuthError::AdminRequired => Self::AdminRequired,
            AuthError::Db(e) => e.into(),
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<RankingError> for ServerError {
    fn from(value: RankingError) -> Self {
        match value {
            RankingError::Db(e) => e.into(),
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<AvatarError> for ServerError {
    fn from(value: AvatarError) -> Self {
        match value {
            AvatarError::Db(e) => e.into(),
            AvatarError::Storage(e) => e.into(),
        }
    }
}

impl From<StorageError> for ServerError {
    fn from(value: StorageError) -> Self {
        Self::Unknown(value.to_string())
    }
}
