//! Error type for HTTP handlers.
//!
//! Every service error converges here; `IntoResponse` maps it to a status
//! code and a `{"detail": ...}` JSON body. Internal failures are logged and
//! answered with a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use favoritos_core::EmailError;

use crate::db::RepositoryError;
use crate::services::{
    CatalogError, CustomerServiceError, FavoriteServiceError, IdentityServiceError, TokenError,
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Identity(#[from] IdentityServiceError),

    #[error(transparent)]
    Customer(#[from] CustomerServiceError),

    #[error(transparent)]
    Favorite(#[from] FavoriteServiceError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            Self::Identity(err) => identity_status(err),
            Self::Customer(err) => customer_status(err),
            Self::Favorite(err) => favorite_status(err),
            Self::Catalog(err) => catalog_status(err),
            Self::Token(err) => token_status(err),
            Self::Repository(err) => repository_status(err),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "authentication required".to_owned(),
            ),
            Self::NotFound => (StatusCode::NOT_FOUND, "not found".to_owned()),
            Self::Internal(_) => internal(),
        }
    }
}

fn identity_status(err: &IdentityServiceError) -> (StatusCode, String) {
    match err {
        IdentityServiceError::EmailTaken | IdentityServiceError::SocialRoleMismatch => {
            (StatusCode::CONFLICT, err.to_string())
        }
        IdentityServiceError::WeakPassword => (StatusCode::BAD_REQUEST, err.to_string()),
        IdentityServiceError::Repository(err) => repository_status(err),
        IdentityServiceError::Credential(_) => internal(),
    }
}

fn customer_status(err: &CustomerServiceError) -> (StatusCode, String) {
    match err {
        CustomerServiceError::EmailTaken => (StatusCode::CONFLICT, err.to_string()),
        CustomerServiceError::WeakPassword => (StatusCode::BAD_REQUEST, err.to_string()),
        CustomerServiceError::Repository(err) => repository_status(err),
        CustomerServiceError::Credential(_) => internal(),
    }
}

fn favorite_status(err: &FavoriteServiceError) -> (StatusCode, String) {
    match err {
        FavoriteServiceError::CustomerNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        FavoriteServiceError::AlreadyFavorited { .. } => (StatusCode::CONFLICT, err.to_string()),
        FavoriteServiceError::Catalog(err) => catalog_status(err),
        FavoriteServiceError::Repository(err) => repository_status(err),
    }
}

fn catalog_status(err: &CatalogError) -> (StatusCode, String) {
    match err {
        CatalogError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CatalogError::Upstream { status, .. } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            err.to_string(),
        ),
        CatalogError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        // Unparseable 2xx body: an internal failure, details go to the log.
        CatalogError::Invalid(_) => internal(),
    }
}

fn token_status(err: &TokenError) -> (StatusCode, String) {
    match err {
        TokenError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
        _ => (StatusCode::UNAUTHORIZED, err.to_string()),
    }
}

fn repository_status(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::Conflict(_) => (StatusCode::CONFLICT, err.to_string()),
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "not found".to_owned()),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => internal(),
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error".to_owned(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use favoritos_core::{CustomerId, ProductId};

    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.status_and_detail().0
    }

    #[test]
    fn test_conflict_mappings() {
        assert_eq!(
            status_of(IdentityServiceError::EmailTaken.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(
                FavoriteServiceError::AlreadyFavorited {
                    customer_id: CustomerId::new(1),
                    product_id: ProductId::new(2),
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_not_found_mappings() {
        assert_eq!(
            status_of(FavoriteServiceError::CustomerNotFound(CustomerId::new(1)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CatalogError::NotFound(ProductId::new(9)).into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_catalog_statuses_pass_through() {
        assert_eq!(
            status_of(
                CatalogError::Upstream {
                    status: 429,
                    message: "rate limited".to_owned(),
                }
                .into()
            ),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(
                CatalogError::Upstream {
                    status: 99,
                    message: "nonsense".to_owned(),
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(CatalogError::Unavailable("down".to_owned()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(CatalogError::Invalid("not json".to_owned()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_errors() {
        assert_eq!(
            status_of(TokenError::Expired.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(TokenError::Forbidden.into()),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::Internal("pool exhausted".to_owned());
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail, "internal server error");
    }
}
