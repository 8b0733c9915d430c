use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gabinete::domain::ledger::LedgerError;
use serde_json::json;
use tracing::error;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Ledger(#[from] LedgerError),
    #[error("{}", .0.body_text())]
    Json(#[from] JsonRejection),
    #[error("{}", .0.body_text())]
    Path(#[from] PathRejection),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Ledger(LedgerError::InvalidInput(_) | LedgerError::PastDate { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Ledger(LedgerError::Conflict { .. }) => StatusCode::CONFLICT,
            AppError::Ledger(LedgerError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Ledger(LedgerError::DataAccess(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(rejection) => rejection.status(),
            AppError::Path(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Ledger(LedgerError::DataAccess(e)) => {
                error!("データアクセスエラー: {}", e);
                "Something went wrong while accessing the schedule".to_owned()
            }
            _ => self.to_string(),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
