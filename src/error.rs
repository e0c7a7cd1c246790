use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::password::PasswordError;
use crate::views;

#[derive(Debug, Error)]
pub enum AppError {
	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error(transparent)]
	Password(#[from] PasswordError),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Session error: {0}")]
	Session(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		match self {
			AppError::NotFound(ref what) => {
				tracing::debug!(%what, "not found");
				(StatusCode::NOT_FOUND, views::not_found()).into_response()
			}
			AppError::Database(ref e) => {
				tracing::error!(error = ?e, "database error");
				(StatusCode::INTERNAL_SERVER_ERROR, views::server_error()).into_response()
			}
			AppError::Password(ref e) => {
				tracing::error!(error = ?e, "password error");
				(StatusCode::INTERNAL_SERVER_ERROR, views::server_error()).into_response()
			}
			AppError::Session(ref message) => {
				tracing::error!(%message, "session error");
				(StatusCode::INTERNAL_SERVER_ERROR, views::server_error()).into_response()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_codes() {
		assert_eq!(
			AppError::NotFound("recipe 7".into()).into_response().status(),
			StatusCode::NOT_FOUND
		);
		assert_eq!(
			AppError::Database(sqlx::Error::RowNotFound).into_response().status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}
}
