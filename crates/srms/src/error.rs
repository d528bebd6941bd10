use crate::config::ConfigError;
use crate::lookup::ResultServiceError;
use crate::records::{ImportError, MarkValidationError, StudentValidationError};
use crate::session::SessionError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Import(ImportError),
    Session(SessionError),
    Student(StudentValidationError),
    Mark(MarkValidationError),
    Lookup(ResultServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Session(err) => write!(f, "session error: {}", err),
            AppError::Student(err) => write!(f, "invalid student: {}", err),
            AppError::Mark(err) => write!(f, "invalid mark: {}", err),
            AppError::Lookup(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Session(err) => Some(err),
            AppError::Student(err) => Some(err),
            AppError::Mark(err) => Some(err),
            AppError::Lookup(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Import(_)
            | AppError::Student(_)
            | AppError::Mark(_)
            | AppError::Lookup(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<StudentValidationError> for AppError {
    fn from(value: StudentValidationError) -> Self {
        Self::Student(value)
    }
}

impl From<MarkValidationError> for AppError {
    fn from(value: MarkValidationError) -> Self {
        Self::Mark(value)
    }
}

impl From<ResultServiceError> for AppError {
    fn from(value: ResultServiceError) -> Self {
        Self::Lookup(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_map_to_bad_request() {
        let response = AppError::from(StudentValidationError::MissingName).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::from(ImportError::UnknownClass {
            row: 2,
            value: "Senior".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_errors_map_to_internal_error() {
        let response = AppError::from(ConfigError::InvalidPort).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::from(SessionError::MissingEmail).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn lookup_errors_keep_the_user_facing_message() {
        let err = AppError::from(ResultServiceError::MissingClassName);
        assert_eq!(err.to_string(), "Class name is required");
    }

    #[test]
    fn display_names_the_layer() {
        let err = AppError::from(MarkValidationError::InvalidMaximum);
        assert_eq!(
            err.to_string(),
            "invalid mark: Maximum marks must be greater than zero"
        );
    }
}
