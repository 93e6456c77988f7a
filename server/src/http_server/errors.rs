use std::fmt::{Debug, Display};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use color_eyre::eyre;
use db::StoreError;
use serde::{Deserialize, Serialize};

pub struct ServerError(pub(crate) eyre::Report, pub(crate) StatusCode);

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:#}", self.1, self.0)
    }
}

impl Debug for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Status Code: {}\n", self.1))?;
        f.write_str("ServerError: \n")?;

        Debug::fmt(&self.0, f)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = if self.1.is_server_error() {
            tracing::error!(error = ?self, "ServerError");

            self.1
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            tracing::warn!(status = %self.1, error = %format!("{:#}", self.0), "Request rejected");

            format!("{:#}", self.0)
        };

        (self.1, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<eyre::Report> for ServerError {
    fn from(err: eyre::Report) -> Self {
        ServerError(err, StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub(crate) fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        StoreError::OutOfRange { .. } | StoreError::ValidationFailed(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        StoreError::Conflict(_) => StatusCode::CONFLICT,
        StoreError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        let status = status_for(&err);

        ServerError(eyre::Report::new(err), status)
    }
}

pub(crate) trait WithStatus<T> {
    fn with_status(self, status: StatusCode) -> Result<T, ServerError>;
}

impl<T> WithStatus<T> for Result<T, eyre::Report> {
    fn with_status(self, status: StatusCode) -> Result<T, ServerError> {
        self.map_err(|err| ServerError(err, status))
    }
}
