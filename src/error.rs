//! Error types shared across the crate.
//!
//! Each seam gets its own enum: the upstream client reports `FetchError`,
//! the cache reports `PriceError`, the calculators report `CalcError`.
//! `ApiError` folds them into HTTP responses with the JSON error shape the
//! front end expects.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failures talking to the upstream spot price API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed upstream response: {0}")]
    Decode(String),

    #[error("unusable upstream price: {0}")]
    InvalidPrice(String),
}

/// Failures producing a price response.
#[derive(Debug, Error)]
pub enum PriceError {
    /// The upstream failed and there is nothing cached to fall back to.
    #[error("no price available: {source}")]
    Unavailable {
        #[source]
        source: FetchError,
    },
}

/// Validation failures in the GST and investment calculators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("invalid input: {message}")]
    InvalidInput { message: &'static str },

    #[error("prices are not loaded yet")]
    PricesNotLoaded,
}

/// Configuration values that parse but make no sense.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Errors returned from HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Price(#[from] PriceError),

    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error("unreadable request body: {0}")]
    Body(String),
}

/// JSON body for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Price(PriceError::Unavailable { source }) => {
                error!(error = %source, "Price request failed with empty cache");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { error: "Failed to fetch prices", message: "Please try again" },
                )
            }
            ApiError::Calc(CalcError::InvalidInput { message }) => (
                StatusCode::BAD_REQUEST,
                ErrorBody { error: "Invalid input", message: *message },
            ),
            ApiError::Calc(CalcError::PricesNotLoaded) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody { error: "Prices unavailable", message: "Wait for prices to load" },
            ),
            ApiError::Body(_) => (
                StatusCode::BAD_REQUEST,
                ErrorBody { error: "Invalid input", message: "Enter valid positive numbers" },
            ),
        };

        (status, Json(body)).into_response()
    }
}
