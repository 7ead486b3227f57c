// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the monitoring REST client

use monfs_api_contract::ProblemDetails;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("server returned {status}: {}", .details.title)]
    ServerError {
        status: StatusCode,
        details: ProblemDetails,
    },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub type RestClientResult<T> = Result<T, RestClientError>;
