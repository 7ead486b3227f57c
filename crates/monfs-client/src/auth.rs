// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Authentication configuration for the monitoring API

use reqwest::header::{HeaderMap, HeaderValue};

use crate::error::{RestClientError, RestClientResult};

/// Credentials attached to every request.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub username: String,
    pub token: String,
}

impl AuthConfig {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    /// Authentication headers for a request.
    pub fn headers(&self) -> RestClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let username = HeaderValue::from_str(&self.username)
            .map_err(|_| RestClientError::Auth("username is not valid header text".to_string()))?;
        headers.insert("X-Auth-User", username);

        let mut token = HeaderValue::from_str(&self.token)
            .map_err(|_| RestClientError::Auth("token is not valid header text".to_string()))?;
        token.set_sensitive(true);
        headers.insert("X-Auth-Token", token);

        Ok(headers)
    }
}
