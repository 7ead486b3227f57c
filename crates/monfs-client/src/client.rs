// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Main REST API client implementation

use std::time::Duration;

use monfs_api_contract::{Check, Entity, ProblemDetails};
use reqwest::blocking::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::auth::AuthConfig;
use crate::error::{RestClientError, RestClientResult};

/// Blocking REST client for the monitoring service.
///
/// Every request carries the configured auth headers and is bounded by the
/// client-wide timeout, so a stalled remote call fails instead of hanging
/// the filesystem dispatch thread that issued it.
#[derive(Debug, Clone)]
pub struct MonitoringRestClient {
    http_client: HttpClient,
    base_url: Url,
    auth: AuthConfig,
}

impl MonitoringRestClient {
    /// Create a new REST client
    pub fn new(base_url: Url, auth: AuthConfig, timeout: Duration) -> RestClientResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent("monfs/0.1")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            auth,
        })
    }

    /// Create a client from a base URL string.
    ///
    /// A trailing slash is enforced: relative joins drop the final path
    /// segment of a slash-less base, which would lose an account-scoped
    /// prefix like `/v1.0/<account>`.
    pub fn from_url(base_url: &str, auth: AuthConfig, timeout: Duration) -> RestClientResult<Self> {
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };
        Self::new(base_url, auth, timeout)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List every entity on the account
    pub fn list_entities(&self) -> RestClientResult<Vec<Entity>> {
        #[derive(Deserialize)]
        struct EntityListResponse {
            values: Vec<Entity>,
        }
        let response: EntityListResponse = self.get("entities")?;
        Ok(response.values)
    }

    /// List the checks configured against an entity
    pub fn list_checks(&self, entity_id: &str) -> RestClientResult<Vec<Check>> {
        #[derive(Deserialize)]
        struct CheckListResponse {
            values: Vec<Check>,
        }
        let path = format!("entities/{}/checks", entity_id);
        let response: CheckListResponse = self.get(&path)?;
        Ok(response.values)
    }

    /// Fetch a single check
    pub fn get_check(&self, entity_id: &str, check_id: &str) -> RestClientResult<Check> {
        let path = format!("entities/{}/checks/{}", entity_id, check_id);
        self.get(&path)
    }

    // Private helper methods

    fn get<T: DeserializeOwned>(&self, path: &str) -> RestClientResult<T> {
        let url = self.base_url.join(path)?;
        debug!(%url, "GET");

        let request = self.http_client.get(url).headers(self.auth.headers()?);
        let response = request.send()?;
        self.handle_response(response)
    }

    fn handle_response<T: DeserializeOwned>(&self, response: Response) -> RestClientResult<T> {
        let status = response.status();

        if status.is_success() {
            let text = response.text()?;
            serde_json::from_str(&text).map_err(RestClientError::from)
        } else {
            let text = response.text()?;
            match serde_json::from_str::<ProblemDetails>(&text) {
                Ok(problem) => Err(RestClientError::ServerError {
                    status,
                    details: problem,
                }),
                Err(_) => Err(RestClientError::UnexpectedResponse(text)),
            }
        }
    }
}
