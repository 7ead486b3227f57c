// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! REST client for the remote monitoring service
//!
//! This crate provides a blocking HTTP client for the monitoring API's
//! entity and check resources. It is deliberately small: the filesystem
//! engine consumes it through the [`MonitoringApi`] trait, and every
//! client-side failure is folded into the engine's remote-unavailable
//! error so a broken listing surfaces as a visible I/O failure instead of
//! an empty directory.

pub mod auth;
pub mod client;
pub mod error;

pub use auth::*;
pub use client::*;
pub use error::*;

use monfs_api_contract::{Check, Entity};
use monfs_core::{FsError, FsResult, MonitoringApi};

impl MonitoringApi for client::MonitoringRestClient {
    fn list_entities(&self) -> FsResult<Vec<Entity>> {
        self.list_entities()
            .map_err(|e| FsError::RemoteUnavailable(e.to_string()))
    }

    fn list_checks(&self, entity: &Entity) -> FsResult<Vec<Check>> {
        self.list_checks(&entity.id)
            .map_err(|e| FsError::RemoteUnavailable(e.to_string()))
    }

    fn get_check(&self, entity_id: &str, check_id: &str) -> FsResult<Check> {
        self.get_check(entity_id, check_id)
            .map_err(|e| FsError::RemoteUnavailable(e.to_string()))
    }
}
