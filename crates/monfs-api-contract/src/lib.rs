//! Monitoring REST API contract types
//!
//! This crate defines the schema types shared between the REST client and
//! every consumer of the monitoring service's resource hierarchy. The
//! service returns entity and check objects whose field set is only partly
//! fixed; the types here keep the known fields strongly typed and fold the
//! remainder into a flattened passthrough map.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
