// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! monfs FUSE Host — mounts a monitoring account as a read-only file tree
//!
//! Entities appear as top-level directories, their checks as
//! subdirectories, and each check exposes an `attributes` file with its
//! serialized fields.

#[cfg(all(feature = "fuse", target_os = "linux"))]
mod adapter;

#[cfg(all(feature = "fuse", target_os = "linux"))]
use adapter::MonFsFuse;
use anyhow::Result;
use clap::Parser;
use monfs_client::{AuthConfig, MonitoringRestClient};
use monfs_core::{FsConfig, MonFsCore};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
struct Args {
    /// Mount point for the filesystem
    mount_point: PathBuf,

    /// Monitoring API username
    username: String,

    /// Monitoring API token
    token: String,

    /// Base URL of the monitoring API
    #[arg(long, env = "MONFS_API_URL")]
    api_url: String,

    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Allow other users to access the filesystem
    #[arg(long)]
    allow_other: bool,

    /// Auto unmount on process exit
    #[arg(long)]
    auto_unmount: bool,
}

fn load_config(config_path: Option<PathBuf>) -> Result<FsConfig> {
    match config_path {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: FsConfig = serde_json::from_str(&content)?;
            Ok(config)
        }
        None => {
            // Default configuration
            Ok(FsConfig::default())
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    info!("Starting monfs FUSE host");
    info!("Mount point: {}", args.mount_point.display());

    let config = load_config(args.config)?;
    let timeout = Duration::from_millis(config.remote.request_timeout_ms);
    let auth = AuthConfig::new(args.username, args.token);
    let client = MonitoringRestClient::from_url(&args.api_url, auth, timeout)?;
    info!("Monitoring API: {}", client.base_url());

    let core = Arc::new(MonFsCore::new(config, Arc::new(client)));

    #[cfg(all(feature = "fuse", target_os = "linux"))]
    {
        let filesystem = MonFsFuse::new(core);

        let mut mount_options = vec![
            fuser::MountOption::FSName("monfs".to_string()),
            fuser::MountOption::Subtype("monfs".to_string()),
        ];

        if args.allow_other {
            mount_options.push(fuser::MountOption::AllowOther);
        }

        if args.auto_unmount {
            mount_options.push(fuser::MountOption::AutoUnmount);
        }

        info!("Mounting filesystem...");
        fuser::mount2(filesystem, &args.mount_point, &mount_options)?;
        info!("Unmounted; exiting");
    }

    #[cfg(not(all(feature = "fuse", target_os = "linux")))]
    {
        warn!("FUSE support not compiled in. This binary is for testing only.");
        info!("monfs core initialized; root present: {}", core.exists("/"));
        info!("To enable FUSE support, compile with: cargo build --features fuse");
    }

    Ok(())
}
