//! Command-line surface of the bootstrapper.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Positional, SettingsOverrides};

/// Prepare a Noosphere gateway node and hand the process over to `orb serve`.
///
/// Each positional argument falls back to its `ORB_*` environment variable
/// when omitted or empty.
#[derive(Debug, Parser)]
#[clap(name = "orb-bootstrap", version)]
pub struct Cli {
    /// Pet name of the gateway's identity key [env: ORB_KEY]
    pub key: Option<String>,

    /// DID of the counterpart sphere [env: ORB_COUNTERPART]
    pub counterpart: Option<String>,

    /// URL of a Kubo RPC API [env: ORB_IPFS_API]
    pub ipfs_api: Option<String>,

    /// URL of a name system RPC API; omitted from the daemon flags when empty
    /// [env: ORB_NS_API]
    pub ns_api: Option<String>,

    /// Launcher settings file (defaults to config/bootstrap.toml if present)
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Sphere working root [env: ORB_BOOTSTRAP_ROOT]
    #[clap(long)]
    pub root: Option<String>,

    /// Path to the orb executable [env: ORB_BOOTSTRAP_BIN]
    #[clap(long)]
    pub orb_bin: Option<String>,

    /// Print the daemon command line and exit without touching anything
    #[clap(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn positional(&self) -> Positional {
        Positional {
            key: self.key.clone(),
            counterpart: self.counterpart.clone(),
            ipfs_api: self.ipfs_api.clone(),
            ns_api: self.ns_api.clone(),
        }
    }

    /// Flag-sourced launcher overrides; these sit above env and file values.
    pub fn settings_overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            root: self.root.clone(),
            orb_bin: self.orb_bin.clone(),
            ..SettingsOverrides::default()
        }
    }
}
