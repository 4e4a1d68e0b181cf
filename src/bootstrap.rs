//! Bootstrap sequence.
//!
//! Strictly sequential, fail-fast:
//!   1. Ensure identity key
//!   2. Ensure sphere (guarded by the `.sphere` sentinel)
//!   3. Apply counterpart (every run)
//!   4. Build launch arguments
//!   5. Hand off to `orb serve`
//!
//! Any error stops the sequence; nothing is retried or rolled back.

use std::{
    convert::Infallible,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::{
    config::ResolvedConfig,
    error::AppError,
    identity::{self, IdentityStep},
    launch,
    node::NodeCli,
    sphere::{self, SphereStep},
};

/// Everything the sequence needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub config: ResolvedConfig,
    pub root: PathBuf,
    pub key_storage_dir: Option<PathBuf>,
}

/// Outcome of the setup steps, just before hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub identity: IdentityStep,
    pub sphere: SphereStep,
    pub launch_args: Vec<String>,
}

impl Bootstrap {
    pub fn new(
        config: ResolvedConfig,
        root: impl Into<PathBuf>,
        key_storage_dir: Option<PathBuf>,
    ) -> Self {
        Self { config, root: root.into(), key_storage_dir }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Run steps 1 to 4 and return the daemon arguments without launching.
pub fn prepare<N: NodeCli>(bootstrap: &Bootstrap, node: &mut N) -> Result<Prepared, AppError> {
    let cfg = &bootstrap.config;

    let identity = identity::ensure_identity(node, &cfg.key, bootstrap.key_storage_dir.as_deref())?;
    let sphere = sphere::ensure_root_structure(node, bootstrap.root(), &cfg.key)?;
    sphere::apply_counterpart(node, &cfg.counterpart)?;
    let launch_args = launch::build_launch_args(cfg);

    info!(?identity, ?sphere, args = launch_args.len(), "bootstrap prepared");

    Ok(Prepared { identity, sphere, launch_args })
}

/// Run the whole sequence. Returns only if something failed.
pub fn run<N: NodeCli>(bootstrap: &Bootstrap, node: &mut N) -> Result<Infallible, AppError> {
    let prepared = prepare(bootstrap, node)?;
    node.launch(&prepared.launch_args)
}
