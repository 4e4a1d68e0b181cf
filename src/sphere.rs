//! Sphere (root data structure) setup and persistent sphere config.

use std::path::Path;

use tracing::info;

use crate::{error::AppError, node::NodeCli};

/// Sentinel directory the daemon creates inside an initialised sphere root.
pub const SPHERE_DIRECTORY: &str = ".sphere";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SphereStep {
    Created,
    AlreadyInitialized,
}

pub fn is_initialized(root: &Path) -> bool {
    root.join(SPHERE_DIRECTORY).is_dir()
}

/// Create the sphere once. Skipped entirely when the sentinel exists.
pub fn ensure_root_structure<N: NodeCli>(
    node: &mut N,
    root: &Path,
    owner_key: &str,
) -> Result<SphereStep, AppError> {
    if is_initialized(root) {
        info!(root = %root.display(), "sphere already initialized");
        return Ok(SphereStep::AlreadyInitialized);
    }

    node.create_sphere(owner_key)?;
    info!(root = %root.display(), owner_key, "sphere created");
    Ok(SphereStep::Created)
}

/// Write the counterpart on every boot, even if unchanged.
pub fn apply_counterpart<N: NodeCli>(node: &mut N, counterpart: &str) -> Result<(), AppError> {
    node.set_counterpart(counterpart)?;
    info!(counterpart, "counterpart applied");
    Ok(())
}
