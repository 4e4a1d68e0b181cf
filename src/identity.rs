//! Gateway identity key.
//!
//! Key storage layout under the global noosphere directory:
//! ```text
//! ~/.config/noosphere/
//! └── keys/
//!     ├── {name}.private   (mnemonic)
//!     └── {name}.public    (did:key)
//! ```
//!
//! When that directory is known the private key file is checked first and
//! `orb key create` is skipped if it is already there.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{error::AppError, node::NodeCli};

pub const KEYS_DIRECTORY: &str = "keys";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStep {
    /// `orb key create` was invoked.
    Requested,
    /// The key file was already on disk.
    AlreadyPresent,
}

/// Path of the private key file the daemon writes for `name`.
pub fn private_key_path(key_storage_dir: &Path, name: &str) -> PathBuf {
    key_storage_dir
        .join(KEYS_DIRECTORY)
        .join(name)
        .with_extension("private")
}

/// Make sure the named key exists before any other daemon step runs.
pub fn ensure_identity<N: NodeCli>(
    node: &mut N,
    key: &str,
    key_storage_dir: Option<&Path>,
) -> Result<IdentityStep, AppError> {
    if let Some(dir) = key_storage_dir {
        let path = private_key_path(dir, key);
        if path.is_file() {
            debug!(path = %path.display(), "identity key already stored");
            return Ok(IdentityStep::AlreadyPresent);
        }
    }

    node.create_key(key)?;
    info!(key, "identity key ensured");
    Ok(IdentityStep::Requested)
}
