//! Daemon launch arguments.
//!
//! The argument list is built from typed [`LaunchOption`] records; an option
//! whose `include` predicate is false contributes no tokens at all.

use crate::config::ResolvedConfig;

pub const SERVE_SUBCOMMAND: &str = "serve";

pub const BIND_FLAG: &str = "--interface";
/// Listen on every interface inside the container.
pub const BIND_ALL_INTERFACES: &str = "0.0.0.0";
pub const IPFS_API_FLAG: &str = "--ipfs-api";
pub const CACHE_LIMIT_FLAG: &str = "--storage-memory-cache-limit";
/// Bytes the daemon's storage layer may use for its in-memory cache.
pub const STORAGE_MEMORY_CACHE_LIMIT: usize = 50_000_000;
pub const NAME_RESOLVER_API_FLAG: &str = "--name-resolver-api";

/// One `flag value` pair of the daemon command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOption {
    pub flag: &'static str,
    pub value: String,
    pub include: bool,
}

impl LaunchOption {
    pub fn always(flag: &'static str, value: impl Into<String>) -> Self {
        Self { flag, value: value.into(), include: true }
    }

    pub fn when_non_empty(flag: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        Self { flag, include: !value.is_empty(), value }
    }
}

/// Every option the bootstrapper knows about, in command-line order,
/// including those that will be filtered out.
pub fn launch_options(config: &ResolvedConfig) -> Vec<LaunchOption> {
    vec![
        LaunchOption::always(BIND_FLAG, BIND_ALL_INTERFACES),
        LaunchOption::always(IPFS_API_FLAG, config.ipfs_api.as_str()),
        LaunchOption::always(CACHE_LIMIT_FLAG, STORAGE_MEMORY_CACHE_LIMIT.to_string()),
        LaunchOption::when_non_empty(NAME_RESOLVER_API_FLAG, config.ns_api.as_str()),
    ]
}

/// Tokens passed after `orb serve`.
pub fn build_launch_args(config: &ResolvedConfig) -> Vec<String> {
    launch_options(config)
        .into_iter()
        .filter(|opt| opt.include)
        .flat_map(|opt| [opt.flag.to_string(), opt.value])
        .collect()
}
