//! Configuration resolution.
//!
//! Two layers live here:
//!
//! - the four node settings (`key`, `counterpart`, `ipfs_api`, `ns_api`),
//!   resolved once from positional arguments with `ORB_*` env fallbacks;
//! - launcher settings (working root, daemon binary, key storage, log level),
//!   read from an optional `config/bootstrap.toml` and overridden by
//!   `ORB_BOOTSTRAP_*` env vars and command-line flags.
//!
//! Nothing in this module reads the process environment except
//! [`EnvSnapshot::capture`], which `main` calls exactly once.

use std::{
    collections::HashMap,
    env, fmt, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

pub const KEY_ENV: &str = "ORB_KEY";
pub const COUNTERPART_ENV: &str = "ORB_COUNTERPART";
pub const IPFS_API_ENV: &str = "ORB_IPFS_API";
pub const NS_API_ENV: &str = "ORB_NS_API";

pub const ROOT_ENV: &str = "ORB_BOOTSTRAP_ROOT";
pub const BIN_ENV: &str = "ORB_BOOTSTRAP_BIN";
pub const KEY_STORAGE_ENV: &str = "ORB_BOOTSTRAP_KEY_STORAGE";
pub const LOG_LEVEL_ENV: &str = "ORB_BOOTSTRAP_LOG_LEVEL";

/// Launcher settings file read when `--config` is not given.
pub const DEFAULT_SETTINGS_PATH: &str = "config/bootstrap.toml";

// ── environment ──────────────────────────────────────────────────────────────

/// Immutable copy of the process environment, taken once at startup.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot(HashMap<String, String>);

impl EnvSnapshot {
    /// Capture the current process environment. Non-UTF-8 entries are dropped.
    pub fn capture() -> Self {
        Self(
            env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Like [`get`](Self::get), but treats an empty value as unset.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ── node settings ────────────────────────────────────────────────────────────

/// The four positional arguments, in order. Any may be absent.
#[derive(Debug, Clone, Default)]
pub struct Positional {
    pub key: Option<String>,
    pub counterpart: Option<String>,
    pub ipfs_api: Option<String>,
    pub ns_api: Option<String>,
}

/// Where a resolved setting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Positional,
    Environment,
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positional => "positional",
            Self::Environment => "environment",
            Self::Default => "default",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSources {
    pub key: ConfigSource,
    pub counterpart: ConfigSource,
    pub ipfs_api: ConfigSource,
    pub ns_api: ConfigSource,
}

/// Node settings after precedence has been applied. Values are passed to the
/// daemon verbatim; an empty string means "not supplied anywhere".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub key: String,
    pub counterpart: String,
    pub ipfs_api: String,
    pub ns_api: String,
    pub sources: ConfigSources,
}

impl ResolvedConfig {
    /// `(name, source)` pairs in positional order, for diagnostics.
    pub fn source_report(&self) -> [(&'static str, ConfigSource); 4] {
        [
            ("key", self.sources.key),
            ("counterpart", self.sources.counterpart),
            ("ipfs_api", self.sources.ipfs_api),
            ("ns_api", self.sources.ns_api),
        ]
    }
}

/// Resolve one setting: a non-empty positional value wins, otherwise the env
/// value (possibly empty), otherwise the empty string.
pub fn resolve_setting(
    positional: Option<&str>,
    env_value: Option<&str>,
) -> (String, ConfigSource) {
    if let Some(value) = positional.filter(|v| !v.is_empty()) {
        return (value.to_string(), ConfigSource::Positional);
    }
    match env_value.filter(|v| !v.is_empty()) {
        Some(value) => (value.to_string(), ConfigSource::Environment),
        None => (String::new(), ConfigSource::Default),
    }
}

/// Apply positional-over-environment precedence to all four node settings.
/// Never fails and performs no validation.
pub fn resolve_config(positional: &Positional, env: &EnvSnapshot) -> ResolvedConfig {
    let (key, key_src) = resolve_setting(positional.key.as_deref(), env.get(KEY_ENV));
    let (counterpart, counterpart_src) =
        resolve_setting(positional.counterpart.as_deref(), env.get(COUNTERPART_ENV));
    let (ipfs_api, ipfs_src) =
        resolve_setting(positional.ipfs_api.as_deref(), env.get(IPFS_API_ENV));
    let (ns_api, ns_src) = resolve_setting(positional.ns_api.as_deref(), env.get(NS_API_ENV));

    ResolvedConfig {
        key,
        counterpart,
        ipfs_api,
        ns_api,
        sources: ConfigSources {
            key: key_src,
            counterpart: counterpart_src,
            ipfs_api: ipfs_src,
            ns_api: ns_src,
        },
    }
}

// ── launcher settings ────────────────────────────────────────────────────────

/// Fully-resolved launcher settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSettings {
    /// Sphere working root; the daemon runs with this as its cwd.
    pub root: PathBuf,
    /// Daemon executable, looked up on `PATH` when not a path.
    pub orb_bin: PathBuf,
    /// Global noosphere directory holding `keys/`. Enables the key
    /// pre-existence check when set.
    pub key_storage_dir: Option<PathBuf>,
    pub log_level: String,
}

/// Values that take precedence over the settings file. Empty strings count
/// as unset.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub root: Option<String>,
    pub orb_bin: Option<String>,
    pub key_storage_dir: Option<String>,
    pub log_level: Option<String>,
}

impl SettingsOverrides {
    pub fn from_env(env: &EnvSnapshot) -> Self {
        let take = |name: &str| env.non_empty(name).map(str::to_string);
        Self {
            root: take(ROOT_ENV),
            orb_bin: take(BIN_ENV),
            key_storage_dir: take(KEY_STORAGE_ENV),
            log_level: take(LOG_LEVEL_ENV),
        }
    }

    /// Layer `higher` on top of `self`: any value set in `higher` wins.
    pub fn overlaid_with(self, higher: SettingsOverrides) -> Self {
        fn set(v: Option<String>) -> Option<String> {
            v.filter(|v| !v.is_empty())
        }
        Self {
            root: set(higher.root).or(self.root),
            orb_bin: set(higher.orb_bin).or(self.orb_bin),
            key_storage_dir: set(higher.key_storage_dir).or(self.key_storage_dir),
            log_level: set(higher.log_level).or(self.log_level),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    bootstrap: RawBootstrap,
}

#[derive(Deserialize)]
struct RawBootstrap {
    #[serde(default = "default_root")]
    root: String,
    #[serde(default = "default_orb_bin")]
    orb_bin: String,
    #[serde(default)]
    key_storage_dir: Option<String>,
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawBootstrap {
    fn default() -> Self {
        Self {
            root: default_root(),
            orb_bin: default_orb_bin(),
            key_storage_dir: None,
            log_level: default_log_level(),
        }
    }
}

fn default_root() -> String { ".".to_string() }
fn default_orb_bin() -> String { "orb".to_string() }
fn default_log_level() -> String { "info".to_string() }

/// Load launcher settings. An explicit `--config` path must exist; the
/// default path is optional.
pub fn load_settings(
    explicit: Option<&Path>,
    overrides: &SettingsOverrides,
) -> Result<LauncherSettings, AppError> {
    match explicit {
        Some(path) => load_from(path, true, overrides),
        None => load_from(Path::new(DEFAULT_SETTINGS_PATH), false, overrides),
    }
}

/// Internal loader: accepts an explicit path and overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    required: bool,
    overrides: &SettingsOverrides,
) -> Result<LauncherSettings, AppError> {
    let parsed = if required || path.exists() {
        let raw = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str::<RawConfig>(&raw)
            .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?
    } else {
        RawConfig::default()
    };

    let b = parsed.bootstrap;
    let pick = |over: &Option<String>, file: String| {
        over.as_deref().filter(|v| !v.is_empty()).map(str::to_string).unwrap_or(file)
    };

    let root = pick(&overrides.root, b.root);
    let orb_bin = pick(&overrides.orb_bin, b.orb_bin);
    let log_level = pick(&overrides.log_level, b.log_level);
    let key_storage_dir = overrides
        .key_storage_dir
        .clone()
        .filter(|v| !v.is_empty())
        .or(b.key_storage_dir.filter(|v| !v.is_empty()));

    Ok(LauncherSettings {
        root: expand_home(&root),
        orb_bin: resolve_program(&orb_bin)?,
        key_storage_dir: key_storage_dir.as_deref().map(expand_home),
        log_level,
    })
}

/// A bare name such as `orb` is left for `PATH` lookup. Anything with a
/// directory component is made absolute against the startup directory, since
/// the daemon runs with the sphere root as its cwd.
pub fn resolve_program(program: &str) -> Result<PathBuf, AppError> {
    let path = expand_home(program);
    if path.components().count() > 1 || path.is_absolute() {
        return Ok(std::path::absolute(&path)?);
    }
    Ok(path)
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
