//! orb-bootstrap: container entry point for a Noosphere gateway node.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse command line, snapshot environment
//!   3. Load launcher settings (flags > env > config file > defaults)
//!   4. Init logger once
//!   5. Resolve node settings (positional > env)
//!   6. Ensure key, ensure sphere, apply counterpart
//!   7. exec `orb serve ...`

use clap::Parser;
use tracing::{debug, info};

use orb_bootstrap::{
    bootstrap::{self, Bootstrap},
    cli::Cli,
    config::{self, EnvSnapshot, SettingsOverrides},
    error::AppError,
    launch, logger,
    node::OrbCli,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    // Load .env if present; the file is optional.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let env = EnvSnapshot::capture();

    let overrides = SettingsOverrides::from_env(&env).overlaid_with(cli.settings_overrides());
    let settings = config::load_settings(cli.config.as_deref(), &overrides)?;

    logger::init(&settings.log_level)?;

    // Passed through untouched to the daemon.
    info!("RUST_LOG={}", env.get("RUST_LOG").unwrap_or_default());
    info!("NOOSPHERE_LOG={}", env.get("NOOSPHERE_LOG").unwrap_or_default());

    let resolved = config::resolve_config(&cli.positional(), &env);
    for (setting, source) in resolved.source_report() {
        debug!(setting, %source, "resolved");
    }

    info!(
        root = %settings.root.display(),
        orb = %settings.orb_bin.display(),
        key = %resolved.key,
        "bootstrapping gateway node"
    );

    let mut node = OrbCli::new(&settings.orb_bin, &settings.root);
    let boot = Bootstrap::new(resolved, &settings.root, settings.key_storage_dir.clone());

    if cli.dry_run {
        let args = launch::build_launch_args(&boot.config);
        println!("{}", node.quoted_command_line(&args));
        return Ok(());
    }

    match bootstrap::run(&boot, &mut node)? {}
}
