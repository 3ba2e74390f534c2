//! PulseFlow desktop media library.
//!
//! Entry point: opens the PulseFlow window and serves the web front-end.
//! When built without the `gui` feature, only the stdio bridge (`pulseflow-rpc`) is usable.

// Prevents an additional console window on Windows in release builds.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use clap::Parser;

/// PulseFlow desktop media library
#[derive(Parser, Debug)]
#[command(name = "pulseflow")]
#[command(version)]
struct Args {
    /// Directory containing the built front-end (index.html, assets)
    #[arg(long, value_name = "DIR", env = "PULSEFLOW_FRONTEND_DIR")]
    frontend_dir: Option<PathBuf>,

    /// Directory holding config.json
    #[arg(long, value_name = "DIR", env = "PULSEFLOW_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Enable webview developer tools
    #[arg(long)]
    devtools: bool,
}

#[cfg(feature = "gui")]
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    pulseflow::logging::init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting PulseFlow");

    pulseflow::ui::webview_app::run(pulseflow::ui::webview_app::ShellOptions {
        frontend_dir: args.frontend_dir,
        config_dir: args.config_dir,
        devtools: args.devtools,
    })
}

#[cfg(not(feature = "gui"))]
fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    pulseflow::logging::init();
    tracing::debug!(?args, "parsed arguments");
    anyhow::bail!(
        "PulseFlow was built without the `gui` feature; use `pulseflow-rpc` for the stdio bridge"
    )
}
