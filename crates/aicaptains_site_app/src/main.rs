// SPDX-License-Identifier: MIT OR Apache-2.0
//! AI Captains site runtime
//!
//! Runs the landing page experience headless:
//! - Retro arcade intro driven by the stage sequencer
//! - Sound cues with a shared mute switch
//! - Retro TV video surface
//! - Scroll-to-top button and newsletter signup state
//!
//! ## Usage
//!
//! `aicaptains_site [--skip-intro] [--muted] [--write-config OUT.ron] [CONFIG.ron]`
//!
//! `--write-config` saves the effective settings and exits.
//!
//! After the intro, visitor commands are read from stdin, one per line
//! (see [`commands`]).

mod app;
mod audio;
mod commands;
mod config;
mod intro;
mod newsletter;
mod playback;
mod scroll;

use app::{AppError, SiteApp};
use config::SiteConfig;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Command line options
#[derive(Debug, Default)]
struct Options {
    config_path: Option<PathBuf>,
    write_config: Option<PathBuf>,
    skip_intro: bool,
    muted: bool,
}

impl Options {
    fn from_args(mut args: impl Iterator<Item = String>) -> Self {
        let mut options = Options::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--skip-intro" => options.skip_intro = true,
                "--muted" => options.muted = true,
                "--write-config" => match args.next() {
                    Some(path) => options.write_config = Some(PathBuf::from(path)),
                    None => tracing::warn!("--write-config needs a path"),
                },
                other if other.starts_with("--") => {
                    tracing::warn!("Ignoring unknown option {other}");
                }
                _ => options.config_path = Some(PathBuf::from(arg)),
            }
        }
        options
    }
}

fn load_config(options: &Options) -> Result<SiteConfig, AppError> {
    let mut config = match &options.config_path {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::default(),
    };
    config.skip_intro |= options.skip_intro;
    config.muted |= options.muted;
    Ok(config)
}

fn run(options: &Options) -> Result<(), AppError> {
    let config = load_config(options)?;
    if let Some(path) = &options.write_config {
        config.save(path)?;
        tracing::info!("Wrote site config to {}", path.display());
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("aicaptains-site")
        .build()?;
    runtime.block_on(SiteApp::new(config).run())
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,aicaptains_site_app=debug,aicaptains_site_sequencer=debug")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting AI Captains site v{}", env!("CARGO_PKG_VERSION"));

    let options = Options::from_args(std::env::args().skip(1));
    if let Err(e) = run(&options) {
        tracing::error!("Site crashed: {e}");
        std::process::exit(1);
    }
}
