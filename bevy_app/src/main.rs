//! Bubble field binary.
//!
//! Loads the layered RON config, applies command line overrides, and runs the effect in a window.
//!
//! Example:
//!   cargo run -p bubble_field_app -- --chains 25 --seed 7 --auto-close 30

use std::{path::PathBuf, str::FromStr};

use anyhow::{bail, Context, Result};
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::Parser;

use bf_config::{AppConfig, ConfigOverrides, DEFAULT_CONFIG_PATHS};
use bf_core::{BubbleConfigRes, ConfigOverridesRes, CorePlugin, RngSeed};
use bf_rendering::RenderingPlugin;
use bf_spawner::BubbleSpawnerPlugin;

#[cfg(feature = "hot-reload")]
use bf_hot_reload::{ConfigReloadSettings, HotReloadPlugin};

mod auto_close;

use auto_close::AutoClosePlugin;

#[derive(Parser, Debug)]
#[command(author, version, about = "Self-renewing decorative bubble field", long_about = None)]
struct Args {
    /// Config layers, later files override earlier ones. Defaults to assets/config/bubbles(.local).ron.
    #[arg(long = "config", value_name = "PATH")]
    config: Vec<PathBuf>,
    /// Number of independent bubble chains.
    #[arg(long)]
    chains: Option<usize>,
    /// Fixed RNG seed for reproducible bubbles.
    #[arg(long)]
    seed: Option<u64>,
    /// Exit after this many seconds.
    #[arg(long)]
    auto_close: Option<f32>,
    /// trace | debug | info | warn | error
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn load_config(&self) -> Result<(AppConfig, Vec<PathBuf>, Vec<String>)> {
        let explicit = !self.config.is_empty();
        let paths: Vec<PathBuf> = if explicit {
            self.config.clone()
        } else {
            DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).collect()
        };
        if explicit {
            // Layers named on the command line must exist and parse.
            for p in &paths {
                AppConfig::load_from_file(p)
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("loading config layer {}", p.display()))?;
            }
        }
        let (mut cfg, _used, errors) = AppConfig::load_layered(&paths);
        if explicit && !errors.is_empty() {
            bail!("config errors: {}", errors.join("; "));
        }

        self.overrides().apply(&mut cfg);
        Ok((cfg, paths, errors))
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            chain_count: self.chains,
            rng_seed: self.seed,
            auto_close: self.auto_close,
            log_level: self.log_level.clone(),
        }
    }
}

fn log_plugin(cfg: &AppConfig) -> LogPlugin {
    let level = Level::from_str(&cfg.logging.level).unwrap_or(Level::INFO);
    LogPlugin {
        level,
        filter: cfg.logging.filter.clone(),
        ..default()
    }
}

fn main() -> Result<()> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let args = Args::parse();
    #[cfg_attr(not(feature = "hot-reload"), allow(unused_variables))]
    let (cfg, paths, load_errors) = args.load_config()?;

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: cfg.window.title.clone(),
                    resolution: (cfg.window.width, cfg.window.height).into(),
                    resizable: true,
                    ..default()
                }),
                ..default()
            })
            .set(log_plugin(&cfg)),
    );

    // Logging is live only once LogPlugin is built.
    for e in &load_errors {
        warn!("config: {e}");
    }
    for w in cfg.validate() {
        warn!("config warning: {w}");
    }
    info!(
        chains = cfg.field.chain_count,
        seed = ?cfg.rng_seed,
        "starting bubble field"
    );

    if let Some(seed) = cfg.rng_seed {
        app.insert_resource(RngSeed(seed));
    }
    app.insert_resource(BubbleConfigRes(cfg));
    app.insert_resource(ConfigOverridesRes(args.overrides()));

    app.add_plugins((
        CorePlugin,
        RenderingPlugin,
        BubbleSpawnerPlugin,
        AutoClosePlugin,
    ));

    #[cfg(feature = "hot-reload")]
    {
        app.insert_resource(ConfigReloadSettings {
            paths,
            ..default()
        });
        app.add_plugins(HotReloadPlugin);
    }

    app.run();
    Ok(())
}
