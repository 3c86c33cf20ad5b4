//! gesture_particles — interactive entry point.
//!
//! ```text
//! gesture_particles [--config <file.json>] [--seed <n>] [--tracker <cmd> [args…]]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use gesture_particles::app::{run, AppConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Gesture Particles — Hand-Tracked Force Field        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let cfg = match configure(std::env::args().skip(1).collect()) {
        Ok(c)  => c,
        Err(e) => {
            log::error!("{:#}", e);
            std::process::exit(2);
        }
    };

    if cfg.uses_simulator() {
        println!("  Mode: Keyboard/mouse simulation  (use --tracker <cmd> for a camera tracker)");
    } else {
        println!("  Mode: External tracker `{}`", cfg.tracker.command.join(" "));
    }
    println!();

    if let Err(e) = run(cfg) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Build the config from the command line: `--config` is applied first, then
/// `--seed` and `--tracker` override it.
fn configure(args: Vec<String>) -> anyhow::Result<AppConfig> {
    let mut config_path: Option<PathBuf> = None;
    let mut seed:        Option<u64>     = None;
    let mut tracker:     Vec<String>     = Vec::new();

    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(it.next().context("--config needs a path")?.into());
            }
            "--seed" => {
                let v = it.next().context("--seed needs a number")?;
                seed = Some(v.parse().with_context(|| format!("bad --seed value {:?}", v))?);
            }
            "--tracker" => {
                tracker = it.by_ref().collect();
                if tracker.is_empty() { bail!("--tracker needs a command"); }
            }
            other => bail!("unknown argument {:?}", other),
        }
    }

    let mut cfg = match config_path {
        Some(p) => AppConfig::load(&p)?,
        None    => AppConfig::default(),
    };
    if seed.is_some()     { cfg.field.seed = seed; }
    if !tracker.is_empty() { cfg.tracker.command = tracker; }
    Ok(cfg)
}
