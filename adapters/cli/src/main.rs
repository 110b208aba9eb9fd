#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a headless Lawn Defence session.

mod config;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lawn_defence_system_drag_drop::DragDrop;
use lawn_defence_system_shooting::Shooting;
use lawn_defence_system_sun_production::SunProduction;
use lawn_defence_world::{query, World};
use tracing_subscriber::EnvFilter;

use crate::config::LawnConfig;
use crate::session::{Script, Session};

/// Headless Lawn Defence session runner.
#[derive(Parser, Debug)]
#[command(name = "lawn-defence", about = "Replays scripted pointer input against the lawn")]
struct Cli {
    /// Lawn configuration in TOML; stock values are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session script in TOML; a short built-in demo runs when omitted.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Seed for sunflower production intervals.
    #[arg(long)]
    seed: Option<u64>,

    /// Tracing filter directive overriding `RUST_LOG`.
    #[arg(long)]
    log_filter: Option<String>,
}

/// Entry point for the Lawn Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter.as_deref())?;

    let config = match &cli.config {
        Some(path) => LawnConfig::load(path)?,
        None => LawnConfig::default(),
    };
    let script = match &cli.script {
        Some(path) => Script::load(path)?,
        None => Script::default(),
    };

    let world = World::new(config.world_config()?);
    println!("{}", query::welcome_banner(&world));

    let session = Session::new(
        world,
        DragDrop::new(config.drag_drop_config()?),
        SunProduction::new(config.sun_production_config(cli.seed)?),
        Shooting::new(config.fire_interval()?),
    );
    let report = session.run(&script);

    println!("frames simulated: {}", report.frames);
    println!("plants committed: {:?}", report.committed);
    for (kind, reason) in &report.cancelled {
        println!("placement cancelled: {kind:?} ({reason})");
    }
    println!("sun collected: {}", report.sun_collected);
    println!("projectiles fired: {}", report.projectiles_fired);
    println!("plants on lawn: {}", report.plants_on_lawn);
    for (cell, bounds) in &report.claimed_cells {
        println!(
            "  cell ({}, {}) spans {:?}..{:?}",
            cell.column(),
            cell.row(),
            bounds.min(),
            bounds.max()
        );
    }
    println!("sun left uncollected: {}", report.suns_uncollected);
    println!("final balance: {}", report.final_balance.get());
    Ok(())
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();
    Ok(())
}
