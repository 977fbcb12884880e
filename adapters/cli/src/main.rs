#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the placement sandbox headlessly.

mod config;
mod feedback;
mod replay;
mod scatter;
mod scenario;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use placement_sandbox_world::query;
use tracing_subscriber::EnvFilter;

use crate::{config::SandboxConfig, scenario::Scenario};

/// Command-line arguments for the placement sandbox.
#[derive(Debug, Parser)]
#[command(name = "placement-sandbox", about = "Drives the placement sandbox headlessly.")]
struct Cli {
    /// Sandbox configuration file; built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Replays a scripted input scenario and prints what happened.
    Replay {
        /// Scenario file to replay.
        scenario: PathBuf,
    },
    /// Drops prototypes at seeded random points and reports how many were accepted.
    Scatter {
        /// Prototype to drop; every catalog entry is used when omitted.
        #[arg(long)]
        prototype: Option<String>,
        /// Number of placement attempts.
        #[arg(long, default_value_t = 100)]
        count: usize,
        /// Seed of the random point generator.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

/// Entry point for the placement sandbox command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => SandboxConfig::load(path)?,
        None => SandboxConfig::default(),
    };

    match cli.command {
        CliCommand::Replay { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            let report = replay::run(&config, &scenario)?;
            for interaction in &report.interactions {
                println!("interaction: {interaction:?}");
            }
            for event in &report.events {
                println!("event: {event:?}");
            }
            print_layout(&report.layout);
            if report.rejected_steps > 0 {
                println!("{} step(s) were rejected", report.rejected_steps);
            }
        }
        CliCommand::Scatter {
            prototype,
            count,
            seed,
        } => {
            let (summary, scene) = scatter::run(&config, prototype.as_deref(), count, seed)?;
            println!(
                "committed {} / discarded {} / skipped {} of {count} attempts",
                summary.committed, summary.discarded, summary.skipped
            );
            print_layout(&query::objects(&scene));
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn print_layout(layout: &[query::ObjectSnapshot]) {
    println!("layout: {} object(s)", layout.len());
    for object in layout {
        let transform = object.transform;
        println!(
            "  #{} {} at ({:.2}, {:.2}, {:.2}) yaw {:.1}",
            object.id,
            object.prototype,
            transform.position.x,
            transform.position.y,
            transform.position.z,
            transform.yaw_degrees
        );
    }
}
