//! Formwright command-line tool.
//!
//! Usage:
//!   formwright inspect --descriptor plugin.json [--value config.json] [--policy catalog.toml]
//!   formwright sdl parse schema.graphql
//!   formwright sdl print model.json

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formwright_cli::{inspect, json_to_sdl, sdl_to_json};
use formwright_plugins::CatalogPolicy;
use std::{fs, path::PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "formwright")]
#[command(about = "Inspect plugin forms and convert GraphQL schemas")]
struct Args {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved field tree of a plugin form as JSON
    Inspect {
        /// Plugin descriptor (JSON)
        #[arg(short, long)]
        descriptor: PathBuf,

        /// Configuration value to resolve against; defaults to the plugin's defaults
        #[arg(long)]
        value: Option<PathBuf>,

        /// Catalog policy (TOML)
        #[arg(short, long)]
        policy: Option<PathBuf>,

        /// Show designer-only fields
        #[arg(long)]
        designer: bool,
    },
    /// Convert between SDL and the type model
    Sdl {
        #[command(subcommand)]
        command: SdlCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SdlCommand {
    /// SDL file to TypeModel JSON
    Parse { file: PathBuf },
    /// TypeModel JSON file to SDL
    Print { file: PathBuf },
}

fn read(path: &PathBuf) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Inspect {
            descriptor,
            value,
            policy,
            designer,
        } => {
            let policy = policy.map(CatalogPolicy::load_from).unwrap_or_default();
            let value = match value {
                Some(path) => Some(serde_json::from_str(&read(&path)?).context("Failed to parse value")?),
                None => None,
            };
            info!("Inspecting {}", descriptor.display());
            let report = inspect(&read(&descriptor)?, value, &policy, designer).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Sdl { command } => match command {
            SdlCommand::Parse { file } => println!("{}", sdl_to_json(&read(&file)?)?),
            SdlCommand::Print { file } => print!("{}", json_to_sdl(&read(&file)?)?),
        },
    }
    Ok(())
}
