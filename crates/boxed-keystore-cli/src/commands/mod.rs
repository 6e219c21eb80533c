use anyhow::Result;
use clap::{Parser, Subcommand};

mod build;

/// Build a local key store document from a DCC Boxed instance.
#[derive(Debug, Parser)]
#[command(name = "boxed-keystore", version, about)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace). `RUST_LOG` takes
    /// precedence.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download the organisation crypto bundle and build a key store
    /// document from it.
    Build(build::BuildArgs),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Build(args) => build::run(&args),
        }
    }
}
