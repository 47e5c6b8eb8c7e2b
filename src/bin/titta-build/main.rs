//! titta-build CLI - configure and build the TittaPy extension

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use titta_build::ConfigureError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        if let Some(err) = e.downcast_ref::<ConfigureError>() {
            eprintln!("{}", err.help());
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("titta_build=debug")
    } else {
        EnvFilter::new("titta_build=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Configure(args) => commands::configure::execute(args),
        Commands::Flags(args) => commands::flags::execute(args),
        Commands::DataFiles(args) => commands::data_files::execute(args),
        Commands::Metadata(args) => commands::metadata::execute(args),
        Commands::Build(args) => commands::build::execute(args, cli.verbose),
        Commands::Toolchain(args) => commands::toolchain::execute(args),
    }
}
