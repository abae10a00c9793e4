// src/main.rs

use anyhow::Result;
use clap::Parser;
use specwright::spec::GeneratorOptions;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Check { file }) => commands::cmd_check(&file),
        Some(Commands::Format {
            file,
            inline_files,
            sort_tags,
            sort_deps,
            sort_scripts,
            in_place,
        }) => {
            let options = GeneratorOptions {
                inline_files,
                sort_tags,
                sort_deps,
                sort_scripts,
            };
            commands::cmd_format(&file, options, in_place)
        }
        Some(Commands::Options { file, json }) => commands::cmd_options(&file, json),
        Some(Commands::Completions { shell }) => commands::cmd_completions(shell),
        None => {
            // No command provided, show help
            println!("Specwright v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'specwright --help' for usage information");
            Ok(())
        }
    }
}
