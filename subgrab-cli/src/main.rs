mod cli;
mod commands;
mod config;
mod error;
mod output;

use crate::{
    cli::{Args, Commands, OutputFormat},
    commands::CommandExecutor,
    config::AppConfig,
    error::Result,
};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use std::process;
use subgrab::logging::{Verbosity, init_logging};
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let output_format = args.output;

    if let Err(e) = run(args).await {
        match output_format {
            OutputFormat::Json => {
                let error_json = serde_json::json!({
                    "status": "error",
                    "message": e.to_string(),
                });
                println!("{error_json}");
            }
            OutputFormat::Pretty => {
                error!("Application error: {}", e);
                #[cfg(feature = "colored-output")]
                {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                }
                #[cfg(not(feature = "colored-output"))]
                {
                    eprintln!("Error: {}", e);
                }
            }
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = AppConfig::load(args.config.as_deref())?;

    let _log_guard = init_logging(
        Verbosity::from_flags(args.verbose, args.quiet),
        commands::log_dir(&config, &args).as_deref(),
    )?;
    debug!(?config, "Loaded configuration");

    let executor = CommandExecutor::new(config, &args);

    match args.command {
        Commands::Channel {
            handle,
            limit,
            full,
            no_incremental,
            output_dir,
            urls_file,
        } => {
            executor
                .process_channel(&handle, limit, full, no_incremental, output_dir, urls_file)
                .await?;
        }

        Commands::Video {
            url,
            channel,
            output_dir,
            print,
            no_summary,
        } => {
            executor
                .process_video(&url, channel, output_dir, print, no_summary)
                .await?;
        }

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Args::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }

        Commands::Config { show, reset } => {
            if reset {
                let path = AppConfig::reset(args.config.as_deref())?;
                println!("✓ Configuration reset to defaults ({})", path.display());
            } else if show {
                let config = AppConfig::load(args.config.as_deref())?;
                println!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
        }
    }

    Ok(())
}
