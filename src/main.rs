//! loadrig: script-driven HTTP load testing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use loadrig::config::AppConfig;
use loadrig::loadtest::model::TestType;

mod commands;

/// Script-driven HTTP load testing
#[derive(Parser)]
#[command(name = "loadrig")]
#[command(about = "Run recorded HTTP scripts under load", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./loadrig.toml if present)
    #[arg(long, global = true, env = "LOADRIG_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a load test from a script file
    ///
    /// Prints a summary to stdout and stores the result in the results
    /// directory.
    Run {
        /// Script JSON file
        #[arg(long)]
        script: PathBuf,

        /// Number of virtual users
        #[arg(long, default_value = "10")]
        vus: u32,

        /// Test duration in seconds
        #[arg(long, default_value = "30")]
        duration: u64,

        /// Test type label: smoke, load, stress or spike
        #[arg(long = "type", default_value = "load")]
        test_type: TestType,

        /// Do not store the result
        #[arg(long)]
        no_save: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Start the HTTP API
    Serve {
        /// Listen address (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },

    /// List stored results, newest first
    History {
        /// Only show results of this script
        #[arg(long)]
        script_id: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print a k6 script equivalent to a script file
    K6 {
        /// Script JSON file
        #[arg(long)]
        script: PathBuf,

        /// Number of virtual users
        #[arg(long, default_value = "10")]
        vus: u32,

        /// Test duration in seconds
        #[arg(long, default_value = "30")]
        duration: u64,
    },

    /// Delete stored results older than the given age
    Cleanup {
        /// Age threshold in days
        #[arg(long)]
        older_than_days: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    loadrig::logging::init(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    execute_command(cli.command, config)
}

fn execute_command(command: Commands, config: AppConfig) -> Result<()> {
    match command {
        Commands::Run {
            script,
            vus,
            duration,
            test_type,
            no_save,
            no_color,
        } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::run::execute(
                &config,
                commands::run::RunOptions {
                    script,
                    vus,
                    duration,
                    test_type,
                    no_save,
                    no_color,
                },
            ))?;
        },
        Commands::Serve { bind } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::serve::execute(config, bind))?;
        },
        Commands::History { script_id, json } => {
            commands::history::execute(&config, script_id.as_deref(), json)?;
        },
        Commands::K6 {
            script,
            vus,
            duration,
        } => {
            commands::k6::execute(&script, vus, duration)?;
        },
        Commands::Cleanup { older_than_days } => {
            commands::cleanup::execute(&config, older_than_days)?;
        },
    }
    Ok(())
}
