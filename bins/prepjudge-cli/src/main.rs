mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prepjudge_common::config::JudgeConfig;
use prepjudge_engine::{CancellationToken, Judge};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "prepjudge-cli")]
#[command(about = "PrepJudge CLI - Run and grade solutions against test cases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a solution against the visible test cases
    Run {
        /// Source file to judge
        #[arg(short, long)]
        file: PathBuf,

        /// Language id or alias (e.g., python, cpp, js)
        #[arg(short, long)]
        language: String,

        /// JSON file with the test cases
        #[arg(short, long)]
        tests: PathBuf,
    },

    /// Grade a solution against every test case, hidden ones included
    Submit {
        /// Source file to judge
        #[arg(short, long)]
        file: PathBuf,

        /// Language id or alias (e.g., python, cpp, js)
        #[arg(short, long)]
        language: String,

        /// JSON file with the test cases
        #[arg(short, long)]
        tests: PathBuf,
    },

    /// Execute a solution once with custom input
    Exec {
        /// Source file to execute
        #[arg(short, long)]
        file: PathBuf,

        /// Language id or alias (e.g., python, cpp, js)
        #[arg(short, long)]
        language: String,

        /// Text passed on stdin
        #[arg(short, long, default_value = "")]
        stdin: String,
    },

    /// List supported languages
    Languages,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout carries the JSON result
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Commands::Languages = cli.command {
        return commands::list_languages();
    }

    let config = JudgeConfig::from_env().context("Invalid judge configuration")?;
    let judge = Judge::from_config(&config).context("Failed to build judge")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let success = match cli.command {
        Commands::Run {
            file,
            language,
            tests,
        } => commands::run_tests(&judge, &file, &language, &tests, &cancel).await?,
        Commands::Submit {
            file,
            language,
            tests,
        } => commands::submit(&judge, &file, &language, &tests, &cancel).await?,
        Commands::Exec {
            file,
            language,
            stdin,
        } => commands::execute(&judge, &file, &language, &stdin, &cancel).await?,
        Commands::Languages => true,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
