mod config;
mod show;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use amazon_ynab::remote::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use amazon_ynab::{CacheStore, RunConfig, RunError, RunReport, YnabClient};
use anyhow::{Context as _, Result};
use clap::{Args as ClapArgs, CommandFactory as _, Parser, Subcommand};

use config::Config;

/// Exit status when the transaction fetch fails and no update was attempted.
const EXIT_FETCH_FAILED: u8 = 2;

#[derive(Parser)]
#[command(
    name = "amazon-ynab",
    about = "Annotate YNAB transactions with the Amazon orders they paid for"
)]
#[command(disable_help_subcommand = true)]
struct Args {
    #[command(flatten)]
    options: Options,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(ClapArgs)]
struct Options {
    /// Config file path. Defaults to amazon-ynab.toml in the current directory.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Only report the memos that would be written
    #[arg(long, global = true, conflicts_with = "apply")]
    dry_run: bool,

    /// Write memos even if the config file sets dry_run
    #[arg(long, global = true)]
    apply: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync transactions, match purchases and update memos (default)
    Run,
    /// Show what the local transaction cache contains
    Status,
}

pub async fn run(args: impl IntoIterator<Item = String>) -> Result<ExitCode> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "amazon_ynab=info,amazon_ynab_cli=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    clap_complete::CompleteEnv::with_factory(Args::command).complete();

    let args = Args::parse_from(args);
    let config = load_config(args.options.config.as_deref())?;

    match args.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let dry_run = match (args.options.dry_run, args.options.apply) {
                (true, _) => true,
                (_, true) => false,
                _ => config.dry_run,
            };
            sync_and_update(&config, dry_run).await
        }
        Commands::Status => {
            let cache = CacheStore::new(&config.ynab.cache_file).load()?;
            show::show_cache_status(&cache);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path),
        None => Config::find_and_load()?.context(
            "No config file found. Create amazon-ynab.toml or pass --config <path>.",
        ),
    }
}

async fn sync_and_update(config: &Config, dry_run: bool) -> Result<ExitCode> {
    let run_config = RunConfig {
        purchases_path: config.amazon.transactions_file.clone(),
        cache_path: config.ynab.cache_file.clone(),
        dry_run,
        matching: (&config.matching).into(),
    };
    if let Some(report) = amazon_ynab::check_input(&run_config) {
        return Ok(finish(report, dry_run));
    }

    let base_url = config
        .ynab
        .base_url
        .as_deref()
        .unwrap_or(DEFAULT_BASE_URL);
    let timeout = config
        .ynab
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    let budget_id = match &config.ynab.budget_id {
        Some(budget_id) => budget_id.clone(),
        None => YnabClient::default_budget_id(base_url, &config.ynab.api_token, timeout)
            .await
            .context("Failed to look up the default budget")?,
    };
    let client = YnabClient::new(base_url, &config.ynab.api_token, budget_id, timeout)?;

    if dry_run {
        tracing::info!("Dry run: no transaction will be updated");
    }

    match amazon_ynab::run(&run_config, &client).await {
        Ok(report) => Ok(finish(report, dry_run)),
        Err(error @ RunError::Fetch(_)) => {
            let error = anyhow::Error::new(error);
            tracing::error!("{error:#}");
            eprintln!("Sync failed, no transactions were updated: {error:#}");
            Ok(ExitCode::from(EXIT_FETCH_FAILED))
        }
        Err(error) => Err(error.into()),
    }
}

fn finish(report: RunReport, dry_run: bool) -> ExitCode {
    match report {
        RunReport::InputMissing(path) => {
            println!(
                "No purchases found at {}. Extract your Amazon orders first.",
                path.display()
            );
        }
        RunReport::Completed(summary) => show::show_summary(&summary, dry_run),
    }
    ExitCode::SUCCESS
}
