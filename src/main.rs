//! esaj-crawler main entry point
//!
//! This is the command-line interface for the e-SAJ process crawler.

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use esaj_crawler::config::{load_config_with_hash, Config};
use esaj_crawler::crawler::{CrawlContext, EsajClient, OabEnumerator};
use esaj_crawler::output::{
    basic_info_to_json, print_statistics, store_documents, write_basic_info_json,
    CollectionStatistics, FsDocumentSink,
};
use esaj_crawler::process::ProcessId;
use esaj_crawler::storage::{open_storage, SqliteStorage, Storage};
use esaj_crawler::EsajError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Exit status when the portal rejected the session cookies
const EXIT_SESSION_EXPIRED: u8 = 3;

/// esaj-crawler: process data and documents from the e-SAJ court portal
///
/// Enumerates the processes of an attorney (OAB number), reads their basic
/// information and downloads publication certificates from the digital
/// folder. Session cookies come from an external login and are read from
/// the configuration file or the ESAJ_COOKIE_SESSION and
/// ESAJ_COOKIE_PDF_SESSION environment variables.
#[derive(Parser, Debug)]
#[command(name = "esaj-crawler")]
#[command(version)]
#[command(about = "Process data and document extraction for e-SAJ", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enumerate every process of an OAB and store the seeds
    Seed {
        #[arg(long)]
        oab: String,
    },

    /// Collect basic information for an OAB's processes or for one process
    #[command(group(ArgGroup::new("target").required(true).args(["oab", "process"])))]
    Collect {
        #[arg(long)]
        oab: Option<String>,

        /// Process number, e.g. 1029989-06.2022.8.26.0053
        #[arg(long)]
        process: Option<String>,

        /// Also write the collected records to this JSON file
        #[arg(long, value_name = "FILE", requires = "oab")]
        output: Option<PathBuf>,
    },

    /// Download the allowed documents of one process
    Download {
        #[arg(long)]
        process: String,
    },

    /// Print the stored basic information of an OAB as JSON
    List {
        #[arg(long)]
        oab: String,
    },

    /// Validate the configuration and show what would be used
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            let session_expired = e
                .downcast_ref::<EsajError>()
                .is_some_and(EsajError::is_session_expired);
            if session_expired {
                eprintln!("Session expired: log in again and refresh the cookies");
                ExitCode::from(EXIT_SESSION_EXPIRED)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    let token = interrupt_token();

    match cli.command {
        Command::Seed { oab } => handle_seed(&config, &token, &oab).await,
        Command::Collect {
            oab: Some(oab),
            output,
            ..
        } => handle_collect_oab(&config, &token, &oab, output.as_deref()).await,
        Command::Collect {
            process: Some(process),
            ..
        } => handle_collect_process(&config, &token, &process).await,
        Command::Collect { .. } => anyhow::bail!("collect needs --oab or --process"),
        Command::Download { process } => handle_download(&config, &token, &process).await,
        Command::List { oab } => handle_list(&config, &oab),
        Command::Check => {
            handle_check(&config);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("esaj_crawler=info,warn"),
            1 => EnvFilter::new("esaj_crawler=debug,info"),
            2 => EnvFilter::new("esaj_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Token cancelled on Ctrl-C, shared by every crawl of the command
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });
    token
}

fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.output.database_path);
    open_storage(path).with_context(|| format!("opening database {}", path.display()))
}

fn parse_process_id(input: &str) -> anyhow::Result<ProcessId> {
    Ok(ProcessId::parse(input)?)
}

/// Errors after which the remaining processes would fail the same way
fn aborts_collection(error: &EsajError) -> bool {
    matches!(
        error,
        EsajError::SessionExpired { .. }
            | EsajError::Cancelled { .. }
            | EsajError::DeadlineExceeded { .. }
            | EsajError::Storage(_)
    )
}

async fn handle_seed(config: &Config, token: &CancellationToken, oab: &str) -> anyhow::Result<()> {
    let enumerator = OabEnumerator::from_config(config)?;
    let mut storage = open_database(config)?;

    let ctx = CrawlContext::for_crawl(&config.crawler, token);
    let seeds = enumerator.search_by_oab(&ctx, oab).await?;
    let saved = storage.save_seeds(&seeds)?;

    println!("✓ {} seeds stored for OAB {}", saved, oab);
    Ok(())
}

async fn handle_collect_oab(
    config: &Config,
    token: &CancellationToken,
    oab: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let enumerator = OabEnumerator::from_config(config)?;
    let client = EsajClient::from_config(config)?;
    let mut storage = open_database(config)?;

    let ctx = CrawlContext::for_crawl(&config.crawler, token);
    let seeds = enumerator.search_by_oab(&ctx, oab).await?;
    storage.save_seeds(&seeds)?;

    let mut stats = CollectionStatistics::new(oab, seeds.len());
    let mut collected = Vec::with_capacity(seeds.len());

    for seed in &seeds {
        // Each process gets the full deadline; Ctrl-C still stops them all.
        let ctx = CrawlContext::for_crawl(&config.crawler, token);
        let result = async {
            let id = ProcessId::parse(&seed.process_id)?;
            let mut info = client.fetch_basic_info(&ctx, &seed.url, &id).await?;
            info.oab = oab.to_string();
            storage.save_basic_info(&info)?;
            Ok::<_, EsajError>(info)
        }
        .await;

        match result {
            Ok(info) => {
                stats.record_success();
                collected.push(info);
            }
            Err(e) if aborts_collection(&e) => return Err(e.into()),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", seed.process_id, e);
                stats.record_failure(&seed.process_id, &e);
            }
        }
    }

    if let Some(path) = output {
        write_basic_info_json(path, &collected)?;
        println!("✓ Records written to: {}", path.display());
    }

    stats.load_stored_count(&storage)?;
    print_statistics(&stats);
    Ok(())
}

async fn handle_collect_process(
    config: &Config,
    token: &CancellationToken,
    process: &str,
) -> anyhow::Result<()> {
    let id = parse_process_id(process)?;
    let client = EsajClient::from_config(config)?;
    let mut storage = open_database(config)?;

    let ctx = CrawlContext::for_crawl(&config.crawler, token);
    let info = client.fetch_basic_info_by_id(&ctx, &id).await?;
    storage.save_basic_info(&info)?;

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

async fn handle_download(
    config: &Config,
    token: &CancellationToken,
    process: &str,
) -> anyhow::Result<()> {
    let id = parse_process_id(process)?;
    let client = EsajClient::from_config(config)?;

    tracing::info!(
        "Allowed statuses: {}",
        config.crawler.allowed_statuses.join(", ")
    );
    let ctx = CrawlContext::for_crawl(&config.crawler, token);
    let documents = client.run(&ctx, &id).await?;
    if documents.is_empty() {
        println!("No document under an allowed status for {}", id);
        return Ok(());
    }

    let mut sink = FsDocumentSink::new(&config.output.documents_dir)?;
    let keys = store_documents(&mut sink, id.as_str(), &documents)?;

    println!("✓ {} documents saved to {}", keys.len(), sink.dir().display());
    for key in keys {
        println!("  - {}", key);
    }
    Ok(())
}

fn handle_list(config: &Config, oab: &str) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let infos = storage.basic_info_by_oab(oab)?;
    println!("{}", basic_info_to_json(&infos)?);
    Ok(())
}

/// Shows the effective configuration without touching the network
fn handle_check(config: &Config) {
    println!("=== esaj-crawler Configuration ===\n");

    println!("Portal:");
    println!("  Base URL: {}", config.portal.base_url);
    println!("  Timeout: {}s", config.portal.timeout_secs);
    println!("  Connect timeout: {}s", config.portal.connect_timeout_secs);
    println!("  User agent: {}", config.portal.user_agent);

    let present = |cookie: &str| if cookie.trim().is_empty() { "missing" } else { "present" };
    println!("\nSession:");
    println!("  Search cookie: {}", present(&config.session.cookie_session));
    println!(
        "  Download cookie: {}",
        present(&config.session.cookie_pdf_session)
    );

    println!("\nCrawler:");
    println!(
        "  Allowed statuses ({}): {}",
        config.crawler.allowed_statuses.len(),
        config.crawler.allowed_statuses.join(", ")
    );
    match config.crawler.deadline_secs {
        0 => println!("  Deadline: none"),
        secs => println!("  Deadline: {}s", secs),
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Documents: {}", config.output.documents_dir);

    println!("\n✓ Configuration is valid");
}
