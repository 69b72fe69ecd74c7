//! Genewiki-Priority main entry point
//!
//! This is the command-line interface for the gene article worklist builder.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use genewiki_priority::config::{load_config_with_hash, Config};
use genewiki_priority::pipeline::{files, Pipeline, Step};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Genewiki-Priority: a worklist of genes with thin Wikipedia coverage
///
/// Correlates knowledge-graph article existence, article length and
/// publication volume into genes ranked by how under-covered they are.
#[derive(Parser, Debug)]
#[command(name = "genewiki-priority")]
#[command(version)]
#[command(about = "Rank genes whose Wikipedia articles lag their literature", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Stage to run
    #[arg(long, value_enum, default_value_t = StageArg::All)]
    stage: StageArg,

    /// Continue from persisted tables and failure lists instead of starting fresh
    #[arg(long)]
    resume: bool,

    /// Validate config and print the resolved settings without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show run and pass history from the ledger and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Generate markdown summary from existing tables and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StageArg {
    All,
    KnowledgeGraph,
    WikiVolume,
    PageViews,
    Literature,
    RetryLiterature,
    RetryPublications,
    Prioritize,
    Authors,
}

impl From<StageArg> for Step {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::All => Step::All,
            StageArg::KnowledgeGraph => Step::KnowledgeGraph,
            StageArg::WikiVolume => Step::WikiVolume,
            StageArg::PageViews => Step::PageViews,
            StageArg::Literature => Step::Literature,
            StageArg::RetryLiterature => Step::RetryLiterature,
            StageArg::RetryPublications => Step::RetryPublications,
            StageArg::Prioritize => Step::Prioritize,
            StageArg::Authors => Step::Authors,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let step = Step::from(cli.stage);
    if cli.dry_run {
        handle_dry_run(&config, step);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        handle_run(config, &config_hash, step, cli.resume).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("genewiki_priority=info,warn"),
            1 => EnvFilter::new("genewiki_priority=debug,info"),
            2 => EnvFilter::new("genewiki_priority=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: prints the resolved configuration
fn handle_dry_run(config: &Config, step: Step) {
    println!("=== Genewiki-Priority Dry Run ===\n");

    println!("User Agent: {}", config.user_agent.header_value());
    println!(
        "  Literature API key: {}",
        if config.user_agent.ncbi_api_key.is_some() {
            "set"
        } else {
            "not set"
        }
    );

    println!("\nFetch:");
    println!("  Max retries: {}", config.fetch.max_retries);
    println!("  Backoff factor: {}s", config.fetch.backoff_factor);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Retry statuses: {:?}", config.fetch.retry_statuses);
    println!("  Wiki spacing: {}ms", config.fetch.wiki_delay_ms);
    println!("  Literature spacing: {}ms", config.fetch.literature_delay_ms);
    println!("  Concurrency: {}", config.fetch.concurrency);

    println!("\nEndpoints:");
    println!("  Knowledge graph: {}", config.endpoints.sparql_url);
    println!("  Wiki API: {}", config.endpoints.wiki_api_url);
    println!("  Pageviews: {}", config.endpoints.pageviews_url);
    println!("  Literature index: {}", config.endpoints.eutils_url);

    let t = &config.thresholds;
    println!("\nThresholds:");
    println!("  Article length below: {}", t.max_page_length);
    println!("  Linked publications above: {}", t.min_linked_publications);
    println!("  Publication count above: {}", t.min_pubcount);
    println!("  Article length above: {}", t.min_page_length);
    println!("  Top N: {}", t.top_n);
    println!(
        "  Score: {} / length + pubcount / {}",
        t.length_numerator, t.pubcount_divisor
    );
    println!("  Author appearances above: {}", t.min_author_gene_count);

    println!("\nResume:");
    println!("  Residual threshold: {}", config.resume.residual_threshold);
    println!("  Max passes: {}", config.resume.max_passes);

    println!("\nOutput:");
    println!("  Data: {}", config.output.data_dir);
    println!("  Results: {}", config.output.result_dir);
    println!("  Ledger: {}", config.output.ledger_path);

    println!("\n✓ Configuration is valid");
    if step.fetches() {
        println!("✓ Would run stage '{}' against the endpoints above", step);
    } else {
        println!("✓ Would run stage '{}' from tables on disk", step);
    }
}

/// Handles the --stats mode: shows run and pass history
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use genewiki_priority::output::{load_statistics, print_statistics};
    use genewiki_priority::storage::open_ledger;

    println!("Ledger: {}\n", config.output.ledger_path);

    let ledger = open_ledger(Path::new(&config.output.ledger_path))?;
    let stats = load_statistics(&ledger, 10)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    use genewiki_priority::output::{generate_markdown_summary, generate_summary};
    use genewiki_priority::storage::open_ledger;

    let output_path = Path::new(&config.output.result_dir).join(files::SUMMARY);

    println!("=== Exporting Run Summary ===\n");
    println!("Ledger: {}", config.output.ledger_path);
    println!("Output: {}", output_path.display());
    println!();

    let ledger = open_ledger(Path::new(&config.output.ledger_path))?;

    tracing::info!("Loading tables...");
    let summary = generate_summary(
        &ledger,
        Path::new(&config.output.data_dir),
        Path::new(&config.output.result_dir),
        25,
    )?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, &output_path)?;

    println!("✓ Summary exported to: {}", output_path.display());

    Ok(())
}

/// Handles the main pipeline run
async fn handle_run(config: Config, config_hash: &str, step: Step, resume: bool) -> anyhow::Result<()> {
    if resume {
        tracing::info!("Running '{}' (resuming from persisted tables)", step);
    } else {
        tracing::info!("Running '{}'", step);
    }

    let mut pipeline = Pipeline::new(config, config_hash, step)?.resume_from_disk(resume);
    pipeline
        .run(step)
        .await
        .with_context(|| format!("stage '{}' failed", step))?;

    tracing::info!("Run {} finished", pipeline.run_id());
    Ok(())
}
