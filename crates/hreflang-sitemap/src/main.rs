use anyhow::Result;
use clap::{Parser, Subcommand};
use hreflang_sitemap::cli::{fetch_cmd, generate_cmd, output};
use hreflang_sitemap::{MergePrecedence, Settings, SiteRegistry};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hreflang-sitemap",
    version,
    about = "Build multilingual sitemaps with hreflang alternates"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Lookup table written by `fetch-external` and read by `generate`
    #[arg(long, global = true)]
    lookup_table: Option<PathBuf>,

    /// Root directory for `<locale>/sitemap.xml` output
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,

    /// Pages scraped concurrently per batch
    #[arg(long, global = true)]
    batch_size: Option<usize>,

    /// Pause between batches in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Let the persisted external table override migrated-site entries
    #[arg(long, global = true)]
    external_wins: bool,

    /// Only log warnings and errors; no summary
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape unmigrated sites and persist the hreflang lookup table
    FetchExternal,
    /// Write one sitemap per migrated locale
    Generate,
    /// `fetch-external` followed by `generate`
    All,
}

impl Cli {
    fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(path) = &self.lookup_table {
            settings.lookup_table = path.clone();
        }
        if let Some(dir) = &self.out_dir {
            settings.output_root = dir.clone();
        }
        if let Some(size) = self.batch_size {
            settings.batch_size = size;
        }
        if let Some(ms) = self.delay_ms {
            settings.batch_delay = Duration::from_millis(ms);
        }
        if self.external_wins {
            settings.precedence = MergePrecedence::ExternalWins;
        }
        settings
    }

    fn log_filter(&self) -> EnvFilter {
        let level = if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        };
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("hreflang_sitemap={level}")))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_writer(std::io::stderr)
        .init();
    output::set_quiet(cli.quiet);

    let registry = SiteRegistry::builtin();
    let settings = cli.settings();
    info!(
        "default locale {}, {} migrated, {} unmigrated",
        registry.default_locale().code,
        registry.migrated().count(),
        registry.unmigrated().count()
    );

    match cli.command {
        Command::FetchExternal => {
            fetch_cmd::run(&registry, &settings).await?;
        }
        Command::Generate => {
            generate_cmd::run(&registry, &settings).await?;
        }
        Command::All => {
            fetch_cmd::run(&registry, &settings).await?;
            generate_cmd::run(&registry, &settings).await?;
        }
    }

    Ok(())
}
