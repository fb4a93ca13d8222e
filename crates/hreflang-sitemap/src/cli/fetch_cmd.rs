//! `hreflang-sitemap fetch-external`: scrape unmigrated sites into the lookup table.

use crate::acquisition::http_client::HttpClient;
use crate::cli::output::{self, Styled};
use crate::config::{Settings, SiteRegistry};
use crate::pipeline::{self, FetchSummary};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};

/// Run the fetch-external command.
pub async fn run(registry: &SiteRegistry, settings: &Settings) -> Result<FetchSummary> {
    let start = Instant::now();
    let client = HttpClient::new().context("failed to build http client")?;

    let summary = pipeline::fetch_external(&client, registry, settings).await;

    if !output::is_quiet() {
        print_summary(&Styled::new(), settings, &summary, start.elapsed());
    }
    Ok(summary)
}

fn print_summary(s: &Styled, settings: &Settings, summary: &FetchSummary, elapsed: Duration) {
    let report = &summary.report;
    output::print_header(s, "fetch-external");

    let sitemap_sym = if report.sitemaps_failed == 0 {
        s.ok_sym()
    } else {
        s.warn_sym()
    };
    output::print_check(
        &sitemap_sym,
        "Sitemaps",
        &format!(
            "{} fetched, {} failed",
            report.sitemaps_fetched, report.sitemaps_failed
        ),
    );
    output::print_check(
        &s.ok_sym(),
        "Pages",
        &format!(
            "{} seen, {} resolved, {} without loc",
            report.entries_seen, report.entries_resolved, report.entries_skipped
        ),
    );

    let table_sym = if summary.persisted {
        s.ok_sym()
    } else {
        s.fail_sym()
    };
    output::print_check(
        &table_sym,
        "Lookup table",
        &format!(
            "{} keys, {} entries -> {}",
            summary.keys,
            summary.entries,
            settings.lookup_table.display()
        ),
    );

    eprintln!();
    eprintln!("  Done in {}", output::format_duration(elapsed.as_secs()));
}
