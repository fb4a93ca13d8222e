//! `hreflang-sitemap generate`: write per-locale sitemaps with hreflang alternates.

use crate::acquisition::http_client::HttpClient;
use crate::cli::output::{self, Styled};
use crate::config::{Settings, SiteRegistry};
use crate::pipeline::{self, GenerateSummary};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};

/// Run the generate command.
pub async fn run(registry: &SiteRegistry, settings: &Settings) -> Result<GenerateSummary> {
    let start = Instant::now();
    let client = HttpClient::new().context("failed to build http client")?;

    let summary = pipeline::generate(&client, registry, settings).await;

    if !output::is_quiet() {
        print_summary(&Styled::new(), &summary, start.elapsed());
    }
    Ok(summary)
}

fn print_summary(s: &Styled, summary: &GenerateSummary, elapsed: Duration) {
    output::print_header(s, "generate");

    let load = &summary.load;
    let index_sym = if load.locales_failed == 0 {
        s.ok_sym()
    } else {
        s.warn_sym()
    };
    output::print_check(
        &index_sym,
        "Query indices",
        &format!("{} loaded, {} failed", load.locales_loaded, load.locales_failed),
    );
    output::print_check(
        &s.ok_sym(),
        "Pages",
        &format!(
            "{} indexable, {} linked, {} unlinked, {} rows skipped",
            load.pages_kept, load.pages_linked, load.pages_unlinked, load.pages_skipped
        ),
    );
    output::print_check(
        &s.ok_sym(),
        "External merge",
        &format!(
            "{} keys, {} entries added, {} kept",
            summary.merge.keys_added, summary.merge.entries_added, summary.merge.entries_kept
        ),
    );

    for written in &summary.written {
        output::print_check(
            &s.ok_sym(),
            &written.locale,
            &format!(
                "{} urls, {} alternates -> {}",
                written.urls,
                written.alternates,
                written.path.display()
            ),
        );
    }
    for code in &summary.failed {
        output::print_check(&s.fail_sym(), code, "sitemap not written");
    }

    eprintln!();
    eprintln!("  Done in {}", output::format_duration(elapsed.as_secs()));
}
