//! CLI subcommand implementations for the `hreflang-sitemap` binary.

pub mod fetch_cmd;
pub mod generate_cmd;
pub mod output;
