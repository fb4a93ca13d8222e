//! Acquisition layer: fetching and parsing remote documents.
//!
//! Everything here turns bytes from the network into typed values. Nothing
//! in this module knows about the hreflang map.

pub mod head_scanner;
pub mod http_client;
pub mod query_index;
pub mod sitemap_parser;
