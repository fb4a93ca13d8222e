//! Cartography: walking locale sites to build the hreflang map.

pub mod batcher;
pub mod index_loader;
pub mod resolver;
