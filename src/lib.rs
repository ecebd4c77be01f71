//! Trending games dashboard: a catalog aggregator over the RAWG `games`
//! collection and a relay gateway that serves static files and proxies the
//! trending query with a server-side API key.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod services;
