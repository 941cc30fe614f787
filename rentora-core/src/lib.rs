// src/lib.rs

pub mod config;
pub mod db;
pub mod repositories;
pub mod services;
pub mod test_utils;

pub use db::Database;
pub use rentora_common::error::Error;

/// Install the global tracing subscriber, honouring `RUST_LOG`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
