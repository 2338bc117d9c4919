// Process bootstrap helpers shared by catalog-service, replica-service, and
// frontend-service: tracing setup, matching the original Python's reliance
// on a `.env` file and `logging` module at process start (see
// SPEC_FULL.md §2). Config loading itself goes entirely through each
// binary's `clap::Parser` derive.

use tracing_subscriber::EnvFilter;

/// Initializes a `tracing` subscriber reading `RUST_LOG`, defaulting to
/// `info` for this crate family. Call once near the top of `main`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
