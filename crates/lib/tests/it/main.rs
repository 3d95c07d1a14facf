/*! Integration tests for Prefstore.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - backend: Load/save through the gist, file and memory transports, with and without encryption
 * - ratelimit: Sliding-window admission and the background cleanup task
 * - store: End-to-end record, friend and statistics flows through the public API
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("prefstore=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod backend;
mod ratelimit;
mod store;
