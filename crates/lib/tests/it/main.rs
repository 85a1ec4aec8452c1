/*! Integration tests for sewaportal.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - resolver: Identity resolution, lazy bootstrap, and degradation behavior
 * - watcher: Session-driven re-resolution and staleness handling
 * - account: Sign-in/sign-up flows, validation, and credential errors
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("sewaportal=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod account;
mod helpers;
mod resolver;
mod watcher;
