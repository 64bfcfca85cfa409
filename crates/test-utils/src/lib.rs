//! Shared helpers for the `sitepipe` integration tests.

pub mod builders;
pub mod fake_executor;
pub mod transforms;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for any single awaited pipeline in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness capture.
///
/// Output only shows for failing tests (or with `--nocapture`); pick the
/// verbosity with `RUST_LOG`, e.g. `RUST_LOG=sitepipe=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt().with_env_filter(filter).with_test_writer().init();
    });
}

/// Await `fut`, panicking if it takes longer than [`TEST_TIMEOUT`].
///
/// A hung runtime loop shows up as a failed test instead of a stuck run.
pub async fn with_timeout<F, T>(fut: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(out) => out,
        Err(_) => panic!("test did not finish within {TEST_TIMEOUT:?}"),
    }
}
