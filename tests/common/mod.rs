#![allow(dead_code)]

use std::error::Error;

pub use sitepipe_test_utils::builders::{ConfigFileBuilder, SiteFixture, identity_toolchain};
pub use sitepipe_test_utils::fake_executor::FakeExecutor;
pub use sitepipe_test_utils::transforms::{FailOn, Uppercase};
pub use sitepipe_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn Error>>;
