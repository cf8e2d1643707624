#![allow(dead_code)]

pub use simon_test_utils::builders;
pub use simon_test_utils::fake_executor;
pub use simon_test_utils::{eventually, init_tracing, with_timeout};
#[cfg(unix)]
pub use simon_test_utils::process_alive;
