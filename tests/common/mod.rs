// tests/common/mod.rs

//! Shared helpers for the process-level tests.

#![allow(dead_code)]

pub use aidy_bridge_test_utils::builders::ConfigFileBuilder;
pub use aidy_bridge_test_utils::fake_engine::FakeEngine;
pub use aidy_bridge_test_utils::{
    collect_until, collect_until_exit, commands, init_tracing, log_lines, states, with_timeout,
};

use std::path::Path;

/// Lines of a file written by a fake engine, e.g. a start counter.
pub fn count_lines(dir: &Path, file: &str) -> usize {
    std::fs::read_to_string(dir.join(file))
        .map(|s| s.lines().count())
        .unwrap_or(0)
}
