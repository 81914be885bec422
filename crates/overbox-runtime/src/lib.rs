//! One-shot container lifecycle for the Overbox engine.

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod engine;
pub mod process;
pub mod teardown;
