//! # overbox-core
//!
//! Low-level Linux isolation primitives for the Overbox engine.
//!
//! This crate provides safe abstractions over:
//! - **Filesystem**: overlay layer composition and the pseudo-filesystem
//!   mounts a minimal root needs (`/proc`, scratch and device tmpfs).
//! - **Namespaces**: mount and PID detachment via `unshare(2)`.
//! - **Devices**: the fixed character-device table materialized under `/dev`.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod devices;
pub mod filesystem;
pub mod namespace;
