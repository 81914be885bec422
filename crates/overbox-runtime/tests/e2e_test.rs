//! End-to-end tests for the one-shot container lifecycle.
//!
//! The engine unshares the namespaces of its own process, which the
//! kernel refuses from the multithreaded test harness. The full
//! lifecycle is therefore exercised out-of-process through the `obx`
//! binary (see the CLI crate's tests); what runs here is everything up
//! to the namespace boundary, plus the privileged device-node checks.
//!
//! `#[ignore]`d tests need root; use `cargo test -- --ignored` on a
//! privileged Linux host.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;
use std::time::Duration;

use overbox_core::filesystem::overlay::LayerSet;
use overbox_runtime::engine::{ContainerConfig, Engine};

fn is_root() -> bool {
    nix::unistd::getuid().is_root()
}

fn layer_config(root: &Path, command: Vec<String>) -> ContainerConfig {
    ContainerConfig {
        layers: LayerSet {
            base: root.join("base"),
            upper: root.join("data"),
            work: root.join("work"),
            combined: root.join("overlay"),
        },
        command,
        grace: Duration::ZERO,
    }
}

#[test]
fn missing_base_reports_the_base_layer() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = layer_config(tmp.path(), vec!["/bin/true".to_string()]);

    let err = Engine::new(cfg).run().unwrap_err();
    assert!(err.to_string().contains("base layer"));
}

#[test]
fn repeated_invocations_reuse_the_data_layer() {
    // The data layer pre-existing from an earlier run must not be an
    // error; without privileges both runs stop at the overlay mount.
    if is_root() {
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let cfg = layer_config(tmp.path(), vec!["/bin/true".to_string()]);
    std::fs::create_dir(&cfg.layers.base).unwrap();
    std::fs::create_dir(&cfg.layers.upper).unwrap();

    for _ in 0..2 {
        let result = Engine::new(cfg.clone()).run();
        assert!(result.is_err(), "unprivileged mount should fail");
        assert!(cfg.layers.upper.is_dir());
    }
}

#[test]
#[ignore] // Use `cargo test -- --ignored` to run privileged tests.
fn device_nodes_match_the_fixed_table() {
    use std::os::unix::fs::{FileTypeExt, MetadataExt};

    if !is_root() {
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    overbox_core::devices::populate_device_dir(tmp.path()).unwrap();

    for spec in overbox_core::devices::DEVICE_TABLE {
        let path = tmp.path().join(spec.name);
        let meta = std::fs::metadata(&path).unwrap();

        assert!(meta.file_type().is_char_device(), "{} kind", spec.name);
        assert_eq!(
            u64::from(meta.mode() & 0o7777),
            u64::from(spec.mode),
            "{} permission bits",
            spec.name
        );
        assert_eq!(
            nix::sys::stat::major(meta.rdev()),
            spec.major,
            "{} major",
            spec.name
        );
        assert_eq!(
            nix::sys::stat::minor(meta.rdev()),
            spec.minor,
            "{} minor",
            spec.name
        );
    }
}
