//! System-wide constants and default paths.

/// Application name used in log output.
pub const APP_NAME: &str = "overbox";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "obx";

/// Default writable data (upper) layer, relative to the current directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default overlay scratch directory, relative to the current directory.
pub const DEFAULT_WORK_DIR: &str = "work";

/// Default combined mount target, relative to the current directory.
pub const DEFAULT_COMBINED_DIR: &str = "overlay";

/// Command executed when the caller does not provide one.
pub const DEFAULT_COMMAND: &str = "/bin/sh";

/// The only environment entry handed to the launched process.
pub const CONTAINER_PATH_ENV: &str = "PATH=/usr/sbin:/usr/bin:/sbin:/bin";
