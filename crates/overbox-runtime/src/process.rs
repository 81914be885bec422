//! Child launch inside the prepared root.
//!
//! Forks, chroots the child into the combined directory, and execs the
//! caller's command with a fixed minimal environment. The parent blocks
//! until the child exits and reports its status.

use std::ffi::CString;
use std::path::Path;

use overbox_common::constants::CONTAINER_PATH_ENV;
use overbox_common::error::{OverboxError, Result};

/// Exit status used when the child cannot reach `execve(2)`, mirroring
/// the shell's "command not found" convention.
const EXEC_FAILURE_STATUS: i32 = 127;

/// Runs `command` chrooted into `root` and returns its exit status.
///
/// The child becomes PID 1 of the previously unshared PID namespace and
/// inherits the caller's three standard streams unchanged; its only
/// environment entry is the fixed `PATH`. A signal death maps to
/// `128 + signo`, the shell convention.
///
/// # Errors
///
/// Returns an error if argv marshaling, `fork(2)`, or the wait fails.
/// Chroot or exec failures inside the child surface as exit status 127.
#[cfg(target_os = "linux")]
pub fn launch(root: &Path, command: &[String]) -> Result<i32> {
    use nix::sys::wait::{WaitStatus, waitpid};
    use nix::unistd::ForkResult;

    let argv = build_argv(command)?;
    let env = build_env()?;

    tracing::info!(root = %root.display(), command = %command.join(" "), "starting container process");

    // SAFETY: single-threaded process; the child only calls chroot, chdir,
    // execve, and _exit before its image is replaced.
    match unsafe { nix::unistd::fork() } {
        Ok(ForkResult::Parent { child }) => {
            tracing::info!(pid = %child, "container process started");
            match waitpid(child, None) {
                Ok(WaitStatus::Exited(_, code)) => {
                    tracing::info!(code, "container process exited");
                    Ok(code)
                }
                Ok(WaitStatus::Signaled(_, signal, _)) => {
                    tracing::info!(signal = %signal, "container process killed by signal");
                    Ok(128 + signal as i32)
                }
                Ok(status) => Err(OverboxError::Launch {
                    command: command[0].clone(),
                    message: format!("unexpected wait status: {status:?}"),
                }),
                Err(e) => Err(OverboxError::Launch {
                    command: command[0].clone(),
                    message: format!("waitpid failed: {e}"),
                }),
            }
        }
        Ok(ForkResult::Child) => {
            // Past this point no error can reach the parent's Result; the
            // exit status is the only channel left.
            if let Err(err) = enter_root_and_exec(root, &argv, &env) {
                eprintln!("{}: {err}", overbox_common::constants::BIN_NAME);
            }
            unsafe { libc::_exit(EXEC_FAILURE_STATUS) }
        }
        Err(e) => Err(OverboxError::Launch {
            command: command[0].clone(),
            message: format!("fork failed: {e}"),
        }),
    }
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — the launcher requires Linux.
#[cfg(not(target_os = "linux"))]
pub fn launch(_root: &Path, _command: &[String]) -> Result<i32> {
    Err(OverboxError::Config {
        message: "Linux required for container operations".into(),
    })
}

#[cfg(target_os = "linux")]
fn enter_root_and_exec(root: &Path, argv: &[CString], env: &[CString]) -> Result<()> {
    use nix::unistd::{chdir, chroot, execve};

    let exec_error = |message: String| OverboxError::Launch {
        command: argv[0].to_string_lossy().into_owned(),
        message,
    };

    chroot(root).map_err(|e| exec_error(format!("chroot failed: {e}")))?;
    chdir("/").map_err(|e| exec_error(format!("chdir failed: {e}")))?;
    let _ = execve(&argv[0], argv, env).map_err(|e| exec_error(format!("exec failed: {e}")))?;
    Ok(())
}

fn build_argv(command: &[String]) -> Result<Vec<CString>> {
    if command.is_empty() {
        return Err(OverboxError::Config {
            message: "no command to execute".into(),
        });
    }
    command
        .iter()
        .map(|arg| {
            CString::new(arg.as_str()).map_err(|_| OverboxError::Launch {
                command: command[0].clone(),
                message: format!("argument contains an interior NUL byte: {arg:?}"),
            })
        })
        .collect()
}

fn build_env() -> Result<Vec<CString>> {
    let path = CString::new(CONTAINER_PATH_ENV).map_err(|_| OverboxError::Config {
        message: "container PATH contains an interior NUL byte".into(),
    })?;
    Ok(vec![path])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_argv_preserves_command_and_arguments() {
        let command = vec!["/bin/ls".to_string(), "-la".to_string(), "/tmp".to_string()];
        let argv = build_argv(&command).unwrap();

        assert_eq!(argv.len(), 3);
        assert_eq!(argv[0].to_str().unwrap(), "/bin/ls");
        assert_eq!(argv[1].to_str().unwrap(), "-la");
        assert_eq!(argv[2].to_str().unwrap(), "/tmp");
    }

    #[test]
    fn build_argv_rejects_empty_command() {
        let err = build_argv(&[]).unwrap_err();
        assert!(matches!(err, OverboxError::Config { .. }));
    }

    #[test]
    fn build_argv_rejects_interior_nul() {
        let command = vec!["/bin/sh".to_string(), "bad\0arg".to_string()];
        let err = build_argv(&command).unwrap_err();
        assert!(matches!(err, OverboxError::Launch { .. }));
    }

    #[test]
    fn env_contains_only_the_fixed_path() {
        let env = build_env().unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(
            env[0].to_str().unwrap(),
            "PATH=/usr/sbin:/usr/bin:/sbin:/bin"
        );
    }
}
