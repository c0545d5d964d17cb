//! External process execution.
//!
//! All toolchain invocations (Gradle, keytool, the SDK build tools) go
//! through these helpers: captured output for parsing, inherited stdio for
//! long-running builds the user wants to watch.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};

#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

fn build_command(
    program: impl AsRef<OsStr>,
    args: &[&str],
    env: &HashMap<String, String>,
    cwd: Option<&Path>,
) -> Command {
    let mut command = Command::new(program);
    command.args(args).envs(env);
    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }
    command
}

/// Runs a program to completion, capturing stdout and stderr. A non-zero
/// exit code is an error carrying the tool's stderr.
pub fn execute_file(
    program: impl AsRef<OsStr>,
    args: &[&str],
    env: &HashMap<String, String>,
    cwd: Option<&Path>,
) -> Result<ProcessOutput> {
    let program_name = program.as_ref().to_string_lossy().to_string();
    log::debug!("Executing {program_name} {}", args.join(" "));

    let output = build_command(program, args, env, cwd)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Running `{program_name}`"))?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        bail!(
            "`{program_name}` exited with {}: {}",
            output.status,
            stderr.trim()
        );
    }

    Ok(ProcessOutput { stdout, stderr })
}

/// Runs a program with stdio inherited from this process, for builds where
/// the user should see the tool's own progress output.
pub fn execute_interactive(
    program: impl AsRef<OsStr>,
    args: &[&str],
    env: &HashMap<String, String>,
    cwd: Option<&Path>,
) -> Result<()> {
    let program_name = program.as_ref().to_string_lossy().to_string();
    log::debug!("Executing {program_name} {}", args.join(" "));

    let status = build_command(program, args, env, cwd)
        .status()
        .with_context(|| format!("Running `{program_name}`"))?;

    if !status.success() {
        bail!("`{program_name}` exited with {status}");
    }
    Ok(())
}

/// A copy of this process' environment, as a base for tool invocations.
pub fn current_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn captures_stdout() {
        let output = execute_file("sh", &["-c", "echo hello"], &current_env(), None).unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_codes_are_errors() {
        let err = execute_file("sh", &["-c", "echo oops >&2; exit 3"], &current_env(), None)
            .unwrap_err();
        assert!(err.to_string().contains("oops"));
    }

    #[test]
    fn missing_programs_are_errors() {
        assert!(execute_file("definitely-not-a-real-tool", &[], &current_env(), None).is_err());
    }
}
