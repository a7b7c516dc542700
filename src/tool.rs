//! Shared runner for external media tools.

use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Captured result of a successful tool invocation.
#[derive(Debug)]
pub(crate) struct ToolOutput {
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

/// Run an external tool to completion, capturing stdout and stderr.
/// The binary is resolved on PATH before spawning; a non-zero exit
/// status is an error carrying both captured streams.
pub(crate) async fn run_tool(program: &'static str, args: &[String]) -> Result<ToolOutput> {
    which::which(program).map_err(|_| Error::ToolNotFound(program))?;

    debug!("Running {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        return Err(Error::ToolFailed {
            tool: program,
            exit_code: output.status.code(),
            stdout,
            stderr,
        });
    }

    Ok(ToolOutput { stdout, stderr })
}
