//! Invocation of the external packaging tools.

use std::process::{Command, Stdio};

use tracing::trace;

use crate::{error::RepoError, RepoResult};

fn program_name(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().into_owned()
}

/// Runs a tool to completion, failing on a non-zero exit.
///
/// With `show_output` the tool writes straight to the terminal; otherwise its
/// output is captured and stderr is attached to the error on failure.
pub fn run(cmd: &mut Command, show_output: bool) -> RepoResult<()> {
    let tool = program_name(cmd);
    trace!("running {cmd:?}");

    if show_output {
        let status = cmd
            .stdin(Stdio::null())
            .status()
            .map_err(|source| RepoError::ToolSpawn { tool: tool.clone(), source })?;
        if !status.success() {
            return Err(RepoError::ToolFailed {
                tool,
                status: status.to_string(),
                stderr: String::new(),
            });
        }
        return Ok(());
    }

    capture(cmd).map(|_| ())
}

/// Runs a tool and returns its standard output.
pub fn capture(cmd: &mut Command) -> RepoResult<String> {
    let tool = program_name(cmd);
    trace!("running {cmd:?}");

    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|source| RepoError::ToolSpawn { tool: tool.clone(), source })?;

    if !output.status.success() {
        return Err(RepoError::ToolFailed {
            tool,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
