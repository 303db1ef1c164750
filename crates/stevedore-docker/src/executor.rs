use crate::process::{CommandOutput, ExecError};

/// Abstraction over external process execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Run a command and capture its output, whatever the exit status.
    async fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput, ExecError>;

    /// Run a command and capture stdout. A non-zero exit is an error.
    async fn exec(&self, program: &str, args: &[String]) -> Result<String, ExecError>;

    /// Run a command with inherited stdio and extra environment variables.
    /// A non-zero exit is an error.
    async fn exec_streaming(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
    ) -> Result<(), ExecError>;
}

/// Spawns real child processes in the current working directory.
pub struct RealExecutor;

impl CommandExecutor for RealExecutor {
    async fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput, ExecError> {
        use std::process::Stdio;

        tracing::debug!(command = %render(program, args), "capturing");

        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ExecError::NotFound {
                program: program.to_owned(),
                source: e,
            })?;

        let stdout = String::from_utf8(output.stdout).map_err(|e| ExecError::InvalidUtf8 {
            program: program.to_owned(),
            source: e,
        })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn exec(&self, program: &str, args: &[String]) -> Result<String, ExecError> {
        let output = self.output(program, args).await?;

        if output.success() {
            Ok(output.stdout)
        } else {
            Err(ExecError::CommandFailed {
                program: program.to_owned(),
                args: args.to_vec(),
                code: output.code,
                stderr: output.stderr,
            })
        }
    }

    async fn exec_streaming(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
    ) -> Result<(), ExecError> {
        use std::process::Stdio;

        tracing::info!(command = %render(program, args), "running");

        let status = tokio::process::Command::new(program)
            .args(args)
            .envs(envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ExecError::NotFound {
                program: program.to_owned(),
                source: e,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::CommandFailed {
                program: program.to_owned(),
                args: args.to_vec(),
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}

fn render(program: &str, args: &[String]) -> String {
    let mut line = program.to_owned();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
