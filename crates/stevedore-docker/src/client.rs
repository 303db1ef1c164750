use stevedore_core::{DeployConfig, ImageRef, MachineSpec};

use crate::args;
use crate::executor::{CommandExecutor, RealExecutor};
use crate::process::ExecError;

/// Docker tooling operations, parameterized over the executor for testability.
pub struct DockerClient<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl DockerClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Image ──

    /// `docker build -t <image> .` against the current build context.
    pub async fn build(&self, image: &ImageRef) -> Result<(), DockerError> {
        let image = image.to_string();
        self.executor
            .exec_streaming("docker", &args(["build", "-t", &image, "."]), &[])
            .await
            .map_err(|e| DockerError::Build { image, source: e })
    }

    pub async fn push(&self, image: &ImageRef) -> Result<(), DockerError> {
        let image = image.to_string();
        self.executor
            .exec_streaming("docker", &args(["push", &image]), &[])
            .await
            .map_err(|e| DockerError::Push { image, source: e })
    }

    // ── Compose ──

    /// `docker-compose up --build` for local development.
    pub async fn compose_up(&self) -> Result<(), DockerError> {
        self.executor
            .exec_streaming("docker-compose", &args(["up", "--build"]), &[])
            .await
            .map_err(|e| DockerError::ComposeUp { source: e })
    }

    // ── Machine ──

    /// Output of `docker-machine status <name>`, trimmed.
    ///
    /// An unknown machine yields an empty string, not an error.
    pub async fn machine_status(&self, name: &str) -> Result<String, DockerError> {
        let output = self
            .executor
            .output("docker-machine", &args(["status", name]))
            .await
            .map_err(|e| DockerError::MachineStatus {
                name: name.to_owned(),
                source: e,
            })?;

        Ok(output.stdout.trim().to_owned())
    }

    /// Fails with [`DockerError::MachineMissing`] when the machine has no status.
    pub async fn require_machine(&self, name: &str) -> Result<String, DockerError> {
        let status = self.machine_status(name).await?;
        if status.is_empty() {
            return Err(DockerError::MachineMissing {
                name: name.to_owned(),
            });
        }
        tracing::debug!(machine = name, status = %status, "machine found");
        Ok(status)
    }

    /// Environment that points the docker CLI at the machine's daemon.
    pub async fn machine_env(&self, name: &str) -> Result<Vec<(String, String)>, DockerError> {
        let out = self
            .executor
            .exec("docker-machine", &args(["env", "--shell", "bash", name]))
            .await
            .map_err(|e| DockerError::MachineEnv {
                name: name.to_owned(),
                source: e,
            })?;

        let env = parse_shell_env(&out);
        if env.is_empty() {
            return Err(DockerError::MachineEnvEmpty {
                name: name.to_owned(),
            });
        }
        Ok(env)
    }

    /// Provisions a machine on an existing host through the generic driver.
    pub async fn create_machine(&self, spec: &MachineSpec) -> Result<(), DockerError> {
        let ip = spec.require_ip()?;

        self.executor
            .exec_streaming(
                "docker-machine",
                &args([
                    "create",
                    "--driver",
                    "generic",
                    "--generic-ip-address",
                    ip,
                    "--generic-ssh-user",
                    &spec.ssh_user,
                    "--generic-ssh-key",
                    &spec.ssh_key,
                    &spec.name,
                ]),
                &[],
            )
            .await
            .map_err(|e| DockerError::MachineCreate {
                name: spec.name.clone(),
                source: e,
            })
    }

    // ── Stack ──

    /// Deploys the compose stack to the machine's swarm, exporting the
    /// image tag as `deploy.version_var`.
    ///
    /// Call [`require_machine`](Self::require_machine) first; an unknown
    /// machine otherwise surfaces as [`DockerError::MachineEnv`].
    pub async fn stack_deploy(
        &self,
        machine: &str,
        deploy: &DeployConfig,
        tag: &str,
    ) -> Result<(), DockerError> {
        let mut envs = self.machine_env(machine).await?;
        envs.push((deploy.version_var.clone(), tag.to_owned()));

        let compose_file = format!("--compose-file={}", deploy.compose_file);
        self.executor
            .exec_streaming(
                "docker",
                &args(["stack", "deploy", &compose_file, &deploy.stack_name]),
                &envs,
            )
            .await
            .map_err(|e| DockerError::StackDeploy {
                stack: deploy.stack_name.clone(),
                source: e,
            })
    }
}

/// Parses `export KEY="VALUE"` lines as printed by `docker-machine env`.
/// Comments and other lines are ignored.
pub fn parse_shell_env(script: &str) -> Vec<(String, String)> {
    script
        .lines()
        .filter_map(|line| line.trim().strip_prefix("export "))
        .filter_map(|assignment| assignment.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                // arch-lint: allow(no-silent-result-drop) reason="unquoted values are kept as-is"
                .unwrap_or(value);
            (key.trim().to_owned(), value.to_owned())
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("docker build failed for {image}")]
    Build { image: String, source: ExecError },

    #[error("docker push failed for {image}")]
    Push { image: String, source: ExecError },

    #[error("docker-compose up failed")]
    ComposeUp { source: ExecError },

    #[error("could not query status of machine '{name}'")]
    MachineStatus { name: String, source: ExecError },

    #[error("Machine '{name}' does not exist! Use `stevedore create_deploy` to make one!")]
    MachineMissing { name: String },

    #[error("could not read docker environment for machine '{name}'")]
    MachineEnv { name: String, source: ExecError },

    #[error("docker-machine env printed no variables for machine '{name}'")]
    MachineEnvEmpty { name: String },

    #[error("docker-machine create failed for '{name}'")]
    MachineCreate { name: String, source: ExecError },

    #[error("docker stack deploy failed for stack '{stack}'")]
    StackDeploy { stack: String, source: ExecError },

    #[error(transparent)]
    Precondition(#[from] stevedore_core::Error),
}
