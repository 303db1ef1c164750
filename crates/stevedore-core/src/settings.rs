//! Process-wide settings, resolved once at startup.
//!
//! Precedence: environment variable, then `stevedore.toml`, then the
//! built-in default. Empty environment values count as unset.

use crate::config::{DeployConfig, StevedoreConfig};
use std::path::PathBuf;

pub const ENV_DEPLOY_NAME: &str = "deploy_name";
pub const ENV_SSH_KEY: &str = "key";
pub const ENV_SSH_USER: &str = "sshuser";
pub const ENV_IP: &str = "ip";
pub const ENV_DOCKER_TAG: &str = "DOCKER_TAG";
pub const ENV_DOCKER_REPO: &str = "DOCKER_REPO";

const DEFAULT_SSH_KEY: &str = "~/.ssh/id_rsa";
const DEFAULT_SSH_USER: &str = "root";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Image repository
    pub repo: String,
    /// Explicit tag; when `None` the tag is derived from git
    pub tag_override: Option<String>,
    /// Mirror directory, relative to the project root
    pub mirror_dir: PathBuf,
    /// Manifest file name patterns
    pub manifest_patterns: Vec<String>,
    pub machine: MachineSpec,
    pub deploy: DeployConfig,
}

/// Target of `docker-machine create` and of machine-scoped commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSpec {
    pub name: String,
    /// SSH private key path, with `~` expanded
    pub ssh_key: String,
    pub ssh_user: String,
    pub ip: Option<String>,
}

impl MachineSpec {
    /// The machine IP, required for provisioning.
    pub fn require_ip(&self) -> crate::Result<&str> {
        self.ip.as_deref().ok_or(crate::Error::MissingIp)
    }
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn from_env(config: StevedoreConfig) -> Self {
        Self::resolve(config, read_env)
    }

    /// Resolve settings using `lookup` for environment variables.
    pub fn resolve<F>(config: StevedoreConfig, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let StevedoreConfig {
            image,
            deps,
            deploy,
        } = config;

        // arch-lint: allow(no-silent-result-drop) reason="unset or empty env var falls back to the default SSH key"
        let ssh_key = var(ENV_SSH_KEY).unwrap_or_else(|| DEFAULT_SSH_KEY.to_owned());

        Self {
            // arch-lint: allow(no-silent-result-drop) reason="unset or empty env var falls back to the configured repo"
            repo: var(ENV_DOCKER_REPO).unwrap_or(image.repo),
            tag_override: var(ENV_DOCKER_TAG),
            mirror_dir: deps.mirror_dir,
            manifest_patterns: deps.patterns,
            machine: MachineSpec {
                // arch-lint: allow(no-silent-result-drop) reason="unset or empty env var falls back to the configured machine name"
                name: var(ENV_DEPLOY_NAME).unwrap_or_else(|| deploy.machine_name.clone()),
                ssh_key: shellexpand::tilde(&ssh_key).into_owned(),
                // arch-lint: allow(no-silent-result-drop) reason="unset or empty env var falls back to the default SSH user"
                ssh_user: var(ENV_SSH_USER).unwrap_or_else(|| DEFAULT_SSH_USER.to_owned()),
                ip: var(ENV_IP),
            },
            deploy,
        }
    }
}

fn read_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => Some(value),
        Err(std::env::VarError::NotPresent) => None,
        Err(std::env::VarError::NotUnicode(raw)) => {
            tracing::warn!(variable = name, value = ?raw, "ignoring non-UTF-8 environment value");
            None
        }
    }
}
