use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the optional project configuration file.
pub const CONFIG_FILE: &str = "stevedore.toml";

/// stevedore.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StevedoreConfig {
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub deps: DepsConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Image repository (overridden by `DOCKER_REPO`)
    #[serde(default = "default_repo")]
    pub repo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepsConfig {
    /// Mirror directory, relative to the project root
    #[serde(default = "default_mirror_dir")]
    pub mirror_dir: PathBuf,
    /// File name patterns identifying dependency manifests.
    /// Exact names or `*` globs, matched against the file name only.
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// docker-machine name (overridden by `deploy_name`)
    #[serde(default = "default_machine_name")]
    pub machine_name: String,
    /// Swarm stack name passed to `docker stack deploy`
    #[serde(default = "default_stack_name")]
    pub stack_name: String,
    /// Compose file used for the stack deployment
    #[serde(default = "default_compose_file")]
    pub compose_file: String,
    /// Environment variable carrying the image tag into the compose file
    #[serde(default = "default_version_var")]
    pub version_var: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            repo: default_repo(),
        }
    }
}

impl Default for DepsConfig {
    fn default() -> Self {
        Self {
            mirror_dir: default_mirror_dir(),
            patterns: default_patterns(),
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            machine_name: default_machine_name(),
            stack_name: default_stack_name(),
            compose_file: default_compose_file(),
            version_var: default_version_var(),
        }
    }
}

impl StevedoreConfig {
    /// Load from stevedore.toml in the given directory, or return defaults if not found.
    pub fn load(project_dir: &std::path::Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config");
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            Ok(Self::default())
        }
    }
}

fn default_repo() -> String {
    "gcr.io/imjacinta/jaci/imjacinta".to_owned()
}

fn default_mirror_dir() -> PathBuf {
    PathBuf::from("build/depslayer")
}

fn default_patterns() -> Vec<String> {
    ["Gemfile", "Gemfile.lock", "*.gemspec"]
        .iter()
        .map(|p| (*p).to_owned())
        .collect()
}

fn default_machine_name() -> String {
    "imjacinta".to_owned()
}

fn default_stack_name() -> String {
    "imjacinta".to_owned()
}

fn default_compose_file() -> String {
    "docker-compose-prod.yml".to_owned()
}

fn default_version_var() -> String {
    "IMJACINTA_VERSION".to_owned()
}
