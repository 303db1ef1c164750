mod build;
mod deploy;
mod deps;
mod image;

use std::path::PathBuf;

use stevedore_core::{Settings, StevedoreConfig};

pub use build::{build, push, up};
pub use deploy::{create_deploy, deploy};
pub use deps::sync_deps;
pub use image::{get_img, get_repo, get_tag};

/// Everything a command needs, resolved once at startup.
pub struct Context {
    pub project_dir: PathBuf,
    pub settings: Settings,
}

impl Context {
    pub fn load() -> anyhow::Result<Self> {
        let project_dir = PathBuf::from(".");
        let config = StevedoreConfig::load(&project_dir)?;
        let settings = Settings::from_env(config);
        tracing::debug!(?settings, "settings resolved");

        Ok(Self {
            project_dir,
            settings,
        })
    }
}
