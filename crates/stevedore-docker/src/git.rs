use stevedore_core::image::revision_tag;

use crate::args;
use crate::executor::{CommandExecutor, RealExecutor};
use crate::process::ExecError;

/// Source-control queries used to name images, parameterized over the
/// executor for testability.
pub struct GitClient<E: CommandExecutor = RealExecutor> {
    executor: E,
}

impl GitClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for GitClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> GitClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Abbreviated hash of the HEAD commit.
    pub async fn short_head(&self) -> Result<String, GitError> {
        let out = self
            .executor
            .exec("git", &args(["rev-parse", "--short", "HEAD"]))
            .await
            .map_err(|e| GitError::RevParse { source: e })?;

        let hash = out.trim();
        if hash.is_empty() {
            return Err(GitError::NoCommit);
        }
        Ok(hash.to_owned())
    }

    /// Whether the working tree differs from HEAD.
    ///
    /// Any non-zero exit of `git diff --quiet` counts as dirty.
    pub async fn is_dirty(&self) -> Result<bool, GitError> {
        let output = self
            .executor
            .output("git", &args(["diff", "HEAD", "--quiet"]))
            .await
            .map_err(|e| GitError::Diff { source: e })?;

        Ok(!output.success())
    }

    /// `<short-hash>` with `-dirty` appended when the tree has uncommitted changes.
    pub async fn derive_tag(&self) -> Result<String, GitError> {
        let hash = self.short_head().await?;
        let dirty = self.is_dirty().await?;
        Ok(revision_tag(&hash, dirty))
    }

    /// Returns `tag_override` when set, otherwise the derived tag.
    pub async fn resolve_tag(&self, tag_override: Option<&str>) -> Result<String, GitError> {
        match tag_override {
            Some(tag) => Ok(tag.to_owned()),
            None => self.derive_tag().await,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("could not resolve HEAD; is this a git repository with at least one commit?")]
    RevParse { source: ExecError },

    #[error("git rev-parse returned an empty commit hash")]
    NoCommit,

    #[error("failed to compare the working tree with HEAD")]
    Diff { source: ExecError },
}
