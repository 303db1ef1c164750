use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::manifest::ManifestPatterns;

/// Mirrors dependency manifests into a dedicated build-context directory.
///
/// Walks `source_root` for files matching the manifest patterns and copies
/// each one to `<source_root>/<mirror_dir>/<relative path>`, rewriting a
/// copy only when its bytes differ from the source. The mirror directory
/// itself is never scanned. Copies whose source disappeared are left in
/// place.
pub struct DepsLayer<'a> {
    source_root: &'a Path,
    mirror_dir: PathBuf,
    patterns: ManifestPatterns,
}

/// A mirrored copy that was created or overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorUpdate {
    /// Manifest path, relative to the source root
    pub source: PathBuf,
    /// Copy path, relative to the source root
    pub destination: PathBuf,
    pub reason: UpdateReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    /// No copy existed yet
    Missing,
    /// The copy's bytes differed from the source
    Changed,
}

/// Outcome of a [`DepsLayer::sync`] run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub updated: Vec<MirrorUpdate>,
    pub unchanged: usize,
}

impl SyncReport {
    /// Total number of manifests found.
    pub fn scanned(&self) -> usize {
        self.updated.len() + self.unchanged
    }

    pub fn is_fresh(&self) -> bool {
        self.updated.is_empty()
    }
}

impl fmt::Display for MirrorUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Update: {} -> {}",
            self.source.display(),
            self.destination.display()
        )
    }
}

impl<'a> DepsLayer<'a> {
    pub fn new(
        source_root: &'a Path,
        mirror_dir: impl Into<PathBuf>,
        patterns: ManifestPatterns,
    ) -> Self {
        Self {
            source_root,
            mirror_dir: mirror_dir.into(),
            patterns,
        }
    }

    /// Absolute (or cwd-relative) location of the mirror directory.
    pub fn mirror_root(&self) -> PathBuf {
        self.source_root.join(&self.mirror_dir)
    }

    /// Lists manifest files outside the mirror directory, relative to the
    /// source root, in file-name order per directory.
    pub fn manifests(&self) -> Result<Vec<PathBuf>, SyncError> {
        let mirror_root = self.mirror_root();
        let mut found = Vec::new();

        let walker = WalkDir::new(self.source_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                // Shell `**` does not descend into dot directories
                if e.file_type().is_dir() && e.file_name().to_string_lossy().starts_with('.') {
                    return false;
                }
                !e.path().starts_with(&mirror_root)
            });

        for entry in walker {
            let entry = entry.map_err(|e| SyncError::Walk {
                root: self.source_root.to_path_buf(),
                source: e,
            })?;

            // Symlinked files count as manifests; symlinked directories are not descended
            let is_file = entry.file_type().is_file()
                || (entry.path_is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !self.patterns.matches(&name) {
                continue;
            }
            if entry.file_name().to_str().is_none() {
                tracing::warn!(
                    path = %entry.path().display(),
                    "manifest file name is not valid UTF-8; matched on its lossy form"
                );
            }

            let relative = entry
                .path()
                .strip_prefix(self.source_root)
                .map_err(|e| SyncError::OutsideRoot {
                    path: entry.path().to_path_buf(),
                    source: e,
                })?;
            found.push(relative.to_path_buf());
        }

        Ok(found)
    }

    /// Brings the mirror directory up to date.
    ///
    /// `notify` is called once per copy written, before the write happens,
    /// so a failure part-way through still reports the copies made so far.
    pub fn sync<F>(&self, mut notify: F) -> Result<SyncReport, SyncError>
    where
        F: FnMut(&MirrorUpdate),
    {
        let mirror_root = self.mirror_root();
        std::fs::create_dir_all(&mirror_root).map_err(|e| SyncError::CreateDir {
            path: mirror_root.clone(),
            source: e,
        })?;

        let mut report = SyncReport::default();

        for relative in self.manifests()? {
            let src = self.source_root.join(&relative);
            let dst = mirror_root.join(&relative);

            if let Some(parent) = dst.parent() {
                std::fs::create_dir_all(parent).map_err(|e| SyncError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }

            let Some(reason) = needs_update(&src, &dst)? else {
                tracing::debug!(manifest = %relative.display(), "mirrored copy up to date");
                report.unchanged += 1;
                continue;
            };

            let update = MirrorUpdate {
                destination: self.mirror_dir.join(&relative),
                source: relative,
                reason,
            };
            notify(&update);

            std::fs::copy(&src, &dst).map_err(|e| SyncError::CopyFile {
                from: src.clone(),
                to: dst.clone(),
                source: e,
            })?;
            report.updated.push(update);
        }

        tracing::debug!(
            updated = report.updated.len(),
            unchanged = report.unchanged,
            mirror = %mirror_root.display(),
            "deps layer synchronized"
        );

        Ok(report)
    }
}

/// Decides whether `dst` must be rewritten from `src`.
fn needs_update(src: &Path, dst: &Path) -> Result<Option<UpdateReason>, SyncError> {
    let current = match std::fs::read(dst) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Some(UpdateReason::Missing));
        }
        Err(e) => {
            return Err(SyncError::ReadFile {
                path: dst.to_path_buf(),
                source: e,
            });
        }
    };

    let wanted = std::fs::read(src).map_err(|e| SyncError::ReadFile {
        path: src.to_path_buf(),
        source: e,
    })?;

    if current == wanted {
        Ok(None)
    } else {
        Ok(Some(UpdateReason::Changed))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("invalid manifest pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("failed to scan {root}")]
    Walk {
        root: PathBuf,
        source: walkdir::Error,
    },
    #[error("path {path} is outside the source root")]
    OutsideRoot {
        path: PathBuf,
        source: std::path::StripPrefixError,
    },
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to copy {from} to {to}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}
