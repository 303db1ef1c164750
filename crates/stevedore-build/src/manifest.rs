use glob::{MatchOptions, Pattern};

use crate::depslayer::SyncError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// File name patterns that identify dependency manifests.
///
/// Each pattern is matched against the file name only, never the full
/// path, so `*.gemspec` finds gemspecs at any depth.
///
/// # Examples
///
/// ```
/// use stevedore_build::ManifestPatterns;
///
/// let patterns = ManifestPatterns::new(["Gemfile", "*.gemspec"]).unwrap();
/// assert!(patterns.matches("Gemfile"));
/// assert!(patterns.matches("lib.gemspec"));
/// assert!(!patterns.matches("Gemfile.bak"));
/// ```
#[derive(Debug, Clone)]
pub struct ManifestPatterns {
    patterns: Vec<Pattern>,
}

impl ManifestPatterns {
    pub fn new<I, S>(patterns: I) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|e| SyncError::InvalidPattern {
                    pattern: p.to_owned(),
                    source: e,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(file_name, MATCH_OPTIONS))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
