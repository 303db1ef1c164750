use std::fmt;

/// Appended to the commit hash when the working tree differs from HEAD.
pub const DIRTY_SUFFIX: &str = "-dirty";

/// Maximum tag length accepted by the Docker registry API.
const MAX_TAG_LEN: usize = 128;

/// An image reference of the form `<repo>:<tag>`.
///
/// # Examples
///
/// ```
/// use stevedore_core::ImageRef;
///
/// let image = ImageRef::new("gcr.io/acme/app", "1a2b3c4").unwrap();
/// assert_eq!(image.to_string(), "gcr.io/acme/app:1a2b3c4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    repo: String,
    tag: String,
}

impl ImageRef {
    pub fn new(repo: impl Into<String>, tag: impl Into<String>) -> crate::Result<Self> {
        let repo = repo.into();
        let tag = tag.into();
        validate_repo(&repo)?;
        validate_tag(&tag)?;
        Ok(Self { repo, tag })
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repo, self.tag)
    }
}

/// Builds a tag from a short commit hash, marking uncommitted changes.
pub fn revision_tag(short_hash: &str, dirty: bool) -> String {
    if dirty {
        format!("{short_hash}{DIRTY_SUFFIX}")
    } else {
        short_hash.to_owned()
    }
}

fn validate_repo(repo: &str) -> crate::Result<()> {
    let reason = if repo.is_empty() {
        Some("must not be empty")
    } else if repo.chars().any(char::is_whitespace) {
        Some("must not contain whitespace")
    } else if repo.ends_with('/') {
        Some("must not end with '/'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(crate::Error::InvalidImage {
            field: "repo",
            value: repo.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

fn validate_tag(tag: &str) -> crate::Result<()> {
    let reason = if tag.is_empty() {
        Some("must not be empty")
    } else if tag.len() > MAX_TAG_LEN {
        Some("must be at most 128 characters")
    } else if tag.starts_with(['.', '-']) {
        Some("must not start with '.' or '-'")
    } else if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Some("may only contain ASCII letters, digits, '_', '.' and '-'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(crate::Error::InvalidImage {
            field: "tag",
            value: tag.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}
