//! Versioned artifact addressing.
//!
//! Download requests have the shape `/v1/files/{version}/batect-{version}.jar`.
//! Both version tokens must be release versions (`\d+\.\d+\.\d+`) and must be
//! identical; anything else does not name an artifact.

/// Path prefix shared by all artifact download requests.
pub const ARTIFACT_PATH_PREFIX: &str = "/v1/files/";

const FILE_NAME_PREFIX: &str = "batect-";
const FILE_NAME_SUFFIX: &str = ".jar";

/// Reason a path does not name an artifact.
///
/// Callers answer every variant with the same "not found" response; the
/// distinction only exists for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactPathError {
    /// The path does not have the artifact shape.
    #[error("path does not match the artifact pattern")]
    NoMatch,
    /// The path has the artifact shape, but the two version tokens differ.
    #[error("version in path does not match version in file name")]
    VersionMismatch,
}

/// A validated `(version, file name)` pair.
///
/// Only [`ArtifactReference::from_path`] constructs one, so holding a value
/// means both version tokens of the request path were byte-equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactReference {
    version: String,
    file_name: String,
}

impl ArtifactReference {
    /// Parse a request path into an artifact reference.
    pub fn from_path(path: &str) -> Result<Self, ArtifactPathError> {
        let rest = path
            .strip_prefix(ARTIFACT_PATH_PREFIX)
            .ok_or(ArtifactPathError::NoMatch)?;

        let (version_in_path, file_name) =
            rest.split_once('/').ok_or(ArtifactPathError::NoMatch)?;

        let version_in_file_name = file_name
            .strip_prefix(FILE_NAME_PREFIX)
            .and_then(|name| name.strip_suffix(FILE_NAME_SUFFIX))
            .ok_or(ArtifactPathError::NoMatch)?;

        if !is_release_version(version_in_path) || !is_release_version(version_in_file_name) {
            return Err(ArtifactPathError::NoMatch);
        }

        if version_in_path != version_in_file_name {
            return Err(ArtifactPathError::VersionMismatch);
        }

        Ok(Self {
            version: version_in_path.to_string(),
            file_name: format!("{FILE_NAME_PREFIX}{version_in_path}{FILE_NAME_SUFFIX}"),
        })
    }

    /// The validated release version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The canonical artifact file name, `batect-{version}.jar`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Upstream download URL for this artifact.
    ///
    /// `release_base_url` is the repository URL without a trailing slash,
    /// e.g. `https://github.com/batect/batect`.
    pub fn download_url(&self, release_base_url: &str) -> String {
        format!(
            "{}/releases/download/{}/{}",
            release_base_url, self.version, self.file_name
        )
    }
}

/// Check for exactly three dot-separated, non-empty groups of ASCII digits.
fn is_release_version(token: &str) -> bool {
    let mut groups = 0;
    for group in token.split('.') {
        if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        groups += 1;
    }
    groups == 3
}
