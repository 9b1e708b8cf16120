//! Release archive names and their upstream download location
//!
//! Archive names have four `_`-separated fields, the second being the
//! version: `scalingo_1.30.0_linux_amd64.tar.gz`. The literal `latest` in a
//! requested name stands for the currently cached version.

use crate::error::{DistError, DistResult};
use url::Url;

/// Placeholder resolved to the cached version
pub const LATEST: &str = "latest";

/// Number of `_`-separated fields in an archive name
const ARCHIVE_FIELDS: usize = 4;

/// A requested archive with `latest` resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Full archive file name
    pub archive: String,
    /// Version field of the archive name
    pub version: String,
}

impl ReleaseRequest {
    /// Resolve a raw archive name against the current version
    ///
    /// Only the first `latest` is replaced.
    pub fn resolve(raw: &str, current_version: &str) -> DistResult<Self> {
        let archive = raw.replacen(LATEST, current_version, 1);

        let fields: Vec<&str> = archive.split('_').collect();
        if fields.len() != ARCHIVE_FIELDS {
            return Err(DistError::ReleaseNotFound(archive));
        }

        let version = fields[1].to_string();
        if archive.is_empty() || version.is_empty() {
            return Err(DistError::ReleaseNotFound(archive));
        }

        validate_component("version", &version)?;
        validate_component("archive", &archive)?;

        Ok(Self { archive, version })
    }

    /// Download URL on the release host: `<base>/<version>/<archive>`
    pub fn upstream_url(&self, base: &str) -> DistResult<Url> {
        let mut url = Url::parse(base).map_err(|e| DistError::UrlInvalid {
            url: base.to_string(),
            reason: e.to_string(),
        })?;

        url.path_segments_mut()
            .map_err(|_| DistError::UrlInvalid {
                url: base.to_string(),
                reason: "cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .push(&self.version)
            .push(&self.archive);

        Ok(url)
    }
}

/// Reject anything that could change the shape of the upstream URL
fn validate_component(component: &str, value: &str) -> DistResult<()> {
    let invalid = |reason: &str| DistError::ReleaseInvalid {
        component: component.to_string(),
        reason: format!("{reason} in {value:?}"),
    };

    if value == "." || value.contains("..") {
        return Err(invalid("relative path"));
    }
    if let Some(c) = value
        .chars()
        .find(|c| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
    {
        return Err(invalid(&format!("forbidden character {c:?}")));
    }
    Ok(())
}
