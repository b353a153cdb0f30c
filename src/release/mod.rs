//! Builds download URLs for published release assets.

use crate::platform::PlatformId;

/// Name of the binary shipped in every release asset.
pub const BINARY_NAME: &str = "envop";

/// GitHub account the releases are published under.
pub const REPO_OWNER: &str = "alexanderflink";

/// Repository the releases are published from.
pub const REPO_NAME: &str = "envop";

const DOWNLOAD_HOST: &str = "https://github.com";

/// Location release assets are downloaded from.
///
/// The default points at the GitHub repository the binaries are published
/// to. A non-default base URL exists so tests can run against a local mock
/// server instead of the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSource {
    base_url: String,
    owner: String,
    repo: String,
}

impl Default for ReleaseSource {
    fn default() -> Self {
        Self::new(DOWNLOAD_HOST, REPO_OWNER, REPO_NAME)
    }
}

impl ReleaseSource {
    pub fn new(
        base_url: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// URL of the release asset for `binary` at `version` on `platform`.
    ///
    /// Pure string interpolation over the fixed release layout
    /// `<base>/<owner>/<repo>/releases/download/v<version>/<asset>`. The
    /// version is not validated here; a malformed version produces a URL
    /// that 404s at fetch time, which the fetcher reports.
    pub fn download_url(&self, binary: &str, version: &str, platform: PlatformId) -> String {
        format!(
            "{}/{}/{}/releases/download/v{}/{}",
            self.base_url,
            self.owner,
            self.repo,
            version,
            asset_name(binary, platform)
        )
    }
}

/// File name of a release asset: `<binary>-<platform>.tar.gz`.
pub fn asset_name(binary: &str, platform: PlatformId) -> String {
    format!("{}-{}.tar.gz", binary, platform)
}
