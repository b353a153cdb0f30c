//! The install flow: resolve the host platform, build the release URL for
//! the packaged version, and hand both to the fetcher.

use crate::fetcher::{Binary, BinaryFetcher};
use crate::platform::{self, ArchKind, OsKind, PlatformId};
use crate::release::{BINARY_NAME, ReleaseSource};
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

/// Version of the binary to install, read from the package metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default directory the binary is installed into: `~/.envop/bin`.
pub fn default_install_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Failed to resolve home directory")?;
    Ok(home.join(".envop").join("bin"))
}

/// Install the binary for the running host.
#[tracing::instrument(skip(fetcher, source, install_dir))]
pub async fn run<F: BinaryFetcher>(
    fetcher: &F,
    source: &ReleaseSource,
    install_dir: &Path,
) -> Result<PathBuf> {
    let (os, arch) = platform::host_kinds()?;
    install_for(fetcher, source, os, arch, install_dir).await
}

/// Install the binary for an explicit OS/architecture pair.
///
/// Platform resolution happens before any URL is built; an unsupported pair
/// aborts here without touching the fetcher.
pub async fn install_for<F: BinaryFetcher>(
    fetcher: &F,
    source: &ReleaseSource,
    os: OsKind,
    arch: ArchKind,
    install_dir: &Path,
) -> Result<PathBuf> {
    let platform = PlatformId::resolve(os, arch)?;
    let url = source.download_url(BINARY_NAME, VERSION, platform);

    info!("Installing {} v{} for {}...", BINARY_NAME, VERSION, platform);

    let binary = Binary::new(BINARY_NAME, url);
    fetcher.fetch(&binary, install_dir).await
}
