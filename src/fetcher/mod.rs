//! Fetches and installs release binaries.
//!
//! The install flow only sees the [`BinaryFetcher`] trait: a name and a URL
//! go in, the path of the installed executable comes out. The production
//! implementation downloads the tar.gz asset, extracts it in a staging
//! directory, and moves the executable into place.

use crate::http::HttpClient;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use log::{debug, info};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tar::Archive;

/// A named binary and the URL of its release archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    pub name: String,
    pub url: String,
}

impl Binary {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Retrieves a binary from a release archive URL and installs it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BinaryFetcher: Send + Sync {
    /// Download the archive at `binary.url`, extract it, and place the
    /// executable under `install_dir`. Returns the installed path.
    async fn fetch(&self, binary: &Binary, install_dir: &Path) -> Result<PathBuf>;
}

/// Production fetcher: streams the asset over HTTP and unpacks the tar.gz.
pub struct ReleaseFetcher {
    http: HttpClient,
}

impl ReleaseFetcher {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

impl Default for ReleaseFetcher {
    fn default() -> Self {
        Self::new(HttpClient::new(reqwest::Client::new()))
    }
}

#[async_trait]
impl BinaryFetcher for ReleaseFetcher {
    #[tracing::instrument(skip(self, install_dir))]
    async fn fetch(&self, binary: &Binary, install_dir: &Path) -> Result<PathBuf> {
        let staging = tempfile::tempdir().context("Failed to create staging directory")?;
        let archive_path = staging.path().join("asset.tar.gz");

        info!("Downloading {} from {}...", binary.name, binary.url);
        self.http
            .download_file(&binary.url, || {
                File::create(&archive_path).with_context(|| {
                    format!("Failed to create temporary file at {:?}", archive_path)
                })
            })
            .await?;

        let extract_dir = staging.path().join("extracted");
        fs::create_dir_all(&extract_dir)
            .with_context(|| format!("Failed to create {:?}", extract_dir))?;
        extract_tar_gz(&archive_path, &extract_dir)?;

        let source = find_binary(&extract_dir, &binary.name)?;

        fs::create_dir_all(install_dir)
            .with_context(|| format!("Failed to create install directory {:?}", install_dir))?;
        let dest = install_dir.join(
            source
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(&binary.name)),
        );

        // rename fails across filesystems; fall back to a copy.
        if fs::rename(&source, &dest).is_err() {
            fs::copy(&source, &dest)
                .with_context(|| format!("Failed to install binary to {:?}", dest))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&dest)
                .with_context(|| format!("Failed to stat {:?}", dest))?
                .permissions();
            perms.set_mode(perms.mode() | 0o755);
            fs::set_permissions(&dest, perms)
                .with_context(|| format!("Failed to mark {:?} executable", dest))?;
        }

        info!("Installed {} to {:?}", binary.name, dest);
        Ok(dest)
    }
}

/// Unpacks a gzip-compressed tarball, preserving entry permissions.
fn extract_tar_gz(archive_path: &Path, extract_to: &Path) -> Result<()> {
    debug!("Extracting {:?} to {:?}...", archive_path, extract_to);
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_preserve_permissions(true);
    archive
        .unpack(extract_to)
        .with_context(|| format!("Failed to extract archive {:?}", archive_path))?;
    Ok(())
}

/// Locates the extracted executable.
///
/// Assets either contain the binary at the top level or wrap it in a single
/// directory. On Windows the entry may carry an `.exe` suffix.
fn find_binary(extract_dir: &Path, name: &str) -> Result<PathBuf> {
    let candidates = [name.to_string(), format!("{}.exe", name)];

    for candidate in &candidates {
        let direct = extract_dir.join(candidate);
        if direct.is_file() {
            return Ok(direct);
        }
    }

    for entry in fs::read_dir(extract_dir)
        .with_context(|| format!("Failed to read extracted archive at {:?}", extract_dir))?
    {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            for candidate in &candidates {
                let nested = entry.path().join(candidate);
                if nested.is_file() {
                    return Ok(nested);
                }
            }
        }
    }

    bail!("Binary '{}' not found in extracted archive", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tar::Builder;
    use tempfile::tempdir;

    fn create_tar_gz(files: &[(&str, &str, u32)]) -> Vec<u8> {
        let mut tar_builder = Builder::new(Vec::new());
        for (name, content, mode) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_path(name).unwrap();
            header.set_mode(*mode);
            header.set_cksum();
            tar_builder.append(&header, content.as_bytes()).unwrap();
        }
        let tar = tar_builder.into_inner().unwrap();

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_extract_tar_gz() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("asset.tar.gz");
        fs::write(&archive_path, create_tar_gz(&[("envop", "#!/bin/sh", 0o755)])).unwrap();

        let extract_dir = dir.path().join("out");
        fs::create_dir_all(&extract_dir).unwrap();
        extract_tar_gz(&archive_path, &extract_dir).unwrap();

        let extracted = extract_dir.join("envop");
        assert_eq!(fs::read_to_string(&extracted).unwrap(), "#!/bin/sh");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&extracted).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn test_extract_tar_gz_rejects_garbage() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("asset.tar.gz");
        fs::write(&archive_path, b"this is not a tarball").unwrap();

        let extract_dir = dir.path().join("out");
        fs::create_dir_all(&extract_dir).unwrap();
        assert!(extract_tar_gz(&archive_path, &extract_dir).is_err());
    }

    #[test]
    fn test_find_binary_top_level() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("envop"), "bin").unwrap();

        let found = find_binary(dir.path(), "envop").unwrap();
        assert_eq!(found, dir.path().join("envop"));
    }

    #[test]
    fn test_find_binary_in_wrapper_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("envop-x86_64-linux");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("envop"), "bin").unwrap();

        let found = find_binary(dir.path(), "envop").unwrap();
        assert_eq!(found, nested.join("envop"));
    }

    #[test]
    fn test_find_binary_missing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "docs only").unwrap();

        let err = find_binary(dir.path(), "envop").unwrap_err();
        assert!(err.to_string().contains("envop"));
    }

    #[test_log::test(tokio::test)]
    async fn test_release_fetcher_installs_binary() {
        let mut server = mockito::Server::new_async().await;

        let body = create_tar_gz(&[("envop", "fake executable", 0o755)]);
        let mock = server
            .mock("GET", "/envop-x86_64-linux.tar.gz")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let install_dir = tempdir().unwrap();
        let fetcher = ReleaseFetcher::default();
        let binary = Binary::new(
            "envop",
            format!("{}/envop-x86_64-linux.tar.gz", server.url()),
        );

        let installed = fetcher.fetch(&binary, install_dir.path()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(installed, install_dir.path().join("envop"));
        assert_eq!(fs::read_to_string(&installed).unwrap(), "fake executable");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&installed).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_release_fetcher_missing_asset() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/envop-x86_64-linux.tar.gz")
            .with_status(404)
            .create_async()
            .await;

        let install_dir = tempdir().unwrap();
        let fetcher = ReleaseFetcher::default();
        let binary = Binary::new(
            "envop",
            format!("{}/envop-x86_64-linux.tar.gz", server.url()),
        );

        let result = fetcher.fetch(&binary, install_dir.path()).await;

        mock.assert_async().await;
        assert!(result.is_err());
        // Nothing must be installed on failure.
        assert!(fs::read_dir(install_dir.path()).unwrap().next().is_none());
    }
}
