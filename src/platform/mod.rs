//! Host platform resolution for release asset selection.
//!
//! Release assets are published for a fixed set of OS/architecture
//! combinations. Resolution is an exhaustive match over the pair, so adding
//! a supported platform is a one-line table edit.

use std::fmt;

/// Operating system family of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsKind {
    Windows,
    Linux,
    Macos,
}

impl OsKind {
    /// Parse an OS name as reported by `std::env::consts::OS`, `uname`, or
    /// Node's `os.type()`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "windows" | "Windows_NT" => Some(OsKind::Windows),
            "linux" | "Linux" => Some(OsKind::Linux),
            "macos" | "darwin" | "Darwin" => Some(OsKind::Macos),
            _ => None,
        }
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsKind::Windows => "windows",
            OsKind::Linux => "linux",
            OsKind::Macos => "macos",
        };
        write!(f, "{}", name)
    }
}

/// CPU architecture of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchKind {
    X86_64,
    Aarch64,
}

impl ArchKind {
    /// Parse an architecture name as reported by `std::env::consts::ARCH`,
    /// `uname`, or Node's `os.arch()`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x86_64" | "x64" | "amd64" => Some(ArchKind::X86_64),
            "aarch64" | "arm64" => Some(ArchKind::Aarch64),
            _ => None,
        }
    }
}

impl fmt::Display for ArchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArchKind::X86_64 => "x86_64",
            ArchKind::Aarch64 => "aarch64",
        };
        write!(f, "{}", name)
    }
}

/// Canonical identifier of a platform that release assets exist for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformId {
    X86_64Windows,
    X86_64Linux,
    X86_64Macos,
    Aarch64Macos,
}

impl PlatformId {
    /// Resolve an OS/architecture pair to a supported platform.
    ///
    /// There is no fallback: any pair outside the published set is a hard
    /// [`UnsupportedPlatform`] error, since no release asset exists for it.
    pub fn resolve(os: OsKind, arch: ArchKind) -> Result<Self, UnsupportedPlatform> {
        match (os, arch) {
            (OsKind::Windows, ArchKind::X86_64) => Ok(PlatformId::X86_64Windows),
            (OsKind::Linux, ArchKind::X86_64) => Ok(PlatformId::X86_64Linux),
            (OsKind::Macos, ArchKind::X86_64) => Ok(PlatformId::X86_64Macos),
            (OsKind::Macos, ArchKind::Aarch64) => Ok(PlatformId::Aarch64Macos),
            (os, arch) => Err(UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            }),
        }
    }

    /// The identifier as it appears in release asset names.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::X86_64Windows => "x86_64-windows",
            PlatformId::X86_64Linux => "x86_64-linux",
            PlatformId::X86_64Macos => "x86_64-macos",
            PlatformId::Aarch64Macos => "aarch64-macos",
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The OS/architecture kinds of the running host.
///
/// Returns [`UnsupportedPlatform`] when the host OS or architecture is not
/// one release assets are ever built for (e.g. FreeBSD, 32-bit x86).
pub fn host_kinds() -> Result<(OsKind, ArchKind), UnsupportedPlatform> {
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    match (OsKind::from_name(os), ArchKind::from_name(arch)) {
        (Some(os), Some(arch)) => Ok((os, arch)),
        _ => Err(UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        }),
    }
}

/// No release asset exists for this OS/architecture combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedPlatform {
    pub os: String,
    pub arch: String,
}

impl fmt::Display for UnsupportedPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported platform: {} {}", self.os, self.arch)
    }
}

impl std::error::Error for UnsupportedPlatform {}
