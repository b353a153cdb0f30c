use anyhow::Result;
use envop_install::fetcher::ReleaseFetcher;
use envop_install::install;
use envop_install::release::ReleaseSource;

/// envop-install - fetches the prebuilt envop binary for the host platform.
///
/// Resolves the host OS and CPU architecture, builds the GitHub release URL
/// for the matching asset at this package's version, and downloads it into
/// ~/.envop/bin. Unsupported platforms abort with a non-zero exit status.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let fetcher = ReleaseFetcher::default();
    let source = ReleaseSource::default();
    let install_dir = install::default_install_dir()?;

    let installed = install::run(&fetcher, &source, &install_dir).await?;
    println!("Installed {}", installed.display());
    Ok(())
}
