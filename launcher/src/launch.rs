//! Launch command - run the pipeline to a ready session
//!
//! Orchestrates: config source → bootstrap → (export save) → shutdown

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use romdeck::{HeadlessEngine, HttpFetcher};
use romdeck_core::{
    Bootstrap, BridgeRegistry, ConfigSource, DirSaveManager, FallbackSource, FeedItemSource,
    LaunchConfig, PropsSource, QuerySource, SaveBlob, TomlSettingsStore,
};

/// Arguments for the launch command
#[derive(Args)]
pub struct LaunchArgs {
    /// Props file (JSON object with rom, type, title, rotation, ...)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Launch parameters (rom=...&type=...)
    #[arg(short, long)]
    pub query: Option<String>,

    /// Feed item file (JSON), used when the config is incomplete
    #[arg(short, long)]
    pub feed: Option<PathBuf>,

    /// Show raw error details and debug logs
    #[arg(long)]
    pub debug: bool,

    /// Write the session's save data to this ZIP file before exiting
    #[arg(long)]
    pub export_save: Option<PathBuf>,

    /// Save directory (defaults to the platform data directory)
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Settings file (defaults to settings.toml in the platform config directory)
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

/// Execute the launch command
pub async fn execute(args: LaunchArgs) -> Result<()> {
    let source = config_source(&args)?;

    let saves = match &args.save_dir {
        Some(dir) => DirSaveManager::new(dir),
        None => DirSaveManager::platform().context("Could not determine save directory")?,
    };
    tracing::debug!("Saves stored in {}", saves.root().display());

    let settings = match &args.settings {
        Some(path) => TomlSettingsStore::new(path.clone()),
        None => TomlSettingsStore::platform(),
    };

    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
    let registry = BridgeRegistry::new();
    let bootstrap = Bootstrap::new(HeadlessEngine::new(saves), fetcher)
        .settings(settings)
        .registry(registry.clone())
        .debug(args.debug);

    let mut session = match bootstrap.start(source.as_ref()).await {
        Ok(session) => session,
        Err(failure) => {
            eprintln!("{}", failure.message);
            return Err(failure).context("Launch failed");
        }
    };

    session.start_frames().context("Failed to start engine")?;
    println!("=== Ready ===");
    println!("  ROM:         {}", session.rom_name());
    println!("  Console:     {}", session.options().console);
    println!("  Fingerprint: {}", session.fingerprint());
    if let Some(cartridge) = session.engine().cartridge() {
        println!("  Title:       {}", cartridge.header.title);
    }
    for warning in session.warnings() {
        println!("  Ignored:     {}", warning);
    }

    if let Some(out) = &args.export_save {
        let bridge = registry.lookup().context("Save bridge was not published")?;
        export_save(bridge.export_save_blob(), out).await?;
    }

    session.shutdown(false).await;
    Ok(())
}

/// Props or launch parameters, with the feed item as fallback.
fn config_source(args: &LaunchArgs) -> Result<Box<dyn ConfigSource>> {
    let primary: Option<Box<dyn ConfigSource>> = match (&args.config, &args.query) {
        (Some(_), Some(_)) => bail!("--config and --query cannot be combined"),
        (Some(path), None) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config = LaunchConfig::from_json_str(&json)
                .with_context(|| format!("Invalid launch config {}", path.display()))?;
            Some(Box::new(PropsSource(config)))
        }
        (None, Some(query)) => Some(Box::new(QuerySource::new(query.as_str()))),
        (None, None) => None,
    };

    let feed = match &args.feed {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Some(
                FeedItemSource::from_json_str(&json)
                    .with_context(|| format!("Invalid feed item {}", path.display()))?,
            )
        }
        None => None,
    };

    Ok(match (primary, feed) {
        (Some(primary), Some(feed)) => Box::new(FallbackSource::new(primary, feed)),
        (Some(primary), None) => primary,
        (None, Some(feed)) => Box::new(feed),
        (None, None) => bail!("Specify --config, --query or --feed"),
    })
}

async fn export_save(blob: Option<SaveBlob>, out: &Path) -> Result<()> {
    let Some(blob) = blob else {
        println!("No save data to export");
        return Ok(());
    };
    tokio::fs::write(out, &blob.bytes)
        .await
        .with_context(|| format!("Failed to write {}", out.display()))?;
    println!(
        "Exported {} save file(s) to {}",
        blob.file_count,
        out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> LaunchArgs {
        LaunchArgs {
            config: None,
            query: None,
            feed: None,
            debug: false,
            export_save: None,
            save_dir: None,
            settings: None,
        }
    }

    #[test]
    fn requires_some_source() {
        assert!(config_source(&args()).is_err());
    }

    #[test]
    fn query_source_from_args() {
        let mut args = args();
        args.query = Some("rom=a.zip&type=gb".into());
        let config = config_source(&args).unwrap().launch_config().unwrap();
        assert_eq!(config.get("type"), Some(&json!("gb")));
    }

    #[test]
    fn props_fall_back_to_feed() {
        let dir = tempfile::tempdir().unwrap();
        let props = dir.path().join("props.json");
        let feed = dir.path().join("feed.json");
        std::fs::write(&props, r#"{"rotation": 90}"#).unwrap();
        std::fs::write(
            &feed,
            r#"{"title":"Tetris","type":"gb","props":{"rom":"tetris.zip"}}"#,
        )
        .unwrap();

        let mut args = args();
        args.config = Some(props);
        args.feed = Some(feed);
        let config = config_source(&args).unwrap().launch_config().unwrap();
        assert_eq!(config.get("rom"), Some(&json!("tetris.zip")));
    }

    #[test]
    fn config_and_query_conflict() {
        let mut args = args();
        args.config = Some(PathBuf::from("a.json"));
        args.query = Some("rom=a.zip".into());
        assert!(config_source(&args).is_err());
    }
}
