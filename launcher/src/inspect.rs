//! Inspect command - show which ROM a locator resolves to
//!
//! Runs the fetch, resolve and fingerprint stages only; no engine is loaded.

use anyhow::{Context, Result};
use clap::Args;
use romdeck::{CartridgeHeader, HttpFetcher};
use romdeck_core::{ConsoleType, ContentFingerprint, ExtensionPolicy, RomFetcher, resolve};
use romdeck_shared::HANDHELD_FAMILY;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// ROM locator: a path, file:// URL or http(s):// URL
    pub rom: String,

    /// Console type used to read the cartridge header (gba, gb, gbc)
    #[arg(long = "type", default_value = "gba")]
    pub console: String,
}

/// Execute the inspect command
pub async fn execute(args: InspectArgs) -> Result<()> {
    let console: ConsoleType = args.console.parse()?;
    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;

    let payload = fetcher
        .fetch(&args.rom)
        .await
        .with_context(|| format!("Failed to fetch {}", args.rom))?;
    let policy = ExtensionPolicy::for_family(HANDHELD_FAMILY);
    let rom = resolve(&payload, &policy, &args.rom).context("Failed to resolve ROM")?;
    let fingerprint = ContentFingerprint::compute(&rom.bytes);

    println!("=== {} ===", args.rom);
    println!("  Payload:     {} bytes", payload.len());
    println!("  ROM:         {}", rom.name);
    println!("  Size:        {} bytes", rom.bytes.len());
    println!("  Fingerprint: {}", fingerprint);
    match CartridgeHeader::parse(console, &rom.bytes) {
        Ok(header) => {
            println!("  Title:       {}", header.title);
            if let Some(code) = &header.game_code {
                println!("  Game code:   {}", code);
            }
            if header.color_support {
                println!("  Color:       yes");
            }
        }
        Err(e) => println!("  Header:      {} ({})", e, console),
    }
    Ok(())
}
