//! romdeck launcher
//!
//! Runs the launch pipeline outside a browser host: an HTTP/file ROM
//! fetcher and a headless engine that validates cartridges and keeps saves
//! on disk.

pub mod cartridge;
pub mod fetch;
pub mod headless;

pub use cartridge::{CartridgeHeader, HeaderError};
pub use fetch::{FETCH_TIMEOUT, HttpFetcher};
pub use headless::HeadlessEngine;
