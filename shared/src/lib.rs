//! Shared types for the romdeck launch pipeline.
//!
//! Everything here is plain data with no I/O: the console type table, the
//! ROM extension formats each console family accepts, the content
//! fingerprint used as the save-data identity key, the save id format, and
//! file names derived from source locators.

pub mod console;
pub mod fingerprint;
pub mod ids;
pub mod locator;
pub mod rom_format;

pub use console::{ConsoleType, UnknownConsoleType};
pub use fingerprint::{ContentFingerprint, FingerprintParseError};
pub use ids::{
    MAX_SAVE_FILE_NAME_LEN, SAVE_TMP_SUFFIX, is_valid_save_file_name, parse_save_id, save_id,
};
pub use locator::{file_name_from_locator, file_stem};
pub use rom_format::{
    ExtensionPolicy, GB_ROM_FORMAT, GBA_ROM_FORMAT, GBC_ROM_FORMAT, HANDHELD_FAMILY, RomFormat,
    extension_of, format_for,
};
