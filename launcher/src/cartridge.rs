//! Cartridge header parsing
//!
//! Both handheld generations carry a fixed header near the start of the ROM.
//! The headless engine uses it to reject payloads that are not cartridges
//! and to report the internal title.

use romdeck_shared::ConsoleType;

/// Game Boy Advance header layout.
const GBA_TITLE: std::ops::Range<usize> = 0xA0..0xAC;
const GBA_GAME_CODE: std::ops::Range<usize> = 0xAC..0xB0;
const GBA_FIXED_OFFSET: usize = 0xB2;
const GBA_FIXED_VALUE: u8 = 0x96;
const GBA_HEADER_END: usize = 0xC0;

/// Game Boy / Game Boy Color header layout.
const GB_LOGO: std::ops::Range<usize> = 0x104..0x134;
const GB_TITLE: std::ops::Range<usize> = 0x134..0x144;
const GB_CGB_FLAG: usize = 0x143;
const GB_HEADER_END: usize = 0x150;

/// Boot logo every licensed Game Boy cartridge carries at 0x104.
const NINTENDO_LOGO: [u8; 48] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B, 0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E, 0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC, 0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("ROM is too small for a cartridge header ({len} bytes, need {needed})")]
    Truncated { len: usize, needed: usize },

    #[error("not a Game Boy Advance cartridge (fixed header byte is {0:#04x})")]
    BadFixedByte(u8),

    #[error("not a Game Boy cartridge (boot logo missing)")]
    MissingLogo,
}

/// Fields read from a cartridge header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeHeader {
    /// Internal title, trimmed of padding
    pub title: String,
    /// Four-character game code (Game Boy Advance only)
    pub game_code: Option<String>,
    /// Whether the cartridge declares Game Boy Color support
    pub color_support: bool,
}

impl CartridgeHeader {
    /// Parse the header of a ROM for `console`.
    pub fn parse(console: ConsoleType, rom: &[u8]) -> Result<Self, HeaderError> {
        if console.is_gba() {
            Self::parse_gba(rom)
        } else {
            Self::parse_gb(rom)
        }
    }

    fn parse_gba(rom: &[u8]) -> Result<Self, HeaderError> {
        require_len(rom, GBA_HEADER_END)?;
        let fixed = rom[GBA_FIXED_OFFSET];
        if fixed != GBA_FIXED_VALUE {
            return Err(HeaderError::BadFixedByte(fixed));
        }
        Ok(Self {
            title: ascii_field(&rom[GBA_TITLE]),
            game_code: Some(ascii_field(&rom[GBA_GAME_CODE])).filter(|c| !c.is_empty()),
            color_support: false,
        })
    }

    fn parse_gb(rom: &[u8]) -> Result<Self, HeaderError> {
        require_len(rom, GB_HEADER_END)?;
        if rom[GB_LOGO] != NINTENDO_LOGO {
            return Err(HeaderError::MissingLogo);
        }
        // On color cartridges the last title byte is the CGB flag.
        let cgb_flag = rom[GB_CGB_FLAG];
        let color_support = cgb_flag & 0x80 != 0;
        let title = if color_support {
            &rom[GB_TITLE.start..GB_CGB_FLAG]
        } else {
            &rom[GB_TITLE]
        };
        Ok(Self {
            title: ascii_field(title),
            game_code: None,
            color_support,
        })
    }
}

fn require_len(rom: &[u8], needed: usize) -> Result<(), HeaderError> {
    if rom.len() < needed {
        return Err(HeaderError::Truncated {
            len: rom.len(),
            needed,
        });
    }
    Ok(())
}

/// Printable ASCII up to the first NUL, trimmed.
fn ascii_field(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect::<String>()
        .trim()
        .to_string()
}
