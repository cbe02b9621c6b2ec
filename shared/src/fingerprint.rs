//! Content fingerprints for resolved ROM payloads.
//!
//! A fingerprint is the SHA-256 digest of the uncompressed ROM bytes. It is
//! the identity key for save data: re-archiving or renaming a ROM does not
//! change it, while any change to the payload does.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of a fingerprint in bytes.
pub const FINGERPRINT_LEN: usize = 32;

/// Fixed-length digest of a ROM payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentFingerprint([u8; FINGERPRINT_LEN]);

/// Error parsing a hex-encoded fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FingerprintParseError {
    #[error("fingerprint must be {expected} hex characters, got {0}", expected = FINGERPRINT_LEN * 2)]
    InvalidLength(usize),

    #[error("fingerprint is not valid hex: {0}")]
    InvalidHex(String),
}

impl ContentFingerprint {
    /// Compute the fingerprint of `bytes`.
    ///
    /// Pure and deterministic. Callers must pass the resolved payload, never
    /// the compressed archive it came from.
    pub fn compute(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hex rendering (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl FromStr for ContentFingerprint {
    type Err = FingerprintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != FINGERPRINT_LEN * 2 {
            return Err(FingerprintParseError::InvalidLength(s.len()));
        }
        let mut out = [0u8; FINGERPRINT_LEN];
        hex::decode_to_slice(s, &mut out)
            .map_err(|e| FingerprintParseError::InvalidHex(e.to_string()))?;
        Ok(Self(out))
    }
}

impl TryFrom<String> for ContentFingerprint {
    type Error = FingerprintParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentFingerprint> for String {
    fn from(value: ContentFingerprint) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentFingerprint({})", self.to_hex())
    }
}
