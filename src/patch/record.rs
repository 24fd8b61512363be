//! On-disk patch record.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Current record format.
pub const RECORD_VERSION: u32 = 1;

/// Suffix appended to the target's file name to form its record path.
pub const RECORD_SUFFIX: &str = ".patch-record.json";

/// Everything needed to undo one patch.
///
/// The original bytes are kept verbatim (base64 in JSON); the patched bytes
/// are only fingerprinted, since the target itself holds them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRecord {
    /// Record format version.
    pub version: u32,
    /// Patched file.
    pub target_file: PathBuf,
    /// Bytes of the target before patching.
    #[serde(with = "base64_bytes")]
    pub original_bytes: Vec<u8>,
    /// SHA-256 of the bytes written by the patch, hex encoded.
    pub patched_sha256: String,
    /// Length of the bytes written by the patch.
    pub patched_len: u64,
    /// When the patch was applied.
    pub applied_at: DateTime<Utc>,
}

impl PatchRecord {
    /// Whether `bytes` are what this patch wrote.
    pub fn matches_patched(&self, bytes: &[u8]) -> bool {
        bytes.len() as u64 == self.patched_len
            && crate::bundler::builder::checksum::sha256_bytes(bytes) == self.patched_sha256
    }
}

/// `<dir>/<file>.patch-record.json` for `<dir>/<file>`.
pub fn record_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(RECORD_SUFFIX);
    target.with_file_name(name)
}

mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
