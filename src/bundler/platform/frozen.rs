//! Single-file frozen executable layout.
//!
//! ```text
//! [bootloader][payload: tar.gz][stamp: JSON][payload offset u64 LE][stamp offset u64 LE][b"CPFROZEN"]
//! ```
//!
//! The bootloader finds its payload by reading the 24-byte trailer from the end
//! of its own file. Everything before the stamp depends only on the build
//! inputs; the stamp carries the build time. [`strip_build_stamp`] cuts the
//! stamp off so two builds of the same inputs compare byte-for-byte.

use crate::bundler::{Result, descriptor::TargetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trailer magic.
pub const FROZEN_MAGIC: &[u8; 8] = b"CPFROZEN";

const TRAILER_LEN: usize = 8 + 8 + FROZEN_MAGIC.len();

/// Build metadata appended after the payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStamp {
    /// Product name.
    pub product: String,
    /// Package version.
    pub version: String,
    /// Target the executable was frozen for.
    #[serde(flatten)]
    pub target: TargetId,
    /// Build time.
    pub built_at: DateTime<Utc>,
}

/// A parsed frozen executable.
#[derive(Clone, Debug)]
pub struct FrozenExecutable {
    /// Length of the bootloader prefix.
    pub bootloader_len: u64,
    /// Compressed payload archive.
    pub payload: Vec<u8>,
    /// Build metadata.
    pub stamp: BuildStamp,
}

/// Concatenates bootloader, payload, stamp and trailer.
pub fn write_frozen(bootloader: &[u8], payload: &[u8], stamp: &BuildStamp) -> Result<Vec<u8>> {
    let stamp_json = serde_json::to_vec(stamp)?;
    let payload_offset = bootloader.len() as u64;
    let stamp_offset = payload_offset + payload.len() as u64;

    let mut out =
        Vec::with_capacity(bootloader.len() + payload.len() + stamp_json.len() + TRAILER_LEN);
    out.extend_from_slice(bootloader);
    out.extend_from_slice(payload);
    out.extend_from_slice(&stamp_json);
    out.extend_from_slice(&payload_offset.to_le_bytes());
    out.extend_from_slice(&stamp_offset.to_le_bytes());
    out.extend_from_slice(FROZEN_MAGIC);
    Ok(out)
}

/// Parses a frozen executable produced by [`write_frozen`].
pub fn read_frozen(bytes: &[u8]) -> Result<FrozenExecutable> {
    let (payload_offset, stamp_offset, trailer_start) = offsets(bytes)?;

    let payload = bytes[payload_offset..stamp_offset].to_vec();
    let stamp: BuildStamp = serde_json::from_slice(&bytes[stamp_offset..trailer_start])?;

    Ok(FrozenExecutable {
        bootloader_len: payload_offset as u64,
        payload,
        stamp,
    })
}

/// Returns the executable without its build stamp and trailer.
pub fn strip_build_stamp(bytes: &[u8]) -> Result<Vec<u8>> {
    let (_, stamp_offset, _) = offsets(bytes)?;
    Ok(bytes[..stamp_offset].to_vec())
}

fn offsets(bytes: &[u8]) -> Result<(usize, usize, usize)> {
    if bytes.len() < TRAILER_LEN || !bytes.ends_with(FROZEN_MAGIC) {
        crate::bail!("not a frozen executable: trailer magic missing");
    }
    let trailer_start = bytes.len() - TRAILER_LEN;
    let payload_offset = read_u64(&bytes[trailer_start..trailer_start + 8]);
    let stamp_offset = read_u64(&bytes[trailer_start + 8..trailer_start + 16]);

    let (Ok(payload_offset), Ok(stamp_offset)) =
        (usize::try_from(payload_offset), usize::try_from(stamp_offset))
    else {
        crate::bail!("frozen executable offsets overflow");
    };
    if payload_offset > stamp_offset || stamp_offset > trailer_start {
        crate::bail!(
            "corrupt frozen trailer (payload at {payload_offset}, stamp at {stamp_offset}, trailer at {trailer_start})"
        );
    }
    Ok((payload_offset, stamp_offset, trailer_start))
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
