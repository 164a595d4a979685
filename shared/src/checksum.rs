use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Bytes kept from the full SHA-256 digest. 64 bits is far above the floor
/// needed for divergence detection while keeping checksums short enough to
/// log and compare by eye.
const CHECKSUM_BYTES: usize = 8;

/// Errors that can occur while computing a state checksum
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecksumError {
    /// The state has no canonical serialization (e.g. a NaN float or a
    /// non-string map key)
    #[error("State is not canonically serializable: {reason}")]
    StateNotSerializable { reason: String },
}

/// Short digest of a state's canonical serialization.
///
/// Two peers holding structurally equal states always compute equal
/// checksums; comparison is plain byte comparison of the hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Computes the checksum of `state`.
///
/// The canonical form is compact JSON with map keys in sorted order, so the
/// result is independent of key enumeration order and identical on every
/// peer holding an equal state. The same function runs on client and master.
pub fn checksum_of<S: Serialize>(state: &S) -> Result<Checksum, ChecksumError> {
    let canonical =
        serde_json::to_value(state).map_err(|err| ChecksumError::StateNotSerializable {
            reason: err.to_string(),
        })?;
    let digest = Sha256::digest(canonical.to_string().as_bytes());
    Ok(Checksum(hex::encode(&digest[..CHECKSUM_BYTES])))
}
