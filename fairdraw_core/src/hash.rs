//! SHA-512 / HMAC-SHA512 primitives and the published commitment type.

use std::fmt;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use crate::error::{FairError, FairResult};

pub type HmacSha512 = Hmac<Sha512>;

pub const DIGEST_LEN: usize = 64;

pub fn sha512(input: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha512::new();
    hasher.update(input);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&hasher.finalize());
    out
}

pub fn sha512_hex(input: &[u8]) -> String {
    hex::encode(sha512(input))
}

pub fn hmac_sha512(key: &[u8], message: &[u8]) -> FairResult<[u8; DIGEST_LEN]> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| FairError::InvalidSeedFormat(format!("hmac key rejected: {e}")))?;
    mac.update(message);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// `SHA-512(secret)`, published before the secret is used for any draw.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SeedCommitment([u8; DIGEST_LEN]);

impl SeedCommitment {
    pub fn of(secret: &str) -> Self {
        Self(sha512(secret.as_bytes()))
    }

    pub fn from_hex(s: &str) -> FairResult<Self> {
        let s = s.trim();
        if s.len() != DIGEST_LEN * 2 {
            return Err(FairError::InvalidSeedFormat(format!(
                "commitment must be {} hex chars, got {}",
                DIGEST_LEN * 2,
                s.len()
            )));
        }
        let mut out = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut out)
            .map_err(|e| FairError::InvalidSeedFormat(format!("commitment: {e}")))?;
        Ok(Self(out))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// True when `secret` hashes to this commitment.
    pub fn matches(&self, secret: &str) -> bool {
        *self == Self::of(secret)
    }
}

impl fmt::Display for SeedCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for SeedCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeedCommitment({})", self.to_hex())
    }
}

impl From<SeedCommitment> for String {
    fn from(c: SeedCommitment) -> Self {
        c.to_hex()
    }
}

impl TryFrom<String> for SeedCommitment {
    type Error = FairError;

    fn try_from(s: String) -> FairResult<Self> {
        Self::from_hex(&s)
    }
}
