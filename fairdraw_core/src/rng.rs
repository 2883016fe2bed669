use std::fmt;

use crate::error::{FairError, FairResult};
use crate::hash::{hmac_sha512, DIGEST_LEN};

// Provably-fair byte stream:
// HMAC-SHA512(key = server_seed, msg = "{client_seed}:{nonce}:{cursor}") -> 64 bytes per draw.
// Seeds are taken as opaque UTF-8 strings; hex-looking seeds are never decoded.

/// Cap on client seeds accepted from players. Draws and verification take a
/// client seed of any length.
pub const MAX_PUBLIC_SEED_LEN: usize = 256;

/// Number of digest bits used per float. 56 bits divide exactly by a power of two in an f64.
pub const FLOAT_BITS: u32 = 56;

const FLOAT_BYTES: usize = (FLOAT_BITS / 8) as usize;

pub fn validate_server_seed(server_seed: &str) -> FairResult<()> {
    if server_seed.is_empty() {
        return Err(FairError::InvalidSeedFormat("server seed is empty".into()));
    }
    Ok(())
}

pub fn validate_client_seed(client_seed: &str) -> FairResult<()> {
    if client_seed.len() > MAX_PUBLIC_SEED_LEN {
        return Err(FairError::InvalidSeedFormat(format!(
            "client seed is {} bytes, limit is {MAX_PUBLIC_SEED_LEN}",
            client_seed.len()
        )));
    }
    Ok(())
}

/// The 64-byte digest for a single draw. Every cursor gets its own HMAC call,
/// so any draw can be recomputed without replaying the ones before it.
pub fn draw_bytes(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    cursor: u64,
) -> FairResult<[u8; DIGEST_LEN]> {
    validate_server_seed(server_seed)?;
    let msg = format!("{client_seed}:{nonce}:{cursor}");
    hmac_sha512(server_seed.as_bytes(), msg.as_bytes())
}

/// First 7 bytes of a digest as a big-endian integer in `[0, 2^56)`.
pub fn digest_prefix(bytes: &[u8; DIGEST_LEN]) -> u64 {
    let mut buf = [0u8; 8];
    buf[8 - FLOAT_BYTES..].copy_from_slice(&bytes[..FLOAT_BYTES]);
    u64::from_be_bytes(buf)
}

pub fn bytes_to_float(bytes: &[u8; DIGEST_LEN]) -> f64 {
    digest_prefix(bytes) as f64 / (1u64 << FLOAT_BITS) as f64
}

/// Uniform float in `[0, 1)` for one draw.
pub fn float01(server_seed: &str, client_seed: &str, nonce: u64, cursor: u64) -> FairResult<f64> {
    Ok(bytes_to_float(&draw_bytes(server_seed, client_seed, nonce, cursor)?))
}

/// `floor(float01 * max_exclusive)` together with the next cursor.
///
/// This is float scaling, not rejection sampling. For bounds approaching 2^56
/// the result carries a small bias; historical rounds depend on it, so it stays.
pub fn uniform_int(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    cursor: u64,
    max_exclusive: u64,
) -> FairResult<(u64, u64)> {
    if max_exclusive == 0 {
        return Err(FairError::InvalidRange { max_exclusive });
    }
    let f = float01(server_seed, client_seed, nonce, cursor)?;
    Ok((scale(f, max_exclusive), cursor + 1))
}

fn scale(f: f64, max_exclusive: u64) -> u64 {
    // f64 rounding can only reach max_exclusive for bounds above 2^53
    ((f * max_exclusive as f64).floor() as u64).min(max_exclusive - 1)
}

/// Draw cursor for one round: fixed seeds and nonce, offsets handed out from 0
/// with no gaps. A failed draw leaves the cursor where it was.
#[derive(Clone)]
pub struct RoundRng<'a> {
    server_seed: &'a str,
    client_seed: &'a str,
    nonce: u64,
    cursor: u64,
}

impl<'a> RoundRng<'a> {
    pub fn new(server_seed: &'a str, client_seed: &'a str, nonce: u64) -> FairResult<Self> {
        validate_server_seed(server_seed)?;
        Ok(Self {
            server_seed,
            client_seed,
            nonce,
            cursor: 0,
        })
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Number of draws consumed so far, which is also the next offset.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn next_float(&mut self) -> FairResult<f64> {
        let f = float01(self.server_seed, self.client_seed, self.nonce, self.cursor)?;
        self.cursor += 1;
        Ok(f)
    }

    pub fn next_int(&mut self, max_exclusive: u64) -> FairResult<u64> {
        let (value, next) = uniform_int(
            self.server_seed,
            self.client_seed,
            self.nonce,
            self.cursor,
            max_exclusive,
        )?;
        self.cursor = next;
        Ok(value)
    }
}

impl fmt::Debug for RoundRng<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundRng")
            .field("client_seed", &self.client_seed)
            .field("nonce", &self.nonce)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}
