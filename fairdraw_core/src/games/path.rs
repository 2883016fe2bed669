use crate::error::{FairError, FairResult};
use crate::rng::RoundRng;

/// Upper bound on rows. `2^56` is the widest range where every path bit comes
/// straight from the sampled 56-bit prefix.
pub const MAX_PATH_ROWS: u32 = 56;

pub fn validate(rows: u32) -> FairResult<()> {
    if rows == 0 || rows > MAX_PATH_ROWS {
        return Err(FairError::InvalidRowCount { rows });
    }
    Ok(())
}

/// Raw path: one draw over `0..2^rows`, bit `i` (little-endian) is row `i`,
/// set means the ball moves right.
pub fn path_bits(rng: &mut RoundRng<'_>, rows: u32) -> FairResult<u64> {
    validate(rows)?;
    rng.next_int(1u64 << rows)
}

/// Final bucket: total rightward moves, in `0..=rows`.
pub fn bucket(bits: u64, rows: u32) -> u32 {
    let mask = if rows >= 64 { u64::MAX } else { (1u64 << rows) - 1 };
    (bits & mask).count_ones()
}

pub fn drop_ball(rng: &mut RoundRng<'_>, rows: u32) -> FairResult<u32> {
    let bits = path_bits(rng, rows)?;
    Ok(bucket(bits, rows))
}
