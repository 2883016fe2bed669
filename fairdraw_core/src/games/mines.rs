use crate::error::{FairError, FairResult};
use crate::rng::RoundRng;

pub const DEFAULT_BOARD_SIZE: u32 = 25;

/// Largest board accepted. Placement allocates the whole board and removes
/// one tile per mine, so work grows with `mines * board_size`.
pub const MAX_BOARD_SIZE: u32 = 1024;

pub fn validate(mines: u32, board_size: u32) -> FairResult<()> {
    if board_size > MAX_BOARD_SIZE || mines > board_size {
        return Err(FairError::InvalidMineCount { mines, board_size });
    }
    Ok(())
}

/// Picks `mines` distinct tiles out of `0..board_size`, one draw per mine.
///
/// Draw `i` chooses a position in the list of tiles still free, which is then
/// removed (a partial Fisher-Yates pass). The result is sorted ascending.
pub fn place(rng: &mut RoundRng<'_>, mines: u32, board_size: u32) -> FairResult<Vec<u32>> {
    validate(mines, board_size)?;
    let mut free: Vec<u32> = (0..board_size).collect();
    let mut placed = Vec::with_capacity(mines as usize);
    for _ in 0..mines {
        let pick = rng.next_int(free.len() as u64)? as usize;
        placed.push(free.remove(pick));
    }
    placed.sort_unstable();
    Ok(placed)
}
