//! Outcome mappers: each game turns a fresh [`RoundRng`] into a result.

pub mod dice;
pub mod mines;
pub mod path;

use serde::{Deserialize, Serialize};

use crate::error::FairResult;
use crate::rng::RoundRng;

pub use dice::{DiceBet, DICE_RANGE};
pub use mines::{DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE};
pub use path::MAX_PATH_ROWS;

/// Game kind plus its caller-supplied parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameSpec {
    Dice,
    Mines {
        mines: u32,
        #[serde(default = "default_board_size")]
        board_size: u32,
    },
    Path {
        rows: u32,
    },
}

fn default_board_size() -> u32 {
    DEFAULT_BOARD_SIZE
}

impl GameSpec {
    pub fn mines(mines: u32) -> Self {
        GameSpec::Mines {
            mines,
            board_size: DEFAULT_BOARD_SIZE,
        }
    }

    pub fn validate(&self) -> FairResult<()> {
        match *self {
            GameSpec::Dice => Ok(()),
            GameSpec::Mines { mines, board_size } => mines::validate(mines, board_size),
            GameSpec::Path { rows } => path::validate(rows),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GameSpec::Dice => "dice",
            GameSpec::Mines { .. } => "mines",
            GameSpec::Path { .. } => "path",
        }
    }

    /// Draws a round of this game from `rng`.
    pub fn generate(&self, rng: &mut RoundRng<'_>) -> FairResult<Outcome> {
        self.validate()?;
        Ok(match *self {
            GameSpec::Dice => Outcome::Dice(dice::roll(rng)?),
            GameSpec::Mines { mines, board_size } => {
                Outcome::Mines(mines::place(rng, mines, board_size)?)
            }
            GameSpec::Path { rows } => Outcome::Path(path::drop_ball(rng, rows)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", content = "result", rename_all = "snake_case")]
pub enum Outcome {
    /// Roll in hundredths, `0.00..=100.00`.
    Dice(f64),
    /// Mine positions, ascending.
    Mines(Vec<u32>),
    /// Bucket index, `0..=rows`.
    Path(u32),
}

impl Outcome {
    pub fn name(&self) -> &'static str {
        match self {
            Outcome::Dice(_) => "dice",
            Outcome::Mines(_) => "mines",
            Outcome::Path(_) => "path",
        }
    }

    /// Structural comparison: mine positions compare as sets, the rest exactly.
    /// A mine list with repeated tiles never matches a placement.
    pub fn same_as(&self, other: &Outcome) -> bool {
        match (self, other) {
            (Outcome::Dice(a), Outcome::Dice(b)) => a == b,
            (Outcome::Path(a), Outcome::Path(b)) => a == b,
            (Outcome::Mines(a), Outcome::Mines(b)) => {
                a.len() == b.len() && as_set(a) == as_set(b)
            }
            _ => false,
        }
    }
}

fn as_set(tiles: &[u32]) -> Vec<u32> {
    let mut v = tiles.to_vec();
    v.sort_unstable();
    v.dedup();
    v
}

/// Replays one round from scratch. Returns the outcome and the number of draws it consumed.
pub fn play(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    spec: &GameSpec,
) -> FairResult<(Outcome, u64)> {
    let mut rng = RoundRng::new(server_seed, client_seed, nonce)?;
    let outcome = spec.generate(&mut rng)?;
    Ok((outcome, rng.cursor()))
}
