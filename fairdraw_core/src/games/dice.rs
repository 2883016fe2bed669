use serde::{Deserialize, Serialize};

use crate::error::FairResult;
use crate::rng::RoundRng;

/// One draw over `0..=10000`, read as hundredths.
pub const DICE_RANGE: u64 = 10_001;

pub fn roll(rng: &mut RoundRng<'_>) -> FairResult<f64> {
    let hundredths = rng.next_int(DICE_RANGE)?;
    Ok(hundredths as f64 / 100.0)
}

/// Over/under bet against a dice roll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiceBet {
    pub target: f64,
    pub roll_over: bool,
}

impl DiceBet {
    /// Win probability in percent.
    pub fn win_chance(&self) -> f64 {
        let chance = if self.roll_over {
            100.0 - self.target
        } else {
            self.target
        };
        chance.clamp(0.0, 100.0)
    }

    pub fn wins(&self, roll: f64) -> bool {
        if self.roll_over {
            roll > self.target
        } else {
            roll < self.target
        }
    }

    /// `(1 - house_edge) * 100 / win_chance`, or `None` when the bet cannot win.
    /// `house_edge` is a fraction, e.g. `0.01`.
    pub fn multiplier(&self, house_edge: f64) -> Option<f64> {
        let chance = self.win_chance();
        (chance > 0.0).then(|| (1.0 - house_edge) * 100.0 / chance)
    }
}
