pub mod error;
pub mod games;
pub mod hash;
pub mod payout;
pub mod rng;
pub mod seed;
pub mod session;
pub mod verify;

pub use crate::error::{FairError, FairResult};
pub use crate::games::{
    play, DiceBet, GameSpec, Outcome, DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, MAX_PATH_ROWS,
};
pub use crate::hash::{sha512_hex, SeedCommitment};
pub use crate::payout::PayoutTable;
pub use crate::rng::{draw_bytes, float01, uniform_int, RoundRng, MAX_PUBLIC_SEED_LEN};
pub use crate::seed::{SecretSeed, SeedLifecycleManager, SeedState};
pub use crate::session::{FairSession, PlayedRound, RoundKey, SeedRotation};
pub use crate::verify::{verify, verify_round, VerificationResult};
