//! Server seed commit/reveal lifecycle.
//!
//! A seed moves through `Uncommitted -> Committed -> Active -> Revealed`.
//! The commitment is fixed before the first draw, the raw seed leaves this
//! module only through [`SeedLifecycleManager::reveal`], and a revealed seed
//! never produces another round.

use std::collections::BTreeSet;
use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{FairError, FairResult};
use crate::games::{self, GameSpec, Outcome};
use crate::hash::SeedCommitment;

/// Bytes of OS entropy behind a generated seed (256 bits).
pub const SECRET_SEED_BYTES: usize = 32;

/// Operator secret. Used as an opaque UTF-8 string; generated seeds are the
/// hex encoding of [`SECRET_SEED_BYTES`] random bytes. Wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretSeed(String);

impl SecretSeed {
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_SEED_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let seed = Self(hex::encode(bytes));
        bytes.zeroize();
        seed
    }

    pub fn new(seed: impl Into<String>) -> FairResult<Self> {
        let seed = seed.into();
        if seed.is_empty() {
            return Err(FairError::InvalidSeedFormat("server seed is empty".into()));
        }
        Ok(Self(seed))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn commitment(&self) -> SeedCommitment {
        SeedCommitment::of(&self.0)
    }
}

impl fmt::Debug for SecretSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretSeed(<hidden>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedState {
    Uncommitted,
    Committed,
    Active,
    Revealed,
}

/// Owns one server seed for its whole lifetime and hands out round counters.
///
/// Counter allocation takes `&mut self`; callers sharing a manager across
/// threads put it behind a single lock so no counter is handed out twice.
#[derive(Debug)]
pub struct SeedLifecycleManager {
    secret: Option<SecretSeed>,
    commitment: Option<SeedCommitment>,
    state: SeedState,
    next_nonce: u64,
    pending: BTreeSet<u64>,
}

impl SeedLifecycleManager {
    /// Fresh manager; the seed itself is generated on [`commit`](Self::commit).
    pub fn new(start_nonce: u64) -> Self {
        Self {
            secret: None,
            commitment: None,
            state: SeedState::Uncommitted,
            next_nonce: start_nonce,
            pending: BTreeSet::new(),
        }
    }

    /// Manager around a known seed, for replays and tests.
    pub fn with_secret(secret: SecretSeed, start_nonce: u64) -> Self {
        Self {
            secret: Some(secret),
            ..Self::new(start_nonce)
        }
    }

    pub fn state(&self) -> SeedState {
        self.state
    }

    pub fn commitment(&self) -> Option<SeedCommitment> {
        self.commitment
    }

    /// Counter the next round will get.
    pub fn peek_nonce(&self) -> u64 {
        self.next_nonce
    }

    pub fn pending_rounds(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, nonce: u64) -> bool {
        self.pending.contains(&nonce)
    }

    /// Generates the seed (unless one was supplied) and fixes its commitment.
    /// Calling it again before reveal returns the same commitment.
    pub fn commit(&mut self) -> FairResult<SeedCommitment> {
        match self.state {
            SeedState::Revealed => Err(FairError::SeedRetired),
            SeedState::Committed | SeedState::Active => {
                self.commitment.ok_or(FairError::NotCommitted)
            }
            SeedState::Uncommitted => {
                let secret = self.secret.take().unwrap_or_else(SecretSeed::generate);
                let commitment = secret.commitment();
                self.secret = Some(secret);
                self.commitment = Some(commitment);
                self.state = SeedState::Committed;
                debug!(%commitment, "server seed committed");
                Ok(commitment)
            }
        }
    }

    /// Allocates the next round counter without tracking it as pending.
    pub fn next_round_counter(&mut self) -> FairResult<u64> {
        match self.state {
            SeedState::Uncommitted => return Err(FairError::NotCommitted),
            SeedState::Revealed => return Err(FairError::SeedRetired),
            SeedState::Committed | SeedState::Active => {}
        }
        let nonce = self.next_nonce;
        self.next_nonce = nonce.checked_add(1).ok_or(FairError::SeedRetired)?;
        if self.state == SeedState::Committed {
            self.state = SeedState::Active;
            debug!(nonce, "server seed active");
        }
        Ok(nonce)
    }

    /// Allocates a round counter and holds it pending until settled.
    pub fn begin_round(&mut self) -> FairResult<u64> {
        let nonce = self.next_round_counter()?;
        self.pending.insert(nonce);
        Ok(nonce)
    }

    pub fn settle_round(&mut self, nonce: u64) -> FairResult<()> {
        if self.pending.remove(&nonce) {
            Ok(())
        } else {
            Err(FairError::UnknownRound(nonce))
        }
    }

    /// Computes the outcome of a pending round without exposing the seed.
    pub fn draw(
        &self,
        client_seed: &str,
        nonce: u64,
        spec: &GameSpec,
    ) -> FairResult<(Outcome, u64)> {
        if self.state == SeedState::Revealed {
            return Err(FairError::SeedRetired);
        }
        if !self.is_pending(nonce) {
            return Err(FairError::UnknownRound(nonce));
        }
        let secret = self.secret.as_ref().ok_or(FairError::NotCommitted)?;
        games::play(secret.expose(), client_seed, nonce, spec)
    }

    /// Publishes the raw seed and retires it. Refused while rounds are pending.
    /// Revealing twice hands back the same seed.
    pub fn reveal(&mut self) -> FairResult<SecretSeed> {
        match self.state {
            SeedState::Uncommitted => return Err(FairError::NotCommitted),
            SeedState::Revealed => {}
            SeedState::Committed | SeedState::Active => {
                if !self.pending.is_empty() {
                    return Err(FairError::NotYetSettled {
                        pending: self.pending.len(),
                    });
                }
                self.state = SeedState::Revealed;
                debug!(last_nonce = self.next_nonce, "server seed revealed");
            }
        }
        self.secret.clone().ok_or(FairError::NotCommitted)
    }
}
