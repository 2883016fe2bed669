use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FairError, FairResult};
use crate::games::{GameSpec, Outcome};
use crate::hash::SeedCommitment;
use crate::rng::validate_client_seed;
use crate::seed::{SecretSeed, SeedLifecycleManager};

/// Everything needed to replay a round once the server seed is revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundKey {
    pub commitment: SeedCommitment,
    pub client_seed: String,
    pub nonce: u64,
    /// Draws consumed, i.e. the final draw offset.
    pub draws: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayedRound {
    pub spec: GameSpec,
    pub outcome: Outcome,
    pub key: RoundKey,
}

/// Result of retiring a seed and committing its successor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRotation {
    pub revealed_seed: String,
    pub revealed_commitment: SeedCommitment,
    pub next_commitment: SeedCommitment,
}

/// Operator-side pairing of the active server seed with the player's client seed.
#[derive(Debug)]
pub struct FairSession {
    seeds: SeedLifecycleManager,
    client_seed: String,
    start_nonce: u64,
}

impl FairSession {
    /// Starts a session with a freshly generated, already committed server seed.
    pub fn new(client_seed: impl Into<String>, start_nonce: u64) -> FairResult<Self> {
        Self::with_manager(SeedLifecycleManager::new(start_nonce), client_seed, start_nonce)
    }

    pub fn with_secret(
        secret: SecretSeed,
        client_seed: impl Into<String>,
        start_nonce: u64,
    ) -> FairResult<Self> {
        let manager = SeedLifecycleManager::with_secret(secret, start_nonce);
        Self::with_manager(manager, client_seed, start_nonce)
    }

    fn with_manager(
        mut seeds: SeedLifecycleManager,
        client_seed: impl Into<String>,
        start_nonce: u64,
    ) -> FairResult<Self> {
        let client_seed = client_seed.into();
        validate_client_seed(&client_seed)?;
        seeds.commit()?;
        Ok(Self {
            seeds,
            client_seed,
            start_nonce,
        })
    }

    pub fn commitment(&self) -> FairResult<SeedCommitment> {
        self.seeds.commitment().ok_or(FairError::NotCommitted)
    }

    pub fn client_seed(&self) -> &str {
        &self.client_seed
    }

    pub fn next_nonce(&self) -> u64 {
        self.seeds.peek_nonce()
    }

    pub fn pending_rounds(&self) -> usize {
        self.seeds.pending_rounds()
    }

    /// Only allowed while no round is in flight. The nonce sequence carries on.
    pub fn set_client_seed(&mut self, client_seed: impl Into<String>) -> FairResult<()> {
        let pending = self.seeds.pending_rounds();
        if pending > 0 {
            return Err(FairError::NotYetSettled { pending });
        }
        let client_seed = client_seed.into();
        validate_client_seed(&client_seed)?;
        debug!(client_seed = %client_seed, "client seed changed");
        self.client_seed = client_seed;
        Ok(())
    }

    pub fn begin_round(&mut self) -> FairResult<u64> {
        self.seeds.begin_round()
    }

    pub fn settle_round(&mut self, nonce: u64) -> FairResult<()> {
        self.seeds.settle_round(nonce)
    }

    /// Outcome of a round started with [`begin_round`](Self::begin_round).
    pub fn draw(&self, nonce: u64, spec: &GameSpec) -> FairResult<PlayedRound> {
        let (outcome, draws) = self.seeds.draw(&self.client_seed, nonce, spec)?;
        Ok(PlayedRound {
            spec: *spec,
            outcome,
            key: RoundKey {
                commitment: self.commitment()?,
                client_seed: self.client_seed.clone(),
                nonce,
                draws,
            },
        })
    }

    /// Allocates, draws and settles one round. Parameters are checked before a
    /// counter is taken, so a rejected call leaves the sequence untouched.
    pub fn play(&mut self, spec: &GameSpec) -> FairResult<PlayedRound> {
        spec.validate()?;
        let nonce = self.begin_round()?;
        let played = self.draw(nonce, spec);
        self.settle_round(nonce)?;
        played
    }

    /// Reveals the current seed and commits a new one. The nonce sequence
    /// restarts at the session's starting value.
    pub fn rotate(&mut self) -> FairResult<SeedRotation> {
        let revealed = self.seeds.reveal()?;
        let mut next = SeedLifecycleManager::new(self.start_nonce);
        let next_commitment = next.commit()?;
        self.seeds = next;
        debug!(%next_commitment, "server seed rotated");
        Ok(SeedRotation {
            revealed_seed: revealed.expose().to_owned(),
            revealed_commitment: revealed.commitment(),
            next_commitment,
        })
    }
}
