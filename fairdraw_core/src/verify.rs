//! Independent replay of a settled round.
//!
//! Nothing here touches operator state: given the revealed server seed and the
//! published inputs, anyone can recompute the outcome and check it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FairResult;
use crate::games::{self, GameSpec, Outcome};
use crate::hash::SeedCommitment;
use crate::session::RoundKey;

/// Both flags must hold for a round to count as honestly generated. A
/// commitment mismatch alone proves the server seed was swapped after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub commitment_matches: bool,
    pub outcome_matches: bool,
}

impl VerificationResult {
    pub fn is_fair(&self) -> bool {
        self.commitment_matches && self.outcome_matches
    }
}

pub fn verify(
    claimed_commitment: &SeedCommitment,
    revealed_seed: &str,
    client_seed: &str,
    nonce: u64,
    spec: &GameSpec,
    claimed: &Outcome,
) -> FairResult<VerificationResult> {
    let commitment_matches = claimed_commitment.matches(revealed_seed);
    let (recomputed, _) = games::play(revealed_seed, client_seed, nonce, spec)?;
    let outcome_matches = recomputed.same_as(claimed);
    debug!(
        game = spec.name(),
        nonce, commitment_matches, outcome_matches, "round verified"
    );
    Ok(VerificationResult {
        commitment_matches,
        outcome_matches,
    })
}

/// [`verify`] driven by a published [`RoundKey`]. A draw count that differs
/// from the replay also counts as an outcome mismatch.
pub fn verify_round(
    key: &RoundKey,
    revealed_seed: &str,
    spec: &GameSpec,
    claimed: &Outcome,
) -> FairResult<VerificationResult> {
    let (_, draws) = games::play(revealed_seed, &key.client_seed, key.nonce, spec)?;
    let mut result = verify(
        &key.commitment,
        revealed_seed,
        &key.client_seed,
        key.nonce,
        spec,
        claimed,
    )?;
    result.outcome_matches &= draws == key.draws;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FairError;
    use crate::rng::MAX_PUBLIC_SEED_LEN;

    #[test]
    fn honest_round_verifies() {
        let c = SeedCommitment::of("s1");
        let r = verify(&c, "s1", "c1", 1, &GameSpec::Dice, &Outcome::Dice(34.9)).unwrap();
        assert!(r.is_fair());
    }

    #[test]
    fn swapped_seed_breaks_commitment_only() {
        let c = SeedCommitment::of("s1");
        let (outcome, _) = games::play("s2", "c1", 1, &GameSpec::Dice).unwrap();
        let r = verify(&c, "s2", "c1", 1, &GameSpec::Dice, &outcome).unwrap();
        assert_eq!(
            r,
            VerificationResult {
                commitment_matches: false,
                outcome_matches: true
            }
        );
        assert!(!r.is_fair());
    }

    #[test]
    fn wrong_game_kind_is_a_mismatch() {
        let c = SeedCommitment::of("s1");
        let path = GameSpec::Path { rows: 8 };
        let r = verify(&c, "s1", "c1", 1, &path, &Outcome::Dice(34.9)).unwrap();
        assert!(r.commitment_matches);
        assert!(!r.outcome_matches);
    }

    #[test]
    fn duplicated_mines_do_not_verify() {
        let c = SeedCommitment::of("s1");
        let spec = GameSpec::mines(3);
        let padded = Outcome::Mines(vec![2, 2, 8, 12]);
        let r = verify(&c, "s1", "c1", 1, &spec, &padded).unwrap();
        assert!(r.commitment_matches);
        assert!(!r.outcome_matches);
    }

    #[test]
    fn any_length_client_seed_verifies() {
        let c = SeedCommitment::of("s1");
        let client = "c".repeat(MAX_PUBLIC_SEED_LEN + 1);
        let (outcome, _) = games::play("s1", &client, 4, &GameSpec::Dice).unwrap();
        let r = verify(&c, "s1", &client, 4, &GameSpec::Dice, &outcome).unwrap();
        assert!(r.is_fair());
    }

    #[test]
    fn invalid_parameters_propagate() {
        let c = SeedCommitment::of("s1");
        let err = verify(&c, "s1", "c1", 1, &GameSpec::Path { rows: 0 }, &Outcome::Path(0))
            .unwrap_err();
        assert_eq!(err, FairError::InvalidRowCount { rows: 0 });
        assert!(verify(&c, "", "c1", 1, &GameSpec::Dice, &Outcome::Dice(0.0)).is_err());
    }

    #[test]
    fn round_key_draw_count_checked() {
        let mut key = RoundKey {
            commitment: SeedCommitment::of("s1"),
            client_seed: "c1".into(),
            nonce: 1,
            draws: 3,
        };
        let spec = GameSpec::mines(3);
        let claimed = Outcome::Mines(vec![12, 2, 8]);
        assert!(verify_round(&key, "s1", &spec, &claimed).unwrap().is_fair());
        key.draws = 2;
        assert!(!verify_round(&key, "s1", &spec, &claimed).unwrap().outcome_matches);
    }
}
