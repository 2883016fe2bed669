use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use fairdraw_core::{verify, FairSession, GameSpec, Outcome, PlayedRound};
use fairdraw_shared::{
    ApiError, ApiResult, ClientSeedRequest, CommitmentResponse, RotateResponse, RoundLogEntry,
    RoundRequest, RoundResponse, VerifyRequest, VerifyResponse,
};
use tracing::{error, info};

use crate::config::ServerConfig;

struct RoundLog {
    entries: VecDeque<RoundLogEntry>,
    next_id: u64,
    capacity: usize,
}

impl RoundLog {
    fn push(&mut self, round: &PlayedRound) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.next_id += 1;
        self.entries.push_back(RoundLogEntry {
            id: self.next_id,
            ts: chrono::Utc::now(),
            game: round.spec,
            outcome: round.outcome.clone(),
            key: round.key.clone(),
        });
    }
}

pub struct AppState {
    // one lock serialises round counter allocation
    session: Mutex<FairSession>,
    log: Mutex<RoundLog>,
    api_key: String,
    house_edge: f64,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let session = FairSession::new(config.client_seed.clone(), config.start_nonce)?;
        Ok(Self {
            session: Mutex::new(session),
            log: Mutex::new(RoundLog {
                entries: VecDeque::with_capacity(config.history.min(4096)),
                next_id: 0,
                capacity: config.history,
            }),
            api_key: config.api_key.clone(),
            house_edge: config.house_edge,
        })
    }

    fn session(&self) -> ApiResult<MutexGuard<'_, FairSession>> {
        self.session.lock().map_err(|_| {
            error!("session lock poisoned");
            ApiError::Internal
        })
    }

    fn log(&self) -> ApiResult<MutexGuard<'_, RoundLog>> {
        self.log.lock().map_err(|_| {
            error!("round log lock poisoned");
            ApiError::Internal
        })
    }

    pub fn authorize(&self, token: &str) -> ApiResult<()> {
        if token == self.api_key {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    pub fn commitment(&self) -> ApiResult<CommitmentResponse> {
        let session = self.session()?;
        Ok(CommitmentResponse {
            server_seed_hash: session.commitment()?,
            client_seed: session.client_seed().to_owned(),
            next_nonce: session.next_nonce(),
        })
    }

    pub fn set_client_seed(&self, req: ClientSeedRequest) -> ApiResult<CommitmentResponse> {
        self.session()?.set_client_seed(req.client_seed)?;
        self.commitment()
    }

    pub fn play(&self, req: RoundRequest) -> ApiResult<RoundResponse> {
        let multiplier_table = match (&req.payout, req.game) {
            (None, _) => None,
            (Some(table), GameSpec::Path { rows }) if table.rows() == rows => Some(table),
            (Some(table), GameSpec::Path { rows }) => {
                return Err(ApiError::Invalid(format!(
                    "payout table has {} rows, board has {rows}",
                    table.rows()
                )))
            }
            (Some(_), game) => {
                return Err(ApiError::Invalid(format!(
                    "payout tables apply to path games, not {}",
                    game.name()
                )))
            }
        };
        let bet = match (req.bet, req.game) {
            (None, _) => None,
            (Some(bet), GameSpec::Dice) => {
                let payout = bet.multiplier(self.house_edge).ok_or_else(|| {
                    ApiError::Invalid(format!("bet on {} cannot win", bet.target))
                })?;
                Some((bet, payout))
            }
            (Some(_), game) => {
                return Err(ApiError::Invalid(format!(
                    "bets apply to dice games, not {}",
                    game.name()
                )))
            }
        };

        let round = self.session()?.play(&req.game)?;
        info!(
            game = round.spec.name(),
            nonce = round.key.nonce,
            outcome = ?round.outcome,
            "round played"
        );
        self.log()?.push(&round);

        let (multiplier, won) = match (bet, &round.outcome) {
            (Some((bet, payout)), Outcome::Dice(roll)) => {
                let won = bet.wins(*roll);
                (Some(if won { payout } else { 0.0 }), Some(won))
            }
            _ => (
                multiplier_table.and_then(|t| t.for_outcome(&round.outcome)),
                None,
            ),
        };
        Ok(RoundResponse {
            game: round.spec,
            outcome: round.outcome,
            key: round.key,
            multiplier,
            won,
        })
    }

    pub fn rotate(&self) -> ApiResult<RotateResponse> {
        let rotation = self.session()?.rotate()?;
        info!(
            revealed = %rotation.revealed_commitment,
            next = %rotation.next_commitment,
            "server seed rotated"
        );
        Ok(RotateResponse {
            revealed_server_seed: rotation.revealed_seed,
            revealed_server_seed_hash: rotation.revealed_commitment,
            next_server_seed_hash: rotation.next_commitment,
        })
    }

    /// Most recent rounds, newest first.
    pub fn recent_rounds(&self, limit: usize) -> ApiResult<Vec<RoundLogEntry>> {
        let log = self.log()?;
        Ok(log.entries.iter().rev().take(limit).cloned().collect())
    }
}

/// Stateless: anyone can call it with a revealed seed.
pub fn verify_round(req: VerifyRequest) -> ApiResult<VerifyResponse> {
    let result = verify(
        &req.server_seed_hash,
        &req.server_seed,
        &req.client_seed,
        req.nonce,
        &req.game,
        &req.outcome,
    )?;
    Ok(result.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairdraw_core::{DiceBet, PayoutTable};

    fn config(history: usize) -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:0".into(),
            api_key: "k".into(),
            start_nonce: 1,
            client_seed: "c1".into(),
            history,
            house_edge: 0.01,
        }
    }

    fn dice() -> RoundRequest {
        RoundRequest {
            game: GameSpec::Dice,
            payout: None,
            bet: None,
        }
    }

    #[test]
    fn rounds_then_rotate_then_verify() {
        let state = AppState::new(&config(10)).unwrap();
        let before = state.commitment().unwrap();
        assert_eq!(before.next_nonce, 1);

        let played: Vec<_> = (0..3).map(|_| state.play(dice()).unwrap()).collect();
        assert_eq!(played[2].key.nonce, 3);
        assert_eq!(state.commitment().unwrap().next_nonce, 4);

        let rotation = state.rotate().unwrap();
        assert_eq!(rotation.revealed_server_seed_hash, before.server_seed_hash);

        for round in played {
            let resp = verify_round(VerifyRequest {
                server_seed_hash: before.server_seed_hash,
                server_seed: rotation.revealed_server_seed.clone(),
                client_seed: round.key.client_seed,
                nonce: round.key.nonce,
                game: round.game,
                outcome: round.outcome,
            })
            .unwrap();
            assert!(resp.fair);
        }
    }

    #[test]
    fn log_is_bounded_and_newest_first() {
        let state = AppState::new(&config(2)).unwrap();
        for _ in 0..3 {
            state.play(dice()).unwrap();
        }
        let rounds = state.recent_rounds(10).unwrap();
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].id, 3);
        assert_eq!(rounds[0].key.nonce, 3);
        assert_eq!(rounds[1].id, 2);
        assert_eq!(state.recent_rounds(1).unwrap().len(), 1);
    }

    #[test]
    fn payout_table_must_fit_board() {
        let state = AppState::new(&config(10)).unwrap();
        let table = PayoutTable::balanced(8, 0.01).unwrap();

        let ok = state
            .play(RoundRequest {
                game: GameSpec::Path { rows: 8 },
                payout: Some(table.clone()),
                bet: None,
            })
            .unwrap();
        let Outcome::Path(bucket) = ok.outcome else {
            panic!("expected path outcome");
        };
        assert_eq!(ok.multiplier, table.multiplier(bucket));

        let wrong_rows = state.play(RoundRequest {
            game: GameSpec::Path { rows: 9 },
            payout: Some(table.clone()),
            bet: None,
        });
        assert!(matches!(wrong_rows, Err(ApiError::Invalid(_))));

        let wrong_game = state.play(RoundRequest {
            game: GameSpec::Dice,
            payout: Some(table),
            bet: None,
        });
        assert!(matches!(wrong_game, Err(ApiError::Invalid(_))));
        assert_eq!(state.commitment().unwrap().next_nonce, 2);
    }

    #[test]
    fn invalid_game_does_not_burn_nonce() {
        let state = AppState::new(&config(10)).unwrap();
        let err = state.play(RoundRequest {
            game: GameSpec::mines(99),
            payout: None,
            bet: None,
        });
        assert!(matches!(err, Err(ApiError::Invalid(_))));
        assert_eq!(state.commitment().unwrap().next_nonce, 1);
    }

    fn dice_bet(target: f64, roll_over: bool) -> RoundRequest {
        RoundRequest {
            bet: Some(DiceBet { target, roll_over }),
            ..dice()
        }
    }

    #[test]
    fn dice_bets_settle_at_house_edge() {
        let state = AppState::new(&config(10)).unwrap();
        let over = DiceBet {
            target: 50.0,
            roll_over: true,
        };
        for _ in 0..20 {
            let resp = state.play(dice_bet(50.0, true)).unwrap();
            let Outcome::Dice(roll) = resp.outcome else {
                panic!("expected dice outcome");
            };
            let won = roll > 50.0;
            assert_eq!(resp.won, Some(won));
            let expected = if won { over.multiplier(0.01) } else { Some(0.0) };
            assert_eq!(resp.multiplier, expected);
        }

        let plain = state.play(dice()).unwrap();
        assert_eq!(plain.won, None);
        assert_eq!(plain.multiplier, None);
    }

    #[test]
    fn unwinnable_or_misplaced_bets_keep_nonce() {
        let state = AppState::new(&config(10)).unwrap();
        let hopeless = state.play(dice_bet(0.0, false));
        assert!(matches!(hopeless, Err(ApiError::Invalid(_))));
        let nan = state.play(dice_bet(f64::NAN, true));
        assert!(matches!(nan, Err(ApiError::Invalid(_))));
        let on_path = state.play(RoundRequest {
            game: GameSpec::Path { rows: 8 },
            ..dice_bet(50.0, true)
        });
        assert!(matches!(on_path, Err(ApiError::Invalid(_))));
        assert_eq!(state.commitment().unwrap().next_nonce, 1);
    }

    #[test]
    fn client_seed_update_and_auth() {
        let state = AppState::new(&config(10)).unwrap();
        let resp = state
            .set_client_seed(ClientSeedRequest {
                client_seed: "mine".into(),
            })
            .unwrap();
        assert_eq!(resp.client_seed, "mine");
        assert!(state.authorize("k").is_ok());
        assert!(matches!(state.authorize("nope"), Err(ApiError::Unauthorized)));
    }
}
