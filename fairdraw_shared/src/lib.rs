use chrono::{DateTime, Utc};
use fairdraw_core::{
    DiceBet, FairError, GameSpec, Outcome, PayoutTable, RoundKey, SeedCommitment,
    VerificationResult,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommitmentResponse {
    pub server_seed_hash: SeedCommitment,
    pub client_seed: String,
    pub next_nonce: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientSeedRequest {
    pub client_seed: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RoundRequest {
    #[serde(flatten)]
    pub game: GameSpec,
    /// Path games only: multipliers per bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout: Option<PayoutTable>,
    /// Dice games only: over/under target settled at the server's house edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet: Option<DiceBet>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RoundResponse {
    pub game: GameSpec,
    pub outcome: Outcome,
    pub key: RoundKey,
    /// Stake multiplier paid out; `0.0` for a lost dice bet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub won: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RotateResponse {
    pub revealed_server_seed: String,
    pub revealed_server_seed_hash: SeedCommitment,
    pub next_server_seed_hash: SeedCommitment,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VerifyRequest {
    pub server_seed_hash: SeedCommitment,
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
    pub game: GameSpec,
    pub outcome: Outcome,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VerifyResponse {
    #[serde(flatten)]
    pub result: VerificationResult,
    pub fair: bool,
}

impl From<VerificationResult> for VerifyResponse {
    fn from(result: VerificationResult) -> Self {
        Self {
            fair: result.is_fair(),
            result,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RoundLogEntry {
    pub id: u64,
    pub ts: DateTime<Utc>,
    pub game: GameSpec,
    pub outcome: Outcome,
    pub key: RoundKey,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal server error")]
    Internal,
}

impl From<FairError> for ApiError {
    fn from(e: FairError) -> Self {
        match e {
            FairError::SeedRetired
            | FairError::NotCommitted
            | FairError::NotYetSettled { .. }
            | FairError::UnknownRound(_) => ApiError::Conflict(e.to_string()),
            FairError::InvalidSeedFormat(_)
            | FairError::InvalidRange { .. }
            | FairError::InvalidMineCount { .. }
            | FairError::InvalidRowCount { .. }
            | FairError::InvalidPayoutTable(_) => ApiError::Invalid(e.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_request_flattens_game() {
        let req: RoundRequest =
            serde_json::from_str(r#"{"game":"path","rows":8,"payout":[9,1,1,1,0.5,1,1,1,9]}"#)
                .unwrap();
        assert_eq!(req.game, GameSpec::Path { rows: 8 });
        assert_eq!(req.payout.unwrap().multiplier(0), Some(9.0));

        let req: RoundRequest = serde_json::from_str(r#"{"game":"dice"}"#).unwrap();
        assert_eq!(req.game, GameSpec::Dice);
        assert!(req.payout.is_none());
        assert!(req.bet.is_none());

        let req: RoundRequest = serde_json::from_str(
            r#"{"game":"dice","bet":{"target":49.5,"roll_over":false}}"#,
        )
        .unwrap();
        assert_eq!(
            req.bet,
            Some(DiceBet {
                target: 49.5,
                roll_over: false
            })
        );
    }

    #[test]
    fn fair_errors_map_to_api_errors() {
        assert!(matches!(
            ApiError::from(FairError::NotYetSettled { pending: 2 }),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(FairError::InvalidRowCount { rows: 0 }),
            ApiError::Invalid(_)
        ));
    }

    #[test]
    fn verify_response_shape() {
        let resp = VerifyResponse::from(VerificationResult {
            commitment_matches: true,
            outcome_matches: false,
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["commitment_matches"], true);
        assert_eq!(json["outcome_matches"], false);
        assert_eq!(json["fair"], false);
    }
}
