use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use fairdraw_core::{
    play, sha512_hex, verify, GameSpec, Outcome, SeedCommitment, VerificationResult,
    DEFAULT_BOARD_SIZE,
};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "fairdraw-cli", about = "Replay and audit provably-fair rounds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Args, Clone)]
struct RoundArgs {
    /// Revealed server seed
    #[arg(long, env = "FAIRDRAW_SERVER_SEED")]
    server_seed: String,
    #[arg(long)]
    client_seed: String,
    #[arg(long)]
    nonce: u64,
}

#[derive(Subcommand, Clone, Copy)]
enum GameArg {
    Dice,
    Mines {
        #[arg(long)]
        mines: u32,
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        board: u32,
    },
    Path {
        #[arg(long)]
        rows: u32,
    },
}

impl From<GameArg> for GameSpec {
    fn from(g: GameArg) -> Self {
        match g {
            GameArg::Dice => GameSpec::Dice,
            GameArg::Mines { mines, board } => GameSpec::Mines {
                mines,
                board_size: board,
            },
            GameArg::Path { rows } => GameSpec::Path { rows },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SHA-512 commitment of a server seed
    Commit { server_seed: String },
    /// Replay one round
    Roll {
        #[command(flatten)]
        round: RoundArgs,
        #[command(subcommand)]
        game: GameArg,
    },
    /// Check a claimed round against its commitment
    Verify {
        #[command(flatten)]
        round: RoundArgs,
        /// Commitment published before play (hex)
        #[arg(long)]
        commitment: String,
        /// Claimed result: a roll, comma-separated mines, a bucket, or outcome JSON
        #[arg(long)]
        claimed: String,
        #[command(subcommand)]
        game: GameArg,
    },
    /// Generate consecutive rounds into a CSV audit file
    ExportCsv {
        path: String,
        #[arg(long, env = "FAIRDRAW_SERVER_SEED")]
        server_seed: String,
        #[arg(long)]
        client_seed: String,
        #[arg(long, default_value_t = 1)]
        from: u64,
        #[arg(long, default_value_t = 100)]
        count: u64,
        #[command(subcommand)]
        game: GameArg,
    },
    /// Verify every row of a CSV audit file
    VerifyCsv { path: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct AuditRow {
    server_seed_hash: String,
    server_seed: String,
    client_seed: String,
    nonce: u64,
    game_json: String,
    outcome_json: String,
}

impl AuditRow {
    fn check(&self) -> anyhow::Result<VerificationResult> {
        let commitment = SeedCommitment::from_hex(&self.server_seed_hash)?;
        let spec: GameSpec = serde_json::from_str(&self.game_json).context("game_json")?;
        let claimed: Outcome = serde_json::from_str(&self.outcome_json).context("outcome_json")?;
        Ok(verify(
            &commitment,
            &self.server_seed,
            &self.client_seed,
            self.nonce,
            &spec,
            &claimed,
        )?)
    }
}

fn parse_claimed(spec: &GameSpec, raw: &str) -> anyhow::Result<Outcome> {
    let raw = raw.trim();
    if raw.starts_with('{') {
        return serde_json::from_str(raw).context("claimed outcome JSON");
    }
    let outcome = match spec {
        GameSpec::Dice => Outcome::Dice(raw.parse().context("claimed dice roll")?),
        GameSpec::Mines { .. } => Outcome::Mines(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<u32>().with_context(|| format!("mine index {s:?}")))
                .collect::<anyhow::Result<_>>()?,
        ),
        GameSpec::Path { .. } => Outcome::Path(raw.parse().context("claimed bucket")?),
    };
    Ok(outcome)
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Dice(roll) => format!("{roll:.2}"),
        Outcome::Mines(tiles) => tiles
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(","),
        Outcome::Path(bucket) => bucket.to_string(),
    }
}

fn print_verification(json: bool, result: &VerificationResult) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
    } else {
        println!(
            "commitment_matches={} outcome_matches={} fair={}",
            result.commitment_matches,
            result.outcome_matches,
            result.is_fair()
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Commit { server_seed } => {
            let hash = sha512_hex(server_seed.as_bytes());
            if cli.json {
                println!("{}", serde_json::json!({ "server_seed_hash": hash }));
            } else {
                println!("{hash}");
            }
        }
        Commands::Roll { round, game } => {
            let spec = GameSpec::from(game);
            let (outcome, draws) =
                play(&round.server_seed, &round.client_seed, round.nonce, &spec)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "outcome": outcome, "nonce": round.nonce, "draws": draws })
                );
            } else {
                println!(
                    "{} nonce={} draws={} result={}",
                    spec.name(),
                    round.nonce,
                    draws,
                    describe(&outcome)
                );
            }
        }
        Commands::Verify {
            round,
            commitment,
            claimed,
            game,
        } => {
            let spec = GameSpec::from(game);
            let commitment = SeedCommitment::from_hex(&commitment)?;
            let claimed = parse_claimed(&spec, &claimed)?;
            let result = verify(
                &commitment,
                &round.server_seed,
                &round.client_seed,
                round.nonce,
                &spec,
                &claimed,
            )?;
            print_verification(cli.json, &result)?;
            if !result.is_fair() {
                bail!("round failed verification");
            }
        }
        Commands::ExportCsv {
            path,
            server_seed,
            client_seed,
            from,
            count,
            game,
        } => {
            let spec = GameSpec::from(game);
            let server_seed_hash = SeedCommitment::of(&server_seed).to_hex();
            let game_json = serde_json::to_string(&spec)?;
            let mut wtr = csv::Writer::from_path(&path)?;
            for nonce in from..from.saturating_add(count) {
                let (outcome, _) = play(&server_seed, &client_seed, nonce, &spec)?;
                wtr.serialize(AuditRow {
                    server_seed_hash: server_seed_hash.clone(),
                    server_seed: server_seed.clone(),
                    client_seed: client_seed.clone(),
                    nonce,
                    game_json: game_json.clone(),
                    outcome_json: serde_json::to_string(&outcome)?,
                })?;
            }
            wtr.flush()?;
            println!("Exported {} rows to {}", count, path);
        }
        Commands::VerifyCsv { path } => {
            let mut rdr = csv::Reader::from_path(&path)?;
            let mut total = 0usize;
            let mut failed = 0usize;
            for (line, row) in rdr.deserialize::<AuditRow>().enumerate() {
                let row = row.with_context(|| format!("row {}", line + 1))?;
                let result = row.check().with_context(|| format!("row {}", line + 1))?;
                total += 1;
                if !result.is_fair() {
                    failed += 1;
                    println!(
                        "row {} nonce={} commitment_matches={} outcome_matches={}",
                        line + 1,
                        row.nonce,
                        result.commitment_matches,
                        result.outcome_matches
                    );
                }
            }
            if cli.json {
                println!("{}", serde_json::json!({ "rows": total, "failed": failed }));
            } else {
                println!("Verified {} rows, {} failed", total, failed);
            }
            if failed > 0 {
                bail!("{failed} of {total} rows failed verification");
            }
        }
    }

    Ok(())
}
