use fairdraw_core::{verify_round, FairSession, GameSpec, PayoutTable};

fn main() {
    // End-to-end: commit, play a few rounds, reveal, verify
    let mut session = FairSession::new("example-client-seed", 1).expect("session");
    println!("commitment={}", session.commitment().expect("committed"));

    let table = PayoutTable::balanced(12, 0.01).expect("payout table");
    let specs = [GameSpec::Dice, GameSpec::mines(3), GameSpec::Path { rows: 12 }];
    let rounds: Vec<_> = specs
        .iter()
        .map(|spec| session.play(spec).expect("round"))
        .collect();
    for round in &rounds {
        println!(
            "nonce={} draws={} outcome={:?} multiplier={:?}",
            round.key.nonce,
            round.key.draws,
            round.outcome,
            table.for_outcome(&round.outcome)
        );
    }

    let rotation = session.rotate().expect("rotate");
    println!("revealed={}", rotation.revealed_seed);
    for round in &rounds {
        let result = verify_round(&round.key, &rotation.revealed_seed, &round.spec, &round.outcome)
            .expect("verify");
        println!("nonce={} fair={}", round.key.nonce, result.is_fair());
    }
}
