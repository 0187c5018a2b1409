//! Iterative post-selection search for a satisfying assignment.
//!
//! Every anti-clause is a partial assignment that must *not* hold. Each clause gets a bit that is
//! set when the clause is satisfied, and an ancilla is rotated a little for every satisfied
//! clause. Post-selecting on the ancilla having flipped amplifies the assignments satisfying all
//! clauses, at the cost of sometimes failing outright.
//!
//! Run with `RUST_LOG=qip_mixed=debug` to see the engine's own logging.

use qip_mixed::prelude::*;
use tracing_subscriber::EnvFilter;

type AntiClause = Vec<(usize, bool)>;

fn simulate(anti_clauses: &[AntiClause]) -> StateResult<()> {
    let n = anti_clauses
        .iter()
        .flat_map(|clause| clause.iter().map(|(bit, _)| *bit))
        .max()
        .map_or(0, |bit| bit + 1);
    let m = anti_clauses.len();
    let clause_bits = n..n + m;
    let ancilla = n + m;

    let mut state = Ensemble::from(ClassicalState::zero());

    // Put the variable bits into a uniform superposition.
    for i in 0..n {
        state = state.unitary_transform(hadamard(i))?;
    }

    // Clause bit j ends up set unless its anti-clause holds.
    for (j, clause) in anti_clauses.iter().enumerate() {
        state = state.unitary_transform(not(n + j))?;
        state = state.unitary_transform(controlled(not(n + j), clause.clone()))?;
    }

    let all_clauses_hold = |c: &ClassicalState| clause_bits.clone().all(|j| c.bit(j));

    let mut log_p_survived = 0.0;
    let mut step = 0;
    loop {
        if step % 10 == 0 {
            let p_correct = state.probability_of(all_clauses_hold);
            let p_survived = 10f64.powf(log_p_survived);
            println!(
                "iter {};\tp_survived: {:.4}%;\tp_correct: {:.4}%;\tp_correct*p_survived: {:.4}%",
                step,
                p_survived * 100.0,
                p_correct * 100.0,
                p_correct * p_survived * 100.0
            );
            if p_correct >= 0.99 {
                break;
            }
        }

        step += 1;
        for j in clause_bits.clone() {
            let op = controlled(partial_x_rotation(ancilla, m as f64), [(j, true)]);
            state = state.unitary_transform(op)?;
        }
        let (p_pass, survivor) = state.post_select(bit_is(ancilla, true));
        state = match survivor {
            Some(survivor) => survivor,
            None => {
                println!("Post-selection can no longer succeed; no assignment satisfies every clause.");
                return Ok(());
            }
        };
        state = state.unitary_transform(not(ancilla))?;
        log_p_survived += p_pass.log10();
    }

    println!("Samples:");
    for _ in 0..5 {
        let s = state.collapsed();
        println!("{} {}", s, all_clauses_hold(&s));
    }
    let p_survived = 10f64.powf(log_p_survived);
    let p_correct = state.probability_of(all_clauses_hold);
    println!("Chance of survival: {:.8}%", p_survived * 100.0);
    println!("Chance of correct: {:.8}%", p_correct * 100.0);
    println!(
        "Chance of survived and correct: {:.8}%",
        p_survived * p_correct * 100.0
    );
    println!(
        "Expected number of attempts needed: {:.9}",
        1.0 / (p_survived * p_correct)
    );
    println!("2**n: {}", 1u64 << n);
    Ok(())
}

fn main() -> StateResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let anti_clauses: Vec<AntiClause> = vec![
        // Force 0 true
        vec![(0, false), (1, false), (2, false)],
        vec![(0, false), (1, true), (2, false)],
        vec![(0, false), (1, false), (2, true)],
        vec![(0, false), (1, true), (2, true)],
        // Force 1 true
        vec![(0, true), (1, false), (2, false)],
        vec![(0, true), (1, false), (2, true)],
        // Force all true
        vec![(0, true), (1, true), (2, false)],
        vec![(0, true), (1, true), (3, false)],
        vec![(0, true), (1, true), (4, false)],
        vec![(0, true), (1, true), (5, false)],
        vec![(0, true), (1, true), (6, false)],
        vec![(0, true), (1, true), (7, false)],
        vec![(0, true), (1, true), (8, false)],
        vec![(0, true), (1, true), (9, false)],
        vec![(0, true), (1, true), (10, false)],
    ];
    simulate(&anti_clauses)
}
