use proptest::prelude::*;
use qip_mixed::prelude::*;
use qip_mixed::rand::rngs::StdRng;
use qip_mixed::rand::SeedableRng;

const BITS: usize = 5;

/// Normalized superpositions over the first `BITS` bits.
fn superposition() -> impl Strategy<Value = Superposition> {
    prop::collection::btree_map(0u64..1 << BITS, (-1.0f64..1.0, -1.0f64..1.0), 1..8)
        .prop_filter("needs a non-negligible norm", |amps| {
            amps.values().map(|(re, im)| re * re + im * im).sum::<f64>() > 1e-3
        })
        .prop_map(|amps| {
            let norm = amps
                .values()
                .map(|(re, im)| re * re + im * im)
                .sum::<f64>()
                .sqrt();
            let terms = amps
                .into_iter()
                .map(|(mask, (re, im))| (ClassicalState::new(mask), Complex::new(re, im) / norm));
            Superposition::new(terms).unwrap()
        })
}

#[derive(Clone, Copy, Debug)]
enum Gate {
    Not(usize),
    Hadamard(usize),
    Rotation(usize, u8),
    ControlledHadamard(usize, usize),
}

fn gate() -> impl Strategy<Value = Gate> {
    prop_oneof![
        (0..BITS).prop_map(Gate::Not),
        (0..BITS).prop_map(Gate::Hadamard),
        (0..BITS, 1u8..8).prop_map(|(bit, d)| Gate::Rotation(bit, d)),
        (0..BITS, 0..BITS)
            .prop_filter("control must differ from target", |(c, t)| c != t)
            .prop_map(|(c, t)| Gate::ControlledHadamard(c, t)),
    ]
}

fn apply(s: &Superposition, gate: Gate) -> StateResult<Superposition> {
    match gate {
        Gate::Not(bit) => s.unitary_transform(not(bit)),
        Gate::Hadamard(bit) => s.unitary_transform(hadamard(bit)),
        Gate::Rotation(bit, d) => s.unitary_transform(partial_x_rotation(bit, f64::from(d))),
        Gate::ControlledHadamard(c, t) => s.unitary_transform(controlled(hadamard(t), [(c, true)])),
    }
}

fn total_probability(s: &Superposition) -> f64 {
    s.iter().map(|(_, amp)| amp.norm_sqr()).sum()
}

proptest! {
    #[test]
    fn unitary_transforms_stay_normalized(
        s in superposition(),
        gates in prop::collection::vec(gate(), 1..6),
    ) {
        let mut s = s;
        for g in gates {
            s = apply(&s, g).unwrap();
            prop_assert!((total_probability(&s) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn measurement_conserves_probability(s in superposition(), bit in 0..BITS, modulus in 1u32..4) {
        let by_bit = s.measure(|c| c.bit(bit));
        let total: f64 = by_bit.iter().map(|(_, p)| p).sum();
        prop_assert!((total - 1.0).abs() < 1e-5);

        let by_weight = s.measure(|c| c.count_ones() % modulus);
        let total: f64 = by_weight.iter().map(|(_, p)| p).sum();
        prop_assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn post_selection_round_trip(s in superposition(), bit in 0..BITS, desired: bool) {
        let expected: f64 = s
            .iter()
            .filter(|(c, _)| c.bit(bit) == desired)
            .map(|(_, amp)| amp.norm_sqr())
            .sum();
        let (p, filtered) = s.post_select(bit_is(bit, desired));
        prop_assert!((p - expected).abs() < 1e-12);
        match filtered {
            Some(filtered) => {
                prop_assert!(filtered.states().all(|c| c.bit(bit) == desired));
                prop_assert!((total_probability(&filtered) - 1.0).abs() < 1e-5);
            }
            None => {
                prop_assert_eq!(p, 0.0);
                prop_assert!(s.states().all(|c| c.bit(bit) != desired));
            }
        }
    }

    #[test]
    fn ensemble_post_selection_matches_probability(
        a in superposition(),
        b in superposition(),
        w in 0.0f64..1.0,
        bit in 0..BITS,
    ) {
        let m = Ensemble::new([(a, w), (b, 1.0 - w)]).unwrap();
        let (p, filtered) = m.post_select(bit_is(bit, true));
        prop_assert!((p - m.probability_of(bit_is(bit, true))).abs() < 1e-9);
        if let Some(filtered) = filtered {
            let total: f64 = filtered.iter().map(|(_, w)| w).sum();
            prop_assert!((total - 1.0).abs() < 1e-5);
            prop_assert!(filtered.iter().all(|(s, _)| s.states().all(|c| c.bit(bit))));
        }
    }

    #[test]
    fn collapse_lands_on_support(s in superposition(), seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..10 {
            let c = s.collapsed_with(&mut rng);
            prop_assert!(s.contains(&c));
        }
        let m = s.measure(|c| c.bit(0));
        let c = m.collapsed_with(&mut rng);
        prop_assert!(s.contains(&c));
    }

    #[test]
    fn with_bit_sets_exactly_one_bit(mask: u128, index in 0usize..200, value: bool) {
        let c = ClassicalState::from(mask);
        let d = c.with_bit(index, value);
        prop_assert_eq!(d.bit(index), value);
        prop_assert_eq!(c.with_bit(index, c.bit(index)), c.clone());
        for i in (0..200).filter(|&i| i != index) {
            prop_assert_eq!(d.bit(i), c.bit(i));
        }
    }
}
