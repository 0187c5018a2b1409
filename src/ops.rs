//! Common unitary operators and predicates on bit-indexed classical states.
//!
//! Operators are plain closures from a classical state to the superposition it maps onto, ready
//! to pass to `unitary_transform`.
//!
//! # Example
//! ```
//! use qip_mixed::prelude::*;
//!
//! # fn main() -> StateResult<()> {
//! let s = Ensemble::from(ClassicalState::zero());
//! let s = s.unitary_transform(hadamard(0))?;
//! let s = s.unitary_transform(controlled(not(1), [(0, true)]))?;
//!
//! // Bits 0 and 1 are now always equal.
//! assert!(s.probability_of(|c| c.bit(0) != c.bit(1)) < 1e-12);
//! # Ok(())
//! # }
//! ```

use crate::errors::StateResult;
use crate::{ClassicalState, Complex, Superposition};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Flip bit `bit`.
pub fn not(bit: usize) -> impl Fn(&ClassicalState) -> StateResult<Superposition> {
    move |c| Ok(Superposition::basis(c.flip(bit)))
}

/// Hadamard on bit `bit`: `|0> -> (|0> + |1>)/sqrt(2)` and `|1> -> (|0> - |1>)/sqrt(2)`.
pub fn hadamard(bit: usize) -> impl Fn(&ClassicalState) -> StateResult<Superposition> {
    move |c| {
        let sign = if c.bit(bit) { -1.0 } else { 1.0 };
        Superposition::new([
            (c.with_bit(bit, false), FRAC_1_SQRT_2),
            (c.with_bit(bit, true), sign * FRAC_1_SQRT_2),
        ])
    }
}

/// A `1/denominator` fraction of an X rotation on bit `bit`.
///
/// With `t = exp(i*pi/denominator)`, the bit keeps its value with amplitude `(1 + t)/2` and
/// flips with amplitude `(1 - t)/2`. Applying it `denominator` times is a full NOT.
pub fn partial_x_rotation(
    bit: usize,
    denominator: f64,
) -> impl Fn(&ClassicalState) -> StateResult<Superposition> {
    let t = Complex::new(0.0, PI / denominator).exp();
    let stay = (Complex::new(1.0, 0.0) + t) / 2.0;
    let flip = (Complex::new(1.0, 0.0) - t) / 2.0;
    move |c| {
        let (to_zero, to_one) = if c.bit(bit) { (flip, stay) } else { (stay, flip) };
        Superposition::new([(c.with_bit(bit, false), to_zero), (c.with_bit(bit, true), to_one)])
    }
}

/// Apply `op` only to states where every `(bit, value)` condition holds; others are unchanged.
pub fn controlled<F, I>(
    op: F,
    conditions: I,
) -> impl Fn(&ClassicalState) -> StateResult<Superposition>
where
    F: Fn(&ClassicalState) -> StateResult<Superposition>,
    I: IntoIterator<Item = (usize, bool)>,
{
    let conditions: Vec<_> = conditions.into_iter().collect();
    move |c| {
        if conditions.iter().all(|&(bit, value)| c.bit(bit) == value) {
            op(c)
        } else {
            Ok(Superposition::basis(c.clone()))
        }
    }
}

/// Predicate that bit `bit` equals `desired`.
pub fn bit_is(bit: usize, desired: bool) -> impl Fn(&ClassicalState) -> bool {
    move |c| c.bit(bit) == desired
}

#[cfg(test)]
mod ops_tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state(mask: u64) -> ClassicalState {
        ClassicalState::new(mask)
    }

    #[test]
    fn test_not() {
        let s = Superposition::basis(state(0b101));
        let s = s.unitary_transform(not(1)).unwrap();
        assert_eq!(s, Superposition::basis(state(0b111)));
    }

    #[test]
    fn test_hadamard_signs() {
        let s = hadamard(0)(&state(1)).unwrap();
        assert_relative_eq!(s.amplitude(&state(0)).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(s.amplitude(&state(1)).re, -FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_hadamard_layer_is_uniform() {
        let mut s = Superposition::basis(ClassicalState::zero());
        for i in 0..4 {
            s = s.unitary_transform(hadamard(i)).unwrap();
        }
        assert_eq!(s.len(), 16);
        for (_, amp) in s.iter() {
            assert_relative_eq!(amp.norm_sqr(), 1.0 / 16.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_partial_rotations_compose_to_not() {
        let n = 4;
        let mut s = Superposition::basis(state(0));
        for _ in 0..n {
            s = s.unitary_transform(partial_x_rotation(0, n as f64)).unwrap();
        }
        assert_relative_eq!(s.probability(&state(1)), 1.0, epsilon = 1e-9);
        assert!(!s.contains(&state(0)));
    }

    #[test]
    fn test_controlled() {
        let op = controlled(not(2), [(0, true), (1, false)]);
        assert_eq!(op(&state(0b001)).unwrap(), Superposition::basis(state(0b101)));
        assert_eq!(op(&state(0b011)).unwrap(), Superposition::basis(state(0b011)));
        assert_eq!(op(&state(0b000)).unwrap(), Superposition::basis(state(0b000)));
    }

    #[test]
    fn test_bit_is() {
        assert!(bit_is(2, true)(&state(0b100)));
        assert!(bit_is(1, false)(&state(0b100)));
        assert!(!bit_is(2, false)(&state(0b100)));
    }
}
