#![forbid(unsafe_code)]
#![deny(
    unreachable_pub,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    missing_docs
)]

//! A small simulator of discrete quantum states.
//!
//! States are built in three layers:
//! - [`ClassicalState`]: a definite bit-vector value.
//! - [`Superposition`]: a normalized linear combination of classical states with complex
//!   amplitudes (a pure state).
//! - [`Ensemble`]: a probability distribution over superpositions (a mixed state).
//!
//! All three are immutable values. Algorithms are written by repeatedly applying unitary
//! transforms (functions from a classical state to a superposition), measuring, and
//! post-selecting, then finally collapsing to sample an outcome.
//!
//! # Example
//! ```
//! use qip_mixed::prelude::*;
//!
//! # fn main() -> StateResult<()> {
//! // Start in |00>, put bit 0 into superposition and copy it onto bit 1.
//! let state = Ensemble::from(ClassicalState::zero());
//! let state = state.unitary_transform(hadamard(0))?;
//! let state = state.unitary_transform(controlled(not(1), [(0, true)]))?;
//!
//! // Keep only the branch where bit 0 is set.
//! let (p, state) = state.post_select(bit_is(0, true));
//! assert!((p - 0.5).abs() < 1e-9);
//!
//! // Every sample now has both bits set.
//! let sample = state.unwrap().collapsed();
//! assert_eq!(sample, ClassicalState::new(0b11));
//! # Ok(())
//! # }
//! ```

/// Bit-vector basis states.
pub mod classical;
/// Probability distributions over superpositions.
pub mod ensemble;
/// State construction error types.
pub mod errors;
pub mod ops;
/// Normalized linear combinations of classical states.
pub mod superposition;
/// Numeric tolerances for validation, pruning, and sampling.
pub mod tolerance;
mod utils;

pub use classical::ClassicalState;
pub use ensemble::Ensemble;
pub use num_complex::Complex;
pub use rand;
pub use superposition::Superposition;
pub use tolerance::Tolerance;

/// Commonly used types, traits, and operators.
/// ```
/// use qip_mixed::prelude::*;
/// ```
pub mod prelude {
    pub use super::*;
    pub use crate::errors::*;
    pub use crate::ops::*;
}
