use thiserror::Error;

/// An error from constructing a state whose weights are not a valid distribution.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StateError {
    /// The squared magnitudes of a superposition's amplitudes did not sum to 1.
    #[error("squared magnitudes must sum to 1, got {total}")]
    UnnormalizedAmplitudes {
        /// Sum of the squared magnitudes that were supplied.
        total: f64,
    },
    /// The branch probabilities of an ensemble did not sum to 1.
    #[error("probabilities must sum to 1, got {total}")]
    UnnormalizedProbabilities {
        /// Sum of the probabilities that were supplied.
        total: f64,
    },
    /// An ensemble branch was given a negative (or NaN) probability.
    #[error("probabilities must be nonnegative, got {weight}")]
    NegativeProbability {
        /// The offending probability.
        weight: f64,
    },
}

/// A result which may contain a state error.
pub type StateResult<T> = Result<T, StateError>;
