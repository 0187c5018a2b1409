/// Largest allowed distance of a total probability from 1.
pub const DEFAULT_NORMALIZATION_TOLERANCE: f64 = 1e-5;
/// Amplitudes with a smaller magnitude are dropped from superpositions.
pub const DEFAULT_AMPLITUDE_CUTOFF: f64 = 1e-7;
/// Branches with a smaller probability are dropped from ensembles.
pub const DEFAULT_PROBABILITY_CUTOFF: f64 = 1e-6;
/// Remaining probability at which a collapse walk stops.
pub const DEFAULT_COLLAPSE_EPSILON: f64 = 1e-6;

/// Numeric tolerances used when validating, pruning, and sampling states.
///
/// Values derived from a state inherit its tolerance. Tolerances are not part of a state's
/// identity: two states with the same terms compare equal whatever their tolerance.
///
/// # Example
/// ```
/// use qip_mixed::prelude::*;
///
/// let strict = Tolerance::default().with_normalization(1e-12);
/// let s = Superposition::new_with_tolerance([(ClassicalState::zero(), 0.999999)], strict);
/// assert!(s.is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    /// Largest allowed distance of a total probability from 1.
    pub normalization: f64,
    /// Amplitudes with a smaller magnitude are dropped.
    pub amplitude_cutoff: f64,
    /// Ensemble branches with a smaller probability are dropped.
    pub probability_cutoff: f64,
    /// Remaining probability at which a collapse walk stops.
    ///
    /// Lets the walk absorb rounding drift, but also means a state whose cumulative
    /// probability lands within this distance of the draw can be picked one step early.
    pub collapse_epsilon: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            normalization: DEFAULT_NORMALIZATION_TOLERANCE,
            amplitude_cutoff: DEFAULT_AMPLITUDE_CUTOFF,
            probability_cutoff: DEFAULT_PROBABILITY_CUTOFF,
            collapse_epsilon: DEFAULT_COLLAPSE_EPSILON,
        }
    }
}

impl Tolerance {
    /// Set the normalization tolerance.
    pub fn with_normalization(mut self, normalization: f64) -> Self {
        self.normalization = normalization;
        self
    }

    /// Set the amplitude pruning cutoff.
    pub fn with_amplitude_cutoff(mut self, amplitude_cutoff: f64) -> Self {
        self.amplitude_cutoff = amplitude_cutoff;
        self
    }

    /// Set the branch probability pruning cutoff.
    pub fn with_probability_cutoff(mut self, probability_cutoff: f64) -> Self {
        self.probability_cutoff = probability_cutoff;
        self
    }

    /// Set the collapse walk stopping epsilon.
    pub fn with_collapse_epsilon(mut self, collapse_epsilon: f64) -> Self {
        self.collapse_epsilon = collapse_epsilon;
        self
    }

    /// Whether `total` counts as a probability of 1. NaN never does.
    pub fn is_normalized(&self, total: f64) -> bool {
        (1.0 - total).abs() <= self.normalization
    }
}
