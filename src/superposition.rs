use crate::ensemble::Ensemble;
use crate::errors::{StateError, StateResult};
use crate::tolerance::Tolerance;
use crate::utils::{consolidate_vec, hash_complex};
use crate::{ClassicalState, Complex};
use num_traits::{One, Zero};
use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::{debug, trace};

/// A normalized linear combination of classical states: a pure quantum state.
///
/// Terms are kept sorted by classical state with no duplicates, and amplitudes smaller than the
/// tolerance's `amplitude_cutoff` are dropped. Equality and hashing are structural.
///
/// # Example
/// ```
/// use qip_mixed::prelude::*;
///
/// # fn main() -> StateResult<()> {
/// let (b, c) = (ClassicalState::new(1), ClassicalState::new(2));
/// let r = Superposition::new([(c.clone(), 0.8), (b.clone(), 0.6)])?;
///
/// let (p, filtered) = r.post_select(|s| s.bit(0));
/// assert!((p - 0.36).abs() < 1e-12);
/// assert_eq!(filtered, Some(Superposition::basis(b)));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Superposition {
    terms: Vec<(ClassicalState, Complex<f64>)>,
    tolerance: Tolerance,
}

impl Superposition {
    /// Make a superposition from `(state, amplitude)` pairs using the default tolerance.
    /// Amplitudes given for the same state are added together.
    ///
    /// Fails unless the squared magnitudes sum to 1.
    pub fn new<I, A>(amplitudes: I) -> StateResult<Self>
    where
        I: IntoIterator<Item = (ClassicalState, A)>,
        A: Into<Complex<f64>>,
    {
        Self::new_with_tolerance(amplitudes, Tolerance::default())
    }

    /// Make a superposition with a given tolerance. See `new`.
    pub fn new_with_tolerance<I, A>(amplitudes: I, tolerance: Tolerance) -> StateResult<Self>
    where
        I: IntoIterator<Item = (ClassicalState, A)>,
        A: Into<Complex<f64>>,
    {
        let terms = consolidate_vec(
            amplitudes
                .into_iter()
                .map(|(state, amp)| (state, amp.into()))
                .collect(),
        );
        Self::from_consolidated(terms, tolerance)
    }

    /// The single classical state `state` with amplitude 1.
    pub fn basis(state: ClassicalState) -> Self {
        Self {
            terms: vec![(state, Complex::one())],
            tolerance: Tolerance::default(),
        }
    }

    /// Validate and prune sorted, duplicate-free terms.
    fn from_consolidated(
        terms: Vec<(ClassicalState, Complex<f64>)>,
        tolerance: Tolerance,
    ) -> StateResult<Self> {
        let total: f64 = terms.iter().map(|(_, amp)| amp.norm_sqr()).sum();
        if !tolerance.is_normalized(total) {
            return Err(StateError::UnnormalizedAmplitudes { total });
        }
        Ok(Self::pruned(terms, tolerance))
    }

    /// Drop negligible amplitudes from terms already known to be normalized.
    fn pruned(terms: Vec<(ClassicalState, Complex<f64>)>, tolerance: Tolerance) -> Self {
        let before = terms.len();
        let terms: Vec<_> = terms
            .into_iter()
            .filter(|(_, amp)| amp.norm() >= tolerance.amplitude_cutoff)
            .collect();
        if terms.len() < before {
            trace!(dropped = before - terms.len(), "pruned negligible amplitudes");
        }
        Self { terms, tolerance }
    }

    /// Keep the terms in `kept`, whose squared magnitudes sum to `p`, rescaled to sum to 1.
    fn renormalized(
        kept: Vec<(ClassicalState, Complex<f64>)>,
        p: f64,
        tolerance: Tolerance,
    ) -> Self {
        let d = p.sqrt();
        let terms = kept.into_iter().map(|(state, amp)| (state, amp / d)).collect();
        Self::pruned(terms, tolerance)
    }

    /// Tolerance used for this state and everything derived from it.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// The same state governed by `tolerance`, dropping amplitudes below its cutoff.
    pub fn with_tolerance(self, tolerance: Tolerance) -> Self {
        Self::pruned(self.terms, tolerance)
    }

    /// Number of classical states with a nonzero amplitude.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether no classical state has a nonzero amplitude.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate over `(state, amplitude)` pairs in increasing order of state.
    pub fn iter(&self) -> impl Iterator<Item = (&ClassicalState, Complex<f64>)> + '_ {
        self.terms.iter().map(|(state, amp)| (state, *amp))
    }

    /// Iterate over the classical states in increasing order.
    pub fn states(&self) -> impl Iterator<Item = &ClassicalState> + '_ {
        self.terms.iter().map(|(state, _)| state)
    }

    /// Whether `state` has a nonzero amplitude.
    pub fn contains(&self, state: &ClassicalState) -> bool {
        self.find(state).is_some()
    }

    fn find(&self, state: &ClassicalState) -> Option<usize> {
        self.terms.binary_search_by(|(s, _)| s.cmp(state)).ok()
    }

    /// Amplitude of `state`, zero if absent.
    pub fn amplitude(&self, state: &ClassicalState) -> Complex<f64> {
        self.find(state)
            .map_or(Complex::zero(), |i| self.terms[i].1)
    }

    /// Probability of observing `state`.
    pub fn probability(&self, state: &ClassicalState) -> f64 {
        self.amplitude(state).norm_sqr()
    }

    /// Total probability of the states satisfying `predicate`.
    pub fn probability_of<F>(&self, mut predicate: F) -> f64
    where
        F: FnMut(&ClassicalState) -> bool,
    {
        self.terms
            .iter()
            .filter(|(state, _)| predicate(state))
            .map(|(_, amp)| amp.norm_sqr())
            .sum()
    }

    /// Discard the states failing `predicate` and renormalize the rest.
    ///
    /// Returns the probability that `predicate` held along with the renormalized superposition,
    /// or `(0, None)` if no state satisfies it.
    pub fn post_select<F>(&self, mut predicate: F) -> (f64, Option<Self>)
    where
        F: FnMut(&ClassicalState) -> bool,
    {
        let kept: Vec<_> = self
            .terms
            .iter()
            .filter(|(state, _)| predicate(state))
            .cloned()
            .collect();
        let p: f64 = kept.iter().map(|(_, amp)| amp.norm_sqr()).sum();
        if p == 0.0 {
            debug!(terms = self.terms.len(), "post-selection matched no states");
            return (0.0, None);
        }
        (p, Some(Self::renormalized(kept, p, self.tolerance)))
    }

    /// Split into branches by the result of `classify`, each weighted by its probability.
    ///
    /// Equivalent to post-selecting on `classify(state) == key` for every key produced.
    ///
    /// Branches below the tolerance's `probability_cutoff` are dropped like in any ensemble, so
    /// a classifier splitting the state into many tiny branches can leave weights summing to
    /// less than 1, or no branches at all.
    pub fn measure<K, F>(&self, mut classify: F) -> Ensemble
    where
        K: Hash + Eq,
        F: FnMut(&ClassicalState) -> K,
    {
        let mut keys: HashMap<K, usize> = HashMap::new();
        let mut groups: Vec<Vec<(ClassicalState, Complex<f64>)>> = vec![];
        for (state, amp) in &self.terms {
            let index = *keys.entry(classify(state)).or_insert_with(|| {
                groups.push(vec![]);
                groups.len() - 1
            });
            groups[index].push((state.clone(), *amp));
        }
        debug!(branches = groups.len(), "measured superposition");

        let tolerance = self.tolerance;
        let branches = groups.into_iter().map(|kept| {
            let p: f64 = kept.iter().map(|(_, amp)| amp.norm_sqr()).sum();
            (Self::renormalized(kept, p, tolerance), p)
        });
        Ensemble::from_branches(branches, tolerance)
    }

    /// Apply `op` to every classical state and interfere the results.
    ///
    /// Each input state maps to the superposition `op(state)`, scaled by its amplitude. Outputs
    /// reached from several inputs have their amplitudes summed. `op` must be unitary; if the
    /// interfered result is not normalized this returns an error.
    pub fn unitary_transform<F>(&self, mut op: F) -> StateResult<Self>
    where
        F: FnMut(&ClassicalState) -> StateResult<Superposition>,
    {
        let mut outputs = vec![];
        for (input, input_amp) in &self.terms {
            let image = op(input)?;
            outputs.extend(
                image
                    .terms
                    .into_iter()
                    .map(|(output, output_amp)| (output, output_amp * input_amp)),
            );
        }
        let interfered = consolidate_vec(outputs);
        trace!(
            inputs = self.terms.len(),
            outputs = interfered.len(),
            "interfered unitary outputs"
        );
        Self::from_consolidated(interfered, self.tolerance)
    }

    /// Sample a classical state with probability given by its squared amplitude, using `rng`.
    ///
    /// # Panics
    /// If the walk over the terms runs out before reaching the draw, which means the state was
    /// not normalized.
    pub fn collapsed_with<R: Rng + ?Sized>(&self, rng: &mut R) -> ClassicalState {
        let mut t: f64 = rng.gen();
        for (state, amp) in &self.terms {
            t -= amp.norm_sqr();
            if t <= self.tolerance.collapse_epsilon {
                return state.clone();
            }
        }
        panic!("Squared magnitudes didn't sum to 1.")
    }

    /// Sample a classical state using the thread-local random number generator.
    pub fn collapsed(&self) -> ClassicalState {
        self.collapsed_with(&mut rand::thread_rng())
    }
}

impl From<ClassicalState> for Superposition {
    fn from(state: ClassicalState) -> Self {
        Self::basis(state)
    }
}

impl PartialEq for Superposition {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

impl Eq for Superposition {}

impl Hash for Superposition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.terms.len());
        for (classical, amp) in &self.terms {
            classical.hash(state);
            hash_complex(amp, state);
        }
    }
}

impl fmt::Display for Superposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (state, amp)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "({:.3})*{}", amp, state)?;
        }
        Ok(())
    }
}
