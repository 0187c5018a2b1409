use crate::errors::{StateError, StateResult};
use crate::superposition::Superposition;
use crate::tolerance::Tolerance;
use crate::utils::{canonical_bits, hash_one};
use crate::ClassicalState;
use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::{debug, trace};

/// A probability distribution over superpositions: a mixed quantum state.
///
/// Branches keep the order in which they were first seen. Branches with a probability below the
/// tolerance's `probability_cutoff` are dropped. Equality and hashing ignore branch order.
///
/// # Example
/// ```
/// use qip_mixed::prelude::*;
///
/// # fn main() -> StateResult<()> {
/// let (a, b) = (ClassicalState::new(0), ClassicalState::new(1));
/// let m = Ensemble::new([
///     (Superposition::basis(a), 0.25),
///     (Superposition::basis(b.clone()), 0.75),
/// ])?;
///
/// let (p, filtered) = m.post_select(|s| s.bit(0));
/// assert_eq!(p, 0.75);
/// assert_eq!(filtered, Some(Ensemble::from(b)));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Ensemble {
    branches: Vec<(Superposition, f64)>,
    tolerance: Tolerance,
}

impl Ensemble {
    /// Make an ensemble from `(superposition, probability)` pairs using the default tolerance.
    /// Probabilities given for the same superposition are added together.
    ///
    /// Fails unless the probabilities are nonnegative and sum to 1.
    pub fn new<I>(distribution: I) -> StateResult<Self>
    where
        I: IntoIterator<Item = (Superposition, f64)>,
    {
        Self::new_with_tolerance(distribution, Tolerance::default())
    }

    /// Make an ensemble with a given tolerance. See `new`.
    pub fn new_with_tolerance<I>(distribution: I, tolerance: Tolerance) -> StateResult<Self>
    where
        I: IntoIterator<Item = (Superposition, f64)>,
    {
        let branches: Vec<_> = distribution.into_iter().collect();
        let negative = branches
            .iter()
            .map(|(_, weight)| *weight)
            .find(|weight| weight.is_nan() || *weight < 0.0);
        if let Some(weight) = negative {
            return Err(StateError::NegativeProbability { weight });
        }
        let total: f64 = branches.iter().map(|(_, weight)| weight).sum();
        if !tolerance.is_normalized(total) {
            return Err(StateError::UnnormalizedProbabilities { total });
        }
        Ok(Self::from_branches(branches, tolerance))
    }

    /// A single superposition with probability 1.
    pub fn pure(superposition: Superposition) -> Self {
        let tolerance = superposition.tolerance();
        Self {
            branches: vec![(superposition, 1.0)],
            tolerance,
        }
    }

    /// Merge equal branches and prune negligible ones from weights known to be normalized.
    ///
    /// Every branch is brought under `tolerance` first.
    pub(crate) fn from_branches<I>(branches: I, tolerance: Tolerance) -> Self
    where
        I: IntoIterator<Item = (Superposition, f64)>,
    {
        let mut index: HashMap<Superposition, usize> = HashMap::new();
        let mut merged: Vec<(Superposition, f64)> = vec![];
        for (superposition, weight) in branches {
            let superposition = superposition.with_tolerance(tolerance);
            match index.get(&superposition) {
                Some(&i) => merged[i].1 += weight,
                None => {
                    index.insert(superposition.clone(), merged.len());
                    merged.push((superposition, weight));
                }
            }
        }

        let before = merged.len();
        merged.retain(|(_, weight)| *weight >= tolerance.probability_cutoff);
        if merged.len() < before {
            trace!(dropped = before - merged.len(), "pruned negligible branches");
        }
        Self {
            branches: merged,
            tolerance,
        }
    }

    /// Tolerance used for this state and everything derived from it.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Number of branches.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Whether there are no branches.
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Iterate over `(superposition, probability)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Superposition, f64)> + '_ {
        self.branches.iter().map(|(s, weight)| (s, *weight))
    }

    /// Probability of the branch `superposition`, zero if absent.
    pub fn weight(&self, superposition: &Superposition) -> f64 {
        self.branches
            .iter()
            .find(|(s, _)| s == superposition)
            .map_or(0.0, |(_, weight)| *weight)
    }

    /// Probability that a classical state drawn from this ensemble satisfies `predicate`.
    pub fn probability_of<F>(&self, mut predicate: F) -> f64
    where
        F: FnMut(&ClassicalState) -> bool,
    {
        self.branches
            .iter()
            .map(|(s, weight)| weight * s.probability_of(&mut predicate))
            .sum()
    }

    /// Post-select every branch on `predicate` and renormalize the surviving weights.
    ///
    /// Returns the total probability that `predicate` held along with the renormalized
    /// ensemble, or `(0, None)` if no classical state in any branch satisfies it.
    pub fn post_select<F>(&self, mut predicate: F) -> (f64, Option<Self>)
    where
        F: FnMut(&ClassicalState) -> bool,
    {
        let mut filtered = vec![];
        for (superposition, weight) in &self.branches {
            if let (p_hit, Some(survivor)) = superposition.post_select(&mut predicate) {
                let p = p_hit * weight;
                if p != 0.0 {
                    filtered.push((survivor, p));
                }
            }
        }
        let remaining: f64 = filtered.iter().map(|(_, p)| p).sum();
        if remaining == 0.0 {
            debug!(branches = self.branches.len(), "post-selection matched no branches");
            return (0.0, None);
        }
        let normalized = filtered
            .into_iter()
            .map(|(survivor, p)| (survivor, p / remaining));
        (remaining, Some(Self::from_branches(normalized, self.tolerance)))
    }

    /// Measure every branch with `classify`, weighting each result by its branch probability.
    ///
    /// Outcomes weighing less than the tolerance's `probability_cutoff` are pruned, so the
    /// remaining weights may sum to less than 1 and the result may even be empty. Collapsing
    /// such an ensemble panics.
    pub fn measure<K, F>(&self, mut classify: F) -> Self
    where
        K: Hash + Eq,
        F: FnMut(&ClassicalState) -> K,
    {
        let branches: Vec<_> = self
            .branches
            .iter()
            .flat_map(|(superposition, weight)| {
                superposition
                    .measure(&mut classify)
                    .branches
                    .into_iter()
                    .map(move |(outcome, p)| (outcome, p * weight))
            })
            .collect();
        Self::from_branches(branches, self.tolerance)
    }

    /// Apply the unitary `op` to every branch, keeping the weights.
    pub fn unitary_transform<F>(&self, mut op: F) -> StateResult<Self>
    where
        F: FnMut(&ClassicalState) -> StateResult<Superposition>,
    {
        let branches = self
            .branches
            .iter()
            .map(|(superposition, weight)| -> StateResult<_> {
                Ok((superposition.unitary_transform(&mut op)?, *weight))
            })
            .collect::<StateResult<Vec<_>>>()?;
        Ok(Self::from_branches(branches, self.tolerance))
    }

    /// Sample a classical state: first a branch by its probability, then a state within it.
    ///
    /// # Panics
    /// If the walk over the branches runs out before reaching the draw, which means the
    /// ensemble was not normalized.
    pub fn collapsed_with<R: Rng + ?Sized>(&self, rng: &mut R) -> ClassicalState {
        let mut t: f64 = rng.gen();
        for (superposition, weight) in &self.branches {
            t -= weight;
            if t <= self.tolerance.collapse_epsilon {
                return superposition.collapsed_with(rng);
            }
        }
        panic!("Probabilities didn't sum to 1.")
    }

    /// Sample a classical state using the thread-local random number generator.
    pub fn collapsed(&self) -> ClassicalState {
        self.collapsed_with(&mut rand::thread_rng())
    }
}

impl From<Superposition> for Ensemble {
    fn from(superposition: Superposition) -> Self {
        Self::pure(superposition)
    }
}

impl From<ClassicalState> for Ensemble {
    fn from(state: ClassicalState) -> Self {
        Self::pure(Superposition::basis(state))
    }
}

impl PartialEq for Ensemble {
    fn eq(&self, other: &Self) -> bool {
        self.branches.len() == other.branches.len()
            && self.branches.iter().all(|(superposition, weight)| {
                other
                    .branches
                    .iter()
                    .any(|(s, w)| s == superposition && w == weight)
            })
    }
}

impl Eq for Ensemble {}

impl Hash for Ensemble {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let combined = self
            .branches
            .iter()
            .map(|(superposition, weight)| hash_one(&(superposition, canonical_bits(*weight))))
            .fold(0u64, u64::wrapping_add);
        state.write_usize(self.branches.len());
        state.write_u64(combined);
    }
}

impl fmt::Display for Ensemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (superposition, weight)) in self.branches.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{:.1}%: {}", weight * 100.0, superposition)?;
        }
        Ok(())
    }
}
