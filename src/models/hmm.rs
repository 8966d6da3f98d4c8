//! HMM parameter snapshot

use super::opdf::OpdfFactory;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// One set of HMM parameters: initial-state distribution, transition
/// matrix, and per-state observation distributions.
///
/// A snapshot is plain data. The learner builds a fresh one on every
/// iteration and never touches a snapshot it has already returned, so
/// callers may share and read them freely.
///
/// Invariants on any snapshot the learner produces: `pi` sums to 1 and
/// every row of the transition matrix sums to 1, within floating
/// tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hmm<D> {
    pi: Array1<f64>,
    a: Array2<f64>,
    opdfs: Vec<D>,
}

impl<D> Hmm<D> {
    /// Uniform model over `n_states` states with factory-default
    /// distributions.
    pub fn uniform<F>(n_states: usize, factory: &F) -> Self
    where
        F: OpdfFactory<Opdf = D>,
    {
        Self {
            pi: Array1::from_elem(n_states, 1.0 / n_states as f64),
            a: Array2::from_elem((n_states, n_states), 1.0 / n_states as f64),
            opdfs: (0..n_states).map(|_| factory.generate()).collect(),
        }
    }

    /// Number of hidden states
    pub fn n_states(&self) -> usize {
        self.opdfs.len()
    }

    /// Initial probability of state `i`
    pub fn pi(&self, i: usize) -> f64 {
        self.pi[i]
    }

    pub fn set_pi(&mut self, i: usize, p: f64) {
        self.pi[i] = p;
    }

    /// Transition probability from state `i` to state `j`
    pub fn aij(&self, i: usize, j: usize) -> f64 {
        self.a[[i, j]]
    }

    pub fn set_aij(&mut self, i: usize, j: usize, p: f64) {
        self.a[[i, j]] = p;
    }

    /// Observation distribution of state `i`
    pub fn opdf(&self, i: usize) -> &D {
        &self.opdfs[i]
    }

    pub fn opdf_mut(&mut self, i: usize) -> &mut D {
        &mut self.opdfs[i]
    }

    pub fn set_opdf(&mut self, i: usize, opdf: D) {
        self.opdfs[i] = opdf;
    }

    /// The full initial-state distribution
    pub fn initial_probs(&self) -> &Array1<f64> {
        &self.pi
    }

    /// The full transition matrix
    pub fn transition_matrix(&self) -> &Array2<f64> {
        &self.a
    }
}
