//! Categorical emission distribution over discrete symbols

use super::opdf::{Opdf, OpdfFactory};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Categorical distribution over symbols `0..n_symbols`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Categorical {
    probs: Array1<f64>,
}

impl Categorical {
    /// Create from an explicit probability table.
    pub fn new(probs: Array1<f64>) -> Self {
        Self { probs }
    }

    /// Uniform distribution over `n_symbols` symbols.
    pub fn uniform(n_symbols: usize) -> Self {
        Self {
            probs: Array1::from_elem(n_symbols, 1.0 / n_symbols as f64),
        }
    }

    /// Number of symbols in the support
    pub fn n_symbols(&self) -> usize {
        self.probs.len()
    }

    /// Probability table
    pub fn probs(&self) -> &Array1<f64> {
        &self.probs
    }
}

impl Opdf<usize> for Categorical {
    fn log_probability(&self, obs: &usize) -> f64 {
        if *obs < self.probs.len() {
            (self.probs[*obs] + 1e-300).ln()
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Maximum-likelihood fit: relative symbol frequencies over the
    /// members. Symbols outside the support are ignored.
    fn fit(&mut self, members: &[&usize]) {
        let mut counts: Array1<f64> = Array1::zeros(self.probs.len());
        for &&symbol in members {
            if symbol < counts.len() {
                counts[symbol] += 1.0;
            }
        }

        let total = counts.sum();
        if total > 0.0 {
            self.probs = counts / total;
        }
    }
}

/// Builds uniform categorical distributions over a fixed alphabet.
#[derive(Debug, Clone)]
pub struct CategoricalFactory {
    n_symbols: usize,
}

impl CategoricalFactory {
    pub fn new(n_symbols: usize) -> Self {
        Self { n_symbols }
    }
}

impl OpdfFactory for CategoricalFactory {
    type Opdf = Categorical;

    fn generate(&self) -> Categorical {
        Categorical::uniform(self.n_symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform() {
        let c = Categorical::uniform(4);
        for s in 0..4 {
            assert!((c.probability(&s) - 0.25).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fit_frequencies() {
        let symbols = [0usize, 0, 1, 0];
        let members: Vec<&usize> = symbols.iter().collect();

        let mut c = Categorical::uniform(3);
        c.fit(&members);

        assert!((c.probs()[0] - 0.75).abs() < 1e-9);
        assert!((c.probs()[1] - 0.25).abs() < 1e-9);
        assert!(c.probs()[2].abs() < 1e-9);
    }

    #[test]
    fn test_out_of_support() {
        let c = Categorical::uniform(2);
        assert_eq!(c.log_probability(&5), f64::NEG_INFINITY);
    }
}
