//! Observation distribution traits

/// A per-state observation probability distribution.
pub trait Opdf<O>: Clone {
    /// Log density (or log mass) of one observation.
    fn log_probability(&self, obs: &O) -> f64;

    /// Density (or mass) of one observation.
    fn probability(&self, obs: &O) -> f64 {
        self.log_probability(obs).exp()
    }

    /// Re-estimate parameters by maximum likelihood over cluster members.
    ///
    /// `members` must be non-empty. The learner never calls `fit` on an
    /// empty cluster; it installs a fresh factory default instead.
    fn fit(&mut self, members: &[&O]);
}

/// Builds default distributions, used for states whose cluster is empty.
pub trait OpdfFactory {
    type Opdf;

    /// A fresh, uninformed distribution.
    fn generate(&self) -> Self::Opdf;
}
