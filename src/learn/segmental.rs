//! Segmental K-Means HMM learner
//!
//! Estimates HMM parameters from unlabeled sequences by alternating hard
//! cluster labeling with Viterbi relabeling: fit a snapshot to the current
//! cluster assignment, decode every sequence under it, migrate every
//! observation whose decoded state disagrees with its cluster, and repeat
//! until a full pass migrates nothing. A local, greedy heuristic; useful
//! as initialization, with no global-optimality claim.

use crate::cluster::{kmeans, CentroidSource, Clusters};
use crate::data::Corpus;
use crate::error::LearnError;
use crate::models::{viterbi, Hmm, Opdf, OpdfFactory};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Segmental K-Means learner over a borrowed corpus.
///
/// The learner owns the cluster assignment exclusively for its whole
/// lifetime; snapshots it returns are independent data and stay valid
/// after further iterations. There is no reset: once terminated, the
/// learner only re-confirms its fixed point.
#[derive(Debug)]
pub struct SegmentalKMeans<'a, O, F>
where
    O: CentroidSource,
    F: OpdfFactory,
    F::Opdf: Opdf<O>,
{
    corpus: &'a Corpus<O>,
    factory: F,
    n_states: usize,
    clusters: Clusters,
    terminated: bool,
    iterations: usize,
    max_iterations: Option<usize>,
}

impl<'a, O, F> SegmentalKMeans<'a, O, F>
where
    O: CentroidSource,
    F: OpdfFactory,
    F::Opdf: Opdf<O>,
{
    /// Build a learner with a randomly seeded initial partition.
    ///
    /// Fails if `n_states` is zero, the corpus has no sequences, or the
    /// K-Means initializer cannot seed `n_states` clusters.
    pub fn new(n_states: usize, factory: F, corpus: &'a Corpus<O>) -> Result<Self, LearnError> {
        Self::with_rng(n_states, factory, corpus, &mut rand::thread_rng())
    }

    /// Build a learner with a deterministic initial partition.
    pub fn seeded(
        n_states: usize,
        factory: F,
        corpus: &'a Corpus<O>,
        seed: u64,
    ) -> Result<Self, LearnError> {
        Self::with_rng(n_states, factory, corpus, &mut StdRng::seed_from_u64(seed))
    }

    fn with_rng<R: Rng>(
        n_states: usize,
        factory: F,
        corpus: &'a Corpus<O>,
        rng: &mut R,
    ) -> Result<Self, LearnError> {
        if n_states == 0 {
            return Err(LearnError::InvalidStateCount(0));
        }
        if corpus.is_empty() {
            return Err(LearnError::NoSequences);
        }

        let partition = kmeans::partition(n_states, corpus.observations(), rng)?;

        Ok(Self {
            corpus,
            factory,
            n_states,
            clusters: Clusters::from_partition(partition),
            terminated: false,
            iterations: 0,
            max_iterations: None,
        })
    }

    /// Cap the number of [`learn`](Self::learn) iterations.
    ///
    /// The base algorithm is unbounded and not guaranteed to terminate for
    /// every centroid and distance choice; the default stays unbounded to
    /// match that behavior.
    pub fn with_max_iterations(mut self, cap: usize) -> Self {
        self.max_iterations = Some(cap);
        self
    }

    /// Number of hidden states
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// True once a full realignment pass migrated nothing
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Completed `iterate` passes
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Current cluster assignment
    pub fn clusters(&self) -> &Clusters {
        &self.clusters
    }

    /// One refinement pass: fit a fresh snapshot to the current labels,
    /// then relabel the corpus by Viterbi decoding under that snapshot.
    ///
    /// Returns the snapshot the relabeling was decoded against.
    pub fn iterate(&mut self) -> Hmm<F::Opdf> {
        let mut hmm = Hmm::uniform(self.n_states, &self.factory);

        self.learn_pi(&mut hmm);
        self.learn_transitions(&mut hmm);
        self.learn_opdfs(&mut hmm);

        self.terminated = self.realign(&hmm);
        self.iterations += 1;

        hmm
    }

    /// Iterate until a pass migrates nothing, then return the last
    /// snapshot produced.
    pub fn learn(&mut self) -> Hmm<F::Opdf> {
        let mut hmm = self.iterate();

        while !self.terminated {
            if let Some(cap) = self.max_iterations {
                if self.iterations >= cap {
                    tracing::warn!(cap, "stopping before a fixed point: iteration cap reached");
                    break;
                }
            }
            hmm = self.iterate();
        }

        tracing::info!(
            iterations = self.iterations,
            terminated = self.terminated,
            "segmental K-Means finished"
        );
        hmm
    }

    /// Initial-state distribution: relative frequency of each cluster
    /// among the first observations of all sequences.
    fn learn_pi(&self, hmm: &mut Hmm<F::Opdf>) {
        let mut counts = vec![0.0; self.n_states];
        for s in 0..self.corpus.n_sequences() {
            let first = self.corpus.handles(s).start;
            counts[self.clusters.cluster_of(first)] += 1.0;
        }

        for (i, count) in counts.iter().enumerate() {
            hmm.set_pi(i, count / self.corpus.n_sequences() as f64);
        }
    }

    /// Transition matrix: normalized counts of consecutive cluster pairs.
    fn learn_transitions(&self, hmm: &mut Hmm<F::Opdf>) {
        let n = self.n_states;
        for i in 0..n {
            for j in 0..n {
                hmm.set_aij(i, j, 0.0);
            }
        }

        for s in 0..self.corpus.n_sequences() {
            let handles = self.corpus.handles(s);
            let mut prev = self.clusters.cluster_of(handles.start);
            for h in handles.start + 1..handles.end {
                let next = self.clusters.cluster_of(h);
                hmm.set_aij(prev, next, hmm.aij(prev, next) + 1.0);
                prev = next;
            }
        }

        for i in 0..n {
            let row_sum: f64 = (0..n).map(|j| hmm.aij(i, j)).sum();
            if row_sum == 0.0 {
                // State never left under the current labeling: fall back
                // to a uniform row instead of leaving it undefined.
                for j in 0..n {
                    hmm.set_aij(i, j, 1.0 / n as f64);
                }
            } else {
                for j in 0..n {
                    hmm.set_aij(i, j, hmm.aij(i, j) / row_sum);
                }
            }
        }
    }

    /// Observation distributions: maximum-likelihood fit per cluster; an
    /// empty cluster keeps its state alive with a fresh factory default.
    fn learn_opdfs(&self, hmm: &mut Hmm<F::Opdf>) {
        for i in 0..self.n_states {
            let members: Vec<&O> = self
                .clusters
                .members(i)
                .iter()
                .map(|&h| self.corpus.observation(h))
                .collect();

            if members.is_empty() {
                hmm.set_opdf(i, self.factory.generate());
            } else {
                hmm.opdf_mut(i).fit(&members);
            }
        }
    }

    /// Decode every sequence under `hmm` and migrate each observation
    /// whose decoded state disagrees with its cluster. Returns true when
    /// the pass migrated nothing (fixed point reached).
    fn realign(&mut self, hmm: &Hmm<F::Opdf>) -> bool {
        let mut migrations = 0usize;

        for s in 0..self.corpus.n_sequences() {
            let (path, _) = viterbi(self.corpus.sequence(s), hmm);

            for (offset, &state) in path.iter().enumerate() {
                let handle = self.corpus.handles(s).start + offset;
                if self.clusters.cluster_of(handle) != state {
                    self.clusters.migrate(handle, state);
                    migrations += 1;
                }
            }
        }

        tracing::debug!(migrations, "realignment pass complete");
        migrations == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoricalFactory, GaussianFactory};
    use ndarray::{array, Array1};

    const TOL: f64 = 1e-9;

    fn separated_corpus() -> Corpus<Array1<f64>> {
        Corpus::from_sequences(vec![
            vec![array![0.1], array![0.2], array![3.0], array![3.1]],
            vec![array![0.0], array![0.3], array![2.9], array![3.2]],
        ])
        .unwrap()
    }

    fn assert_stochastic(hmm: &Hmm<impl Clone>, n: usize) {
        let pi_sum: f64 = (0..n).map(|i| hmm.pi(i)).sum();
        assert!((pi_sum - 1.0).abs() < TOL, "pi sums to {}", pi_sum);

        for i in 0..n {
            let row_sum: f64 = (0..n).map(|j| hmm.aij(i, j)).sum();
            assert!((row_sum - 1.0).abs() < TOL, "row {} sums to {}", i, row_sum);
        }
    }

    #[test]
    fn test_rejects_empty_corpus() {
        let corpus: Corpus<Array1<f64>> = Corpus::new();
        let err = SegmentalKMeans::seeded(2, GaussianFactory::new(1), &corpus, 0).unwrap_err();
        assert!(matches!(err, LearnError::NoSequences));
    }

    #[test]
    fn test_rejects_zero_states() {
        let corpus = separated_corpus();
        let err = SegmentalKMeans::seeded(0, GaussianFactory::new(1), &corpus, 0).unwrap_err();
        assert!(matches!(err, LearnError::InvalidStateCount(0)));
    }

    #[test]
    fn test_snapshot_is_stochastic() {
        let corpus = separated_corpus();
        let mut learner = SegmentalKMeans::seeded(2, GaussianFactory::new(1), &corpus, 42).unwrap();

        let hmm = learner.iterate();
        assert_stochastic(&hmm, 2);
    }

    #[test]
    fn test_initial_partition_covers_corpus() {
        let corpus = separated_corpus();
        let learner = SegmentalKMeans::seeded(2, GaussianFactory::new(1), &corpus, 42).unwrap();

        let clusters = learner.clusters();
        let mut seen: Vec<usize> = (0..clusters.n_clusters())
            .flat_map(|c| clusters.members(c).iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..corpus.n_observations()).collect::<Vec<_>>());
    }

    #[test]
    fn test_transition_free_states_get_uniform_rows() {
        // Length-1 sequences only: no transitions exist anywhere, so every
        // row falls back to uniform.
        let corpus = Corpus::from_sequences(vec![vec![0usize], vec![5usize]]).unwrap();
        let mut learner =
            SegmentalKMeans::seeded(2, CategoricalFactory::new(6), &corpus, 3).unwrap();

        let hmm = learner.iterate();
        for i in 0..2 {
            for j in 0..2 {
                assert!((hmm.aij(i, j) - 0.5).abs() < TOL);
            }
        }
    }

    #[test]
    fn test_empty_cluster_gets_fresh_default_opdf() {
        // Identical observations: K-Means ties put everything in cluster 0
        // and cluster 1 stays empty, so its opdf must be the factory
        // default rather than a fit to stale data.
        let corpus = Corpus::from_sequences(vec![vec![0usize, 0, 0, 0]]).unwrap();
        let mut learner =
            SegmentalKMeans::seeded(2, CategoricalFactory::new(2), &corpus, 11).unwrap();

        let hmm = learner.iterate();

        let (empty, full) = if learner.clusters().members(0).is_empty() {
            (0, 1)
        } else {
            (1, 0)
        };
        assert!(learner.clusters().members(empty).is_empty());

        // Fitted cluster concentrates on symbol 0; empty cluster is
        // uniform.
        assert!((hmm.opdf(full).probability(&0) - 1.0).abs() < TOL);
        assert!((hmm.opdf(empty).probability(&0) - 0.5).abs() < TOL);
        assert!((hmm.opdf(empty).probability(&1) - 0.5).abs() < TOL);
    }

    #[test]
    fn test_fixed_point_is_stable() {
        let corpus = separated_corpus();
        let mut learner = SegmentalKMeans::seeded(2, GaussianFactory::new(1), &corpus, 42).unwrap();

        learner.learn();
        assert!(learner.is_terminated());

        // A further pass must migrate nothing and stay terminated.
        let before: Vec<usize> = (0..corpus.n_observations())
            .map(|h| learner.clusters().cluster_of(h))
            .collect();
        learner.iterate();
        assert!(learner.is_terminated());
        let after: Vec<usize> = (0..corpus.n_observations())
            .map(|h| learner.clusters().cluster_of(h))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_learn_converges_on_separated_data() {
        let corpus = separated_corpus();
        let mut learner = SegmentalKMeans::seeded(2, GaussianFactory::new(1), &corpus, 42).unwrap();

        let hmm = learner.learn();

        assert!(learner.is_terminated());
        assert!(learner.iterations() <= 2, "took {}", learner.iterations());
        assert_stochastic(&hmm, 2);

        // Both sequences start in the same (low-valued) cluster, so pi is
        // concentrated on one state.
        let first = learner.clusters().cluster_of(0);
        assert!((hmm.pi(first) - 1.0).abs() < TOL);

        // Positions with near-identical values share a state.
        let clusters = learner.clusters();
        assert_eq!(clusters.cluster_of(0), clusters.cluster_of(4));
        assert_eq!(clusters.cluster_of(2), clusters.cluster_of(6));
        assert_ne!(clusters.cluster_of(0), clusters.cluster_of(2));
    }

    #[test]
    fn test_iteration_cap_stops_learn() {
        let corpus = separated_corpus();
        let mut learner = SegmentalKMeans::seeded(2, GaussianFactory::new(1), &corpus, 42)
            .unwrap()
            .with_max_iterations(1);

        learner.learn();
        assert_eq!(learner.iterations(), 1);
    }
}
