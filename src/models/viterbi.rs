//! Viterbi decoding

use super::hmm::Hmm;
use super::opdf::Opdf;
use ndarray::Array2;

/// Most likely state path for `sequence` under `hmm`, with its log
/// probability.
///
/// Runs in log space for numerical stability. Ties are broken toward the
/// lower state index (only a strict improvement replaces the incumbent),
/// so decoding is deterministic for a fixed model and sequence.
pub fn viterbi<O, D: Opdf<O>>(sequence: &[O], hmm: &Hmm<D>) -> (Vec<usize>, f64) {
    let t_len = sequence.len();
    let n = hmm.n_states();

    if t_len == 0 {
        return (vec![], 0.0);
    }

    let log_pi: Vec<f64> = (0..n).map(|i| (hmm.pi(i) + 1e-300).ln()).collect();
    let mut log_a = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            log_a[[i, j]] = (hmm.aij(i, j) + 1e-300).ln();
        }
    }

    // Delta: best path log probability ending in state j at time t
    let mut delta = Array2::zeros((t_len, n));
    // Psi: backpointers for path reconstruction
    let mut psi = vec![vec![0usize; n]; t_len];

    // Initialization (t = 0)
    for j in 0..n {
        delta[[0, j]] = log_pi[j] + hmm.opdf(j).log_probability(&sequence[0]);
    }

    // Recursion
    for t in 1..t_len {
        for j in 0..n {
            let mut best_val = f64::NEG_INFINITY;
            let mut best_state = 0;

            for i in 0..n {
                let val = delta[[t - 1, i]] + log_a[[i, j]];
                if val > best_val {
                    best_val = val;
                    best_state = i;
                }
            }

            delta[[t, j]] = best_val + hmm.opdf(j).log_probability(&sequence[t]);
            psi[t][j] = best_state;
        }
    }

    // Termination
    let mut best_final_state = 0;
    let mut best_final_prob = f64::NEG_INFINITY;
    for j in 0..n {
        if delta[[t_len - 1, j]] > best_final_prob {
            best_final_prob = delta[[t_len - 1, j]];
            best_final_state = j;
        }
    }

    // Backtracking
    let mut path = vec![0; t_len];
    path[t_len - 1] = best_final_state;
    for t in (0..t_len - 1).rev() {
        path[t] = psi[t + 1][path[t + 1]];
    }

    (path, best_final_prob)
}
