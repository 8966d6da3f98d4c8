//! Centroid K-Means partitioning for the initial cluster assignment

use super::centroid::{Centroid, CentroidSource};
use crate::error::LearnError;
use rand::seq::SliceRandom;
use rand::Rng;

/// Assignment rounds before giving up on a stable partition.
const MAX_ROUNDS: usize = 100;

/// Partition `observations` into `k` member-sets of handles.
///
/// Centroids are seeded from `k` randomly chosen observations, then
/// assignment and centroid recomputation alternate until no observation
/// changes cluster. Every handle lands in exactly one member-set; sets may
/// be empty if a centroid loses all members.
pub fn partition<O, R>(
    k: usize,
    observations: &[O],
    rng: &mut R,
) -> Result<Vec<Vec<usize>>, LearnError>
where
    O: CentroidSource,
    R: Rng,
{
    if k == 0 {
        return Err(LearnError::InvalidStateCount(0));
    }
    if observations.len() < k {
        return Err(LearnError::TooFewObservations {
            requested: k,
            available: observations.len(),
        });
    }

    // Seed centroids from k distinct observations.
    let mut seed_order: Vec<usize> = (0..observations.len()).collect();
    seed_order.shuffle(rng);
    let mut centroids: Vec<O::Centroid> = seed_order[..k]
        .iter()
        .map(|&h| O::centroid(&[&observations[h]]))
        .collect();

    let mut assignment = vec![0usize; observations.len()];

    for round in 0..MAX_ROUNDS {
        // Assign each observation to its nearest centroid; ties go to the
        // lower cluster index.
        let mut changed = false;
        for (handle, obs) in observations.iter().enumerate() {
            let mut best = 0;
            let mut best_dist = f64::MAX;
            for (c, centroid) in centroids.iter().enumerate() {
                let dist = centroid.distance(obs);
                if dist < best_dist {
                    best_dist = dist;
                    best = c;
                }
            }
            if assignment[handle] != best {
                assignment[handle] = best;
                changed = true;
            }
        }

        if round > 0 && !changed {
            break;
        }

        // Recompute centroids. A cluster that lost all members keeps its
        // previous centroid.
        for c in 0..k {
            let members: Vec<&O> = observations
                .iter()
                .enumerate()
                .filter(|(handle, _)| assignment[*handle] == c)
                .map(|(_, obs)| obs)
                .collect();
            if !members.is_empty() {
                centroids[c] = O::centroid(&members);
            }
        }
    }

    let mut sets = vec![Vec::new(); k];
    for (handle, &c) in assignment.iter().enumerate() {
        sets[c].push(handle);
    }
    Ok(sets)
}
