//! Cluster membership store

/// Bidirectional cluster membership: handle to cluster index, and cluster
/// index to member handles.
///
/// The forward map is a flat handle-indexed vector, so lookups are O(1)
/// and no hashing of observation values is involved. The member-sets are
/// kept in sync by [`migrate`](Clusters::migrate); together they always
/// partition the handle space (every handle in exactly one set).
#[derive(Debug, Clone)]
pub struct Clusters {
    assignment: Vec<usize>,
    members: Vec<Vec<usize>>,
}

impl Clusters {
    /// Build the store from an initial partition of handles `0..n`.
    ///
    /// The partition must cover every handle exactly once, which
    /// [`kmeans::partition`](super::kmeans::partition) guarantees.
    pub fn from_partition(partition: Vec<Vec<usize>>) -> Self {
        let n: usize = partition.iter().map(Vec::len).sum();
        let mut assignment = vec![usize::MAX; n];
        for (c, set) in partition.iter().enumerate() {
            for &handle in set {
                debug_assert_eq!(assignment[handle], usize::MAX, "duplicate handle");
                assignment[handle] = c;
            }
        }
        debug_assert!(assignment.iter().all(|&c| c != usize::MAX));

        Self {
            assignment,
            members: partition,
        }
    }

    /// Number of clusters
    pub fn n_clusters(&self) -> usize {
        self.members.len()
    }

    /// Number of registered observations
    pub fn n_observations(&self) -> usize {
        self.assignment.len()
    }

    /// Current cluster of `handle`.
    ///
    /// Panics on an unregistered handle; that is a logic defect in the
    /// caller (a sequence decoded that was never registered), not a
    /// recoverable condition.
    pub fn cluster_of(&self, handle: usize) -> usize {
        self.assignment[handle]
    }

    /// Member handles of one cluster; may be empty.
    pub fn members(&self, cluster: usize) -> &[usize] {
        &self.members[cluster]
    }

    /// Move `handle` into cluster `to`.
    ///
    /// The source cluster is derived from the current assignment and both
    /// maps are updated inside one `&mut` call, so the handle is never
    /// observable as belonging to no cluster.
    pub fn migrate(&mut self, handle: usize, to: usize) {
        let from = self.assignment[handle];
        if from == to {
            return;
        }

        let pos = self.members[from]
            .iter()
            .position(|&h| h == handle)
            .expect("member list out of sync with assignment");
        self.members[from].swap_remove(pos);
        self.members[to].push(handle);
        self.assignment[handle] = to;
    }
}
