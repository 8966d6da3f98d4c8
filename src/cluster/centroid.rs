//! Centroid capability for K-Means partitioning

use ndarray::Array1;

/// A cluster representative that can measure its distance to an
/// observation.
pub trait Centroid<O: ?Sized> {
    fn distance(&self, obs: &O) -> f64;
}

/// Observation types that can produce a centroid over a member set.
///
/// Deliberately independent of the emission capability ([`Opdf`]): an
/// observation type may support either without the other, and learners
/// require both through separate bounds.
///
/// [`Opdf`]: crate::models::Opdf
pub trait CentroidSource: Sized {
    type Centroid: Centroid<Self>;

    /// Centroid of a non-empty member set.
    fn centroid(members: &[&Self]) -> Self::Centroid;
}

impl Centroid<Array1<f64>> for Array1<f64> {
    /// Squared Euclidean distance
    fn distance(&self, obs: &Array1<f64>) -> f64 {
        self.iter()
            .zip(obs.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum()
    }
}

impl CentroidSource for Array1<f64> {
    type Centroid = Array1<f64>;

    fn centroid(members: &[&Self]) -> Array1<f64> {
        let mut mean = Array1::zeros(members[0].len());
        for member in members {
            mean += *member;
        }
        mean / members.len() as f64
    }
}

impl Centroid<usize> for f64 {
    fn distance(&self, obs: &usize) -> f64 {
        (*self - *obs as f64).powi(2)
    }
}

impl CentroidSource for usize {
    type Centroid = f64;

    fn centroid(members: &[&Self]) -> f64 {
        members.iter().map(|&&s| s as f64).sum::<f64>() / members.len() as f64
    }
}
