//! Cluster membership store and K-Means initialization

mod centroid;
pub mod kmeans;
mod store;

pub use centroid::{Centroid, CentroidSource};
pub use store::Clusters;
