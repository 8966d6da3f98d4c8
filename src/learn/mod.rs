//! Segmental K-Means learner

mod segmental;

pub use segmental::SegmentalKMeans;
