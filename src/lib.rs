//! Segmental K-Means initialization for hidden Markov models
//!
//! Trains a discrete-state HMM from a corpus of unlabeled observation
//! sequences. A centroid K-Means pass gives every observation a
//! provisional state label, an HMM is fit to those labels, and Viterbi
//! decoding relabels the corpus; the loop repeats until a full pass
//! changes nothing. The result is a greedy local fit, typically used to
//! initialize further refinement.
//!
//! Observation types plug in through two independent capabilities:
//! [`cluster::CentroidSource`] for the initial partitioning and an
//! emission distribution implementing [`models::Opdf`]. Vector
//! observations with Gaussian emissions and discrete symbols with
//! categorical emissions ship in [`models`].

pub mod cluster;
pub mod data;
pub mod error;
pub mod learn;
pub mod models;

pub use cluster::{Centroid, CentroidSource, Clusters};
pub use data::Corpus;
pub use error::{LearnError, LearnResult};
pub use learn::SegmentalKMeans;
pub use models::{
    viterbi, Categorical, CategoricalFactory, GaussianFactory, Hmm, MultivariateGaussian, Opdf,
    OpdfFactory,
};
