//! HMM snapshot, emission distributions, and Viterbi decoding

mod categorical;
mod gaussian;
mod hmm;
mod opdf;
mod viterbi;

pub use categorical::{Categorical, CategoricalFactory};
pub use gaussian::{GaussianFactory, MultivariateGaussian};
pub use hmm::Hmm;
pub use opdf::{Opdf, OpdfFactory};
pub use viterbi::viterbi;
