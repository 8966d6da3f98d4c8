//! Multivariate Gaussian emission distribution

use super::opdf::{Opdf, OpdfFactory};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Diagonal regularization added to fitted covariances.
const COV_REGULARIZATION: f64 = 1e-6;

/// Multivariate Gaussian distribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultivariateGaussian {
    /// Mean vector
    pub mean: Array1<f64>,
    /// Covariance matrix
    pub covariance: Array2<f64>,
    /// Cached inverse of the covariance
    covariance_inv: Array2<f64>,
    /// Cached log determinant
    log_det: f64,
}

impl MultivariateGaussian {
    /// Create a Gaussian from mean and covariance.
    pub fn new(mean: Array1<f64>, covariance: Array2<f64>) -> Self {
        let mut gaussian = Self {
            mean,
            covariance,
            covariance_inv: Array2::zeros((0, 0)),
            log_det: 0.0,
        };
        gaussian.refresh_cache();
        gaussian
    }

    /// Standard Gaussian with identity covariance around `mean`.
    pub fn with_identity(mean: Array1<f64>) -> Self {
        let d = mean.len();
        Self::new(mean, Array2::eye(d))
    }

    /// Dimension of the distribution
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Recompute the cached inverse and log determinant.
    fn refresh_cache(&mut self) {
        let d = self.dim();

        // Diagonal approximation; adequate for the regularized covariances
        // this model produces.
        let mut inv = Array2::eye(d);
        let mut log_det = 0.0;
        for i in 0..d {
            let v = self.covariance[[i, i]];
            if v.abs() > 1e-10 {
                inv[[i, i]] = 1.0 / v;
            }
            log_det += v.ln();
        }

        self.covariance_inv = inv;
        self.log_det = log_det;
    }

    /// Log probability density at a point
    pub fn log_pdf(&self, x: &Array1<f64>) -> f64 {
        let d = self.dim();
        let diff = x - &self.mean;

        // Quadratic form: (x - mu)' * Sigma^-1 * (x - mu)
        let mut quad_form = 0.0;
        for i in 0..d {
            for j in 0..d {
                quad_form += diff[i] * self.covariance_inv[[i, j]] * diff[j];
            }
        }

        -0.5 * (d as f64 * (2.0 * PI).ln() + self.log_det + quad_form)
    }

    /// Probability density at a point
    pub fn pdf(&self, x: &Array1<f64>) -> f64 {
        self.log_pdf(x).exp()
    }
}

impl Opdf<Array1<f64>> for MultivariateGaussian {
    fn log_probability(&self, obs: &Array1<f64>) -> f64 {
        self.log_pdf(obs)
    }

    /// Maximum-likelihood fit: sample mean and regularized sample
    /// covariance over the members.
    fn fit(&mut self, members: &[&Array1<f64>]) {
        let n = members.len() as f64;
        let d = members[0].len();

        let mut mean = Array1::zeros(d);
        for obs in members {
            mean += *obs;
        }
        mean /= n;

        let mut covariance = Array2::zeros((d, d));
        for obs in members {
            let diff = *obs - &mean;
            for i in 0..d {
                for j in 0..d {
                    covariance[[i, j]] += diff[i] * diff[j];
                }
            }
        }
        covariance /= n;

        for i in 0..d {
            covariance[[i, i]] += COV_REGULARIZATION;
        }

        self.mean = mean;
        self.covariance = covariance;
        self.refresh_cache();
    }
}

/// Builds standard Gaussians of a fixed dimension.
#[derive(Debug, Clone)]
pub struct GaussianFactory {
    dim: usize,
}

impl GaussianFactory {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl OpdfFactory for GaussianFactory {
    type Opdf = MultivariateGaussian;

    fn generate(&self) -> MultivariateGaussian {
        MultivariateGaussian::with_identity(Array1::zeros(self.dim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_gaussian_creation() {
        let g = MultivariateGaussian::with_identity(array![0.0, 0.0]);
        assert_eq!(g.dim(), 2);
    }

    #[test]
    fn test_pdf_peaks_at_mean() {
        let mean = array![0.0, 0.0];
        let g = MultivariateGaussian::new(mean.clone(), Array2::eye(2));

        let at_mean = g.pdf(&mean);
        let away = g.pdf(&array![1.0, 1.0]);
        assert!(at_mean > away);
    }

    #[test]
    fn test_fit_recovers_mean() {
        let samples = [
            array![1.0, 2.0],
            array![1.5, 2.5],
            array![0.5, 1.5],
            array![1.0, 2.0],
        ];
        let members: Vec<&Array1<f64>> = samples.iter().collect();

        let mut g = GaussianFactory::new(2).generate();
        g.fit(&members);

        assert!((g.mean[0] - 1.0).abs() < 1e-9);
        assert!((g.mean[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_factory_default_is_standard() {
        let g = GaussianFactory::new(3).generate();
        assert_eq!(g.dim(), 3);
        assert_eq!(g.mean, Array1::zeros(3));
        assert_eq!(g.covariance, Array2::eye(3));
    }
}
