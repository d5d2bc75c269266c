//! Probability distributions.
//!
//! The standard normal drives the log-spot mesher bounds; the non-central
//! chi-square drives the variance mesher and the gamma law is the stationary
//! density of the square-root process.

pub mod chi_square;
pub mod gamma;
pub mod normal;

pub use chi_square::{ChiSquareDistribution, NonCentralChiSquareDistribution};
pub use gamma::GammaDistribution;
pub use normal::{normal_cdf, normal_cdf_inverse, normal_pdf};
