//! Standard normal density, distribution and quantile.
//!
//! Both tails go through `statrs`' complementary error function and its
//! inverse, so quantiles near 0 and 1 keep their relative accuracy. The
//! meshers rely on that when they cut grids at `N⁻¹(ε)`.

use ql_core::Real;
use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::SQRT_2;

const INV_SQRT_2PI: Real = 0.398_942_280_401_432_7;

/// `φ(x) = exp(-x²/2) / √(2π)`.
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// `Φ(x)`.
pub fn normal_cdf(x: Real) -> Real {
    0.5 * erfc(-x / SQRT_2)
}

/// `Φ⁻¹(p)`, infinite at `p = 0` and `p = 1`.
pub fn normal_cdf_inverse(p: Real) -> Real {
    if p <= 0.0 {
        Real::NEG_INFINITY
    } else if p >= 1.0 {
        Real::INFINITY
    } else {
        -SQRT_2 * erfc_inv(2.0 * p)
    }
}
