//! Extended Ornstein-Uhlenbeck process with an exponential jump factor.
//!
//! ```text
//! ln S = X + Y
//! dX = a(b(t) − X) dt + σ dW
//! dY = −β Y dt + J dN,   J ~ Exp(η),  N Poisson with intensity λ
//! ```

use std::sync::Arc;

use crate::extended_ornstein_uhlenbeck_process::ExtendedOrnsteinUhlenbeckProcess;
use ql_core::{ensure, errors::Result, Real};

/// Two-factor spike model: a diffusive OU factor plus a mean-reverting
/// compound-Poisson jump factor.
#[derive(Debug, Clone)]
pub struct ExtOUWithJumpsProcess {
    ou: Arc<ExtendedOrnsteinUhlenbeckProcess>,
    y0: Real,
    beta: Real,
    jump_intensity: Real,
    eta: Real,
}

impl ExtOUWithJumpsProcess {
    /// * `y0` — initial jump factor
    /// * `beta` — jump-factor mean reversion
    /// * `jump_intensity` — Poisson intensity `λ`
    /// * `eta` — rate of the exponential jump size distribution
    pub fn new(
        ou: Arc<ExtendedOrnsteinUhlenbeckProcess>,
        y0: Real,
        beta: Real,
        jump_intensity: Real,
        eta: Real,
    ) -> Result<Self> {
        ensure!(beta > 0.0, "jump mean reversion must be positive, got {beta}");
        ensure!(
            jump_intensity >= 0.0,
            "jump intensity must be non-negative, got {jump_intensity}"
        );
        ensure!(eta > 0.0, "jump size rate must be positive, got {eta}");
        Ok(Self {
            ou,
            y0,
            beta,
            jump_intensity,
            eta,
        })
    }

    /// The diffusive factor.
    pub fn ext_ou_process(&self) -> &Arc<ExtendedOrnsteinUhlenbeckProcess> {
        &self.ou
    }

    /// Initial values `(x0, y0)`.
    pub fn initial_values(&self) -> [Real; 2] {
        use crate::stochastic_process::StochasticProcess1D;
        [self.ou.x0(), self.y0]
    }

    /// Jump-factor mean reversion `β`.
    pub fn beta(&self) -> Real {
        self.beta
    }

    /// Jump intensity `λ`.
    pub fn jump_intensity(&self) -> Real {
        self.jump_intensity
    }

    /// Rate `η` of the exponential jump sizes.
    pub fn eta(&self) -> Real {
        self.eta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extended_ornstein_uhlenbeck_process::Discretization;

    #[test]
    fn initial_values_combine_both_factors() {
        let ou = Arc::new(
            ExtendedOrnsteinUhlenbeckProcess::new(
                1.0,
                0.2,
                0.1,
                Arc::new(|_| 0.0),
                Discretization::MidPoint,
            )
            .unwrap(),
        );
        let p = ExtOUWithJumpsProcess::new(ou.clone(), 0.05, 5.0, 4.0, 8.0).unwrap();
        assert_eq!(p.initial_values(), [0.1, 0.05]);
        assert!(ExtOUWithJumpsProcess::new(ou, 0.0, 5.0, 4.0, 0.0).is_err());
    }
}
