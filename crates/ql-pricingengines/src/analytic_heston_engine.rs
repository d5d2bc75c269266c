//! Semi-analytic Heston engine.
//!
//! Prices European options under the Heston stochastic volatility model by
//! Fourier inversion of the characteristic function. The finite-difference
//! Heston engines are validated against it.

use std::f64::consts::PI;
use std::sync::Arc;

use num_complex::Complex64;
use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use ql_instruments::{
    ExerciseType, OptionType, PricingEngine, PricingResults, VanillaOptionArguments,
};
use ql_math::integrals::{GaussLobattoIntegral, Integrator};
use ql_processes::HestonProcess;

/// Semi-analytic Heston pricing engine.
///
/// The Heston model assumes the variance follows a CIR process:
///
/// $$dS = (r-q) S \, dt + \sqrt{v} S \, dW_1$$
/// $$dv = \kappa(\theta - v) \, dt + \sigma_v \sqrt{v} \, dW_2$$
/// $$dW_1 dW_2 = \rho \, dt$$
///
/// The call price is $C = S e^{-qT} P_1 - K e^{-rT} P_2$ where $P_1, P_2$
/// are computed from the characteristic function by adaptive Gauss-Lobatto
/// integration on a truncated frequency range.
#[derive(Debug)]
pub struct AnalyticHestonEngine {
    process: Arc<HestonProcess>,
    accuracy: Real,
    max_evaluations: usize,
}

impl AnalyticHestonEngine {
    /// Create a new Heston engine for the given process.
    pub fn new(process: Arc<HestonProcess>) -> Self {
        Self {
            process,
            accuracy: 1e-10,
            max_evaluations: 100_000,
        }
    }

    /// Set the absolute accuracy and evaluation budget of the integration.
    pub fn with_integration(mut self, accuracy: Real, max_evaluations: usize) -> Self {
        self.accuracy = accuracy;
        self.max_evaluations = max_evaluations;
        self
    }
}

/// Model parameters of one pricing call.
#[derive(Debug, Clone, Copy)]
struct HestonParams {
    t: Time,
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
}

impl HestonParams {
    /// Forward characteristic function of the log-price for probability
    /// `P_j`, without the drift term; "little trap" formulation of
    /// Albrecher et al., which stays on the principal branch of the log.
    fn char_func(&self, phi: Real, j: usize) -> Complex64 {
        let (u, b) = if j == 1 {
            (0.5, self.kappa - self.rho * self.sigma)
        } else {
            (-0.5, self.kappa)
        };
        let i = Complex64::i();
        let sigma2 = self.sigma * self.sigma;

        let c = Complex64::new(b, -self.rho * self.sigma * phi);
        let d = (c * c - sigma2 * (2.0 * u * i * phi - phi * phi)).sqrt();
        let g = (c - d) / (c + d);
        let e = (-d * self.t).exp();

        let big_d = (c - d) / sigma2 * (1.0 - e) / (1.0 - g * e);
        let big_c = self.kappa * self.theta / sigma2
            * ((c - d) * self.t - 2.0 * ((1.0 - g * e) / (1.0 - g)).ln());

        (big_c + big_d * self.v0).exp()
    }

    /// Frequency beyond which both characteristic functions are negligible.
    fn upper_limit(&self) -> Real {
        let mut phi = 32.0;
        while phi < 1e5
            && (self.char_func(phi, 1).norm() > 1e-16 || self.char_func(phi, 2).norm() > 1e-16)
        {
            phi *= 2.0;
        }
        phi
    }
}

fn probability(
    params: &HestonParams,
    j: usize,
    log_moneyness: Real,
    integrator: &GaussLobattoIntegral,
) -> Result<Real> {
    let integrand = |phi: Real| -> Real {
        // the integrand has a finite limit at the origin
        let phi = phi.max(1e-8);
        let cf = params.char_func(phi, j);
        let z = Complex64::new(0.0, phi * log_moneyness).exp() * cf;
        // Re[z / (iφ)] = Im[z] / φ
        z.im / phi
    };
    let integral = integrator.integrate(integrand, 0.0, params.upper_limit())?;
    Ok(0.5 + integral / PI)
}

/// Price a European option under the Heston model.
#[allow(clippy::too_many_arguments)]
pub fn heston_price(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    r: Real,
    q: Real,
    t: Time,
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
) -> Result<Real> {
    let df_q = (-q * t).exp();
    let df_r = (-r * t).exp();
    if t <= 0.0 {
        return Ok((option_type.sign() * (spot - strike)).max(0.0));
    }

    let params = HestonParams {
        t,
        v0,
        kappa,
        theta,
        sigma,
        rho,
    };
    let integrator = GaussLobattoIntegral::new(1e-10, 100_000);
    let x = spot.ln() + (r - q) * t - strike.ln();
    let p1 = probability(&params, 1, x, &integrator)?;
    let p2 = probability(&params, 2, x, &integrator)?;

    let call = spot * df_q * p1 - strike * df_r * p2;
    Ok(match option_type {
        OptionType::Call => call,
        // C - P = S e^{-qT} - K e^{-rT}
        OptionType::Put => call - spot * df_q + strike * df_r,
    })
}

impl PricingEngine<VanillaOptionArguments> for AnalyticHestonEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        if args.exercise.exercise_type() != ExerciseType::European {
            return Err(Error::UnsupportedExercise(format!(
                "analytic Heston engine cannot price a {} exercise",
                args.exercise
            )));
        }
        let p = &self.process;
        let t = args.exercise.last_time();
        let params = HestonParams {
            t,
            v0: p.v0(),
            kappa: p.kappa(),
            theta: p.theta(),
            sigma: p.sigma(),
            rho: p.rho(),
        };
        let integrator = GaussLobattoIntegral::new(self.accuracy, self.max_evaluations);
        let (spot, strike) = (p.s0(), args.payoff.strike());
        let (df_r, df_q) = (
            (-p.risk_free_rate() * t).exp(),
            (-p.dividend_yield() * t).exp(),
        );
        let x = spot.ln() + (p.risk_free_rate() - p.dividend_yield()) * t - strike.ln();
        let p1 = probability(&params, 1, x, &integrator)?;
        let p2 = probability(&params, 2, x, &integrator)?;

        let (npv, delta) = match args.payoff.option_type() {
            OptionType::Call => (spot * df_q * p1 - strike * df_r * p2, df_q * p1),
            OptionType::Put => (
                spot * df_q * (p1 - 1.0) - strike * df_r * (p2 - 1.0),
                df_q * (p1 - 1.0),
            ),
        };
        Ok(PricingResults::from_npv(npv).with_result("delta", delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::black_scholes_merton;
    use approx::assert_abs_diff_eq;

    #[test]
    fn reference_value_from_the_literature() {
        // Fang & Oosterlee (2008), Table 4
        let price = heston_price(
            OptionType::Call,
            100.0,
            100.0,
            0.0,
            0.0,
            1.0,
            0.0175,
            1.5768,
            0.0398,
            0.5751,
            -0.5711,
        )
        .unwrap();
        assert_abs_diff_eq!(price, 5.785155450, epsilon = 1e-4);
    }

    #[test]
    fn vanishing_vol_of_vol_recovers_black_scholes() {
        let (spot, strike, r, q, t) = (100.0, 95.0, 0.05, 0.02, 0.5);
        let heston = heston_price(
            OptionType::Call,
            spot,
            strike,
            r,
            q,
            t,
            0.04,
            1.0,
            0.04,
            1e-4,
            0.0,
        )
        .unwrap();
        let bs = black_scholes_merton(OptionType::Call, spot, strike, r, q, 0.20, t).npv;
        assert_abs_diff_eq!(heston, bs, epsilon = 1e-5);
    }

    #[test]
    fn put_call_parity() {
        let (spot, strike, r, q, t) = (100.0, 105.0, 0.05, 0.02, 1.0);
        let price = |option_type| {
            heston_price(option_type, spot, strike, r, q, t, 0.04, 2.0, 0.04, 0.3, -0.7).unwrap()
        };
        let lhs = price(OptionType::Call) - price(OptionType::Put);
        let rhs = spot * (-q * t).exp() - strike * (-r * t).exp();
        assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-10);
    }

    #[test]
    fn engine_matches_the_pricing_function() {
        let process =
            Arc::new(HestonProcess::new(100.0, 0.04, 0.025, 0.0, 1.5, 0.04, 0.3, -0.9).unwrap());
        let engine = AnalyticHestonEngine::new(process);
        let args = VanillaOptionArguments {
            payoff: Arc::new(ql_instruments::PlainVanillaPayoff::new(OptionType::Put, 110.0)),
            exercise: ql_instruments::Exercise::european(1.0).unwrap(),
        };
        let result = engine.calculate(&args).unwrap();
        let expected = heston_price(
            OptionType::Put,
            100.0,
            110.0,
            0.025,
            0.0,
            1.0,
            0.04,
            1.5,
            0.04,
            0.3,
            -0.9,
        )
        .unwrap();
        assert_abs_diff_eq!(result.npv, expected, epsilon = 1e-8);
        let delta = result.result("delta").unwrap();
        assert!(delta < 0.0 && delta > -1.0, "delta = {delta}");
    }
}
