//! Closed-form Black-Scholes-Merton prices for European vanillas.
//!
//! Reference values for the finite-difference engines and the degenerate
//! Heston limit.

use std::sync::Arc;

use ql_core::{
    errors::{Error, Result},
    Rate, Real, Time, Volatility,
};
use ql_instruments::{
    ExerciseType, OptionType, PricingEngine, PricingResults, VanillaOptionArguments,
};
use ql_math::distributions::{normal_cdf, normal_pdf};
use ql_processes::GeneralizedBlackScholesProcess;

/// Price and first-order sensitivities of a European vanilla.
///
/// Vega and rho are per unit of volatility and rate; theta is per year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholesGreeks {
    /// Present value.
    pub npv: Real,
    /// `∂V/∂S`.
    pub delta: Real,
    /// `∂²V/∂S²`.
    pub gamma: Real,
    /// `∂V/∂σ`.
    pub vega: Real,
    /// `∂V/∂t` in calendar time.
    pub theta: Real,
    /// `∂V/∂r`.
    pub rho: Real,
}

impl BlackScholesGreeks {
    fn intrinsic(value: Real) -> Self {
        Self {
            npv: value,
            delta: 0.0,
            gamma: 0.0,
            vega: 0.0,
            theta: 0.0,
            rho: 0.0,
        }
    }
}

/// Black-Scholes-Merton value of a call or put with continuous yield `q`.
///
/// An expired option is worth its intrinsic value. With zero total
/// volatility the forward decides which side of the strike the option ends
/// on.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    r: Rate,
    q: Rate,
    sigma: Volatility,
    t: Time,
) -> BlackScholesGreeks {
    let phi = option_type.sign();
    if t <= 0.0 {
        return BlackScholesGreeks::intrinsic(option_type.moneyness(spot, strike).max(0.0));
    }

    let sqrt_t = t.sqrt();
    let std_dev = sigma * sqrt_t;
    let growth = (-q * t).exp();
    let discount = (-r * t).exp();

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((spot / strike).ln() + (r - q) * t) / std_dev + 0.5 * std_dev;
        (d1, d1 - std_dev)
    } else {
        let forward = spot * growth / discount;
        let d = if forward > strike { 1e15 } else { -1e15 };
        (d, d)
    };

    let n1 = normal_cdf(phi * d1);
    let n2 = normal_cdf(phi * d2);
    let density = normal_pdf(d1);
    let asset = spot * growth;
    let cash = strike * discount;

    let gamma = if density > 0.0 {
        growth * density / (spot * std_dev)
    } else {
        0.0
    };
    BlackScholesGreeks {
        npv: phi * (asset * n1 - cash * n2),
        delta: phi * growth * n1,
        gamma,
        vega: asset * density * sqrt_t,
        theta: -asset * density * sigma / (2.0 * sqrt_t) - phi * (r * cash * n2 - q * asset * n1),
        rho: phi * cash * t * n2,
    }
}

/// European vanilla engine on a flat Black-Scholes process.
#[derive(Debug)]
pub struct AnalyticEuropeanEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
}

impl AnalyticEuropeanEngine {
    /// Engine on a flat-rate Black-Scholes process.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self { process }
    }
}

impl PricingEngine<VanillaOptionArguments> for AnalyticEuropeanEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        if args.exercise.exercise_type() != ExerciseType::European {
            return Err(Error::UnsupportedExercise(format!(
                "closed form needs a European exercise, got {}",
                args.exercise
            )));
        }
        let p = &self.process;
        let g = black_scholes_merton(
            args.payoff.option_type(),
            p.spot(),
            args.payoff.strike(),
            p.risk_free_rate(),
            p.dividend_yield(),
            p.volatility(),
            args.exercise.last_time(),
        );
        Ok(PricingResults::from_npv(g.npv)
            .with_result("delta", g.delta)
            .with_result("gamma", g.gamma)
            .with_result("vega", g.vega)
            .with_result("theta", g.theta)
            .with_result("rho", g.rho))
    }
}
