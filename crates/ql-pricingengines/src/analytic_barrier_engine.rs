//! Reiner-Rubinstein closed form for continuously monitored single
//! barriers.
//!
//! Every price is a combination of six building blocks: two vanilla-like
//! terms, two terms reflected in the barrier, the rebate paid at expiry
//! (`E`, knock-ins) and the rebate paid on the hit (`F`, knock-outs).

use std::sync::Arc;

use ql_core::{
    errors::{Error, Result},
    Rate, Real, Time, Volatility,
};
use ql_instruments::{
    BarrierOptionArguments, BarrierType, ExerciseType, OptionType, PricingEngine, PricingResults,
};
use ql_math::distributions::normal_cdf;
use ql_processes::GeneralizedBlackScholesProcess;
use tracing::debug;

/// Model quantities shared by the building blocks.
struct Blocks {
    spot: Real,
    strike: Real,
    barrier: Real,
    growth: Real,
    discount: Real,
    std_dev: Real,
    mu: Real,
    lambda: Real,
    phi: Real,
    eta: Real,
}

impl Blocks {
    /// `ln(ratio)/σ√T + (1 + μ)σ√T`
    fn point(&self, ratio: Real) -> Real {
        ratio.ln() / self.std_dev + (1.0 + self.mu) * self.std_dev
    }

    /// Asset-minus-strike term evaluated at `x` (`A` and `B`).
    fn vanilla(&self, x: Real) -> Real {
        let phi = self.phi;
        phi * (self.spot * self.growth * normal_cdf(phi * x)
            - self.strike * self.discount * normal_cdf(phi * (x - self.std_dev)))
    }

    /// The same term seen through the barrier (`C` and `D`).
    fn reflected(&self, y: Real) -> Real {
        let (phi, eta) = (self.phi, self.eta);
        let h = self.barrier / self.spot;
        let asset = self.spot * self.growth * h.powf(2.0 * (self.mu + 1.0));
        let cash = self.strike * self.discount * h.powf(2.0 * self.mu);
        phi * (asset * normal_cdf(eta * y) - cash * normal_cdf(eta * (y - self.std_dev)))
    }

    /// Rebate paid at expiry when the barrier was never touched.
    fn rebate_at_expiry(&self, rebate: Real, x2: Real, y2: Real) -> Real {
        let eta = self.eta;
        let h = self.barrier / self.spot;
        rebate
            * self.discount
            * (normal_cdf(eta * (x2 - self.std_dev))
                - h.powf(2.0 * self.mu) * normal_cdf(eta * (y2 - self.std_dev)))
    }

    /// Rebate paid at the first touch.
    fn rebate_at_hit(&self, rebate: Real) -> Real {
        let eta = self.eta;
        let h = self.barrier / self.spot;
        let z = h.ln() / self.std_dev + self.lambda * self.std_dev;
        rebate
            * (h.powf(self.mu + self.lambda) * normal_cdf(eta * z)
                + h.powf(self.mu - self.lambda)
                    * normal_cdf(eta * (z - 2.0 * self.lambda * self.std_dev)))
    }
}

/// Price of a European single-barrier call or put under flat
/// Black-Scholes dynamics.
///
/// An expired option pays its intrinsic value if it is a knock-out and
/// nothing otherwise.
#[allow(clippy::too_many_arguments)]
pub fn analytic_barrier_price(
    option_type: OptionType,
    barrier_type: BarrierType,
    spot: Real,
    strike: Real,
    barrier: Real,
    rebate: Real,
    r: Rate,
    q: Rate,
    sigma: Volatility,
    t: Time,
) -> Real {
    if t <= 0.0 {
        return match barrier_type.is_knock_in() {
            true => 0.0,
            false => option_type.moneyness(spot, strike).max(0.0),
        };
    }

    let variance = sigma * sigma;
    let mu = (r - q) / variance - 0.5;
    let blocks = Blocks {
        spot,
        strike,
        barrier,
        growth: (-q * t).exp(),
        discount: (-r * t).exp(),
        std_dev: sigma * t.sqrt(),
        mu,
        lambda: (mu * mu + 2.0 * r / variance).sqrt(),
        phi: option_type.sign(),
        eta: if barrier_type.is_down() { 1.0 } else { -1.0 },
    };

    let x1 = blocks.point(spot / strike);
    let x2 = blocks.point(spot / barrier);
    let y1 = blocks.point(barrier * barrier / (spot * strike));
    let y2 = blocks.point(barrier / spot);

    let a = blocks.vanilla(x1);
    let b = blocks.vanilla(x2);
    let c = blocks.reflected(y1);
    let d = blocks.reflected(y2);
    let e = blocks.rebate_at_expiry(rebate, x2, y2);
    let f = blocks.rebate_at_hit(rebate);

    let high_strike = strike >= barrier;
    use BarrierType::*;
    use OptionType::*;
    match (barrier_type, option_type, high_strike) {
        (DownIn, Call, true) | (UpIn, Put, false) => c + e,
        (DownIn, Call, false) | (UpIn, Put, true) => a - b + d + e,
        (DownIn, Put, true) | (UpIn, Call, false) => b - c + d + e,
        (DownIn, Put, false) | (UpIn, Call, true) => a + e,
        (DownOut, Call, true) | (UpOut, Put, false) => a - c + f,
        (DownOut, Call, false) | (UpOut, Put, true) => b - d + f,
        (DownOut, Put, true) | (UpOut, Call, false) => a - b + c - d + f,
        (DownOut, Put, false) | (UpOut, Call, true) => f,
    }
}

/// Closed-form barrier engine on a flat Black-Scholes process.
#[derive(Debug)]
pub struct AnalyticBarrierEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
}

impl AnalyticBarrierEngine {
    /// Engine on a flat-rate Black-Scholes process.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self { process }
    }
}

impl PricingEngine<BarrierOptionArguments> for AnalyticBarrierEngine {
    fn calculate(&self, args: &BarrierOptionArguments) -> Result<PricingResults> {
        if args.exercise.exercise_type() != ExerciseType::European {
            return Err(Error::UnsupportedExercise(format!(
                "closed-form barrier needs a European exercise, got {}",
                args.exercise
            )));
        }
        let p = &self.process;
        let spot = p.spot();
        if args.barrier_type.is_triggered(spot, args.barrier) {
            return Err(Error::Precondition(format!(
                "spot {spot} is already beyond the barrier {}",
                args.barrier
            )));
        }

        let npv = analytic_barrier_price(
            args.payoff.option_type(),
            args.barrier_type,
            spot,
            args.payoff.strike(),
            args.barrier,
            args.rebate,
            p.risk_free_rate(),
            p.dividend_yield(),
            p.volatility(),
            args.exercise.last_time(),
        );
        debug!(npv, barrier = args.barrier, "closed-form barrier price");
        Ok(PricingResults::from_npv(npv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::black_scholes_merton;
    use approx::assert_abs_diff_eq;
    use ql_instruments::{Exercise, PlainVanillaPayoff};

    fn haug(option_type: OptionType, barrier_type: BarrierType, strike: Real, barrier: Real) -> Real {
        analytic_barrier_price(
            option_type,
            barrier_type,
            100.0,
            strike,
            barrier,
            3.0,
            0.08,
            0.04,
            0.25,
            0.5,
        )
    }

    #[test]
    fn reproduces_haug_table() {
        use BarrierType::*;
        use OptionType::*;
        let rows = [
            (DownOut, Call, 90.0, 95.0, 9.0246),
            (DownOut, Call, 100.0, 95.0, 6.7924),
            (DownOut, Call, 110.0, 95.0, 4.8759),
            (UpOut, Call, 90.0, 105.0, 2.6789),
            (UpOut, Call, 100.0, 105.0, 2.3580),
            (UpOut, Call, 110.0, 105.0, 2.3453),
            (DownIn, Call, 90.0, 95.0, 7.7627),
            (DownIn, Call, 100.0, 95.0, 4.0109),
            (DownIn, Call, 110.0, 95.0, 2.0576),
            (UpIn, Call, 90.0, 105.0, 14.1112),
            (UpIn, Call, 100.0, 105.0, 8.4482),
            (UpIn, Call, 110.0, 105.0, 4.5910),
            (DownOut, Put, 90.0, 95.0, 2.2798),
            (DownOut, Put, 100.0, 95.0, 2.2947),
            (DownOut, Put, 110.0, 95.0, 2.6252),
            (UpOut, Put, 90.0, 105.0, 3.7760),
            (UpOut, Put, 100.0, 105.0, 5.4932),
            (UpOut, Put, 110.0, 105.0, 7.5187),
            (DownIn, Put, 90.0, 95.0, 2.9586),
            (DownIn, Put, 100.0, 95.0, 6.5677),
            (DownIn, Put, 110.0, 95.0, 11.9752),
            (UpIn, Put, 90.0, 105.0, 1.4653),
            (UpIn, Put, 100.0, 105.0, 3.3721),
            (UpIn, Put, 110.0, 105.0, 7.0846),
        ];
        for (barrier_type, option_type, strike, barrier, expected) in rows {
            let npv = haug(option_type, barrier_type, strike, barrier);
            assert!(
                (npv - expected).abs() < 1e-4,
                "{barrier_type:?} {option_type} K {strike}: {npv} vs {expected}"
            );
        }
    }

    #[test]
    fn in_out_parity_without_rebate() {
        let cases = [(OptionType::Call, 90.0, 115.0), (OptionType::Put, 85.0, 110.0)];
        for (option_type, down, up) in cases {
            let vanilla = black_scholes_merton(option_type, 100.0, 100.0, 0.05, 0.02, 0.2, 1.0).npv;
            for (knock_in, knock_out, barrier) in [
                (BarrierType::DownIn, BarrierType::DownOut, down),
                (BarrierType::UpIn, BarrierType::UpOut, up),
            ] {
                let price = |bt| {
                    analytic_barrier_price(
                        option_type, bt, 100.0, 100.0, barrier, 0.0, 0.05, 0.02, 0.2, 1.0,
                    )
                };
                assert_abs_diff_eq!(price(knock_in) + price(knock_out), vanilla, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn expired_options() {
        let out = analytic_barrier_price(
            OptionType::Put,
            BarrierType::UpOut,
            90.0,
            100.0,
            120.0,
            0.0,
            0.05,
            0.0,
            0.2,
            0.0,
        );
        assert_eq!(out, 10.0);
        let knock_in = analytic_barrier_price(
            OptionType::Put,
            BarrierType::UpIn,
            90.0,
            100.0,
            120.0,
            0.0,
            0.05,
            0.0,
            0.2,
            0.0,
        );
        assert_eq!(knock_in, 0.0);
    }

    #[test]
    fn engine_rejects_a_touched_barrier() {
        let process =
            Arc::new(GeneralizedBlackScholesProcess::new(100.0, 0.08, 0.04, 0.25).unwrap());
        let engine = AnalyticBarrierEngine::new(process);
        let args = |barrier| BarrierOptionArguments {
            payoff: Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
            exercise: Exercise::european(0.5).unwrap(),
            barrier_type: BarrierType::DownOut,
            barrier,
            rebate: 3.0,
        };
        assert_abs_diff_eq!(engine.calculate(&args(95.0)).unwrap().npv, 6.7924, epsilon = 1e-4);
        assert!(matches!(
            engine.calculate(&args(101.0)),
            Err(Error::Precondition(_))
        ));
    }
}
