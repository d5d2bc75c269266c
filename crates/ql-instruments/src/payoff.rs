//! Exercise payoffs.
//!
//! Inner-value calculators on log meshes evaluate these at `exp(x)`; the
//! storage and swing engines use them as the cash flow of a single
//! exercise.

use ql_core::Real;
use std::fmt;
use std::sync::Arc;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// Long the underlying above the strike.
    Call,
    /// Short the underlying below the strike.
    Put,
}

impl OptionType {
    /// `φ`: `1` for a call and `-1` for a put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// `φ(S - K)`.
    pub fn moneyness(self, price: Real, strike: Real) -> Real {
        self.sign() * (price - strike)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionType::Call => "Call",
            OptionType::Put => "Put",
        })
    }
}

/// Cash amount received for an underlying price at exercise.
pub trait Payoff: fmt::Debug + Send + Sync {
    /// Payoff at `price`.
    fn value(&self, price: Real) -> Real;

    /// Short identifier used in log output.
    fn name(&self) -> &str;
}

/// A payoff parameterised by strike and call/put side.
pub trait StrikedPayoff: Payoff {
    /// Strike.
    fn strike(&self) -> Real;

    /// Call or put.
    fn option_type(&self) -> OptionType;
}

// engines hold `Arc<dyn StrikedPayoff>` but calculators take `Arc<dyn Payoff>`
impl Payoff for Arc<dyn StrikedPayoff> {
    fn value(&self, price: Real) -> Real {
        (**self).value(price)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

macro_rules! striked_payoff {
    ($(#[$doc:meta])* $name:ident { $($extra:ident: $ty:ty),* }, $label:literal, |$p:ident, $price:ident| $value:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            /// Call or put.
            pub option_type: OptionType,
            /// Strike.
            pub strike: Real,
            $(#[allow(missing_docs)] pub $extra: $ty,)*
        }

        impl $name {
            #[allow(missing_docs)]
            pub fn new(option_type: OptionType, strike: Real $(, $extra: $ty)*) -> Self {
                Self { option_type, strike $(, $extra)* }
            }
        }

        impl Payoff for $name {
            fn value(&self, $price: Real) -> Real {
                let $p = self;
                $value
            }

            fn name(&self) -> &str {
                $label
            }
        }

        impl StrikedPayoff for $name {
            fn strike(&self) -> Real {
                self.strike
            }

            fn option_type(&self) -> OptionType {
                self.option_type
            }
        }
    };
}

striked_payoff!(
    /// `max(φ(S - K), 0)`.
    PlainVanillaPayoff {}, "Vanilla",
    |p, price| p.option_type.moneyness(price, p.strike).max(0.0)
);

striked_payoff!(
    /// `cash_payoff` when `φ(S - K) > 0`, nothing otherwise.
    CashOrNothingPayoff { cash_payoff: Real }, "CashOrNothing",
    |p, price| if p.option_type.moneyness(price, p.strike) > 0.0 { p.cash_payoff } else { 0.0 }
);

striked_payoff!(
    /// `S` when `φ(S - K) > 0`, nothing otherwise.
    AssetOrNothingPayoff {}, "AssetOrNothing",
    |p, price| if p.option_type.moneyness(price, p.strike) > 0.0 { price } else { 0.0 }
);

striked_payoff!(
    /// `φ(S - K)` with no floor: the cash flow of one swing exercise, which
    /// may be taken out of the money when minimum rights force it.
    VanillaForwardPayoff {}, "Forward",
    |p, price| p.option_type.moneyness(price, p.strike)
);

/// Reduction of several prices to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BasketType {
    /// Lowest price.
    Min,
    /// Highest price.
    Max,
    /// Weighted sum, or the plain mean without weights.
    Average,
}

/// A one-dimensional payoff applied to a reduced basket price.
#[derive(Debug, Clone)]
pub struct BasketPayoff {
    basket_type: BasketType,
    base: Arc<dyn Payoff>,
    weights: Vec<Real>,
}

impl BasketPayoff {
    /// Min or max basket; weights are ignored.
    pub fn new(basket_type: BasketType, base: Arc<dyn Payoff>) -> Self {
        Self {
            basket_type,
            base,
            weights: Vec::new(),
        }
    }

    /// Weighted average basket.
    pub fn average(base: Arc<dyn Payoff>, weights: Vec<Real>) -> Self {
        Self {
            basket_type: BasketType::Average,
            base,
            weights,
        }
    }

    /// How the basket is reduced to one price.
    pub fn basket_type(&self) -> BasketType {
        self.basket_type
    }

    /// The single price the base payoff sees.
    pub fn accumulate(&self, prices: &[Real]) -> Real {
        let it = prices.iter().copied();
        match self.basket_type {
            BasketType::Min => it.fold(Real::INFINITY, Real::min),
            BasketType::Max => it.fold(Real::NEG_INFINITY, Real::max),
            BasketType::Average if self.weights.is_empty() => {
                it.sum::<Real>() / prices.len() as Real
            }
            BasketType::Average => it.zip(&self.weights).map(|(p, w)| p * w).sum(),
        }
    }

    /// Base payoff of the reduced basket price.
    pub fn value(&self, prices: &[Real]) -> Real {
        self.base.value(self.accumulate(prices))
    }
}
