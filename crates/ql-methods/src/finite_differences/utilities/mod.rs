//! Payoff calculators, mesh integration and analytic densities.

mod heston_greens_fct;
mod inner_value;
mod mesher_integral;
mod square_root_rnd;

pub use heston_greens_fct::{FdmHestonGreensFct, FdmHestonGreensFctAlgorithm};
pub use inner_value::{
    shape_shift, FdmExpExtOUInnerValueCalculator, FdmExtOUJumpModelInnerValue,
    FdmInnerValueCalculator, FdmLogBasketInnerValue, FdmLogInnerValue, FdmStorageValue,
    FdmZeroInnerValue, Shape,
};
pub use mesher_integral::{DiscreteIntegrator, FdmMesherIntegral};
pub use square_root_rnd::SquareRootProcessRNDCalculator;
