//! # ql-processes
//!
//! Stochastic process snapshots consumed by the finite-difference engine:
//! Black-Scholes-Merton, Heston, square-root, Ornstein-Uhlenbeck and its
//! extensions with a time-dependent level and exponential jumps.
//!
//! Rates are flat and every process is an immutable value; share them
//! through `Arc`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod black_scholes_process;
pub mod ext_ou_with_jumps_process;
pub mod extended_ornstein_uhlenbeck_process;
pub mod heston_process;
pub mod ornstein_uhlenbeck_process;
pub mod square_root_process;
pub mod stochastic_process;

pub use black_scholes_process::{
    black_scholes_merton_process, black_scholes_process, GeneralizedBlackScholesProcess,
};
pub use ext_ou_with_jumps_process::ExtOUWithJumpsProcess;
pub use extended_ornstein_uhlenbeck_process::{
    Discretization, ExtendedOrnsteinUhlenbeckProcess, LevelFn,
};
pub use heston_process::HestonProcess;
pub use ornstein_uhlenbeck_process::OrnsteinUhlenbeckProcess;
pub use square_root_process::SquareRootProcess;
pub use stochastic_process::StochasticProcess1D;
