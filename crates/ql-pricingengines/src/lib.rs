//! # ql-pricingengines
//!
//! Pricing engines for options on Black-Scholes, Heston and Ornstein-Uhlenbeck
//! underlyings.
//!
//! ## Finite-difference engines
//!
//! - [`FdBlackScholesVanillaEngine`]: European, American and Bermudan vanillas
//! - [`FdBlackScholesBarrierEngine`]: single barriers, monitored on the time grid
//! - [`FdHestonVanillaEngine`]: vanillas on the two-factor Heston PDE
//! - [`FdHestonBarrierEngine`] and [`FdHestonRebateEngine`]: single barriers
//!   and their rebate leg under Heston
//! - [`FdSimpleExtOUStorageEngine`]: gas storage under an extended OU log price
//! - [`FdSimpleExtOUJumpSwingEngine`]: swing options under OU with jumps
//!
//! ## Closed-form engines
//!
//! - [`AnalyticEuropeanEngine`]: Black-Scholes-Merton
//! - [`AnalyticBarrierEngine`]: Reiner-Rubinstein barriers
//! - [`AnalyticHestonEngine`]: Heston characteristic-function integral
//!
//! All engines implement [`ql_instruments::PricingEngine`] for the argument
//! type of their instrument and report the NPV through `tracing` at `info`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_barrier_engine;
pub mod analytic_european_engine;
pub mod analytic_heston_engine;
pub mod fd_black_scholes_barrier_engine;
pub mod fd_black_scholes_vanilla_engine;
pub mod fd_grid_spec;
pub mod fd_heston_barrier_engine;
pub mod fd_heston_rebate_engine;
pub mod fd_heston_vanilla_engine;
pub mod fd_simple_ext_ou_jump_swing_engine;
pub mod fd_simple_ext_ou_storage_engine;

pub use analytic_barrier_engine::{analytic_barrier_price, AnalyticBarrierEngine};
pub use analytic_european_engine::{black_scholes_merton, AnalyticEuropeanEngine, BlackScholesGreeks};
pub use analytic_heston_engine::{heston_price, AnalyticHestonEngine};
pub use fd_black_scholes_barrier_engine::FdBlackScholesBarrierEngine;
pub use fd_black_scholes_vanilla_engine::FdBlackScholesVanillaEngine;
pub use fd_grid_spec::FdGridSpec;
pub use fd_heston_barrier_engine::FdHestonBarrierEngine;
pub use fd_heston_rebate_engine::FdHestonRebateEngine;
pub use fd_heston_vanilla_engine::FdHestonVanillaEngine;
pub use fd_simple_ext_ou_jump_swing_engine::FdSimpleExtOUJumpSwingEngine;
pub use fd_simple_ext_ou_storage_engine::FdSimpleExtOUStorageEngine;
