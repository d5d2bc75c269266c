//! # ql-instruments
//!
//! Contract terms consumed by the pricing engines: payoffs, exercise
//! schedules in year fractions, vanilla, barrier, swing and storage options.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod exercise;
pub mod instrument;
pub mod option;
pub mod payoff;
pub mod storage_option;
pub mod swing_option;

pub use exercise::{Exercise, ExerciseType};
pub use instrument::{Instrument, PricingEngine, PricingResults};
pub use option::{
    BarrierOption, BarrierOptionArguments, BarrierType, VanillaOption, VanillaOptionArguments,
};
pub use payoff::{
    AssetOrNothingPayoff, BasketPayoff, BasketType, CashOrNothingPayoff, OptionType, Payoff,
    PlainVanillaPayoff, StrikedPayoff, VanillaForwardPayoff,
};
pub use storage_option::{StorageOptionArguments, VanillaStorageOption};
pub use swing_option::{SwingOptionArguments, VanillaSwingOption};
