//! The instrument/engine split.
//!
//! An instrument only knows its contract terms. Pricing packs those terms
//! into the instrument's `Arguments` value and hands it to an engine that
//! owns the market model.

use ql_core::{errors::Result, Real, Time};
use std::collections::HashMap;

/// Net present value plus whatever sensitivities the engine reports.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResults {
    /// Net present value.
    pub npv: Real,
    /// Named extras such as `"delta"`, `"gamma"` or `"theta"`.
    pub additional_results: HashMap<String, Real>,
}

impl PricingResults {
    /// Results holding only `npv`.
    pub fn from_npv(npv: Real) -> Self {
        Self {
            npv,
            additional_results: HashMap::new(),
        }
    }

    /// Builder-style insert of a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }

    /// The named result, if the engine produced one.
    pub fn result(&self, key: &str) -> Option<Real> {
        self.additional_results.get(key).copied()
    }
}

/// Prices one kind of argument set.
pub trait PricingEngine<Args>: std::fmt::Debug + Send + Sync {
    /// Value the contract described by `args`.
    fn calculate(&self, args: &Args) -> Result<PricingResults>;
}

/// A contract that can be handed to a matching engine.
pub trait Instrument: std::fmt::Debug + Send + Sync {
    /// What an engine needs to know about the contract.
    type Arguments;

    /// Snapshot of the contract terms.
    fn arguments(&self) -> Self::Arguments;

    /// Last exercise time in years.
    fn maturity(&self) -> Time;

    /// `true` once the last exercise time lies in the past.
    fn is_expired(&self) -> bool {
        self.maturity() < 0.0
    }

    /// Run `engine` on the contract terms.
    fn price(&self, engine: &dyn PricingEngine<Self::Arguments>) -> Result<PricingResults> {
        engine.calculate(&self.arguments())
    }
}
