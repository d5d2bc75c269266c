use std::sync::Arc;

use ql_core::Real;
use ql_math::integrals::{discrete_simpson, discrete_trapezoid};
use ql_math::Array;

use crate::finite_differences::meshers::FdmMesherComposite;

/// One-dimensional rule on node values.
pub type DiscreteIntegrator = fn(&[Real], &[Real]) -> Real;

/// Integral of a mesh function over the whole mesh, one direction at a
/// time starting with the fastest.
#[derive(Debug, Clone)]
pub struct FdmMesherIntegral {
    mesher: Arc<FdmMesherComposite>,
    integrator: DiscreteIntegrator,
}

impl FdmMesherIntegral {
    /// Integrate with an arbitrary one-dimensional rule.
    pub fn new(mesher: Arc<FdmMesherComposite>, integrator: DiscreteIntegrator) -> Self {
        Self { mesher, integrator }
    }

    /// Composite Simpson along every direction.
    pub fn simpson(mesher: Arc<FdmMesherComposite>) -> Self {
        Self::new(mesher, discrete_simpson)
    }

    /// Composite trapezoid along every direction.
    pub fn trapezoid(mesher: Arc<FdmMesherComposite>) -> Self {
        Self::new(mesher, discrete_trapezoid)
    }

    /// `∫ f` where `f[i]` is the value at layout index `i`.
    pub fn integrate(&self, f: &Array) -> Real {
        let mut values = f.to_vec();
        for m in self.mesher.get_fdm_1d_meshers() {
            let x = m.locations();
            values = values
                .chunks(x.len())
                .map(|line| (self.integrator)(x, line))
                .collect();
        }
        values.first().copied().unwrap_or(0.0)
    }
}
