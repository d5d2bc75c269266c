//! One-dimensional meshers and their multi-dimensional composite.
//!
//! Every mesher ends up as an [`Fdm1dMesher`]: a strictly increasing array of
//! locations together with the forward and backward spacings the difference
//! operators need. The concrete meshers are thin newtypes that only differ in
//! how those locations are chosen.

use ql_core::{errors::Error, errors::Result, Real};

// Newtype plumbing shared by the concrete meshers. Must stay above the `mod`
// declarations so it is in textual scope for them.
macro_rules! impl_fdm_1d_mesher {
    ($name:ident) => {
        impl std::ops::Deref for $name {
            type Target = $crate::finite_differences::meshers::Fdm1dMesher;

            fn deref(&self) -> &Self::Target {
                &self.mesher
            }
        }

        impl From<$name> for $crate::finite_differences::meshers::Fdm1dMesher {
            fn from(m: $name) -> Self {
                m.mesher
            }
        }
    };
}

mod black_scholes;
mod composite;
mod concentrating;
mod exponential_jump;
mod heston_variance;
mod predefined;
mod simple_process;
mod uniform;

pub use black_scholes::{BlackScholesMesherOptions, FdmBlackScholesMesher};
pub use composite::FdmMesherComposite;
pub use concentrating::{Concentrating1dMesher, CriticalPoint};
pub use exponential_jump::ExponentialJump1dMesher;
pub use heston_variance::FdmHestonVarianceMesher;
pub use predefined::Predefined1dMesher;
pub use simple_process::FdmSimpleProcess1dMesher;
pub use uniform::Uniform1dMesher;

/// Strictly increasing 1D grid with cached spacings.
///
/// `dplus(i) = x[i+1] - x[i]` is NaN at the last node and
/// `dminus(i) = x[i] - x[i-1]` is NaN at the first node.
#[derive(Debug, Clone, PartialEq)]
pub struct Fdm1dMesher {
    locations: Vec<Real>,
    dplus: Vec<Real>,
    dminus: Vec<Real>,
}

impl Fdm1dMesher {
    /// Build a mesher from its node locations.
    ///
    /// Fails with [`Error::InsufficientMesher`] for fewer than two nodes or
    /// when the locations are not strictly increasing.
    pub fn from_locations(locations: Vec<Real>) -> Result<Self> {
        if locations.len() < 2 {
            return Err(Error::InsufficientMesher(format!(
                "a mesher needs at least two nodes, got {}",
                locations.len()
            )));
        }
        if let Some(w) = locations
            .windows(2)
            .find(|w| w[1] <= w[0] || !w[0].is_finite() || !w[1].is_finite())
        {
            return Err(Error::InsufficientMesher(format!(
                "locations must be finite and strictly increasing, found {} followed by {}",
                w[0], w[1]
            )));
        }

        let n = locations.len();
        let mut dplus = vec![Real::NAN; n];
        let mut dminus = vec![Real::NAN; n];
        for i in 0..n - 1 {
            let h = locations[i + 1] - locations[i];
            dplus[i] = h;
            dminus[i + 1] = h;
        }
        Ok(Self {
            locations,
            dplus,
            dminus,
        })
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.locations.len()
    }

    /// Node locations.
    pub fn locations(&self) -> &[Real] {
        &self.locations
    }

    /// Distance to the next node (NaN at the last node).
    #[inline]
    pub fn dplus(&self, i: usize) -> Real {
        self.dplus[i]
    }

    /// Distance to the previous node (NaN at the first node).
    #[inline]
    pub fn dminus(&self, i: usize) -> Real {
        self.dminus[i]
    }

    /// First location.
    pub fn lower_bound(&self) -> Real {
        self.locations[0]
    }

    /// Last location.
    pub fn upper_bound(&self) -> Real {
        self.locations[self.locations.len() - 1]
    }
}
