use ql_core::{errors::Result, Real};
use ql_math::Array;

use super::Fdm1dMesher;
use crate::finite_differences::operators::{FdmLinearOpIterator, FdmLinearOpLayout};

/// Tensor product of 1D meshers; dimension 0 varies fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmMesherComposite {
    layout: FdmLinearOpLayout,
    meshers: Vec<Fdm1dMesher>,
}

impl FdmMesherComposite {
    /// Combine up to four 1D meshers.
    pub fn new(meshers: Vec<Fdm1dMesher>) -> Result<Self> {
        let dim: Vec<usize> = meshers.iter().map(Fdm1dMesher::size).collect();
        let layout = FdmLinearOpLayout::new(&dim)?;
        Ok(Self { layout, meshers })
    }

    /// One-dimensional composite.
    pub fn from_mesher(m: impl Into<Fdm1dMesher>) -> Result<Self> {
        Self::new(vec![m.into()])
    }

    /// Two-dimensional composite.
    pub fn from_pair(m1: impl Into<Fdm1dMesher>, m2: impl Into<Fdm1dMesher>) -> Result<Self> {
        Self::new(vec![m1.into(), m2.into()])
    }

    /// Index layout of the grid.
    pub fn layout(&self) -> &FdmLinearOpLayout {
        &self.layout
    }

    /// The underlying 1D meshers.
    pub fn get_fdm_1d_meshers(&self) -> &[Fdm1dMesher] {
        &self.meshers
    }

    /// Coordinate of `iter` along `direction`.
    #[inline]
    pub fn location(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real {
        self.meshers[direction].locations()[iter.coordinate(direction)]
    }

    /// Forward spacing at `iter` along `direction`.
    #[inline]
    pub fn dplus(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real {
        self.meshers[direction].dplus(iter.coordinate(direction))
    }

    /// Backward spacing at `iter` along `direction`.
    #[inline]
    pub fn dminus(&self, iter: &FdmLinearOpIterator, direction: usize) -> Real {
        self.meshers[direction].dminus(iter.coordinate(direction))
    }

    /// The `direction` coordinate of every node, in layout order.
    pub fn locations(&self, direction: usize) -> Array {
        self.layout
            .iter()
            .map(|iter| self.location(&iter, direction))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::{Predefined1dMesher, Uniform1dMesher};

    #[test]
    fn locations_follow_the_layout() {
        let m = FdmMesherComposite::from_pair(
            Uniform1dMesher::new(0.0, 1.0, 3).unwrap(),
            Predefined1dMesher::new(vec![10.0, 20.0]).unwrap(),
        )
        .unwrap();
        assert_eq!(m.layout().size(), 6);
        assert_eq!(m.locations(0).to_vec(), vec![0.0, 0.5, 1.0, 0.0, 0.5, 1.0]);
        assert_eq!(
            m.locations(1).to_vec(),
            vec![10.0, 10.0, 10.0, 20.0, 20.0, 20.0]
        );
        let it = m.layout().iter_at(4);
        assert_eq!(m.location(&it, 0), 0.5);
        assert_eq!(m.dplus(&it, 0), 0.5);
        assert!(m.dplus(&it, 1).is_nan());
        assert_eq!(m.dminus(&it, 1), 10.0);
    }

    #[test]
    fn too_many_dimensions_are_rejected() {
        let u = || Fdm1dMesher::from_locations(vec![0.0, 1.0]).unwrap();
        assert!(FdmMesherComposite::new(vec![u(), u(), u(), u(), u()]).is_err());
        assert!(FdmMesherComposite::new(vec![]).is_err());
    }
}
