//! No-flux boundary for finite-volume forward operators.
//!
//! A forward operator written in flux form evolves cell averages by
//! `du_i/dt = (F_{i-1/2} - F_{i+1/2}) / (w_i·Δ_i)`. Closing the outer face
//! (`F = 0` there) leaves the boundary row as a combination of the boundary
//! node and its first interior neighbour only.

use ql_core::{errors::Result, Real};
use ql_math::Array;

use super::FdmBoundarySide;
use crate::finite_differences::operators::FdmLinearOpLayout;

/// Discrete flux through one cell face, `F = left·u_left + right·u_right`,
/// positive in the direction of increasing coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceFlux {
    /// Weight of the node below the face.
    pub left: Real,
    /// Weight of the node above the face.
    pub right: Real,
    /// Coordinate of the face.
    pub location: Real,
}

impl FaceFlux {
    /// Flux for the two adjacent node values.
    #[inline]
    pub fn value(&self, u_left: Real, u_right: Real) -> Real {
        self.left * u_left + self.right * u_right
    }
}

/// Zero-flux closure of one side of a forward operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroFlowBoundary {
    direction: usize,
    side: FdmBoundarySide,
    location: Real,
    cell_weight: Real,
    faces: [FaceFlux; 2],
}

impl ZeroFlowBoundary {
    /// `faces` are the two faces nearest the boundary, outermost first;
    /// `cell_weight` is `w·Δ` of the boundary cell.
    pub fn new(
        direction: usize,
        side: FdmBoundarySide,
        location: Real,
        cell_weight: Real,
        faces: [FaceFlux; 2],
    ) -> Result<Self> {
        ql_core::ensure!(
            cell_weight > 0.0 && cell_weight.is_finite(),
            "boundary cell weight must be positive, got {cell_weight}"
        );
        Ok(Self {
            direction,
            side,
            location,
            cell_weight,
            faces,
        })
    }

    /// Direction the boundary closes.
    pub fn direction(&self) -> usize {
        self.direction
    }

    /// Side the boundary closes.
    pub fn side(&self) -> FdmBoundarySide {
        self.side
    }

    /// `(diagonal, off-diagonal)` of the boundary row; the off-diagonal
    /// multiplies the first interior neighbour.
    pub fn row_coefficients(&self) -> (Real, Real) {
        let f = &self.faces[0];
        match self.side {
            FdmBoundarySide::Lower => (-f.left / self.cell_weight, -f.right / self.cell_weight),
            FdmBoundarySide::Upper => (f.right / self.cell_weight, f.left / self.cell_weight),
        }
    }

    /// Flux through the boundary for every grid line ending on this side.
    ///
    /// The two innermost face fluxes are extrapolated linearly to the
    /// boundary coordinate; a stationary solution gives zero.
    pub fn flux(&self, layout: &FdmLinearOpLayout, u: &Array) -> Array {
        let d = self.direction;
        let (edge, inward) = match self.side {
            FdmBoundarySide::Lower => (0, 1),
            FdmBoundarySide::Upper => (layout.dim()[d] - 1, -1),
        };
        let (z0, z1) = (self.faces[0].location, self.faces[1].location);
        layout
            .iter()
            .filter(|iter| iter.coordinate(d) == edge)
            .map(|iter| {
                let at = |k: isize| u[layout.neighbourhood(&iter, d, inward * k)];
                let (f0, f1) = match self.side {
                    FdmBoundarySide::Lower => (
                        self.faces[0].value(at(0), at(1)),
                        self.faces[1].value(at(1), at(2)),
                    ),
                    FdmBoundarySide::Upper => (
                        self.faces[0].value(at(1), at(0)),
                        self.faces[1].value(at(2), at(1)),
                    ),
                };
                f0 + (f0 - f1) * (self.location - z0) / (z0 - z1)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_flux_is_extrapolated_exactly() {
        // F = u_left on every face; u linear gives a linear flux profile
        let face = |z: Real| FaceFlux {
            left: 1.0,
            right: 0.0,
            location: z,
        };
        let bc = ZeroFlowBoundary::new(
            0,
            FdmBoundarySide::Lower,
            0.0,
            0.5,
            [face(0.5), face(1.5)],
        )
        .unwrap();
        let layout = FdmLinearOpLayout::new(&[4]).unwrap();
        let u = Array::from_slice(&[1.0, 2.0, 3.0, 4.0]);
        let f = bc.flux(&layout, &u);
        assert_eq!(f.size(), 1);
        // faces carry 1 and 2 at z = 0.5, 1.5
        assert_abs_diff_eq!(f[0], 0.5, epsilon = 1e-14);
        assert_eq!(bc.row_coefficients(), (-2.0, -0.0));
    }

    #[test]
    fn rejects_empty_cells() {
        let face = FaceFlux {
            left: 1.0,
            right: 1.0,
            location: 0.0,
        };
        assert!(ZeroFlowBoundary::new(0, FdmBoundarySide::Upper, 0.0, 0.0, [face, face]).is_err());
    }
}
