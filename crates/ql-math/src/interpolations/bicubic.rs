//! Bicubic spline interpolation on a rectangular grid.
//!
//! For each row of the grid, a natural cubic spline is built along `x`.
//! For a query `(x, y)` the row splines are evaluated at `x` and the
//! resulting column is itself interpolated along `y`.

use ql_core::{errors::Result, Real};

use super::{check_abscissae, CubicNaturalSpline, Interpolation1D};

/// 2D interpolation trait.
pub trait Interpolation2D: std::fmt::Debug + Send + Sync {
    /// Evaluate the surface at `(x, y)`.
    fn operator(&self, x: Real, y: Real) -> Real;
    /// Lower bound of the x domain.
    fn x_min(&self) -> Real;
    /// Upper bound of the x domain.
    fn x_max(&self) -> Real;
    /// Lower bound of the y domain.
    fn y_min(&self) -> Real;
    /// Upper bound of the y domain.
    fn y_max(&self) -> Real;

    /// Return `true` if `(x, y)` lies within the grid.
    fn is_in_range(&self, x: Real, y: Real) -> bool {
        x >= self.x_min() && x <= self.x_max() && y >= self.y_min() && y <= self.y_max()
    }
}

/// Bicubic spline interpolation on a rectangular grid.
///
/// `z` is stored with `x` running fastest: `z[j * nx + i]` = f(xs\[i\], ys\[j\]).
#[derive(Debug, Clone)]
pub struct BicubicSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    /// One cubic spline per y-row, interpolating along x.
    row_splines: Vec<CubicNaturalSpline>,
}

impl BicubicSpline {
    /// Build a bicubic spline on the grid `(xs × ys → z)`.
    pub fn new(xs: &[Real], ys: &[Real], z: &[Real]) -> Result<Self> {
        let nx = xs.len();
        let ny = ys.len();
        ql_core::ensure!(
            z.len() == nx * ny,
            "z length ({}) must equal nx*ny ({}*{}={})",
            z.len(),
            nx,
            ny,
            nx * ny
        );
        check_abscissae(xs, &xs[..], 2)?;
        check_abscissae(ys, &ys[..], 2)?;

        let row_splines = (0..ny)
            .map(|j| CubicNaturalSpline::from_sorted(xs, &z[j * nx..(j + 1) * nx]))
            .collect();

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            row_splines,
        })
    }

    fn column<F: Fn(&CubicNaturalSpline) -> Real>(&self, f: F) -> CubicNaturalSpline {
        let column: Vec<Real> = self.row_splines.iter().map(f).collect();
        CubicNaturalSpline::from_sorted(&self.ys, &column)
    }

    /// ∂f/∂x at `(x, y)`.
    pub fn derivative_x(&self, x: Real, y: Real) -> Real {
        self.column(|s| s.derivative(x)).operator(y)
    }

    /// ∂f/∂y at `(x, y)`.
    pub fn derivative_y(&self, x: Real, y: Real) -> Real {
        self.column(|s| s.operator(x)).derivative(y)
    }

    /// ∂²f/∂x² at `(x, y)`.
    pub fn second_derivative_x(&self, x: Real, y: Real) -> Real {
        self.column(|s| s.second_derivative(x)).operator(y)
    }

    /// ∂²f/∂y² at `(x, y)`.
    pub fn second_derivative_y(&self, x: Real, y: Real) -> Real {
        self.column(|s| s.operator(x)).second_derivative(y)
    }

    /// ∂²f/∂x∂y at `(x, y)`.
    pub fn derivative_xy(&self, x: Real, y: Real) -> Real {
        self.column(|s| s.derivative(x)).derivative(y)
    }
}

impl Interpolation2D for BicubicSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn y_min(&self) -> Real {
        self.ys[0]
    }

    fn y_max(&self) -> Real {
        self.ys[self.ys.len() - 1]
    }

    fn operator(&self, x: Real, y: Real) -> Real {
        self.column(|s| s.operator(x)).operator(y)
    }
}
