//! Discretisation parameters shared by the finite-difference engines.

use ql_methods::FdmSchemeDesc;

/// Grid sizes, damping and time-stepping scheme of an FD engine.
///
/// `x_grid` is the number of nodes of the first (price) direction and
/// `y_grid` that of the second one: variance for Heston, storage level for
/// the storage engine and the jump factor for the swing engine. The
/// one-factor engines ignore `y_grid`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdGridSpec {
    /// Time steps of the main scheme.
    pub t_grid: usize,
    /// Nodes along the first direction.
    pub x_grid: usize,
    /// Nodes along the second direction.
    pub y_grid: usize,
    /// Implicit Euler steps taken before the main scheme.
    pub damping_steps: usize,
    /// Time-stepping scheme.
    pub scheme: FdmSchemeDesc,
}

impl Default for FdGridSpec {
    fn default() -> Self {
        Self {
            t_grid: 100,
            x_grid: 100,
            y_grid: 50,
            damping_steps: 0,
            scheme: FdmSchemeDesc::hundsdorfer(),
        }
    }
}

impl FdGridSpec {
    /// Grid of the given sizes with the default damping and scheme.
    pub fn new(t_grid: usize, x_grid: usize, y_grid: usize) -> Self {
        Self {
            t_grid,
            x_grid,
            y_grid,
            ..Self::default()
        }
    }

    /// Use `damping_steps` implicit Euler steps.
    pub fn with_damping_steps(mut self, damping_steps: usize) -> Self {
        self.damping_steps = damping_steps;
        self
    }

    /// Use `scheme` for the main rollback.
    pub fn with_scheme(mut self, scheme: FdmSchemeDesc) -> Self {
        self.scheme = scheme;
        self
    }
}
