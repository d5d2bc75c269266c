//! Memory layout of a multi-dimensional grid.
//!
//! A layout maps a multi-index `(i₀, i₁, …)` to a flat offset
//! `Σ iₖ·spacingₖ` with `spacing₀ = 1`, i.e. dimension 0 varies fastest.

use ql_core::{ensure, errors::Result};

/// Layouts support up to this many dimensions.
pub const MAX_DIMENSIONS: usize = 4;

/// Position inside a layout: flat offset plus multi-index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdmLinearOpIterator {
    index: usize,
    coordinates: [usize; MAX_DIMENSIONS],
    ndim: usize,
}

impl FdmLinearOpIterator {
    /// Flat offset.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Multi-index, one entry per dimension.
    #[inline]
    pub fn coordinates(&self) -> &[usize] {
        &self.coordinates[..self.ndim]
    }

    /// Coordinate along `direction`.
    #[inline]
    pub fn coordinate(&self, direction: usize) -> usize {
        self.coordinates[direction]
    }
}

/// Dimension extents, spacings and total size of a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdmLinearOpLayout {
    dim: Vec<usize>,
    spacing: Vec<usize>,
    size: usize,
}

impl FdmLinearOpLayout {
    /// Build a layout from the extent of each dimension.
    pub fn new(dim: &[usize]) -> Result<Self> {
        ensure!(
            !dim.is_empty() && dim.len() <= MAX_DIMENSIONS,
            "layouts support 1 to {MAX_DIMENSIONS} dimensions, got {}",
            dim.len()
        );
        ensure!(
            dim.iter().all(|&d| d > 0),
            "every dimension needs at least one point, got {dim:?}"
        );
        let mut spacing = Vec::with_capacity(dim.len());
        let mut stride = 1;
        for &d in dim {
            spacing.push(stride);
            stride *= d;
        }
        Ok(Self {
            dim: dim.to_vec(),
            spacing,
            size: stride,
        })
    }

    /// Extent of each dimension.
    pub fn dim(&self) -> &[usize] {
        &self.dim
    }

    /// Stride of each dimension in the flat array.
    pub fn spacing(&self) -> &[usize] {
        &self.spacing
    }

    /// Total number of grid points.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.dim.len()
    }

    /// Flat offset of a multi-index.
    pub fn index(&self, coordinates: &[usize]) -> usize {
        coordinates
            .iter()
            .zip(&self.spacing)
            .map(|(c, s)| c * s)
            .sum()
    }

    /// Iterator positioned at flat offset `index`.
    pub fn iter_at(&self, index: usize) -> FdmLinearOpIterator {
        let mut coordinates = [0; MAX_DIMENSIONS];
        let mut rest = index;
        for (k, &d) in self.dim.iter().enumerate() {
            coordinates[k] = rest % d;
            rest /= d;
        }
        FdmLinearOpIterator {
            index,
            coordinates,
            ndim: self.dim.len(),
        }
    }

    /// Traverse the whole index space, dimension 0 fastest.
    pub fn iter(&self) -> LayoutIter<'_> {
        LayoutIter {
            layout: self,
            current: FdmLinearOpIterator {
                index: 0,
                coordinates: [0; MAX_DIMENSIONS],
                ndim: self.dim.len(),
            },
        }
    }

    /// Offset of the neighbour `offset` steps away along `direction`.
    ///
    /// Coordinates falling off the grid are reflected back into it.
    pub fn neighbourhood(
        &self,
        iter: &FdmLinearOpIterator,
        direction: usize,
        offset: isize,
    ) -> usize {
        let c = iter.coordinates[direction];
        let moved = self.reflect(c as isize + offset, direction);
        (iter.index as isize + (moved as isize - c as isize) * self.spacing[direction] as isize)
            as usize
    }

    /// Offset of the neighbour displaced along two directions at once.
    pub fn neighbourhood2(
        &self,
        iter: &FdmLinearOpIterator,
        direction1: usize,
        offset1: isize,
        direction2: usize,
        offset2: isize,
    ) -> usize {
        let c1 = iter.coordinates[direction1];
        let c2 = iter.coordinates[direction2];
        let m1 = self.reflect(c1 as isize + offset1, direction1);
        let m2 = self.reflect(c2 as isize + offset2, direction2);
        (iter.index as isize
            + (m1 as isize - c1 as isize) * self.spacing[direction1] as isize
            + (m2 as isize - c2 as isize) * self.spacing[direction2] as isize) as usize
    }

    fn reflect(&self, c: isize, direction: usize) -> usize {
        let n = self.dim[direction] as isize;
        if n == 1 {
            return 0;
        }
        let mut c = c;
        if c < 0 {
            c = -c;
        } else if c >= n {
            c = 2 * (n - 1) - c;
        }
        c.clamp(0, n - 1) as usize
    }
}

/// Iterator over every position of a layout.
#[derive(Debug, Clone)]
pub struct LayoutIter<'a> {
    layout: &'a FdmLinearOpLayout,
    current: FdmLinearOpIterator,
}

impl Iterator for LayoutIter<'_> {
    type Item = FdmLinearOpIterator;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.index >= self.layout.size {
            return None;
        }
        let out = self.current;
        self.current.index += 1;
        for k in 0..self.layout.dim.len() {
            self.current.coordinates[k] += 1;
            if self.current.coordinates[k] < self.layout.dim[k] {
                break;
            }
            self.current.coordinates[k] = 0;
        }
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.layout.size.saturating_sub(self.current.index);
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for LayoutIter<'_> {}

impl<'a> IntoIterator for &'a FdmLinearOpLayout {
    type Item = FdmLinearOpIterator;
    type IntoIter = LayoutIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
