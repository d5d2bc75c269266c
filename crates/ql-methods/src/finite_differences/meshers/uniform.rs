use ql_core::{errors::Error, errors::Result, Real};

use super::Fdm1dMesher;

/// Equidistant grid on `[start, end]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform1dMesher {
    mesher: Fdm1dMesher,
}

impl Uniform1dMesher {
    /// `size` equidistant nodes; the last one is exactly `end`.
    pub fn new(start: Real, end: Real, size: usize) -> Result<Self> {
        if size < 2 || !(end > start) {
            return Err(Error::InsufficientMesher(format!(
                "uniform mesher needs size >= 2 and end > start, got size {size} on [{start}, {end}]"
            )));
        }
        let dx = (end - start) / (size - 1) as Real;
        let mut locations: Vec<Real> = (0..size).map(|i| start + i as Real * dx).collect();
        locations[size - 1] = end;
        Ok(Self {
            mesher: Fdm1dMesher::from_locations(locations)?,
        })
    }
}

impl_fdm_1d_mesher!(Uniform1dMesher);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn equidistant_nodes() {
        let m = Uniform1dMesher::new(-1.0, 2.0, 7).unwrap();
        assert_eq!(m.size(), 7);
        assert_eq!(m.lower_bound(), -1.0);
        assert_eq!(m.upper_bound(), 2.0);
        for i in 0..6 {
            assert_abs_diff_eq!(m.dplus(i), 0.5, epsilon = 1e-14);
        }
    }

    #[test]
    fn rejects_bad_bounds() {
        assert!(matches!(
            Uniform1dMesher::new(1.0, 1.0, 10),
            Err(Error::InsufficientMesher(_))
        ));
        assert!(Uniform1dMesher::new(0.0, 1.0, 1).is_err());
    }
}
