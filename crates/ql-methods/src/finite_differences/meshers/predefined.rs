use ql_core::{errors::Result, Real};

use super::Fdm1dMesher;

/// Grid given literally by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Predefined1dMesher {
    mesher: Fdm1dMesher,
}

impl Predefined1dMesher {
    /// `values` must be strictly increasing with at least two entries.
    pub fn new(values: Vec<Real>) -> Result<Self> {
        Ok(Self {
            mesher: Fdm1dMesher::from_locations(values)?,
        })
    }
}

impl_fdm_1d_mesher!(Predefined1dMesher);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_the_given_values() {
        let m = Predefined1dMesher::new(vec![0.0, 0.5, 2.0, 10.0]).unwrap();
        assert_eq!(m.locations(), &[0.0, 0.5, 2.0, 10.0]);
        assert_eq!(m.dminus(3), 8.0);
        assert!(Predefined1dMesher::new(vec![2.0, 1.0]).is_err());
    }
}
