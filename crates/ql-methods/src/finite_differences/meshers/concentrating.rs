//! Non-uniform grid concentrated around one or more critical points.
//!
//! With a single point `c` the nodes follow
//!
//! ```text
//! x(u) = c + d·sinh(c1·(1-u) + c2·u),   d = density·(end-start)
//! ```
//!
//! with `c1`, `c2` chosen so that `x(0) = start` and `x(1) = end`. With
//! several points the grid solves `dx/du = a / sqrt(Σ 1/(βᵢ + (x-pᵢ)²))`,
//! `βᵢ = (densityᵢ·(end-start))²`, the speed `a` being calibrated so the
//! solution ends exactly at `end`.

use ql_core::{errors::Error, errors::Result, Real};
use ql_math::{
    brent, close_enough, interpolations::Interpolation1D, ode::integrate_scalar,
    LinearInterpolation,
};

use super::Fdm1dMesher;

/// Default accuracy of the multi-point ODE integration.
const ODE_TOLERANCE: Real = 1e-8;

/// Concentration target of a [`Concentrating1dMesher`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriticalPoint {
    /// Location the nodes cluster around.
    pub point: Real,
    /// Relative width of the cluster; smaller is tighter.
    pub density: Real,
    /// Whether `point` must be a grid node.
    pub required: bool,
}

impl CriticalPoint {
    /// Convenience constructor.
    pub fn new(point: Real, density: Real, required: bool) -> Self {
        Self {
            point,
            density,
            required,
        }
    }
}

/// Grid concentrated around critical points.
#[derive(Debug, Clone, PartialEq)]
pub struct Concentrating1dMesher {
    mesher: Fdm1dMesher,
}

impl Concentrating1dMesher {
    /// Single critical point `(c, density)`; uniform when `c_point` is `None`.
    ///
    /// When `require_c_point` is set, `c` is moved exactly onto the interior
    /// node nearest to its natural position in the sinh mapping.
    pub fn new(
        start: Real,
        end: Real,
        size: usize,
        c_point: Option<(Real, Real)>,
        require_c_point: bool,
    ) -> Result<Self> {
        check_bounds(start, end, size)?;
        let Some((c, density)) = c_point else {
            return uniform(start, end, size);
        };
        check_point(start, end, c, density)?;

        let d = density * (end - start);
        let c1 = ((start - c) / d).asinh();
        let c2 = ((end - c) / d).asinh();
        let n1 = (size - 1) as Real;

        // piecewise-linear reparametrisation through (u0, z0) pinning c on a node
        let pin = if require_c_point && !close_enough(c, start, 42) && !close_enough(c, end, 42)
        {
            if size < 3 {
                return Err(Error::InvalidCriticalPoint(format!(
                    "required point {c} cannot be placed on a grid of {size} nodes"
                )));
            }
            let z0 = -c1 / (c2 - c1);
            let u0 = ((z0 * n1).round()).clamp(1.0, n1 - 1.0) / n1;
            Some((u0, z0))
        } else {
            None
        };

        let mut locations = Vec::with_capacity(size);
        locations.push(start);
        for i in 1..size - 1 {
            let u = i as Real / n1;
            let z = match pin {
                Some((u0, z0)) if u <= u0 => u * z0 / u0,
                Some((u0, z0)) => z0 + (u - u0) * (1.0 - z0) / (1.0 - u0),
                None => u,
            };
            locations.push(c + d * (c1 * (1.0 - z) + c2 * z).sinh());
        }
        locations.push(end);

        if let Some((u0, _)) = pin {
            // the sinh evaluates to c up to rounding; make it exact
            let j = (u0 * n1).round() as usize;
            locations[j] = c;
        }

        Ok(Self {
            mesher: Fdm1dMesher::from_locations(locations)?,
        })
    }

    /// Several critical points, integrated with accuracy `tol`.
    ///
    /// Every required point replaces the interior node closest to it.
    pub fn with_points(
        start: Real,
        end: Real,
        size: usize,
        points: &[CriticalPoint],
        tol: Option<Real>,
    ) -> Result<Self> {
        check_bounds(start, end, size)?;
        if points.is_empty() {
            return uniform(start, end, size);
        }
        for p in points {
            check_point(start, end, p.point, p.density)?;
        }
        let tol = tol.unwrap_or(ODE_TOLERANCE);

        let width = end - start;
        let betas: Vec<(Real, Real)> = points
            .iter()
            .map(|p| (p.point, (p.density * width).powi(2)))
            .collect();
        let speed = |a: Real, y: Real| -> Real {
            let s: Real = betas.iter().map(|(p, b)| 1.0 / (b + (y - p).powi(2))).sum();
            a / s.sqrt()
        };
        let end_of = |a: Real| integrate_scalar(|_, y| speed(a, y), 0.0, start, 1.0, tol) - end;

        // the single-point answer is exact for one point and a fair guess otherwise
        let a_init = betas
            .iter()
            .map(|(p, b)| {
                let d = b.sqrt();
                ((end - p) / d).asinh() - ((start - p) / d).asinh()
            })
            .sum::<Real>()
            / betas.len() as Real;

        let mut hi = a_init.max(tol);
        let mut expansions = 0;
        while end_of(hi) < 0.0 {
            hi *= 2.0;
            expansions += 1;
            if expansions > 60 {
                return Err(Error::InvalidCriticalPoint(format!(
                    "unable to calibrate the concentration speed on [{start}, {end}]"
                )));
            }
        }
        let lo = if expansions == 0 { 0.0 } else { 0.5 * hi };
        let a = brent(end_of, lo, hi, tol)?;

        let n1 = (size - 1) as Real;
        let u: Vec<Real> = (0..size).map(|i| i as Real / n1).collect();
        let mut y = Vec::with_capacity(size);
        y.push(start);
        for i in 1..size {
            let next = integrate_scalar(|_, v| speed(a, v), u[i - 1], y[i - 1], u[i], tol);
            y.push(next);
        }
        let drift = y[size - 1] - end;
        for (i, yi) in y.iter_mut().enumerate() {
            *yi -= u[i] * drift;
        }

        let ode = LinearInterpolation::new(&u, &y)?;
        let inverse = LinearInterpolation::new(&y, &u)?;

        let mut pins: Vec<(Real, Real)> = vec![(0.0, 0.0), (1.0, 1.0)];
        let mut snaps: Vec<(usize, Real)> = Vec::new();
        for p in points.iter().filter(|p| p.required) {
            if close_enough(p.point, start, 42) || close_enough(p.point, end, 42) {
                continue;
            }
            if size < 3 {
                return Err(Error::InvalidCriticalPoint(format!(
                    "required point {} cannot be placed on a grid of {size} nodes",
                    p.point
                )));
            }
            let nearest = y
                .iter()
                .enumerate()
                .min_by(|a, b| (a.1 - p.point).abs().total_cmp(&(b.1 - p.point).abs()))
                .map_or(1, |(j, _)| j)
                .clamp(1, size - 2);
            pins.push((u[nearest], inverse.operator(p.point)));
            snaps.push((nearest, p.point));
        }
        pins.sort_by(|a, b| a.0.total_cmp(&b.0));
        if pins
            .windows(2)
            .any(|w| w[1].0 <= w[0].0 || w[1].1 <= w[0].1)
        {
            return Err(Error::InvalidCriticalPoint(
                "required points are too close to be placed on distinct nodes".into(),
            ));
        }
        let (pu, pz): (Vec<Real>, Vec<Real>) = pins.into_iter().unzip();
        let transform = LinearInterpolation::new(&pu, &pz)?;

        let mut locations: Vec<Real> = u
            .iter()
            .map(|&ui| ode.operator(transform.operator(ui)))
            .collect();
        locations[0] = start;
        locations[size - 1] = end;
        for (k, point) in snaps {
            locations[k] = point;
        }

        Ok(Self {
            mesher: Fdm1dMesher::from_locations(locations)?,
        })
    }
}

impl_fdm_1d_mesher!(Concentrating1dMesher);

fn check_bounds(start: Real, end: Real, size: usize) -> Result<()> {
    if size < 2 || !(end > start) {
        return Err(Error::InsufficientMesher(format!(
            "concentrating mesher needs size >= 2 and end > start, got size {size} on [{start}, {end}]"
        )));
    }
    Ok(())
}

fn check_point(start: Real, end: Real, c: Real, density: Real) -> Result<()> {
    if !(start..=end).contains(&c) {
        return Err(Error::InvalidCriticalPoint(format!(
            "critical point {c} lies outside [{start}, {end}]"
        )));
    }
    if !(density > 0.0) {
        return Err(Error::InvalidCriticalPoint(format!(
            "density must be positive, got {density}"
        )));
    }
    Ok(())
}

fn uniform(start: Real, end: Real, size: usize) -> Result<Concentrating1dMesher> {
    let dx = (end - start) / (size - 1) as Real;
    let mut locations: Vec<Real> = (0..size).map(|i| start + i as Real * dx).collect();
    locations[size - 1] = end;
    Ok(Concentrating1dMesher {
        mesher: Fdm1dMesher::from_locations(locations)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn strictly_increasing(xs: &[Real]) -> bool {
        xs.windows(2).all(|w| w[1] > w[0])
    }

    #[test]
    fn without_point_is_uniform() {
        let m = Concentrating1dMesher::new(0.0, 1.0, 11, None, false).unwrap();
        for i in 0..10 {
            assert_abs_diff_eq!(m.dplus(i), 0.1, epsilon = 1e-14);
        }
    }

    #[test]
    fn clusters_around_the_point() {
        let m = Concentrating1dMesher::new(-1.0, 1.0, 41, Some((0.3, 0.05)), false).unwrap();
        assert!(strictly_increasing(m.locations()));
        assert_eq!(m.lower_bound(), -1.0);
        assert_eq!(m.upper_bound(), 1.0);
        let near = m
            .locations()
            .windows(2)
            .map(|w| w[1] - w[0])
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap()
            .0;
        assert!((m.locations()[near] - 0.3).abs() < 0.05);
        // spacing near the point is much finer than at the edges
        assert!(m.dplus(near) * 5.0 < m.dplus(0));
    }

    #[test]
    fn required_point_is_a_node() {
        for &(c, density) in &[(0.3, 0.1), (-0.77, 0.01), (0.999, 0.2), (0.0, 1.0)] {
            let m = Concentrating1dMesher::new(-1.0, 1.0, 30, Some((c, density)), true).unwrap();
            assert!(strictly_increasing(m.locations()));
            assert!(
                m.locations().iter().any(|&x| x == c),
                "{c} is not a node of {:?}",
                m.locations()
            );
        }
    }

    #[test]
    fn multi_point_reduces_to_single_point() {
        let single = Concentrating1dMesher::new(0.0, 2.0, 21, Some((0.8, 0.1)), false).unwrap();
        let multi = Concentrating1dMesher::with_points(
            0.0,
            2.0,
            21,
            &[CriticalPoint::new(0.8, 0.1, false)],
            None,
        )
        .unwrap();
        for (a, b) in single.locations().iter().zip(multi.locations()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn multi_point_required_nodes() {
        let points = [
            CriticalPoint::new(4.2, 0.05, true),
            CriticalPoint::new(4.9, 0.05, true),
        ];
        let m = Concentrating1dMesher::with_points(3.0, 6.0, 60, &points, None).unwrap();
        assert!(strictly_increasing(m.locations()));
        for p in &points {
            assert!(m.locations().iter().any(|&x| x == p.point));
        }
    }

    #[test]
    fn invalid_points_are_rejected() {
        assert!(matches!(
            Concentrating1dMesher::new(0.0, 1.0, 10, Some((1.5, 0.1)), false),
            Err(Error::InvalidCriticalPoint(_))
        ));
        assert!(matches!(
            Concentrating1dMesher::new(0.0, 1.0, 10, Some((0.5, 0.0)), false),
            Err(Error::InvalidCriticalPoint(_))
        ));
        assert!(matches!(
            Concentrating1dMesher::new(1.0, 0.0, 10, Some((0.5, 0.1)), false),
            Err(Error::InsufficientMesher(_))
        ));
        assert!(matches!(
            Concentrating1dMesher::new(0.0, 1.0, 2, Some((0.5, 0.1)), true),
            Err(Error::InvalidCriticalPoint(_))
        ));
    }
}
