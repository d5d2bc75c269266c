//! Forward evolution of the square-root (CIR) density against its closed
//! form, and mass conservation under every transformation.

use std::sync::Arc;

use ql_core::Real;
use ql_math::Array;
use ql_methods::finite_differences::utilities::SquareRootProcessRNDCalculator;
use ql_methods::finite_differences::{
    FdmBackwardSolver, FdmBoundaryConditionSet, FdmMesherComposite, FdmMesherIntegral,
    FdmSchemeDesc, FdmSquareRootFwdOp, FdmSquareRootFwdOpTransformation,
    FdmStepConditionComposite, Uniform1dMesher,
};

const KAPPA: Real = 1.2;
const THETA: Real = 0.4;
const SIGMA: Real = 0.7;
const V0: Real = 0.4;

fn mesher(start: Real, end: Real, n: usize) -> Arc<FdmMesherComposite> {
    let m = Uniform1dMesher::new(start, end, n).unwrap();
    Arc::new(FdmMesherComposite::from_mesher(m).unwrap())
}

/// Evolve `p` from `t0` to `t1`; the forward operator is autonomous.
fn evolve(op: &mut FdmSquareRootFwdOp, p: &mut Array, t0: Real, t1: Real, steps: usize) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let mut bc_set = FdmBoundaryConditionSet::new();
    let mut condition = FdmStepConditionComposite::default();
    FdmBackwardSolver::new(op, &mut bc_set, &mut condition, FdmSchemeDesc::douglas())
        .rollback(p, t1, t0, steps, 0)
        .unwrap();
}

#[test]
fn plain_density_matches_the_transition_law() {
    let m = mesher(0.0, 3.0, 400);
    let mut op = FdmSquareRootFwdOp::new(
        &m,
        KAPPA,
        THETA,
        SIGMA,
        0,
        FdmSquareRootFwdOpTransformation::Plain,
    )
    .unwrap();
    let rnd = SquareRootProcessRNDCalculator::new(V0, KAPPA, THETA, SIGMA).unwrap();

    let dt = 0.005;
    let t0 = 20.0 * dt;
    let v = m.locations(0);
    let mut p: Array = v.iter().map(|&v| rnd.pdf(v, t0).unwrap()).collect();
    evolve(&mut op, &mut p, t0, 1.0, 180);

    for (i, &vi) in v.iter().enumerate() {
        let expected = rnd.pdf(vi, 1.0).unwrap();
        assert!(
            (p[i] - expected).abs() < 2e-3,
            "v = {vi}: calculated {}, expected {expected}",
            p[i]
        );
    }
}

#[test]
fn mass_is_conserved_for_every_transformation() {
    let rnd = SquareRootProcessRNDCalculator::new(V0, KAPPA, THETA, SIGMA).unwrap();
    let t0 = 0.1;
    for transformation in [
        FdmSquareRootFwdOpTransformation::Plain,
        FdmSquareRootFwdOpTransformation::Log,
        FdmSquareRootFwdOpTransformation::Power,
    ] {
        let m = match transformation {
            FdmSquareRootFwdOpTransformation::Plain => mesher(0.0, 3.0, 200),
            FdmSquareRootFwdOpTransformation::Power => mesher(1e-4, 3.0, 200),
            FdmSquareRootFwdOpTransformation::Log => mesher(-8.0, 3f64.ln(), 200),
        };
        let mut op = FdmSquareRootFwdOp::new(&m, KAPPA, THETA, SIGMA, 0, transformation).unwrap();
        let alpha = op.alpha();
        let mut u: Array = m
            .locations(0)
            .iter()
            .map(|&z| match transformation {
                FdmSquareRootFwdOpTransformation::Plain => rnd.pdf(z, t0).unwrap(),
                FdmSquareRootFwdOpTransformation::Log => {
                    let v = z.exp();
                    v * rnd.pdf(v, t0).unwrap()
                }
                FdmSquareRootFwdOpTransformation::Power => {
                    z.powf(alpha) * rnd.pdf(z, t0).unwrap()
                }
            })
            .collect();
        evolve(&mut op, &mut u, t0, 2.0, 200);

        let weights: Array = (0..m.layout().size()).map(|i| op.weight(i)).collect();
        let mass = FdmMesherIntegral::simpson(Arc::clone(&m)).integrate(&(&u * &weights));
        assert!((mass - 1.0).abs() < 5e-3, "{transformation:?}: mass {mass}");
    }
}

#[test]
fn long_run_density_approaches_the_stationary_law() {
    let m = mesher(0.0, 3.0, 200);
    let mut op = FdmSquareRootFwdOp::new(
        &m,
        KAPPA,
        THETA,
        SIGMA,
        0,
        FdmSquareRootFwdOpTransformation::Plain,
    )
    .unwrap();
    let rnd = SquareRootProcessRNDCalculator::new(0.1, KAPPA, THETA, SIGMA).unwrap();
    let v = m.locations(0);
    let mut p: Array = v.iter().map(|&v| rnd.pdf(v, 0.1).unwrap()).collect();
    evolve(&mut op, &mut p, 0.1, 10.0, 500);

    for (i, &vi) in v.iter().enumerate().skip(1) {
        let expected = rnd.stationary_pdf(vi).unwrap();
        assert!((p[i] - expected).abs() < 1e-2, "v = {vi}: {} vs {expected}", p[i]);
    }
}
