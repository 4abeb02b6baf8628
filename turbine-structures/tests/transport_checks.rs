use approx::assert_relative_eq;
use turbine_structures::optim::NonlinearProblem;
use turbine_structures::prelude::*;

fn properties() -> StationProperties {
    StationProperties {
        ea: 2.0e10,
        eixx: 1.2e10,
        eiyy: 6.0e9,
        gj: 5.0e8,
        rho_a: 400.0,
        rho_j: 50.0,
    }
}

fn straight_blade(length: f64, fiber: f64) -> BladeStructure {
    BladeStructure::prismatic(length, 21, properties(), FiberDistances::uniform(21, fiber, fiber))
}

#[test]
fn zero_load_constraints_are_slack() {
    let config = RailTransportConfig::default();
    let transport = RailTransport::with_defaults(config);
    let blade = straight_blade(10.0, 0.2);
    let problem = transport.problem(&blade).unwrap();

    let x = vec![0.0; problem.n_stations() + 1];
    let g = problem.constraints(&x).unwrap();
    assert_eq!(g.len(), 3 * 21);
    for &strain_margin in &g[..21] {
        assert_relative_eq!(strain_margin, config.max_strains * 1.0e3);
    }
    assert!(g[21..].iter().all(|&margin| margin > 0.0));
    assert_eq!(problem.objective(&x).unwrap(), 0.0);
}

#[test]
fn uniform_blade_finds_feasible_rotation() {
    let transport = RailTransport::with_defaults(RailTransportConfig::default());
    let blade = straight_blade(40.0, 0.5);
    let result = transport.run(&blade).unwrap();

    // a prismatic blade has no strain-limited load to apply
    assert!(result.load.iter().all(|&q| q == 0.0));
    assert_eq!(result.reaction_force, 0.0);
    assert_eq!(result.lv_constraint_4axle, 0.0);
    assert_eq!(result.lv_constraint_8axle, 0.0);
    // unrotated the tip hits the envelope; the clear band is about -11.7 to -4.4 deg
    assert!(
        result.root_rotation_deg > -12.0 && result.root_rotation_deg < -4.0,
        "rotation {}",
        result.root_rotation_deg
    );

    let problem = transport.problem(&blade).unwrap();
    let mut x = result.load_factors.clone();
    x.push(result.root_rotation_deg.to_radians());
    let g = problem.constraints(&x).unwrap();
    assert!(g.iter().all(|&margin| margin > -1.0e-3));
}

/// Flapwise stiffness falling towards the tip, so the strain-limited
/// load is positive along the span
fn tapered_blade(length: f64) -> BladeStructure {
    let mut blade = straight_blade(length, 0.5);
    blade.eiyy = blade
        .span()
        .iter()
        .map(|r| 1.0e6 * (1.2 * length - r).powi(2))
        .collect();
    blade
}

#[test]
fn tapered_blade_needs_support_load() {
    let config = RailTransportConfig::default();
    let transport = RailTransport::with_defaults(config);

    for length in [70.0, 80.0] {
        let blade = tapered_blade(length);
        let problem = transport.problem(&blade).unwrap();
        // too long to clear the turn on root rotation alone
        for k in -60..=60 {
            let deg = 0.25 * k as f64;
            let mut x = vec![0.0; problem.n_stations()];
            x.push(deg.to_radians());
            let g = problem.constraints(&x).unwrap();
            assert!(
                g.iter().any(|&margin| margin < 0.0),
                "{} m at {} deg",
                length,
                deg
            );
        }

        let result = transport
            .run(&blade)
            .unwrap_or_else(|e| panic!("{} m blade: {}", length, e));

        assert!(result.load_factors.iter().any(|&f| f > 0.0));
        assert!(result.load_factors.iter().all(|&f| (0.0..=1.0).contains(&f)));
        assert!(result.load.iter().any(|&q| q > 0.0));
        assert!(result.reaction_force > 0.0);
        assert!(result.root_rotation_deg.abs() <= config.max_root_rot_deg);
        for &eps in &result.strain {
            assert!(eps.abs() <= config.max_strains + 1.0e-7, "strain {}", eps);
        }

        let mut x = result.load_factors.clone();
        x.push(result.root_rotation_deg.to_radians());
        let g = problem.constraints(&x).unwrap();
        assert!(
            g.iter().all(|&margin| margin >= -1.0e-4),
            "{} m blade: worst margin {}",
            length,
            g.iter().fold(f64::INFINITY, |m, &v| m.min(v))
        );

        let full = problem.evaluate(&problem.initial_guess()).unwrap();
        assert!(result.reaction_force <= full.reaction_force);
        let truck_weight = config.max_flatcar_weight_4axle * config.gravity;
        assert_relative_eq!(
            result.lv_constraint_4axle,
            result.reaction_force / truck_weight / config.max_lv,
            max_relative = 1e-12
        );
    }
}

#[test]
fn tight_clearance_does_not_converge() {
    let config = RailTransportConfig::default().with_lateral_clearance(0.01);
    let transport = RailTransport::with_defaults(config);
    let err = transport.run(&straight_blade(40.0, 0.5)).unwrap_err();
    match err {
        StructuresError::OptimizationDidNotConverge { constraint, .. } => {
            assert!(constraint.contains("envelope"), "{}", constraint);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn bent_blade_is_rejected() {
    let mut blade = straight_blade(40.0, 0.5);
    blade.ref_axis[20][0] = -2.5;
    let transport = RailTransport::with_defaults(RailTransportConfig::default());
    assert!(matches!(
        transport.run(&blade).unwrap_err(),
        StructuresError::NonStraightBlade {
            axis: 'x',
            station: 20,
            ..
        }
    ));
}

#[test]
fn fibres_from_outlines_feed_the_problem() {
    let outline = SectionOutline {
        coords: vec![[1.0, 0.0], [0.5, 0.08], [0.0, 0.0], [0.5, -0.04], [1.0, 0.0]],
        pitch_axis: 0.25,
        twist_deg: 0.0,
        chord: 2.5,
        x_ec: 0.1,
        y_ec: 0.02,
    };
    let fibers = FiberDistances::from_outlines(&vec![outline; 21]).unwrap();
    assert_relative_eq!(fibers.suction[0], 0.2 - 0.02, epsilon = 1e-12);
    assert_relative_eq!(fibers.pressure[0], 0.02 + 0.1, epsilon = 1e-12);

    let blade = BladeStructure::prismatic(10.0, 21, properties(), fibers);
    let transport = RailTransport::with_defaults(RailTransportConfig::default());
    let problem = transport.problem(&blade).unwrap();
    let state = problem.evaluate(&vec![0.0; 22]).unwrap();
    assert!(state.margins.outer.iter().all(|&g| g > 0.0));
    assert!(state.margins.inner.iter().all(|&g| g > 0.0));
}

#[test]
fn narrow_turn_geometry_is_rejected() {
    let config = RailTransportConfig::default().with_lateral_clearance(500.0);
    let transport = RailTransport::with_defaults(config);
    assert!(matches!(
        transport.run(&straight_blade(10.0, 0.2)).unwrap_err(),
        StructuresError::InvalidInput(_)
    ));
}
