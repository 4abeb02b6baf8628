use approx::assert_relative_eq;
use frame_solver::prelude::*;
use std::f64::consts::PI;

const RIGID: f64 = 1e30;

fn tower_section() -> SectionProperties {
    SectionProperties::tube(4.0, 0.03, 200e9, 79.3e9, 7850.0)
}

fn tower(n_elements: usize, height: f64, options: AnalysisOptions) -> Frame {
    let nodes = (0..=n_elements)
        .map(|i| Node::new(i, 0.0, 0.0, height * i as f64 / n_elements as f64, 2.0))
        .collect();
    let elements = (0..n_elements)
        .map(|i| Element::new(i, i, i + 1, tower_section()))
        .collect();
    Frame::new(nodes, vec![Reaction::rigid(0, RIGID)], elements, options)
}

#[test]
fn tower_with_head_mass_first_frequency() {
    let (n, height, m_top) = (10, 50.0, 200_000.0);
    let mut frame = tower(n, height, AnalysisOptions::default().with_shear(false));
    frame.change_extra_node_mass(vec![ExtraNodeMass::point(n, m_top)], false);
    frame.enable_dynamics(4, 1e-9);

    let results = DirectStiffnessSolver.run(&frame).unwrap();
    let modal = results.modal.unwrap();

    let s = tower_section();
    let m_beam = s.mass_per_length() * height;
    let k = 3.0 * s.e * s.iy / height.powi(3);
    let expected = (k / (m_top + 0.2357 * m_beam)).sqrt() / (2.0 * PI);

    assert_eq!(modal.frequencies.len(), 4);
    assert_relative_eq!(modal.frequencies[0], expected, max_relative = 0.02);
    // fore-aft and side-side modes of a round tower coincide
    assert_relative_eq!(modal.frequencies[0], modal.frequencies[1], max_relative = 1e-6);
    assert!(modal.frequencies.windows(2).all(|w| w[0] <= w[1]));
    assert_relative_eq!(modal.total_mass, m_beam + m_top, max_relative = 1e-12);
    assert_eq!(modal.mode_shapes[0].len(), (n + 1) * 6);
}

#[test]
fn tripod_reactions_balance_loads() {
    let nodes = vec![
        Node::new(0, 10.0, 0.0, 0.0, 0.5),
        Node::new(1, -5.0, 8.66, 0.0, 0.5),
        Node::new(2, -5.0, -8.66, 0.0, 0.5),
        Node::new(3, 0.0, 0.0, 12.0, 0.5),
    ];
    let section = SectionProperties::tube(0.8, 0.02, 200e9, 79.3e9, 7850.0);
    let elements = vec![
        Element::new(0, 0, 3, section),
        Element::new(1, 1, 3, section),
        Element::new(2, 2, 3, section),
    ];
    let reactions = (0..3).map(|i| Reaction::rigid(i, RIGID)).collect();
    let mut frame = Frame::new(nodes.clone(), reactions, elements.clone(), AnalysisOptions::default());

    let gravity = [0.0, 0.0, -9.80633];
    let load = PointLoad::new(3, [2.0e5, -1.0e5, -5.0e5], [0.0, 3.0e5, 1.0e4]);
    let mut case = StaticLoadCase::new(gravity);
    case.add_point_load(load);
    frame.add_load_case(case);

    let results = DirectStiffnessSolver.run(&frame).unwrap();
    let rxns = &results.load_cases[0].reactions;

    let mut total_force = load.force;
    let mut total_moment = load.moment;
    let apex = nodes[3].coords();
    let add_moment = |m: &mut [f64; 3], r: [f64; 3], f: [f64; 3]| {
        m[0] += r[1] * f[2] - r[2] * f[1];
        m[1] += r[2] * f[0] - r[0] * f[2];
        m[2] += r[0] * f[1] - r[1] * f[0];
    };
    add_moment(&mut total_moment, apex, load.force);

    for el in &elements {
        let (a, b) = (nodes[el.n1], nodes[el.n2]);
        let w = section.mass_per_length() * a.distance_to(&b);
        let weight = [0.0, 0.0, w * gravity[2]];
        let mid = [(a.x + b.x) / 2.0, (a.y + b.y) / 2.0, (a.z + b.z) / 2.0];
        total_force[2] += weight[2];
        add_moment(&mut total_moment, mid, weight);
    }

    for rxn in rxns {
        let r = nodes[rxn.node].coords();
        for k in 0..3 {
            total_force[k] += rxn.force()[k];
            total_moment[k] += rxn.moment()[k];
        }
        add_moment(&mut total_moment, r, rxn.force());
    }

    // residuals relative to loads of order 1e5 N and 1e6 N·m
    for k in 0..3 {
        assert!(total_force[k].abs() < 1.0, "force residual {:?}", total_force);
        assert!(total_moment[k].abs() < 10.0, "moment residual {:?}", total_moment);
    }
}

#[test]
fn frame_survives_json() {
    let mut frame = tower(3, 30.0, AnalysisOptions::default().with_dynamics(3, 1e-7));
    frame.add_load_case(StaticLoadCase::new([0.0, 0.0, -9.81]));
    let restored = Frame::from_json(&frame.to_json().unwrap()).unwrap();
    assert_eq!(restored.nodes, frame.nodes);
    assert_eq!(restored.reactions, frame.reactions);
    assert_eq!(restored.elements.len(), 3);
    assert_eq!(restored.options.dynamics.map(|d| d.n_modes), Some(3));
    assert_eq!(restored.load_cases, frame.load_cases);
}
