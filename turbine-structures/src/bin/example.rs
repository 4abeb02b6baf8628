//! Turbine Structures Example - Semi-submersible platform and blade transport

use anyhow::Result;
use turbine_structures::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Turbine Structures Example: Semi-submersible ===\n");

    let steel = MemberSection::tube(10.0, 0.05, 200e9, 79.3e9, 7850.0);
    let brace = MemberSection::tube(1.2, 0.02, 200e9, 79.3e9, 7850.0);

    // Central column C0 with three outer columns, each tied to the base of
    // C0 by a pontoon
    let draft = -20.0;
    let freeboard = 15.0;
    let offsets = [[0.0, 0.0], [40.0, 0.0], [-20.0, 34.64], [-20.0, -34.64]];

    let mut members = Vec::new();
    for (i, [x, y]) in offsets.iter().enumerate() {
        let (x, y) = (*x, *y);
        let column = MemberModel::uniform(
            vec![[x, y, draft], [x, y, 0.0], [x, y, freeboard]],
            5.0,
            steel,
        )
        .with_mass(1.2e6, [x, y, draft + 10.0])
        .with_buoyancy(0, 1.57e3, [x, y, 0.5 * draft], 1.57e3 * 1025.0 * 9.80633)
        .with_cost(2.5e6);
        println!("  Column C{} at ({:.1}, {:.1})", i, x, y);
        members.push(column);
    }
    for [x, y] in &offsets[1..] {
        let pontoon = MemberModel::uniform(
            vec![[0.0, 0.0, draft], [*x, *y, draft]],
            0.6,
            brace,
        )
        .with_mass(8.0e4, [0.5 * x, 0.5 * y, draft])
        .with_buoyancy(0, 45.0, [0.5 * x, 0.5 * y, draft], 0.0)
        .with_cost(1.5e5);
        members.push(pontoon);
    }

    let limits = FrameLimits::default();
    let mut platform_frame = PlatformFrame::new(limits);
    let platform = platform_frame.assemble(&members)?;
    println!(
        "\nPlatform: {} nodes, {} elements, mass {:.4e} kg, displacement {:.1} m³",
        platform.frame.n_nodes(),
        platform.frame.n_elements(),
        platform.frame.mass,
        platform.displacement
    );

    let transition = [0.0, 0.0, freeboard];
    let hub = hub_node(transition, 150.0);
    let tower_member = MemberModel::uniform(
        vec![transition, [0.0, 0.0, 60.0], [0.0, 0.0, 100.0], [0.0, 0.0, 145.0]],
        4.0,
        MemberSection::tube(7.0, 0.04, 200e9, 79.3e9, 7850.0),
    )
    .with_mass(1.1e6, [0.0, 0.0, 70.0])
    .with_cost(3.0e6);
    let tower = tower_frame(&tower_member, &limits)?;

    let inputs = CompositionInputs {
        transition_node: transition,
        hub_node: hub,
        transition_piece_mass: 1.0e5,
        rna_mass: 9.9e5,
        rna_cg: [-5.0, 0.0, 2.5],
        rho_water: 1025.0,
    };
    let system = compose_system(&platform, &tower, &inputs, &limits)?;
    println!(
        "System: {} nodes, variable ballast {:.4e} kg\n",
        system.frame.n_nodes(),
        system.variable_ballast_mass
    );

    let fairleads = offsets[1..]
        .iter()
        .map(|[x, y]| [*x, *y, draft])
        .collect::<Vec<_>>();
    let mooring = fairleads
        .iter()
        .map(|[x, y, _]| [-200.0 * x, -200.0 * y, -1.5e6])
        .collect();
    let loads = FrameLoads::new(transition)
        .with_transition_piece(1.0e5, [0.0; 6])
        .with_rna(9.9e5, [-5.0, 0.0, 2.5], [1.0e8, 8.0e7, 8.0e7, 0.0, 0.0, 0.0])
        .with_rotor_loads([2.0e6, 0.0, 0.0], [0.0, 0.0, 0.0])
        .with_mooring(fairleads, mooring)
        .with_platform_center_of_mass(platform.frame.center_of_mass);

    let analysis = FrameAnalysis::with_default_solver(FrameAnalysisConfig::default(), limits);
    let (tower_summary, system_summary) =
        analysis.analyze_all(&tower, &system.frame, &loads)?;

    for summary in [&tower_summary, &system_summary] {
        println!("=== {:?} ===", summary.kind);
        println!(
            "  Reaction force:  [{:>12.4e}, {:>12.4e}, {:>12.4e}] N",
            summary.reaction_force[0], summary.reaction_force[1], summary.reaction_force[2]
        );
        println!(
            "  Reaction moment: [{:>12.4e}, {:>12.4e}, {:>12.4e}] Nm",
            summary.reaction_moment[0], summary.reaction_moment[1], summary.reaction_moment[2]
        );
        if let Some(f1) = summary.natural_frequencies.first() {
            println!("  First natural frequency: {:.4} Hz", f1);
        }
        println!();
    }

    println!("=== Rail Transport: 40 m blade ===\n");
    let n = 21;
    let blade = BladeStructure::prismatic(
        40.0,
        n,
        StationProperties {
            ea: 2.0e10,
            eixx: 1.2e10,
            eiyy: 6.0e9,
            gj: 5.0e8,
            rho_a: 400.0,
            rho_j: 50.0,
        },
        FiberDistances::uniform(n, 0.5, 0.5),
    );
    let transport = RailTransport::with_defaults(RailTransportConfig::default());
    match transport.run(&blade) {
        Ok(result) => {
            println!("  Root rotation:      {:.3} deg", result.root_rotation_deg);
            println!("  Max reaction force: {:.4e} N", result.reaction_force);
            println!("  L/V 4-axle:         {:.4}", result.lv_constraint_4axle);
            println!("  L/V 8-axle:         {:.4}", result.lv_constraint_8axle);
        }
        Err(StructuresError::OptimizationDidNotConverge { constraint, .. }) => {
            println!("  No feasible transport, limited by the {}", constraint);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
