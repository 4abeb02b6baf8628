//! Static and modal analysis of the tower and the combined system

use frame_solver::analysis::AnalysisOptions;
use frame_solver::elements::{Element, ExtraNodeMass, Node, Reaction};
use frame_solver::loads::{PointLoad, StaticLoadCase};
use frame_solver::model::{DirectStiffnessSolver, Frame, FrameSolver};
use frame_solver::results::FrameResults;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::assembly::{closest_node, FrameModel};
use crate::config::{FrameAnalysisConfig, FrameLimits};
use crate::error::{StructuresError, StructuresResult};

/// Which model is being analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameKind {
    /// The tower alone, supported at the transition node
    Tower,
    /// Platform and tower together, with mooring loads
    System,
}

/// Point masses and loads applied on top of the frame's own weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameLoads {
    pub transition_node: [f64; 3],
    pub transition_piece_mass: f64,
    /// Inertia about the transition node [Ixx, Iyy, Izz, Ixy, Ixz, Iyz]
    pub transition_piece_inertia: [f64; 6],
    pub platform_center_of_mass: [f64; 3],
    pub rna_mass: f64,
    pub rna_cg: [f64; 3],
    pub rna_inertia: [f64; 6],
    /// Rotor thrust at the hub (N)
    pub rna_force: [f64; 3],
    pub rna_moment: [f64; 3],
    /// Neutral mooring line load per line (N)
    pub mooring_neutral_load: Vec<[f64; 3]>,
    /// Fairlead position per line (m)
    pub fairlead_joints: Vec<[f64; 3]>,
}

impl FrameLoads {
    /// Only the transition point, no masses or loads
    pub fn new(transition_node: [f64; 3]) -> Self {
        Self {
            transition_node,
            transition_piece_mass: 0.0,
            transition_piece_inertia: [0.0; 6],
            platform_center_of_mass: [0.0; 3],
            rna_mass: 0.0,
            rna_cg: [0.0; 3],
            rna_inertia: [0.0; 6],
            rna_force: [0.0; 3],
            rna_moment: [0.0; 3],
            mooring_neutral_load: Vec::new(),
            fairlead_joints: Vec::new(),
        }
    }

    pub fn with_transition_piece(mut self, mass: f64, inertia: [f64; 6]) -> Self {
        self.transition_piece_mass = mass;
        self.transition_piece_inertia = inertia;
        self
    }

    pub fn with_rna(mut self, mass: f64, cg: [f64; 3], inertia: [f64; 6]) -> Self {
        self.rna_mass = mass;
        self.rna_cg = cg;
        self.rna_inertia = inertia;
        self
    }

    pub fn with_rotor_loads(mut self, force: [f64; 3], moment: [f64; 3]) -> Self {
        self.rna_force = force;
        self.rna_moment = moment;
        self
    }

    pub fn with_mooring(mut self, fairleads: Vec<[f64; 3]>, loads: Vec<[f64; 3]>) -> Self {
        self.fairlead_joints = fairleads;
        self.mooring_neutral_load = loads;
        self
    }

    pub fn with_platform_center_of_mass(mut self, center_of_mass: [f64; 3]) -> Self {
        self.platform_center_of_mass = center_of_mass;
        self
    }
}

/// Net support reactions and frame properties of one solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSolveSummary {
    pub kind: FrameKind,
    /// Net external force the structure needs at its support (N)
    pub reaction_force: [f64; 3],
    pub reaction_moment: [f64; 3],
    pub element_lengths: Vec<f64>,
    /// Natural frequencies (Hz), empty if the solver returned none
    pub natural_frequencies: Vec<f64>,
    pub transition_index: usize,
    pub hub_index: usize,
}

/// Builds solver input for tower and system models and extracts reactions
#[derive(Debug, Clone)]
pub struct FrameAnalysis<S: FrameSolver = DirectStiffnessSolver> {
    solver: S,
    config: FrameAnalysisConfig,
    limits: FrameLimits,
}

impl FrameAnalysis<DirectStiffnessSolver> {
    /// Analysis with the built-in direct stiffness solver
    pub fn with_default_solver(config: FrameAnalysisConfig, limits: FrameLimits) -> Self {
        Self::new(DirectStiffnessSolver, config, limits)
    }
}

impl<S: FrameSolver> FrameAnalysis<S> {
    pub fn new(solver: S, config: FrameAnalysisConfig, limits: FrameLimits) -> Self {
        Self {
            solver,
            config,
            limits,
        }
    }

    pub fn config(&self) -> &FrameAnalysisConfig {
        &self.config
    }

    /// Solver input for `model`, with the transition and hub node indices
    pub fn build_frame(
        &self,
        kind: FrameKind,
        model: &FrameModel,
        loads: &FrameLoads,
    ) -> StructuresResult<(Frame, usize, usize)> {
        model.check_capacity(&self.limits)?;
        if model.node_radii.len() != model.n_nodes() || model.node_forces.len() != model.n_nodes()
        {
            return Err(StructuresError::InvalidInput(format!(
                "{} nodes with {} radii and {} forces",
                model.n_nodes(),
                model.node_radii.len(),
                model.node_forces.len()
            )));
        }
        let itrans = closest_node(&model.nodes, loads.transition_node)?;
        let ihub = highest_node(&model.nodes)?;

        let nodes = model
            .nodes
            .iter()
            .zip(&model.node_radii)
            .enumerate()
            .map(|(i, (xyz, &r))| Node::from_coords(i, *xyz, r))
            .collect();
        let elements = model
            .elements
            .iter()
            .enumerate()
            .map(|(i, el)| Element::new(i, el.n1, el.n2, el.section.to_solver_section()))
            .collect();
        let reactions = vec![Reaction::rigid(itrans, self.limits.rigid_stiffness)];
        let options = AnalysisOptions::default()
            .with_shear(self.config.shear)
            .with_geometric_stiffness(self.config.geometric_stiffness);
        let mut frame = Frame::new(nodes, reactions, elements, options);

        // the tower model is expressed relative to the platform's center of mass
        let cg_trans = match kind {
            FrameKind::Tower => [
                loads.transition_node[0] - loads.platform_center_of_mass[0],
                loads.transition_node[1] - loads.platform_center_of_mass[1],
                loads.transition_node[2] - loads.platform_center_of_mass[2],
            ],
            FrameKind::System => [0.0; 3],
        };
        frame.change_extra_node_mass(
            vec![
                ExtraNodeMass::new(
                    itrans,
                    loads.transition_piece_mass,
                    loads.transition_piece_inertia,
                    cg_trans,
                ),
                ExtraNodeMass::new(ihub, loads.rna_mass, loads.rna_inertia, loads.rna_cg),
            ],
            true,
        );
        frame.enable_dynamics(self.config.n_modes, self.config.modal_tolerance);

        let mut forces = model.node_forces.clone();
        let mut moments = vec![[0.0; 3]; model.n_nodes()];
        if kind == FrameKind::System {
            if loads.fairlead_joints.len() != loads.mooring_neutral_load.len() {
                return Err(StructuresError::InvalidInput(format!(
                    "{} fairleads for {} mooring loads",
                    loads.fairlead_joints.len(),
                    loads.mooring_neutral_load.len()
                )));
            }
            for (fairlead, line) in loads.fairlead_joints.iter().zip(&loads.mooring_neutral_load) {
                let ind = closest_node(&model.nodes, *fairlead)?;
                add_into(&mut forces[ind], line);
            }
        }
        add_into(&mut forces[ihub], &loads.rna_force);
        add_into(&mut moments[ihub], &loads.rna_moment);

        let mut load_case = StaticLoadCase::new([0.0, 0.0, -self.config.gravity]);
        load_case.add_point_loads(
            forces
                .iter()
                .zip(&moments)
                .enumerate()
                .map(|(i, (f, m))| PointLoad::new(i, *f, *m))
                .filter(|load| !load.is_zero()),
        );
        debug!(
            "{:?} frame: {} nodes, {} elements, {} point loads, support at node {}, hub at node {}",
            kind,
            model.n_nodes(),
            model.n_elements(),
            load_case.point_loads.len(),
            itrans,
            ihub
        );
        frame.add_load_case(load_case);

        Ok((frame, itrans, ihub))
    }

    /// Solve `model` and return its net support reactions
    pub fn analyze(
        &self,
        kind: FrameKind,
        model: &FrameModel,
        loads: &FrameLoads,
    ) -> StructuresResult<FrameSolveSummary> {
        let (frame, itrans, ihub) = self.build_frame(kind, model, loads)?;
        let results = self.solver.run(&frame)?;
        let (reaction_force, reaction_moment) = net_reactions(&results)?;
        let element_lengths = model.element_lengths()?;
        let natural_frequencies = results
            .modal
            .map(|modal| modal.frequencies)
            .unwrap_or_default();

        info!(
            "{:?} reactions: force [{:.4e}, {:.4e}, {:.4e}] N, moment [{:.4e}, {:.4e}, {:.4e}] Nm",
            kind,
            reaction_force[0],
            reaction_force[1],
            reaction_force[2],
            reaction_moment[0],
            reaction_moment[1],
            reaction_moment[2]
        );

        Ok(FrameSolveSummary {
            kind,
            reaction_force,
            reaction_moment,
            element_lengths,
            natural_frequencies,
            transition_index: itrans,
            hub_index: ihub,
        })
    }

    /// Solve the tower alone and then the combined system
    pub fn analyze_all(
        &self,
        tower: &FrameModel,
        system: &FrameModel,
        loads: &FrameLoads,
    ) -> StructuresResult<(FrameSolveSummary, FrameSolveSummary)> {
        let tower = self.analyze(FrameKind::Tower, tower, loads)?;
        let system = self.analyze(FrameKind::System, system, loads)?;
        Ok((tower, system))
    }
}

/// Negated sums of the reported support reactions of the first load case
fn net_reactions(results: &FrameResults) -> StructuresResult<([f64; 3], [f64; 3])> {
    let case = results.load_cases.first().ok_or_else(|| {
        StructuresError::InvalidInput("solver returned no load case".to_string())
    })?;
    let mut force = [0.0; 3];
    let mut moment = [0.0; 3];
    for reaction in &case.reactions {
        for k in 0..3 {
            force[k] -= reaction.force()[k];
            moment[k] -= reaction.moment()[k];
        }
    }
    Ok((force, moment))
}

/// Index of the highest node; the first one wins ties
fn highest_node(nodes: &[[f64; 3]]) -> StructuresResult<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, node) in nodes.iter().enumerate() {
        if best.map_or(true, |(_, z)| node[2] > z) {
            best = Some((i, node[2]));
        }
    }
    best.map(|(i, _)| i).ok_or_else(|| {
        StructuresError::GeometryLookup("no highest node in an empty frame".to_string())
    })
}

fn add_into(target: &mut [f64; 3], value: &[f64; 3]) {
    for (t, v) in target.iter_mut().zip(value) {
        *t += v;
    }
}
