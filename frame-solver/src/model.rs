//! Frame model and the direct stiffness solver

use std::collections::HashMap;
use std::f64::consts::PI;

use nalgebra::SymmetricEigen;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisOptions, DynamicsOptions};
use crate::elements::{Element, ExtraNodeMass, Node, Reaction};
use crate::error::{FEAError, FEAResult};
use crate::loads::StaticLoadCase;
use crate::math::{self, Mat, Mat12, Mat3, Vec as FEVec, Vec12};
use crate::results::{
    ElementEndForces, FrameResults, LoadCaseResults, ModalResults, NodeDisplacement, Reactions,
};

/// A 3D frame ready for analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Nodes in the frame
    pub nodes: Vec<Node>,
    /// Support conditions
    pub reactions: Vec<Reaction>,
    /// Frame elements
    pub elements: Vec<Element>,
    /// Analysis options
    pub options: AnalysisOptions,
    /// Lumped masses attached to nodes
    pub extra_masses: Vec<ExtraNodeMass>,
    /// Apply gravity to the extra node masses in every load case
    pub extra_mass_gravity: bool,
    /// Static load cases
    pub load_cases: Vec<StaticLoadCase>,
}

impl Frame {
    /// Create a frame without extra masses or load cases
    pub fn new(
        nodes: Vec<Node>,
        reactions: Vec<Reaction>,
        elements: Vec<Element>,
        options: AnalysisOptions,
    ) -> Self {
        Self {
            nodes,
            reactions,
            elements,
            options,
            extra_masses: Vec::new(),
            extra_mass_gravity: false,
            load_cases: Vec::new(),
        }
    }

    /// Replace the extra node masses
    pub fn change_extra_node_mass(&mut self, masses: Vec<ExtraNodeMass>, add_gravity: bool) {
        self.extra_masses = masses;
        self.extra_mass_gravity = add_gravity;
    }

    /// Enable modal analysis
    pub fn enable_dynamics(&mut self, n_modes: usize, tolerance: f64) {
        self.options.dynamics = Some(DynamicsOptions::new(n_modes, tolerance));
    }

    /// Add a static load case
    pub fn add_load_case(&mut self, case: StaticLoadCase) {
        self.load_cases.push(case);
    }

    /// Serialize the frame to JSON
    pub fn to_json(&self) -> FEAResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a frame from JSON
    pub fn from_json(json: &str) -> FEAResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A structural solver for 3D frames
pub trait FrameSolver {
    /// Run every load case of the frame, plus modal analysis if enabled
    fn run(&self, frame: &Frame) -> FEAResult<FrameResults>;
}

/// Dense direct stiffness solver
///
/// Supports are penalty springs in the static solve and are eliminated from
/// the modal eigenproblem when rigid.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectStiffnessSolver;

/// Element data computed once per analysis
struct PreparedElement {
    i: usize,
    j: usize,
    length: f64,
    rotation: Mat3,
    t: Mat12,
    k_local: Mat12,
}

impl PreparedElement {
    fn dofs(&self) -> [usize; 12] {
        let mut dofs = [0; 12];
        for k in 0..6 {
            dofs[k] = self.i * 6 + k;
            dofs[k + 6] = self.j * 6 + k;
        }
        dofs
    }

    fn local_displacements(&self, d: &FEVec) -> Vec12 {
        let dofs = self.dofs();
        let d_global = Vec12::from_fn(|k, _| d[dofs[k]]);
        self.t * d_global
    }
}

struct Prepared {
    index: HashMap<usize, usize>,
    elements: Vec<PreparedElement>,
    n_dofs: usize,
}

impl Prepared {
    fn node_index(&self, id: usize) -> FEAResult<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or(FEAError::NodeNotFound(id))
    }
}

fn scatter(global: &mut Mat, local: &Mat12, dofs: &[usize; 12]) {
    for (a, &da) in dofs.iter().enumerate() {
        for (b, &db) in dofs.iter().enumerate() {
            global[(da, db)] += local[(a, b)];
        }
    }
}

impl DirectStiffnessSolver {
    /// Validate the frame and compute element geometry
    fn prepare(&self, frame: &Frame) -> FEAResult<Prepared> {
        if frame.nodes.is_empty() {
            return Err(FEAError::InvalidInput("frame has no nodes".to_string()));
        }

        let mut index = HashMap::with_capacity(frame.nodes.len());
        for (pos, node) in frame.nodes.iter().enumerate() {
            if index.insert(node.id, pos).is_some() {
                return Err(FEAError::DuplicateNode(node.id));
            }
        }

        let mut elements = Vec::with_capacity(frame.elements.len());
        for element in &frame.elements {
            let i = *index.get(&element.n1).ok_or(FEAError::NodeNotFound(element.n1))?;
            let j = *index.get(&element.n2).ok_or(FEAError::NodeNotFound(element.n2))?;
            if i == j {
                return Err(FEAError::InvalidGeometry(format!(
                    "element {} starts and ends at node {}",
                    element.id, element.n1
                )));
            }
            let (ni, nj) = (&frame.nodes[i], &frame.nodes[j]);
            let length = ni.distance_to(nj);
            let rotation = math::direction_cosines(&ni.coords(), &nj.coords(), element.roll)?;
            let t = math::member_transformation_matrix(&ni.coords(), &nj.coords(), element.roll)?;
            let k_local = math::member_local_stiffness(&element.section, length, frame.options.shear);
            elements.push(PreparedElement {
                i,
                j,
                length,
                rotation,
                t,
                k_local,
            });
        }

        for reaction in &frame.reactions {
            if !index.contains_key(&reaction.node) {
                return Err(FEAError::NodeNotFound(reaction.node));
            }
        }
        for mass in &frame.extra_masses {
            if !index.contains_key(&mass.node) {
                return Err(FEAError::NodeNotFound(mass.node));
            }
        }

        Ok(Prepared {
            index,
            elements,
            n_dofs: frame.nodes.len() * 6,
        })
    }

    /// Global elastic stiffness without supports
    fn build_global_stiffness(&self, prepared: &Prepared) -> Mat {
        let mut k = Mat::zeros(prepared.n_dofs, prepared.n_dofs);
        for el in &prepared.elements {
            let k_global = el.t.transpose() * el.k_local * el.t;
            scatter(&mut k, &k_global, &el.dofs());
        }
        k
    }

    /// Add support springs; rigid DOFs are skipped when `skip_fixed` is set
    fn add_support_springs(
        &self,
        k: &mut Mat,
        frame: &Frame,
        prepared: &Prepared,
        skip_fixed: bool,
    ) -> FEAResult<()> {
        for reaction in &frame.reactions {
            let base = prepared.node_index(reaction.node)? * 6;
            for dof in 0..6 {
                if skip_fixed && reaction.is_fixed(dof) {
                    continue;
                }
                k[(base + dof, base + dof)] += reaction.stiffness[dof];
            }
        }
        Ok(())
    }

    fn build_geometric_stiffness(
        &self,
        frame: &Frame,
        prepared: &Prepared,
        axial: &[f64],
    ) -> Mat {
        let mut kg = Mat::zeros(prepared.n_dofs, prepared.n_dofs);
        for ((el, element), &p) in prepared.elements.iter().zip(&frame.elements).zip(axial) {
            let kg_local =
                math::member_geometric_stiffness(p, element.section.a, element.section.jx, el.length);
            let kg_global = el.t.transpose() * kg_local * el.t;
            scatter(&mut kg, &kg_global, &el.dofs());
        }
        kg
    }

    /// Nodal loads applied directly at each node (point loads and extra-mass weight)
    fn applied_nodal_loads(
        &self,
        frame: &Frame,
        prepared: &Prepared,
        case: &StaticLoadCase,
    ) -> FEAResult<Vec<[f64; 6]>> {
        let mut applied = vec![[0.0; 6]; frame.nodes.len()];
        for load in &case.point_loads {
            let idx = prepared.node_index(load.node)?;
            for (a, v) in applied[idx].iter_mut().zip(load.as_array()) {
                *a += v;
            }
        }
        if frame.extra_mass_gravity {
            for mass in &frame.extra_masses {
                let idx = prepared.node_index(mass.node)?;
                for (a, v) in applied[idx].iter_mut().zip(mass.gravity_load(&case.gravity)) {
                    *a += v;
                }
            }
        }
        Ok(applied)
    }

    /// Fixed end forces of element self-weight in local coordinates
    fn self_weight_fer(&self, frame: &Frame, prepared: &Prepared, gravity: &[f64; 3]) -> Vec<Vec12> {
        let g = nalgebra::Vector3::new(gravity[0], gravity[1], gravity[2]);
        prepared
            .elements
            .iter()
            .zip(&frame.elements)
            .map(|(el, element)| {
                let w_local = el.rotation * (g * element.section.mass_per_length());
                (0..3).fold(Vec12::zeros(), |acc, dir| {
                    acc + math::fer_uniform_load(w_local[dir], el.length, dir)
                })
            })
            .collect()
    }

    fn element_forces(
        &self,
        frame: &Frame,
        prepared: &Prepared,
        d: &FEVec,
        fer: &[Vec12],
        axial: Option<&[f64]>,
    ) -> Vec<Vec12> {
        prepared
            .elements
            .iter()
            .enumerate()
            .map(|(e, el)| {
                let d_local = el.local_displacements(d);
                let mut k = el.k_local;
                if let Some(axial) = axial {
                    let section = &frame.elements[e].section;
                    k += math::member_geometric_stiffness(axial[e], section.a, section.jx, el.length);
                }
                k * d_local + fer[e]
            })
            .collect()
    }

    fn solve_load_case(
        &self,
        frame: &Frame,
        prepared: &Prepared,
        k_supported: &Mat,
        case: &StaticLoadCase,
    ) -> FEAResult<LoadCaseResults> {
        let applied = self.applied_nodal_loads(frame, prepared, case)?;
        let fer = self.self_weight_fer(frame, prepared, &case.gravity);

        let mut p = FEVec::zeros(prepared.n_dofs);
        for (idx, load) in applied.iter().enumerate() {
            for k in 0..6 {
                p[idx * 6 + k] += load[k];
            }
        }
        for (el, fer_e) in prepared.elements.iter().zip(&fer) {
            let fer_global = el.t.transpose() * fer_e;
            for (k, &dof) in el.dofs().iter().enumerate() {
                p[dof] -= fer_global[k];
            }
        }

        let mut d = math::solve_linear_system(k_supported, &p).ok_or(FEAError::SingularMatrix)?;
        let mut iterations = 0;
        let mut axial: Option<Vec<f64>> = None;

        if frame.options.geom {
            loop {
                if iterations >= frame.options.max_iterations {
                    return Err(FEAError::ConvergenceFailed(frame.options.max_iterations));
                }
                iterations += 1;

                // positive = tension
                let forces = self.element_forces(frame, prepared, &d, &fer, axial.as_deref());
                let p_axial: Vec<f64> = forces.iter().map(|f| -f[0]).collect();

                let kg = self.build_geometric_stiffness(frame, prepared, &p_axial);
                let k_combined = k_supported + &kg;
                let d_new =
                    math::solve_linear_system(&k_combined, &p).ok_or(FEAError::SingularMatrix)?;

                let max_diff = (&d_new - &d).amax();
                d = d_new;
                axial = Some(p_axial);
                if max_diff < frame.options.tolerance {
                    break;
                }
            }
            log::debug!("P-Delta converged after {} iterations", iterations);
        }

        if d.iter().any(|v| !v.is_finite()) {
            return Err(FEAError::AnalysisFailed(
                "non-finite displacements in static solve".to_string(),
            ));
        }

        let forces = self.element_forces(frame, prepared, &d, &fer, axial.as_deref());

        let displacements = frame
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                let mut arr = [0.0; 6];
                for (k, v) in arr.iter_mut().enumerate() {
                    *v = d[idx * 6 + k];
                }
                NodeDisplacement::from_array(node.id, arr)
            })
            .collect();

        let reactions = self.calculate_reactions(frame, prepared, &forces, &applied)?;

        let element_forces = frame
            .elements
            .iter()
            .zip(&forces)
            .map(|(element, f)| {
                let mut local = [0.0; 12];
                local.copy_from_slice(f.as_slice());
                ElementEndForces {
                    element: element.id,
                    local,
                }
            })
            .collect();

        Ok(LoadCaseResults {
            displacements,
            element_forces,
            reactions,
            iterations,
        })
    }

    /// Reactions as the sum of element end forces minus applied nodal loads
    fn calculate_reactions(
        &self,
        frame: &Frame,
        prepared: &Prepared,
        forces: &[Vec12],
        applied: &[[f64; 6]],
    ) -> FEAResult<Vec<Reactions>> {
        let mut sums = vec![[0.0; 6]; frame.nodes.len()];
        for (el, f_local) in prepared.elements.iter().zip(forces) {
            let f_global = el.t.transpose() * f_local;
            for k in 0..6 {
                sums[el.i][k] += f_global[k];
                sums[el.j][k] += f_global[k + 6];
            }
        }

        frame
            .reactions
            .iter()
            .map(|reaction| {
                let idx = prepared.node_index(reaction.node)?;
                let mut values = [0.0; 6];
                for (k, v) in values.iter_mut().enumerate() {
                    if reaction.is_supported(k) {
                        *v = sums[idx][k] - applied[idx][k];
                    }
                }
                Ok(Reactions::from_array(reaction.node, values))
            })
            .collect()
    }

    /// Global consistent mass including extra node masses
    fn build_global_mass(&self, frame: &Frame, prepared: &Prepared) -> FEAResult<Mat> {
        let mut m = Mat::zeros(prepared.n_dofs, prepared.n_dofs);
        for (el, element) in prepared.elements.iter().zip(&frame.elements) {
            let s = &element.section;
            let m_local = math::member_consistent_mass(s.rho, s.a, s.jx, el.length);
            let m_global = el.t.transpose() * m_local * el.t;
            scatter(&mut m, &m_global, &el.dofs());
        }

        for mass in &frame.extra_masses {
            let base = prepared.node_index(mass.node)? * 6;
            let [ixx, iyy, izz, ixy, ixz, iyz] = mass.inertia;
            let j = Mat3::new(ixx, ixy, ixz, ixy, iyy, iyz, ixz, iyz, izz);
            let c = mass.cg;
            // skew(c) * θ = c × θ
            let s = Mat3::new(0.0, -c[2], c[1], c[2], 0.0, -c[0], -c[1], c[0], 0.0);
            let m_tt = Mat3::identity() * mass.mass;
            let m_tr = -s * mass.mass;
            let m_rr = j + s.transpose() * s * mass.mass;
            for a in 0..3 {
                for b in 0..3 {
                    m[(base + a, base + b)] += m_tt[(a, b)];
                    m[(base + a, base + 3 + b)] += m_tr[(a, b)];
                    m[(base + 3 + a, base + b)] += m_tr[(b, a)];
                    m[(base + 3 + a, base + 3 + b)] += m_rr[(a, b)];
                }
            }
        }
        Ok(m)
    }

    /// Natural frequencies from `K φ = ω² M φ` on the DOFs not rigidly fixed
    fn modal_analysis(
        &self,
        frame: &Frame,
        prepared: &Prepared,
        k_elastic: &Mat,
        dynamics: &DynamicsOptions,
    ) -> FEAResult<ModalResults> {
        let mut k = k_elastic.clone();
        self.add_support_springs(&mut k, frame, prepared, true)?;
        let m = self.build_global_mass(frame, prepared)?;

        let mut fixed = vec![false; prepared.n_dofs];
        for reaction in &frame.reactions {
            let base = prepared.node_index(reaction.node)? * 6;
            for dof in 0..6 {
                fixed[base + dof] |= reaction.is_fixed(dof);
            }
        }
        let free: Vec<usize> = (0..prepared.n_dofs).filter(|&d| !fixed[d]).collect();
        let n_free = free.len();

        let total_mass = frame
            .elements
            .iter()
            .zip(&prepared.elements)
            .map(|(element, el)| element.section.mass_per_length() * el.length)
            .sum::<f64>()
            + frame.extra_masses.iter().map(|m| m.mass).sum::<f64>();

        if n_free == 0 {
            return Ok(ModalResults {
                frequencies: Vec::new(),
                mode_shapes: Vec::new(),
                total_mass,
            });
        }

        let k_ff = Mat::from_fn(n_free, n_free, |a, b| k[(free[a], free[b])]);
        let m_ff = Mat::from_fn(n_free, n_free, |a, b| m[(free[a], free[b])]);

        let chol = m_ff.cholesky().ok_or(FEAError::IndefiniteMass)?;
        let l = chol.l();
        let x = l
            .solve_lower_triangular(&k_ff)
            .ok_or(FEAError::SingularMatrix)?;
        let a = l
            .solve_lower_triangular(&x.transpose())
            .ok_or(FEAError::SingularMatrix)?;
        let a = (&a + a.transpose()) * 0.5;

        let eigen = SymmetricEigen::try_new(a, dynamics.tolerance, dynamics.max_iterations)
            .ok_or(FEAError::ConvergenceFailed(dynamics.max_iterations))?;

        let mut order: Vec<usize> = (0..n_free).collect();
        order.sort_by(|&p, &q| eigen.eigenvalues[p].total_cmp(&eigen.eigenvalues[q]));

        let n_modes = dynamics.n_modes.min(n_free);
        let mut frequencies = Vec::with_capacity(n_modes);
        let mut mode_shapes = Vec::with_capacity(n_modes);
        for &mode in order.iter().take(n_modes) {
            let lambda = eigen.eigenvalues[mode].max(0.0);
            frequencies.push(lambda.sqrt() / (2.0 * PI));

            let y = eigen.eigenvectors.column(mode).into_owned();
            let phi = l
                .tr_solve_lower_triangular(&y)
                .ok_or(FEAError::SingularMatrix)?;
            let mut shape = vec![0.0; prepared.n_dofs];
            for (a, &dof) in free.iter().enumerate() {
                shape[dof] = phi[a];
            }
            mode_shapes.push(shape);
        }

        Ok(ModalResults {
            frequencies,
            mode_shapes,
            total_mass,
        })
    }
}

impl FrameSolver for DirectStiffnessSolver {
    fn run(&self, frame: &Frame) -> FEAResult<FrameResults> {
        let prepared = self.prepare(frame)?;
        log::debug!(
            "Solving frame: {} nodes, {} elements, {} reactions, {} load cases",
            frame.nodes.len(),
            frame.elements.len(),
            frame.reactions.len(),
            frame.load_cases.len()
        );

        let k_elastic = self.build_global_stiffness(&prepared);
        let mut k_supported = k_elastic.clone();
        self.add_support_springs(&mut k_supported, frame, &prepared, false)?;

        let load_cases = frame
            .load_cases
            .iter()
            .map(|case| self.solve_load_case(frame, &prepared, &k_supported, case))
            .collect::<FEAResult<Vec<_>>>()?;

        let modal = match &frame.options.dynamics {
            Some(dynamics) => Some(self.modal_analysis(frame, &prepared, &k_elastic, dynamics)?),
            None => None,
        };

        Ok(FrameResults { load_cases, modal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::SectionProperties;
    use crate::loads::PointLoad;
    use approx::assert_relative_eq;

    fn section() -> SectionProperties {
        SectionProperties::tube(0.6, 0.02, 200e9, 80e9, 7850.0)
    }

    fn cantilever(options: AnalysisOptions) -> Frame {
        let nodes = vec![
            Node::new(0, 0.0, 0.0, 0.0, 0.0),
            Node::new(1, 5.0, 0.0, 0.0, 0.0),
            Node::new(2, 10.0, 0.0, 0.0, 0.0),
        ];
        let elements = vec![
            Element::new(0, 0, 1, section()),
            Element::new(1, 1, 2, section()),
        ];
        Frame::new(nodes, vec![Reaction::rigid(0, 1e30)], elements, options)
    }

    #[test]
    fn test_cantilever_tip_load() {
        let mut frame = cantilever(AnalysisOptions::default().with_shear(false));
        let mut case = StaticLoadCase::new([0.0; 3]);
        case.add_point_load(PointLoad::force(2, [0.0, 0.0, -10_000.0]));
        frame.add_load_case(case);

        let results = DirectStiffnessSolver.run(&frame).unwrap();
        let lc = &results.load_cases[0];

        let s = section();
        let expected = -10_000.0 * 10.0_f64.powi(3) / (3.0 * s.e * s.iy);
        assert_relative_eq!(lc.displacements[2].dz, expected, max_relative = 1e-6);

        // the support pushes up and resists the tip moment
        let rxn = &lc.reactions[0];
        assert_relative_eq!(rxn.fz, 10_000.0, max_relative = 1e-6);
        assert_relative_eq!(rxn.my, -100_000.0, max_relative = 1e-6);
    }

    #[test]
    fn test_self_weight_reaction() {
        let mut frame = cantilever(AnalysisOptions::default());
        frame.add_load_case(StaticLoadCase::new([0.0, 0.0, -9.81]));

        let results = DirectStiffnessSolver.run(&frame).unwrap();
        let rxn = &results.load_cases[0].reactions[0];

        let weight = section().mass_per_length() * 10.0 * 9.81;
        assert_relative_eq!(rxn.fz, weight, max_relative = 1e-6);
        // resultant acts at mid-span
        assert_relative_eq!(rxn.my, -weight * 5.0, max_relative = 1e-6);
    }

    #[test]
    fn test_extra_mass_weight_and_offset() {
        let mut frame = cantilever(AnalysisOptions::default());
        frame.change_extra_node_mass(
            vec![ExtraNodeMass::new(2, 1000.0, [0.0; 6], [1.0, 0.0, 0.0])],
            true,
        );
        frame.add_load_case(StaticLoadCase::new([0.0, 0.0, -10.0]));

        let results = DirectStiffnessSolver.run(&frame).unwrap();
        let rxn = &results.load_cases[0].reactions[0];
        let beam_weight = section().mass_per_length() * 10.0 * 10.0;

        assert_relative_eq!(rxn.fz, beam_weight + 10_000.0, max_relative = 1e-6);
        // mass center sits 1 m beyond the tip
        assert_relative_eq!(
            rxn.my,
            -(beam_weight * 5.0 + 10_000.0 * 11.0),
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_tension_stiffening_reduces_deflection() {
        let build = |geom: bool| {
            let mut frame =
                cantilever(AnalysisOptions::default().with_geometric_stiffness(geom));
            let mut case = StaticLoadCase::new([0.0; 3]);
            case.add_point_load(PointLoad::force(2, [5.0e6, 0.0, -10_000.0]));
            frame.add_load_case(case);
            DirectStiffnessSolver.run(&frame).unwrap()
        };
        let linear = build(false);
        let p_delta = build(true);

        assert!(p_delta.load_cases[0].iterations > 0);
        assert!(
            p_delta.load_cases[0].displacements[2].dz.abs()
                < linear.load_cases[0].displacements[2].dz.abs()
        );
        // equilibrium is unaffected by geometric stiffness
        assert_relative_eq!(
            p_delta.load_cases[0].reactions[0].fz,
            10_000.0,
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut frame = cantilever(AnalysisOptions::default());
        frame.nodes.push(Node::new(1, 1.0, 1.0, 1.0, 0.0));
        assert!(matches!(
            DirectStiffnessSolver.run(&frame),
            Err(FEAError::DuplicateNode(1))
        ));
    }

    #[test]
    fn test_missing_reaction_node_rejected() {
        let mut frame = cantilever(AnalysisOptions::default());
        frame.reactions.push(Reaction::rigid(42, 1e30));
        assert!(matches!(
            DirectStiffnessSolver.run(&frame),
            Err(FEAError::NodeNotFound(42))
        ));
    }
}
