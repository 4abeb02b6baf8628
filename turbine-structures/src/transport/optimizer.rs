//! Support load and root rotation for carrying a blade through a rail turn
//!
//! The blade rides on two flatcar trucks and is bent by a distributed
//! support load, scaled per station from the load that would strain it to
//! the limit. The design variables are the `n_opt` load factors in [0, 1]
//! followed by the root rotation in radians. The objective is the reaction
//! at the near truck; the constraints keep the strain below the limit and
//! both sides of the bent blade inside the clearance envelope.

use frame_solver::beam::{
    BaseData, Beam, BeamLoads, BeamSolver, EulerBernoulliSolver, SectionData, TipData,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::loads::{BaselineLoad, LoadProfile};
use super::numerics::{arc_length, interp, linspace};
use super::rail::RailGeometry;
use super::section::FiberDistances;
use crate::config::RailTransportConfig;
use crate::error::{StructuresError, StructuresResult};
use crate::optim::penalty::PenaltyLbfgs;
use crate::optim::{max_constraint_violation, Bounds, ConstrainedOptimizer, NonlinearProblem};

/// Objective scale, keeps the reaction force near unity for the optimizer
const OBJECTIVE_SCALE: f64 = 1.0e-5;
/// Strain margins are reported in millistrain
const STRAIN_SCALE: f64 = 1.0e3;

/// Distributed structural properties along a straight blade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BladeStructure {
    /// Reference axis (x, y, z) at each station; z runs root to tip
    pub ref_axis: Vec<[f64; 3]>,
    /// Axial stiffness (N)
    pub ea: Vec<f64>,
    /// Edgewise bending stiffness (N·m²)
    pub eixx: Vec<f64>,
    /// Flapwise bending stiffness (N·m²)
    pub eiyy: Vec<f64>,
    /// Torsional stiffness (N·m²)
    pub gj: Vec<f64>,
    /// Mass per unit length (kg/m)
    pub rho_a: Vec<f64>,
    /// Polar mass moment of inertia per unit length (kg·m)
    pub rho_j: Vec<f64>,
    pub fibers: FiberDistances,
}

/// Section properties of a prismatic blade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationProperties {
    pub ea: f64,
    pub eixx: f64,
    pub eiyy: f64,
    pub gj: f64,
    pub rho_a: f64,
    pub rho_j: f64,
}

impl BladeStructure {
    /// Straight blade with the same section at `n` evenly spaced stations
    pub fn prismatic(
        length: f64,
        n: usize,
        properties: StationProperties,
        fibers: FiberDistances,
    ) -> Self {
        let ref_axis = linspace(0.0, length, n)
            .into_iter()
            .map(|z| [0.0, 0.0, z])
            .collect();
        Self {
            ref_axis,
            ea: vec![properties.ea; n],
            eixx: vec![properties.eixx; n],
            eiyy: vec![properties.eiyy; n],
            gj: vec![properties.gj; n],
            rho_a: vec![properties.rho_a; n],
            rho_j: vec![properties.rho_j; n],
            fibers,
        }
    }

    pub fn n_stations(&self) -> usize {
        self.ref_axis.len()
    }

    /// Span position of each station (m)
    pub fn span(&self) -> Vec<f64> {
        self.ref_axis.iter().map(|p| p[2]).collect()
    }

    /// Blade length, the span position of the tip
    pub fn length(&self) -> f64 {
        self.ref_axis.last().map_or(0.0, |p| p[2])
    }

    /// Check the blade is straight and its arrays line up
    pub fn validate(&self) -> StructuresResult<()> {
        let n = self.n_stations();
        if n < 2 {
            return Err(StructuresError::InvalidInput(format!(
                "blade needs at least 2 stations, got {}",
                n
            )));
        }
        for (station, p) in self.ref_axis.iter().enumerate() {
            for (axis, value) in [('x', p[0]), ('y', p[1])] {
                if value != 0.0 {
                    return Err(StructuresError::NonStraightBlade {
                        axis,
                        station,
                        value,
                    });
                }
            }
        }

        let lengths = [
            ("ea", self.ea.len()),
            ("eixx", self.eixx.len()),
            ("eiyy", self.eiyy.len()),
            ("gj", self.gj.len()),
            ("rho_a", self.rho_a.len()),
            ("rho_j", self.rho_j.len()),
            ("suction fibre", self.fibers.suction.len()),
            ("pressure fibre", self.fibers.pressure.len()),
        ];
        if let Some((name, len)) = lengths.iter().find(|(_, len)| *len != n) {
            return Err(StructuresError::InvalidInput(format!(
                "blade property {} has {} values for {} stations",
                name, len, n
            )));
        }
        if self.ref_axis.windows(2).any(|w| w[1][2] <= w[0][2]) {
            return Err(StructuresError::InvalidInput(
                "blade span positions must be strictly increasing".to_string(),
            ));
        }
        if !(self.length() > 0.0) {
            return Err(StructuresError::InvalidInput(format!(
                "blade length {} must be positive",
                self.length()
            )));
        }
        Ok(())
    }

    /// Section properties resampled onto `stations`
    fn section_at(&self, stations: &[f64]) -> SectionData {
        let span = self.span();
        SectionData {
            z: stations.to_vec(),
            ea: interp(stations, &span, &self.ea),
            eixx: interp(stations, &span, &self.eixx),
            eiyy: interp(stations, &span, &self.eiyy),
            gj: interp(stations, &span, &self.gj),
            rho_a: interp(stations, &span, &self.rho_a),
            rho_j: interp(stations, &span, &self.rho_j),
        }
    }
}

/// Signed margins, all non-negative when feasible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportMargins {
    /// Strain limit minus strain magnitude, in millistrain
    pub strain: Vec<f64>,
    /// Suction side past the outer envelope (m)
    pub outer: Vec<f64>,
    /// Pressure side inside the inner envelope (m)
    pub inner: Vec<f64>,
}

impl TransportMargins {
    /// Strain, outer, then inner margins in one array
    pub fn stacked(&self) -> Vec<f64> {
        let mut g = Vec::with_capacity(self.strain.len() + self.outer.len() + self.inner.len());
        g.extend_from_slice(&self.strain);
        g.extend_from_slice(&self.outer);
        g.extend_from_slice(&self.inner);
        g
    }
}

/// Blade state for one set of design variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportState {
    pub profile: LoadProfile,
    pub strain: Vec<f64>,
    /// Flapwise deflection of the pitch axis (m)
    pub deflection: Vec<f64>,
    /// Root rotation (rad)
    pub root_rotation: f64,
    /// Reaction at the near truck (N)
    pub reaction_force: f64,
    pub margins: TransportMargins,
}

/// The transport problem for one blade on one rail turn
#[derive(Debug, Clone)]
pub struct TransportProblem<'a, B: BeamSolver> {
    solver: &'a B,
    config: RailTransportConfig,
    rail: RailGeometry,
    baseline: BaselineLoad,
    section: SectionData,
    suction: Vec<f64>,
    pressure: Vec<f64>,
    blade_length: f64,
}

impl<'a, B: BeamSolver> TransportProblem<'a, B> {
    pub fn new(
        solver: &'a B,
        config: RailTransportConfig,
        blade: &BladeStructure,
    ) -> StructuresResult<Self> {
        blade.validate()?;
        let rail = RailGeometry::from_config(&config)?;
        let span = blade.span();
        let baseline = BaselineLoad::strain_limited(
            &span,
            &blade.eiyy,
            &blade.fibers.suction,
            config.max_strains,
            config.n_opt,
        )?;
        let stations = &baseline.stations;
        let section = blade.section_at(stations);
        let suction = interp(stations, &span, &blade.fibers.suction);
        let pressure = interp(stations, &span, &blade.fibers.pressure);
        debug!(
            "Transport problem: blade {:.2} m, {} stations, peak baseline load {:.4e} N/m",
            blade.length(),
            stations.len(),
            baseline.load.iter().fold(0.0_f64, |m, &q| m.max(q))
        );

        Ok(Self {
            solver,
            config,
            rail,
            baseline,
            section,
            suction,
            pressure,
            blade_length: blade.length(),
        })
    }

    pub fn rail(&self) -> &RailGeometry {
        &self.rail
    }

    pub fn baseline(&self) -> &BaselineLoad {
        &self.baseline
    }

    pub fn stations(&self) -> &[f64] {
        &self.baseline.stations
    }

    pub fn n_stations(&self) -> usize {
        self.baseline.stations.len()
    }

    /// Full baseline load and no rotation
    pub fn initial_guess(&self) -> Vec<f64> {
        let mut x = vec![1.0; self.n_stations()];
        x.push(0.0);
        x
    }

    /// Load factors in [0, 1], rotation within the root rotation limit
    pub fn bounds(&self) -> StructuresResult<Bounds> {
        let n = self.n_stations();
        let max_rot = self.config.max_root_rot_deg.to_radians();
        let mut lower = vec![0.0; n];
        let mut upper = vec![1.0; n];
        lower.push(-max_rot);
        upper.push(max_rot);
        Bounds::new(lower, upper)
    }

    fn split<'x>(&self, x: &'x [f64]) -> StructuresResult<(&'x [f64], f64)> {
        let n = self.n_stations();
        if x.len() != n + 1 {
            return Err(StructuresError::InvalidInput(format!(
                "expected {} design variables, got {}",
                n + 1,
                x.len()
            )));
        }
        Ok((&x[..n], x[n]))
    }

    fn load_profile(&self, factors: &[f64]) -> LoadProfile {
        LoadProfile::from_load(self.baseline.scaled(factors), &self.baseline.stations)
    }

    /// Loads, deflection and margins for design variables `x`
    ///
    /// The suction side is checked against the outer envelope and the
    /// pressure side against the inner envelope, each at its own rotated
    /// height.
    pub fn evaluate(&self, x: &[f64]) -> StructuresResult<TransportState> {
        let (factors, root_rotation) = self.split(x)?;
        let stations = &self.baseline.stations;
        let profile = self.load_profile(factors);
        let reaction_force = profile.reaction_force(self.config.flatcar_tc_length);

        let strain = profile.strain(&self.suction, &self.section.eiyy);
        let strain_margin = strain
            .iter()
            .map(|eps| (self.config.max_strains - eps.abs()) * STRAIN_SCALE)
            .collect();

        let beam = Beam::new(
            self.section.clone(),
            BeamLoads::flapwise(profile.load.clone()),
            TipData::free(),
            BaseData::rigid(1.0),
        )?;
        let deflection = self.solver.displacement(&beam)?.dx;

        // rescale so the bent pitch axis keeps the blade length
        let arc = arc_length(stations, &deflection)
            .last()
            .copied()
            .unwrap_or(0.0);
        if !(arc > 0.0) || !arc.is_finite() {
            return Err(StructuresError::NonFinite(format!(
                "deflected blade arc length {}",
                arc
            )));
        }
        let scale = self.blade_length / arc;

        let (sin, cos) = root_rotation.sin_cos();
        let rotate = |x: f64, y: f64| (x * cos - y * sin, y * cos + x * sin);

        let n = stations.len();
        let mut outer = Vec::with_capacity(n);
        let mut inner = Vec::with_capacity(n);
        for i in 0..n {
            let x_axis = deflection[i] * scale;
            let y_axis = stations[i] * scale;
            let (ss_x, ss_y) = rotate(x_axis - self.suction[i], y_axis);
            let (ps_x, ps_y) = rotate(x_axis + self.pressure[i], y_axis);
            outer.push(ss_x - self.rail.outer_x_at(ss_y));
            inner.push(self.rail.inner_x_at(ps_y) - ps_x);
        }

        Ok(TransportState {
            profile,
            strain,
            deflection,
            root_rotation,
            reaction_force,
            margins: TransportMargins {
                strain: strain_margin,
                outer,
                inner,
            },
        })
    }

    /// Name of the constraint class furthest from feasible at `x`
    pub fn most_violated(&self, x: &[f64], bounds: &Bounds) -> StructuresResult<&'static str> {
        let margins = self.evaluate(x)?.margins;
        let classes = [
            ("strain limit", max_constraint_violation(&margins.strain)),
            ("outer clearance envelope", max_constraint_violation(&margins.outer)),
            ("inner clearance envelope", max_constraint_violation(&margins.inner)),
            ("variable bounds", bounds.max_violation(x)),
        ];
        let mut worst = classes[0];
        for class in &classes[1..] {
            if class.1 > worst.1 {
                worst = *class;
            }
        }
        Ok(worst.0)
    }
}

impl<B: BeamSolver> NonlinearProblem for TransportProblem<'_, B> {
    fn objective(&self, x: &[f64]) -> StructuresResult<f64> {
        let (factors, _) = self.split(x)?;
        let profile = self.load_profile(factors);
        Ok(profile.reaction_force(self.config.flatcar_tc_length) * OBJECTIVE_SCALE)
    }

    fn constraints(&self, x: &[f64]) -> StructuresResult<Vec<f64>> {
        Ok(self.evaluate(x)?.margins.stacked())
    }
}

/// Outcome of a converged transport analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportResult {
    /// Lateral to vertical ratio on a 4-axle flatcar over its limit;
    /// violated above 1
    pub lv_constraint_4axle: f64,
    /// Same for an 8-axle flatcar
    pub lv_constraint_8axle: f64,
    pub root_rotation_deg: f64,
    /// Peak reaction force at the near truck (N)
    pub reaction_force: f64,
    pub load_factors: Vec<f64>,
    pub stations: Vec<f64>,
    pub load: Vec<f64>,
    pub shear: Vec<f64>,
    pub moment: Vec<f64>,
    pub strain: Vec<f64>,
    pub deflection: Vec<f64>,
    pub iterations: u64,
}

/// Rail transport analysis of a blade
#[derive(Debug, Clone)]
pub struct RailTransport<B: BeamSolver = EulerBernoulliSolver, O = PenaltyLbfgs> {
    beam_solver: B,
    optimizer: O,
    config: RailTransportConfig,
}

impl RailTransport<EulerBernoulliSolver, PenaltyLbfgs> {
    /// Analysis with the built-in beam solver and optimizer
    pub fn with_defaults(config: RailTransportConfig) -> Self {
        Self::new(EulerBernoulliSolver, PenaltyLbfgs::default(), config)
    }
}

impl<B: BeamSolver, O: ConstrainedOptimizer> RailTransport<B, O> {
    pub fn new(beam_solver: B, optimizer: O, config: RailTransportConfig) -> Self {
        Self {
            beam_solver,
            optimizer,
            config,
        }
    }

    pub fn config(&self) -> &RailTransportConfig {
        &self.config
    }

    pub fn problem(&self, blade: &BladeStructure) -> StructuresResult<TransportProblem<'_, B>> {
        TransportProblem::new(&self.beam_solver, self.config, blade)
    }

    /// Find the support load and root rotation with the lowest truck
    /// reaction that keeps the blade within its limits
    ///
    /// Fails with [`StructuresError::OptimizationDidNotConverge`] naming
    /// the most violated constraint when no feasible point is found.
    pub fn run(&self, blade: &BladeStructure) -> StructuresResult<TransportResult> {
        let problem = self.problem(blade)?;
        let bounds = problem.bounds()?;
        let result = self
            .optimizer
            .minimize(&problem, problem.initial_guess(), &bounds)?;

        if !result.success {
            let constraint = problem.most_violated(&result.x, &bounds)?;
            warn!(
                "Transport optimization failed on the {} after {} iterations: {}",
                constraint, result.iterations, result.message
            );
            return Err(StructuresError::OptimizationDidNotConverge {
                constraint: constraint.to_string(),
                message: result.message,
            });
        }

        let state = problem.evaluate(&result.x)?;
        let n = problem.n_stations();
        let root_rotation_deg = state.root_rotation.to_degrees();
        let rf = state.reaction_force;
        let g = self.config.gravity;
        let lv_8 = rf / (self.config.max_flatcar_weight_8axle * g) / self.config.max_lv;
        let lv_4 = rf / (self.config.max_flatcar_weight_4axle * g) / self.config.max_lv;

        info!("Prescribed rotation angle: {:.4} deg", root_rotation_deg);
        info!("Max reaction force: {:.4e} N", rf);

        Ok(TransportResult {
            lv_constraint_4axle: lv_4,
            lv_constraint_8axle: lv_8,
            root_rotation_deg,
            reaction_force: rf,
            load_factors: result.x[..n].to_vec(),
            stations: problem.stations().to_vec(),
            load: state.profile.load,
            shear: state.profile.shear,
            moment: state.profile.moment,
            strain: state.strain,
            deflection: state.deflection,
            iterations: result.iterations,
        })
    }
}
