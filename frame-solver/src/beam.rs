//! Cantilever beam deflection
//!
//! A straight beam along local z, clamped (or spring supported) at its base
//! and free at its tip. Flapwise loads `px` deflect in x through `EIyy`,
//! edgewise loads `py` deflect in y through `EIxx`, axial loads `pz` stretch
//! through `EA`, and a tip torque twists through `GJ`.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{FEAError, FEAResult};
use crate::math::{self, Mat, Vec as FEVec};

/// Distributed section properties at each station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionData {
    /// Station positions along the beam axis, strictly increasing (m)
    pub z: Vec<f64>,
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
}

impl SectionData {
    /// Number of stations
    pub fn len(&self) -> usize {
        self.z.len()
    }

    /// Whether there are no stations
    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    fn validate(&self) -> FEAResult<()> {
        let n = self.z.len();
        if n < 2 {
            return Err(FEAError::InvalidInput(format!(
                "beam needs at least 2 stations, got {}",
                n
            )));
        }
        let lengths = [
            ("ea", self.ea.len()),
            ("eixx", self.eixx.len()),
            ("eiyy", self.eiyy.len()),
            ("gj", self.gj.len()),
            ("rho_a", self.rho_a.len()),
            ("rho_j", self.rho_j.len()),
        ];
        if let Some((name, len)) = lengths.iter().find(|(_, len)| *len != n) {
            return Err(FEAError::InvalidInput(format!(
                "section property {} has {} values for {} stations",
                name, len, n
            )));
        }
        if self.z.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FEAError::InvalidGeometry(
                "station positions must be strictly increasing".to_string(),
            ));
        }
        Ok(())
    }
}

/// Distributed loads, linear between stations, plus tip loads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamLoads {
    /// Distributed force in x per unit length (N/m)
    pub px: Vec<f64>,
    /// Distributed force in y per unit length (N/m)
    pub py: Vec<f64>,
    /// Distributed force in z per unit length (N/m)
    pub pz: Vec<f64>,
}

impl BeamLoads {
    /// Loads in all three directions
    pub fn new(px: Vec<f64>, py: Vec<f64>, pz: Vec<f64>) -> Self {
        Self { px, py, pz }
    }

    /// Flapwise load only
    pub fn flapwise(px: Vec<f64>) -> Self {
        let n = px.len();
        Self::new(px, vec![0.0; n], vec![0.0; n])
    }
}

/// Point force and moment at the free tip
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TipData {
    /// Tip force `[Fx, Fy, Fz]` (N)
    pub force: [f64; 3],
    /// Tip moment `[Mx, My, Mz]` (N·m)
    pub moment: [f64; 3],
}

impl TipData {
    /// Unloaded free tip
    pub fn free() -> Self {
        Self::default()
    }
}

/// Base support springs `[x, y, z, θx, θy, θz]`
///
/// Values at or above `rigid` fix the DOF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseData {
    /// Spring stiffness per DOF
    pub stiffness: [f64; 6],
    /// Threshold at which a spring counts as fixed
    pub rigid: f64,
}

impl BaseData {
    /// Clamped base
    pub fn rigid(rigid: f64) -> Self {
        Self {
            stiffness: [rigid; 6],
            rigid,
        }
    }

    /// Spring supported base
    pub fn with_stiffness(stiffness: [f64; 6], rigid: f64) -> Self {
        Self { stiffness, rigid }
    }

    fn support(&self, dof: usize) -> Support {
        let k = self.stiffness[dof];
        if k >= self.rigid {
            Support::Fixed
        } else {
            Support::Spring(k)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Support {
    Fixed,
    Spring(f64),
}

/// A beam ready for analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub section: SectionData,
    pub loads: BeamLoads,
    pub tip: TipData,
    pub base: BaseData,
}

impl Beam {
    /// Assemble a beam, checking that loads match the stations
    pub fn new(
        section: SectionData,
        loads: BeamLoads,
        tip: TipData,
        base: BaseData,
    ) -> FEAResult<Self> {
        section.validate()?;
        let n = section.len();
        for (name, load) in [("px", &loads.px), ("py", &loads.py), ("pz", &loads.pz)] {
            if load.len() != n {
                return Err(FEAError::InvalidInput(format!(
                    "load {} has {} values for {} stations",
                    name,
                    load.len(),
                    n
                )));
            }
        }
        Ok(Self {
            section,
            loads,
            tip,
            base,
        })
    }
}

/// Deflections at every station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamDisplacement {
    pub dx: Vec<f64>,
    pub dy: Vec<f64>,
    pub dz: Vec<f64>,
    pub dtheta_x: Vec<f64>,
    pub dtheta_y: Vec<f64>,
    pub dtheta_z: Vec<f64>,
}

/// A solver for cantilever beam deflection
pub trait BeamSolver {
    /// Static deflection of the beam under its loads
    fn displacement(&self, beam: &Beam) -> FEAResult<BeamDisplacement>;
}

/// Finite element Euler-Bernoulli beam solver
///
/// Each span between stations is one Hermite element with the mean
/// stiffness of its end stations. Directions without load return zero
/// deflection without being solved.
#[derive(Debug, Clone, Copy, Default)]
pub struct EulerBernoulliSolver;

/// Bending in one plane: returns (deflection, slope)
fn solve_bending(
    z: &[f64],
    ei: &[f64],
    q: &[f64],
    tip_force: f64,
    tip_moment: f64,
    base: (Support, Support),
) -> FEAResult<(Vec<f64>, Vec<f64>)> {
    let n = z.len();
    let n_dofs = 2 * n;
    let mut k = Mat::zeros(n_dofs, n_dofs);
    let mut f = FEVec::zeros(n_dofs);

    for e in 0..n - 1 {
        let l = z[e + 1] - z[e];
        let l2 = l * l;
        let c = 0.5 * (ei[e] + ei[e + 1]) / (l2 * l);
        if c <= 0.0 {
            return Err(FEAError::InvalidInput(format!(
                "non-positive bending stiffness between stations {} and {}",
                e,
                e + 1
            )));
        }
        #[rustfmt::skip]
        let ke = [
            12.0,     6.0 * l,  -12.0,    6.0 * l,
            6.0 * l,  4.0 * l2, -6.0 * l, 2.0 * l2,
            -12.0,    -6.0 * l, 12.0,     -6.0 * l,
            6.0 * l,  2.0 * l2, -6.0 * l, 4.0 * l2,
        ];
        let (q1, q2) = (q[e], q[e + 1]);
        let fe = [
            l * (7.0 * q1 + 3.0 * q2) / 20.0,
            l2 * (3.0 * q1 + 2.0 * q2) / 60.0,
            l * (3.0 * q1 + 7.0 * q2) / 20.0,
            -l2 * (2.0 * q1 + 3.0 * q2) / 60.0,
        ];
        let base_dof = 2 * e;
        for a in 0..4 {
            f[base_dof + a] += fe[a];
            for b in 0..4 {
                k[(base_dof + a, base_dof + b)] += c * ke[a * 4 + b];
            }
        }
    }

    f[n_dofs - 2] += tip_force;
    f[n_dofs - 1] += tip_moment;

    let u = solve_supported(k, f, [base.0, base.1])?;
    let w = (0..n).map(|i| u[2 * i]).collect();
    let slope = (0..n).map(|i| u[2 * i + 1]).collect();
    Ok((w, slope))
}

/// Axial or torsional bar: returns the nodal values
fn solve_bar(
    z: &[f64],
    stiffness: &[f64],
    q: Option<&[f64]>,
    tip_load: f64,
    base: Support,
) -> FEAResult<Vec<f64>> {
    let n = z.len();
    let mut k = Mat::zeros(n, n);
    let mut f = FEVec::zeros(n);

    for e in 0..n - 1 {
        let l = z[e + 1] - z[e];
        let c = 0.5 * (stiffness[e] + stiffness[e + 1]) / l;
        if c <= 0.0 {
            return Err(FEAError::InvalidInput(format!(
                "non-positive axial or torsional stiffness between stations {} and {}",
                e,
                e + 1
            )));
        }
        k[(e, e)] += c;
        k[(e, e + 1)] -= c;
        k[(e + 1, e)] -= c;
        k[(e + 1, e + 1)] += c;
        if let Some(q) = q {
            f[e] += l * (2.0 * q[e] + q[e + 1]) / 6.0;
            f[e + 1] += l * (q[e] + 2.0 * q[e + 1]) / 6.0;
        }
    }
    f[n - 1] += tip_load;

    let u = solve_supported(k, f, [base])?;
    Ok(u.iter().copied().collect())
}

/// Apply base supports to the leading DOFs and solve
fn solve_supported<const S: usize>(
    mut k: Mat,
    f: FEVec,
    supports: [Support; S],
) -> FEAResult<FEVec> {
    let mut fixed = Vec::with_capacity(S);
    for (dof, support) in supports.iter().enumerate() {
        match *support {
            Support::Fixed => fixed.push(dof),
            Support::Spring(ks) => k[(dof, dof)] += ks,
        }
    }

    let n = k.nrows();
    let free: Vec<usize> = (0..n).filter(|d| !fixed.contains(d)).collect();
    let k_ff = DMatrix::from_fn(free.len(), free.len(), |a, b| k[(free[a], free[b])]);
    let f_f = FEVec::from_fn(free.len(), |a, _| f[free[a]]);

    let u_f = math::solve_cholesky(&k_ff, &f_f)
        .or_else(|| math::solve_linear_system(&k_ff, &f_f))
        .ok_or(FEAError::SingularMatrix)?;

    let mut u = FEVec::zeros(n);
    for (a, &dof) in free.iter().enumerate() {
        u[dof] = u_f[a];
    }
    Ok(u)
}

fn all_zero(values: &[f64]) -> bool {
    values.iter().all(|&v| v == 0.0)
}

impl BeamSolver for EulerBernoulliSolver {
    fn displacement(&self, beam: &Beam) -> FEAResult<BeamDisplacement> {
        let s = &beam.section;
        let n = s.len();
        let base = &beam.base;
        let tip = &beam.tip;

        // flapwise: slope d(dx)/dz is the rotation about y
        let flap_loaded = !all_zero(&beam.loads.px) || tip.force[0] != 0.0 || tip.moment[1] != 0.0;
        let edge_loaded = !all_zero(&beam.loads.py) || tip.force[1] != 0.0 || tip.moment[0] != 0.0;

        let (dx, dtheta_y) = if !flap_loaded {
            (vec![0.0; n], vec![0.0; n])
        } else {
            solve_bending(
                &s.z,
                &s.eiyy,
                &beam.loads.px,
                tip.force[0],
                tip.moment[1],
                (base.support(0), base.support(4)),
            )?
        };

        // edgewise: slope d(dy)/dz is minus the rotation about x
        let (dy, dtheta_x) = if !edge_loaded {
            (vec![0.0; n], vec![0.0; n])
        } else {
            let (dy, slope) = solve_bending(
                &s.z,
                &s.eixx,
                &beam.loads.py,
                tip.force[1],
                -tip.moment[0],
                (base.support(1), base.support(3)),
            )?;
            (dy, slope.into_iter().map(|v| -v).collect())
        };

        let dz = if all_zero(&beam.loads.pz) && tip.force[2] == 0.0 {
            vec![0.0; n]
        } else {
            solve_bar(&s.z, &s.ea, Some(&beam.loads.pz), tip.force[2], base.support(2))?
        };

        let dtheta_z = if tip.moment[2] == 0.0 {
            vec![0.0; n]
        } else {
            solve_bar(&s.z, &s.gj, None, tip.moment[2], base.support(5))?
        };

        Ok(BeamDisplacement {
            dx,
            dy,
            dz,
            dtheta_x,
            dtheta_y,
            dtheta_z,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn uniform_section(n: usize, length: f64, ei: f64) -> SectionData {
        let z = (0..n).map(|i| length * i as f64 / (n - 1) as f64).collect();
        SectionData {
            z,
            ea: vec![1e10; n],
            eixx: vec![ei; n],
            eiyy: vec![ei; n],
            gj: vec![1e8; n],
            rho_a: vec![100.0; n],
            rho_j: vec![1.0; n],
        }
    }

    #[test]
    fn test_uniform_load_tip_deflection() {
        let (n, length, ei, q) = (11, 20.0, 5e8, 1000.0);
        let beam = Beam::new(
            uniform_section(n, length, ei),
            BeamLoads::flapwise(vec![q; n]),
            TipData::free(),
            BaseData::rigid(1e30),
        )
        .unwrap();

        let d = EulerBernoulliSolver.displacement(&beam).unwrap();
        let expected = q * length.powi(4) / (8.0 * ei);
        assert_relative_eq!(d.dx[n - 1], expected, max_relative = 1e-8);
        assert_relative_eq!(d.dtheta_y[n - 1], q * length.powi(3) / (6.0 * ei), max_relative = 1e-8);
        assert_eq!(d.dx[0], 0.0);
        assert!(d.dy.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_tip_force_edgewise() {
        let (n, length, ei, p) = (6, 10.0, 2e7, 500.0);
        let mut tip = TipData::free();
        tip.force[1] = p;
        let beam = Beam::new(
            uniform_section(n, length, ei),
            BeamLoads::flapwise(vec![0.0; n]),
            tip,
            BaseData::rigid(1e30),
        )
        .unwrap();

        let d = EulerBernoulliSolver.displacement(&beam).unwrap();
        assert_relative_eq!(d.dy[n - 1], p * length.powi(3) / (3.0 * ei), max_relative = 1e-8);
        assert!(d.dtheta_x[n - 1] < 0.0);
    }

    #[test]
    fn test_mismatched_loads_rejected() {
        let result = Beam::new(
            uniform_section(5, 10.0, 1e6),
            BeamLoads::flapwise(vec![0.0; 4]),
            TipData::free(),
            BaseData::rigid(1e30),
        );
        assert!(matches!(result, Err(FEAError::InvalidInput(_))));
    }
}
