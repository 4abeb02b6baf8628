//! Strain-limited load shapes and their shear and moment profiles

use serde::{Deserialize, Serialize};

use super::numerics::{gradient, integrate_from_tip, interp, linspace};
use crate::error::{StructuresError, StructuresResult};

/// Distributed load that would bring the blade to the strain limit
/// everywhere, sampled at the optimization stations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineLoad {
    /// Span stations (m), evenly spaced root to tip
    pub stations: Vec<f64>,
    /// Moment giving the limit strain at each station (N·m)
    pub moment: Vec<f64>,
    /// Non-negative load per unit length (N/m)
    pub load: Vec<f64>,
}

impl BaselineLoad {
    /// Derive the load from the moment `M = ε_max · EI_flap / d_ss`
    ///
    /// The moment is resampled onto `n_opt` stations and differentiated
    /// twice; negative load is clipped to zero.
    pub fn strain_limited(
        span: &[f64],
        ei_flap: &[f64],
        suction: &[f64],
        max_strain: f64,
        n_opt: usize,
    ) -> StructuresResult<Self> {
        let n = span.len();
        if n < 2 || ei_flap.len() != n || suction.len() != n {
            return Err(StructuresError::InvalidInput(format!(
                "baseline load needs matching span ({}), stiffness ({}) and fibre ({}) arrays",
                n,
                ei_flap.len(),
                suction.len()
            )));
        }
        if n_opt < 2 {
            return Err(StructuresError::InvalidInput(format!(
                "need at least 2 optimization stations, got {}",
                n_opt
            )));
        }

        let mut moment_limit = Vec::with_capacity(n);
        for (i, (&ei, &d)) in ei_flap.iter().zip(suction).enumerate() {
            let m = max_strain * ei / d;
            if !m.is_finite() {
                return Err(StructuresError::NonFinite(format!(
                    "limit moment at station {} (EI {}, fibre distance {})",
                    i, ei, d
                )));
            }
            moment_limit.push(m);
        }

        let stations = linspace(0.0, span[n - 1], n_opt);
        let moment = interp(&stations, span, &moment_limit);
        let shear = gradient(&moment, &stations);
        let load = gradient(&shear, &stations)
            .into_iter()
            .map(|q| q.max(0.0))
            .collect();

        Ok(Self {
            stations,
            moment,
            load,
        })
    }

    /// Baseline load scaled station by station
    pub fn scaled(&self, factors: &[f64]) -> Vec<f64> {
        self.load.iter().zip(factors).map(|(q, f)| q * f).collect()
    }
}

/// Shear and moment carried by the blade under a distributed load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProfile {
    pub load: Vec<f64>,
    pub shear: Vec<f64>,
    pub moment: Vec<f64>,
}

impl LoadProfile {
    /// Integrate the load from the free tip inwards, twice
    pub fn from_load(load: Vec<f64>, stations: &[f64]) -> Self {
        let shear = integrate_from_tip(&load, stations);
        let moment = integrate_from_tip(&shear, stations);
        Self {
            load,
            shear,
            moment,
        }
    }

    /// Reaction at the near flatcar truck: root shear plus the root moment
    /// carried over half the truck spacing
    pub fn reaction_force(&self, truck_spacing: f64) -> f64 {
        match (self.shear.first(), self.moment.first()) {
            (Some(v), Some(m)) => v + m / (0.5 * truck_spacing),
            _ => 0.0,
        }
    }

    /// Flapwise strain at each station
    pub fn strain(&self, suction: &[f64], ei_flap: &[f64]) -> Vec<f64> {
        self.moment
            .iter()
            .zip(suction)
            .zip(ei_flap)
            .map(|((m, d), ei)| m * d / ei)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_blade_needs_no_load() {
        let span = linspace(0.0, 40.0, 11);
        let baseline = BaselineLoad::strain_limited(
            &span,
            &vec![2.0e9; 11],
            &vec![0.5; 11],
            3500e-6,
            21,
        )
        .unwrap();
        assert_eq!(baseline.stations.len(), 21);
        assert_relative_eq!(baseline.moment[7], 3500e-6 * 2.0e9 / 0.5);
        assert!(baseline.load.iter().all(|&q| q == 0.0));
    }

    #[test]
    fn test_quadratic_moment_gives_constant_load() {
        // EI = c (L - r)² with uniform fibres: M'' = 2 c ε / d
        let span = linspace(0.0, 20.0, 41);
        let ei: Vec<f64> = span.iter().map(|r| 1.0e7 * (30.0 - r).powi(2)).collect();
        let baseline =
            BaselineLoad::strain_limited(&span, &ei, &vec![0.4; 41], 3500e-6, 21).unwrap();
        let expected = 2.0 * 1.0e7 * 3500e-6 / 0.4;
        for &q in &baseline.load[2..19] {
            assert_relative_eq!(q, expected, max_relative = 1e-6);
        }
        assert!(baseline.load.iter().all(|&q| q >= 0.0));
    }

    #[test]
    fn test_negative_curvature_is_clipped() {
        let span = linspace(0.0, 10.0, 11);
        let ei: Vec<f64> = span.iter().map(|r| 1.0e8 - 1.0e5 * r * r).collect();
        let baseline =
            BaselineLoad::strain_limited(&span, &ei, &vec![0.3; 11], 3500e-6, 11).unwrap();
        assert!(baseline.load.iter().all(|&q| q == 0.0));
    }

    #[test]
    fn test_zero_fibre_distance_is_non_finite() {
        let span = [0.0, 5.0];
        let err = BaselineLoad::strain_limited(&span, &[1.0e9, 1.0e9], &[0.0, 0.5], 3500e-6, 5)
            .unwrap_err();
        assert!(matches!(err, StructuresError::NonFinite(_)));
    }

    #[test]
    fn test_uniform_load_profile() {
        let stations = linspace(0.0, 10.0, 101);
        let profile = LoadProfile::from_load(vec![100.0; 101], &stations);
        // V(0) = qL, M(0) = qL²/2 up to trapezoid error on the quadratic
        assert_relative_eq!(profile.shear[0], 1000.0, max_relative = 1e-12);
        assert_relative_eq!(profile.moment[0], 5000.0, max_relative = 1e-3);
        assert_eq!(*profile.shear.last().unwrap(), 0.0);
        assert_relative_eq!(
            profile.reaction_force(20.0),
            profile.shear[0] + profile.moment[0] / 10.0
        );

        let strain = profile.strain(&[0.5; 101], &[1.0e9; 101]);
        assert_relative_eq!(strain[0], profile.moment[0] * 0.5 / 1.0e9);
    }
}
