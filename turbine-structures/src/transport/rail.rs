//! Circular rail turn and its clearance envelope

use log::debug;
use serde::{Deserialize, Serialize};

use super::numerics::{is_non_decreasing, linspace, nearest_linear, nearest_sorted};
use crate::config::RailTransportConfig;
use crate::error::{StructuresError, StructuresResult};

/// One sampled arc of the turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RailCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// The rising half of `y` is non-decreasing, so lookups can bisect
    monotone: bool,
}

impl RailCurve {
    /// Half circle of `radius` centred on (`center`, 0), sampled from
    /// `x_start` to `x_end`
    fn arc(center: f64, radius: f64, x_start: f64, x_end: f64, n_points: usize) -> Self {
        let x = linspace(x_start, x_end, n_points);
        let y: Vec<f64> = x
            .iter()
            .map(|&xi| (radius * radius - (xi - center) * (xi - center)).max(0.0).sqrt())
            .collect();
        let monotone = is_non_decreasing(&y[..half(y.len())]);
        Self { x, y, monotone }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// x of the sample on the rising half whose height is nearest `y`
    pub fn x_at_height(&self, y: f64) -> f64 {
        let rising = &self.y[..half(self.y.len())];
        let i = if self.monotone {
            nearest_sorted(rising, y)
        } else {
            nearest_linear(rising, y)
        };
        self.x[i]
    }
}

fn half(n: usize) -> usize {
    n.div_ceil(2)
}

/// Rail midline with the outer and inner clearance envelope
///
/// The turn is a circle of radius R whose chord of `rail_chord_length`
/// subtends the horizontal angle. Curves start at the x axis and rise to
/// the apex at x = R, so the first half of each curve is the one the blade
/// sweeps past.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RailGeometry {
    pub radius: f64,
    pub lateral_clearance: f64,
    pub midline: RailCurve,
    pub outer: RailCurve,
    pub inner: RailCurve,
}

impl RailGeometry {
    pub fn new(
        horizontal_angle_deg: f64,
        lateral_clearance: f64,
        n_points: usize,
        rail_chord_length: f64,
    ) -> StructuresResult<Self> {
        if !(horizontal_angle_deg > 0.0 && horizontal_angle_deg <= 180.0) {
            return Err(StructuresError::InvalidInput(format!(
                "horizontal angle {} deg is outside (0, 180]",
                horizontal_angle_deg
            )));
        }
        if n_points < 2 {
            return Err(StructuresError::InvalidInput(format!(
                "rail curves need at least 2 points, got {}",
                n_points
            )));
        }
        if !(lateral_clearance >= 0.0) || !(rail_chord_length > 0.0) {
            return Err(StructuresError::InvalidInput(format!(
                "lateral clearance {} and rail chord {} must be non-negative and positive",
                lateral_clearance, rail_chord_length
            )));
        }

        let angle = horizontal_angle_deg.to_radians();
        let radius = rail_chord_length / (2.0 * (0.5 * angle).sin());
        let half_width = 0.5 * lateral_clearance;
        let r_outer = radius + half_width;
        let r_inner = radius - half_width;
        if r_inner <= 0.0 {
            return Err(StructuresError::InvalidInput(format!(
                "lateral clearance {} is wider than the turn radius {:.3}",
                lateral_clearance, radius
            )));
        }

        let midline = RailCurve::arc(radius, radius, 0.0, 2.0 * radius, n_points);
        let outer = RailCurve::arc(
            radius,
            r_outer,
            -half_width,
            2.0 * radius + half_width,
            n_points,
        );
        let inner = RailCurve::arc(
            radius,
            r_inner,
            half_width,
            2.0 * radius - half_width,
            n_points,
        );
        debug!(
            "Rail turn: radius {:.3} m, envelope {:.3} to {:.3} m, {} points",
            radius, r_inner, r_outer, n_points
        );

        Ok(Self {
            radius,
            lateral_clearance,
            midline,
            outer,
            inner,
        })
    }

    pub fn from_config(config: &RailTransportConfig) -> StructuresResult<Self> {
        Self::new(
            config.horizontal_angle_deg,
            config.lateral_clearance,
            config.n_points,
            config.rail_chord_length,
        )
    }

    pub fn outer_x_at(&self, y: f64) -> f64 {
        self.outer.x_at_height(y)
    }

    pub fn inner_x_at(&self, y: f64) -> f64 {
        self.inner.x_at_height(y)
    }
}
