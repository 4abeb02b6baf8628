//! Extreme fibre distances of blade cross sections

use serde::{Deserialize, Serialize};

use crate::error::{StructuresError, StructuresResult};

/// Distances from the elastic center to the outline extremes at each
/// span station (m)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiberDistances {
    /// Elastic center to suction side (AE)
    pub suction: Vec<f64>,
    /// Elastic center to pressure side (EB)
    pub pressure: Vec<f64>,
    /// Elastic center to trailing edge (EC)
    pub trailing_edge: Vec<f64>,
    /// Elastic center to leading edge (DE)
    pub leading_edge: Vec<f64>,
}

impl FiberDistances {
    /// Same flapwise distances at every station; edgewise distances zero
    pub fn uniform(n: usize, suction: f64, pressure: f64) -> Self {
        Self {
            suction: vec![suction; n],
            pressure: vec![pressure; n],
            trailing_edge: vec![0.0; n],
            leading_edge: vec![0.0; n],
        }
    }

    /// One set of distances per outline
    pub fn from_outlines(outlines: &[SectionOutline]) -> StructuresResult<Self> {
        let mut fibers = Self::uniform(0, 0.0, 0.0);
        for (i, outline) in outlines.iter().enumerate() {
            let [ae, eb, ec, de] = outline.fiber_distances().map_err(|e| match e {
                StructuresError::InvalidInput(msg) => {
                    StructuresError::InvalidInput(format!("section {}: {}", i, msg))
                }
                other => other,
            })?;
            fibers.suction.push(ae);
            fibers.pressure.push(eb);
            fibers.trailing_edge.push(ec);
            fibers.leading_edge.push(de);
        }
        Ok(fibers)
    }

    pub fn len(&self) -> usize {
        self.suction.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suction.is_empty()
    }
}

/// Airfoil outline placed on the blade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionOutline {
    /// Non-dimensional (x, y) outline, x along the chord
    pub coords: Vec<[f64; 2]>,
    /// Chordwise pitch axis position, fraction of chord
    pub pitch_axis: f64,
    /// Twist (deg)
    pub twist_deg: f64,
    /// Chord (m)
    pub chord: f64,
    /// Elastic center relative to the pitch axis (m)
    pub x_ec: f64,
    pub y_ec: f64,
}

impl SectionOutline {
    /// Distances [AE, EB, EC, DE] from the elastic center to the extreme
    /// fibres of the twisted, dimensional outline
    ///
    /// The outline is rotated by the twist about the pitch axis, then
    /// renormalized to unit chord with the trailing edge first and the
    /// leading edge at y = 0.
    pub fn fiber_distances(&self) -> StructuresResult<[f64; 4]> {
        if self.coords.len() < 2 {
            return Err(StructuresError::InvalidInput(format!(
                "outline has {} points",
                self.coords.len()
            )));
        }

        let (sin, cos) = self.twist_deg.to_radians().sin_cos();
        let mut pts: Vec<[f64; 2]> = self
            .coords
            .iter()
            .map(|&[x, y]| {
                let dx = x - self.pitch_axis;
                [self.pitch_axis + cos * dx - sin * y, sin * dx + cos * y]
            })
            .collect();
        normalize_chord(&mut pts)?;

        let i_te = argmax_x(&pts);
        if i_te != 0 {
            // a closed outline repeats its start point; drop the duplicate
            let start = if pts[0][0] == pts[pts.len() - 1][0] { 1 } else { 0 };
            let mut reordered = pts[i_te..].to_vec();
            reordered.extend_from_slice(&pts[start..i_te]);
            pts = reordered;
        }

        let y_le = pts[argmin_x(&pts)][1];
        for p in pts.iter_mut() {
            p[1] -= y_le;
        }
        normalize_chord(&mut pts)?;
        if pts[pts.len() - 1][0] != 1.0 {
            pts.push(pts[0]);
        }

        let mut x_range = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y_range = (f64::INFINITY, f64::NEG_INFINITY);
        for &[x, y] in &pts {
            let x = self.chord * (x - self.pitch_axis);
            let y = self.chord * y;
            x_range = (x_range.0.min(x), x_range.1.max(x));
            y_range = (y_range.0.min(y), y_range.1.max(y));
        }

        Ok([
            y_range.1 - self.y_ec,
            self.y_ec - y_range.0,
            x_range.1 - self.x_ec,
            self.x_ec - x_range.0,
        ])
    }
}

/// Shift x to start at zero and scale both axes to unit chord
fn normalize_chord(pts: &mut [[f64; 2]]) -> StructuresResult<()> {
    let x_min = pts.iter().fold(f64::INFINITY, |m, p| m.min(p[0]));
    for p in pts.iter_mut() {
        p[0] -= x_min;
    }
    let x_max = pts.iter().fold(f64::NEG_INFINITY, |m, p| m.max(p[0]));
    if !(x_max > 0.0) || !x_max.is_finite() {
        return Err(StructuresError::InvalidInput(format!(
            "outline has no chordwise extent ({})",
            x_max
        )));
    }
    for p in pts.iter_mut() {
        p[0] /= x_max;
        p[1] /= x_max;
    }
    Ok(())
}

/// First index of the largest x
fn argmax_x(pts: &[[f64; 2]]) -> usize {
    let mut best = 0;
    for (i, p) in pts.iter().enumerate() {
        if p[0] > pts[best][0] {
            best = i;
        }
    }
    best
}

/// First index of the smallest x
fn argmin_x(pts: &[[f64; 2]]) -> usize {
    let mut best = 0;
    for (i, p) in pts.iter().enumerate() {
        if p[0] < pts[best][0] {
            best = i;
        }
    }
    best
}
