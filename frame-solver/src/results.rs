//! Result types for frame analysis

use serde::{Deserialize, Serialize};

/// Displacement results at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Node id
    pub node: usize,
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(node: usize, arr: [f64; 6]) -> Self {
        Self {
            node,
            dx: arr[0],
            dy: arr[1],
            dz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }
}

/// Reaction forces at a supported node
///
/// The force and moment the support exerts on the structure. Components on
/// unsupported DOFs are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reactions {
    /// Node id
    pub node: usize,
    /// Reaction force in X direction
    pub fx: f64,
    /// Reaction force in Y direction
    pub fy: f64,
    /// Reaction force in Z direction
    pub fz: f64,
    /// Reaction moment about X axis
    pub mx: f64,
    /// Reaction moment about Y axis
    pub my: f64,
    /// Reaction moment about Z axis
    pub mz: f64,
}

impl Reactions {
    /// Create from array [FX, FY, FZ, MX, MY, MZ]
    pub fn from_array(node: usize, arr: [f64; 6]) -> Self {
        Self {
            node,
            fx: arr[0],
            fy: arr[1],
            fz: arr[2],
            mx: arr[3],
            my: arr[4],
            mz: arr[5],
        }
    }

    /// Force components
    pub fn force(&self) -> [f64; 3] {
        [self.fx, self.fy, self.fz]
    }

    /// Moment components
    pub fn moment(&self) -> [f64; 3] {
        [self.mx, self.my, self.mz]
    }
}

/// End forces of an element in its local coordinates
///
/// Forces the end nodes exert on the element, ordered
/// `[Fx1, Fy1, Fz1, Mx1, My1, Mz1, Fx2, ..., Mz2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementEndForces {
    /// Element id
    pub element: usize,
    /// Local end forces
    pub local: [f64; 12],
}

impl ElementEndForces {
    /// Axial force (positive = tension)
    pub fn axial(&self) -> f64 {
        self.local[6]
    }
}

/// Results of one static load case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCaseResults {
    /// Nodal displacements, one entry per node in frame order
    pub displacements: Vec<NodeDisplacement>,
    /// Element end forces, one entry per element in frame order
    pub element_forces: Vec<ElementEndForces>,
    /// Support reactions, one entry per reaction in frame order
    pub reactions: Vec<Reactions>,
    /// Number of P-Delta iterations performed (0 for a linear solve)
    pub iterations: usize,
}

/// Modal analysis results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalResults {
    /// Natural frequencies (Hz), ascending
    pub frequencies: Vec<f64>,
    /// Mass-normalised mode shapes over all DOFs (6 per node, frame order)
    pub mode_shapes: Vec<Vec<f64>>,
    /// Total structural mass including extra node masses (kg)
    pub total_mass: f64,
}

/// All results of a frame analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResults {
    /// Static results in load case order
    pub load_cases: Vec<LoadCaseResults>,
    /// Modal results, if dynamics were enabled
    pub modal: Option<ModalResults>,
}
