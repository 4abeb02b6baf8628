//! Frame Solver - structural solvers for wind turbine support structures
//!
//! Two linear finite element solvers sit behind small traits so callers
//! can swap them for stubs:
//! - [`FrameSolver`](model::FrameSolver): 3D frame of Timoshenko/Euler beam
//!   elements with rigid reactions, lumped extra node masses, static load
//!   cases, optional P-Delta stiffening and modal analysis.
//! - [`BeamSolver`](beam::BeamSolver): cantilevered beam along its span axis
//!   with distributed loads, tip loads and per-DOF base stiffness.
//!
//! ## Example
//! ```rust
//! use frame_solver::prelude::*;
//!
//! let nodes = vec![Node::new(0, 0.0, 0.0, 0.0, 0.5), Node::new(1, 0.0, 0.0, 10.0, 0.5)];
//! let section = SectionProperties::tube(1.0, 0.02, 200e9, 79.3e9, 7850.0);
//! let elements = vec![Element::new(0, 0, 1, section)];
//! let reactions = vec![Reaction::rigid(0, 1e30)];
//!
//! let mut frame = Frame::new(nodes, reactions, elements, AnalysisOptions::default());
//! let mut case = StaticLoadCase::new([0.0, 0.0, -9.81]);
//! case.add_point_load(PointLoad::force(1, [1000.0, 0.0, 0.0]));
//! frame.add_load_case(case);
//!
//! let results = DirectStiffnessSolver.run(&frame).unwrap();
//! let rxn = &results.load_cases[0].reactions[0];
//! assert!((rxn.fx + 1000.0).abs() < 1e-3);
//! ```

pub mod analysis;
pub mod beam;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{AnalysisOptions, DynamicsOptions};
    pub use crate::beam::{
        BaseData, Beam, BeamDisplacement, BeamLoads, BeamSolver, EulerBernoulliSolver,
        SectionData, TipData,
    };
    pub use crate::elements::{Element, ExtraNodeMass, Node, Reaction, SectionProperties};
    pub use crate::error::{FEAError, FEAResult};
    pub use crate::loads::{PointLoad, StaticLoadCase};
    pub use crate::model::{DirectStiffnessSolver, Frame, FrameSolver};
    pub use crate::results::{
        ElementEndForces, FrameResults, LoadCaseResults, ModalResults, NodeDisplacement,
        Reactions,
    };
}
