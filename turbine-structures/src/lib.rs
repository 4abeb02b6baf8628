//! # Turbine Structures
//!
//! Floating platform frame assembly and solve, and rail transport analysis
//! of wind turbine blades.
//!
//! The frame side turns independently discretized members into one
//! deduplicated node and element model, merges a tower on top of the
//! platform and runs static and modal analysis of both the tower alone and
//! the combined system. The transport side finds the distributed support
//! load and root rotation that carry a blade through a rail curve without
//! exceeding its strain limit or the clearance envelope.
//!
//! ## Example
//!
//! ```rust
//! use turbine_structures::prelude::*;
//!
//! let member = MemberModel::uniform(
//!     vec![[0.0, 0.0, -20.0], [0.0, 0.0, -10.0], [0.0, 0.0, 0.0]],
//!     5.0,
//!     MemberSection::tube(10.0, 0.05, 200e9, 79.3e9, 7850.0),
//! )
//! .with_mass(1.0e6, [0.0, 0.0, -10.0])
//! .with_buoyancy(2, 1.5e3, [0.0, 0.0, -10.0], 1.0e7);
//!
//! let mut platform = PlatformFrame::new(FrameLimits::default());
//! let model = platform.assemble(&[member]).unwrap();
//! assert_eq!(model.frame.n_nodes(), 3);
//! assert_eq!(model.frame.n_elements(), 2);
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod optim;
pub mod transport;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{FrameAnalysisConfig, FrameLimits, RailTransportConfig};
    pub use crate::error::{StructuresError, StructuresResult};
    pub use crate::frame::{
        closest_node, compose_system, hub_node, tower_frame, CompositionInputs, FrameAnalysis,
        FrameElement, FrameKind, FrameLoads, FrameModel, FrameSolveSummary, MemberModel,
        MemberSection, PlatformFrame, PlatformModel, SystemModel, Topology,
    };
    pub use crate::optim::{Bounds, ConstrainedOptimizer, NonlinearProblem, OptimizeResult};
    pub use crate::optim::penalty::PenaltyLbfgs;
    pub use crate::transport::{
        BladeStructure, FiberDistances, RailGeometry, RailTransport, SectionOutline,
        StationProperties, TransportResult,
    };
}
