//! Floating platform frame assembly and analysis

mod analysis;
mod assembly;
mod compose;
mod member;
mod topology;

pub use analysis::{FrameAnalysis, FrameKind, FrameLoads, FrameSolveSummary};
pub use assembly::{
    closest_node, hub_node, tower_frame, FrameElement, FrameModel, PlatformFrame, PlatformModel,
};
pub use compose::{compose_system, CompositionInputs, SystemModel};
pub use member::{MemberModel, MemberSection};
pub use topology::Topology;
