//! Rail transport of wind turbine blades
//!
//! A blade carried on flatcars through a horizontal rail turn must bend to
//! stay inside the clearance envelope. This module finds the support load
//! and root rotation that get it through with the lowest truck reaction.

mod loads;
mod numerics;
mod optimizer;
mod rail;
mod section;

pub use loads::{BaselineLoad, LoadProfile};
pub use optimizer::{
    BladeStructure, RailTransport, StationProperties, TransportMargins, TransportProblem,
    TransportResult, TransportState,
};
pub use rail::{RailCurve, RailGeometry};
pub use section::{FiberDistances, SectionOutline};
