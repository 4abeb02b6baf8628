//! Structural elements module

mod element;
mod extra_mass;
mod node;
mod reaction;

pub use element::{Element, SectionProperties};
pub use extra_mass::ExtraNodeMass;
pub use node::Node;
pub use reaction::Reaction;
