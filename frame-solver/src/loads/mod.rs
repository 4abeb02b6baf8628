//! Loads module

mod load_case;
mod point_load;

pub use load_case::StaticLoadCase;
pub use point_load::PointLoad;
