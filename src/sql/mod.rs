//! Statement builder: identifiers come from the schema table, values are bound parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
