//! CLI command implementations

pub mod locations;
pub mod resources;
pub mod setup;
pub mod token;
