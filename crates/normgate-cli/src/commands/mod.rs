//! Subcommand implementations.

pub mod audit;
pub mod canonicalize;
pub mod rules;
pub mod verify;
