//! Circuit specification and validation.
//!
//! This module provides the compiler's output: a [`Specification`] holding
//! the entity interface and the architecture netlist of signals and logic
//! elements, in a form that can be handed to a diagram editor or stored as
//! JSON.

mod types;
mod validate;

pub use types::*;
pub use validate::validate_specification;
