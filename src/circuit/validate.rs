//! Specification validation.

use std::collections::HashSet;

use crate::error::{NetlistError, Result};

use super::Specification;

/// Validate a circuit specification.
///
/// Checks:
/// - Every input and output of every logic element names a port or a
///   global signal
/// - Every element has at least one output
pub fn validate_specification(spec: &Specification) -> Result<()> {
    let declared: HashSet<&str> = spec
        .entity
        .ports
        .iter()
        .map(|port| port.name.as_str())
        .chain(spec.architecture.global_signals.iter().map(|signal| signal.name.as_str()))
        .collect();

    for (index, element) in spec.architecture.logic_elements.iter().enumerate() {
        if let Some(name) = element.signal_names().find(|name| !declared.contains(name)) {
            return Err(NetlistError::DanglingReference {
                element: index,
                name: name.to_string(),
            });
        }

        if element.outputs.is_empty() {
            return Err(NetlistError::invalid_statement(format!(
                "logic element {} ({}) drives nothing",
                index, element.operation
            )));
        }
    }

    Ok(())
}
