//! Name table for one lowering run.

use std::collections::HashSet;

use super::SynthConfig;
use crate::circuit::{Direction, Port, Signal, SignalRef};
use crate::error::{NetlistError, Result};

/// Type names lowered as single-bit signals without a warning.
const SINGLE_BIT_TYPES: &[&str] = &["std_logic", "std_ulogic", "bit"];

/// Declared ports and signals, plus the temporary counter.
///
/// Owned by a single [`super::Synthesizer::synthesize`] call, so temporary
/// numbering always starts from zero.
pub(crate) struct LoweringContext<'c> {
    config: &'c SynthConfig,
    ports: Vec<Port>,
    signals: Vec<Signal>,
    names: HashSet<String>,
    next_temporary: usize,
    high_rail_used: bool,
    low_rail_used: bool,
}

impl<'c> LoweringContext<'c> {
    pub fn new(config: &'c SynthConfig) -> Self {
        Self {
            config,
            ports: Vec::new(),
            signals: Vec::new(),
            names: HashSet::new(),
            next_temporary: 0,
            high_rail_used: false,
            low_rail_used: false,
        }
    }

    fn check_name(&self, name: &str) -> Result<()> {
        if name == self.config.high_rail || name == self.config.low_rail {
            return Err(NetlistError::ReservedSignalName { name: name.to_string() });
        }
        if self.names.contains(name) {
            return Err(NetlistError::DuplicateSignal { name: name.to_string() });
        }
        Ok(())
    }

    fn check_type(name: &str, type_name: &str) {
        if !SINGLE_BIT_TYPES.iter().any(|known| known.eq_ignore_ascii_case(type_name)) {
            log::warn!("'{}' has unsupported type '{}', treating it as single-bit", name, type_name);
        }
    }

    /// Declare an entity port. Ports are also global signals.
    pub fn declare_port(&mut self, name: &str, direction: Direction, type_name: &str) -> Result<()> {
        self.check_name(name)?;
        Self::check_type(name, type_name);

        let port = Port::single_bit(name, direction);
        self.signals.push(Signal::from(&port));
        self.ports.push(port);
        self.names.insert(name.to_string());
        Ok(())
    }

    /// Declare an internal signal.
    pub fn declare_signal(&mut self, name: &str, type_name: &str) -> Result<()> {
        self.check_name(name)?;
        Self::check_type(name, type_name);

        self.signals.push(Signal::single_bit(name));
        self.names.insert(name.to_string());
        Ok(())
    }

    /// Resolve an identifier to a declared port, signal or constant rail.
    pub fn resolve(&mut self, name: &str) -> Result<SignalRef> {
        if name == self.config.high_rail {
            return Ok(self.rail(true));
        }
        if name == self.config.low_rail {
            return Ok(self.rail(false));
        }
        if self.names.contains(name) {
            Ok(SignalRef::new(name))
        } else {
            Err(NetlistError::unresolved(name))
        }
    }

    /// Reference a constant rail, declaring it on first use.
    pub fn rail(&mut self, value: bool) -> SignalRef {
        let config = self.config;
        let (name, used) = if value {
            (&config.high_rail, &mut self.high_rail_used)
        } else {
            (&config.low_rail, &mut self.low_rail_used)
        };
        if !*used {
            *used = true;
            self.signals.push(Signal::single_bit(name.as_str()));
        }
        SignalRef::new(name.as_str())
    }

    /// Declare a fresh temporary signal.
    pub fn temporary(&mut self) -> SignalRef {
        let name = loop {
            let candidate = format!("{}{}", self.config.temporary_prefix, self.next_temporary);
            self.next_temporary += 1;
            if !self.names.contains(&candidate) {
                break candidate;
            }
        };
        log::debug!("created temporary {}", name);

        self.signals.push(Signal::single_bit(name.as_str()));
        self.names.insert(name.clone());
        SignalRef::new(name)
    }

    /// Consume the context, returning the ports and global signals in
    /// declaration order.
    pub fn finish(self) -> (Vec<Port>, Vec<Signal>) {
        (self.ports, self.signals)
    }
}
