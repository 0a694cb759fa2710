//! Core types for the circuit specification.
//!
//! These types are the compiler's output and are serialized as JSON with
//! the field names and values shown in their serde attributes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Whether a signal carries one bit or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalType {
    SingleBit,
    BitVector,
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

/// How a logic element relates its outputs to its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Output is a pure function of the current inputs
    Combinational,
    /// Output may hold its previous value
    Sequential,
    /// Output is routed from one of the inputs
    Connection,
}

/// The function a logic element computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    And,
    Or,
    Not,
    Nand,
    Nor,
    Xor,
    Xnor,
    Mux,
    None,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::And => "and",
            Operation::Or => "or",
            Operation::Not => "not",
            Operation::Nand => "nand",
            Operation::Nor => "nor",
            Operation::Xor => "xor",
            Operation::Xnor => "xnor",
            Operation::Mux => "mux",
            Operation::None => "none",
        };
        f.write_str(name)
    }
}

/// A reference to a port or global signal by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalRef {
    pub name: String,
}

impl SignalRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for SignalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An entity port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub signal_type: SignalType,
    pub bit_width: u32,
    pub direction: Direction,
}

impl Port {
    /// A single-bit port.
    pub fn single_bit(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            signal_type: SignalType::SingleBit,
            bit_width: 1,
            direction,
        }
    }
}

/// A named wire inside the architecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub signal_type: SignalType,
    pub bit_width: u32,
}

impl Signal {
    /// A single-bit signal.
    pub fn single_bit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signal_type: SignalType::SingleBit,
            bit_width: 1,
        }
    }
}

impl From<&Port> for Signal {
    fn from(port: &Port) -> Self {
        Self {
            name: port.name.clone(),
            signal_type: port.signal_type,
            bit_width: port.bit_width,
        }
    }
}

/// A primitive gate, multiplexer or pass-through connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicElement {
    pub kind: ElementKind,
    pub operation: Operation,
    pub inputs: Vec<SignalRef>,
    pub outputs: Vec<SignalRef>,
}

impl LogicElement {
    pub fn new(kind: ElementKind, operation: Operation, inputs: Vec<SignalRef>) -> Self {
        Self {
            kind,
            operation,
            inputs,
            outputs: Vec::new(),
        }
    }

    /// All signal names this element touches, inputs first.
    pub fn signal_names(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .map(|signal| signal.name.as_str())
    }
}

impl fmt::Display for LogicElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |refs: &[SignalRef]| refs.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(", ");
        write!(
            f,
            "{}({}) -> [{}]",
            self.operation,
            join(&self.inputs),
            join(&self.outputs)
        )
    }
}

/// The entity interface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entity {
    pub ports: Vec<Port>,
}

/// The architecture netlist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Architecture {
    pub name: String,
    pub global_signals: Vec<Signal>,
    pub logic_elements: Vec<LogicElement>,
}

/// A complete circuit specification: interface plus netlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub version: u32,
    pub description: String,
    pub entity: Entity,
    pub architecture: Architecture,
}

impl Specification {
    /// Look up a port or global signal by name.
    pub fn find_signal(&self, name: &str) -> Option<Signal> {
        self.entity
            .ports
            .iter()
            .find(|port| port.name == name)
            .map(Signal::from)
            .or_else(|| {
                self.architecture
                    .global_signals
                    .iter()
                    .find(|signal| signal.name == name)
                    .cloned()
            })
    }

    /// Look up a port by name.
    pub fn find_port(&self, name: &str) -> Option<&Port> {
        self.entity.ports.iter().find(|port| port.name == name)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
