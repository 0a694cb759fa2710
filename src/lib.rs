//! # hdl_netlist
//!
//! A compiler from a small subset of VHDL to a gate-level circuit
//! specification.
//!
//! This library provides:
//! - A tokenizer that splits punctuation glued to names (`temp;`, `port(`)
//! - A recursive-descent parser with side-effect-free lookahead
//! - A lowering pass that flattens nested expressions into primitive logic
//!   elements wired through temporary signals
//! - A serde-serializable [`Specification`] describing the result
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Lexer, AST and parser for the VHDL subset
//! - [`synth`] - Lowering of the parsed file into a specification
//! - [`circuit`] - Specification types and validation
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! hdlnet and_gate.vhd --pretty > and_gate.json
//! ```
//!
//! ### Library
//!
//! ```no_run
//! let source = std::fs::read_to_string("and_gate.vhd").unwrap();
//! let spec = hdl_netlist::compile(&source).unwrap();
//! println!("{}", spec.to_json_pretty().unwrap());
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmSynthesizer } from 'hdl_netlist';
//!
//! const synth = new WasmSynthesizer();
//! const json = synth.compile(vhdlSource);
//! ```

pub mod circuit;
pub mod dsl;
pub mod error;
pub mod synth;

#[cfg(test)]
mod fixtures;

// Re-export main types for convenience
pub use circuit::Specification;
pub use error::{NetlistError, Result};
pub use synth::{SynthConfig, Synthesizer};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmSynthesizer;

/// Version number written into every specification.
pub const SPEC_VERSION: u32 = 1;

/// Compile source text with the default configuration.
pub fn compile(input: &str) -> Result<Specification> {
    compile_with_config(input, &SynthConfig::default())
}

/// Compile source text with a custom configuration.
pub fn compile_with_config(input: &str, config: &SynthConfig) -> Result<Specification> {
    let expressions = dsl::parse(input)?;
    Synthesizer::with_config(config.clone()).synthesize(&expressions)
}

/// Compile a source file.
#[cfg(feature = "cli")]
pub fn compile_file(path: &std::path::Path, config: &SynthConfig) -> Result<Specification> {
    let expressions = dsl::parse_file(path)?;
    Synthesizer::with_config(config.clone()).synthesize(&expressions)
}
