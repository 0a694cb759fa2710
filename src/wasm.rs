//! WASM bindings for hdl_netlist.
//!
//! This module provides JavaScript-friendly bindings so a browser-based
//! diagram editor can compile source text without a server round trip.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmSynthesizer } from 'hdl_netlist';
//!
//! await init();
//!
//! const synth = new WasmSynthesizer();
//! synth.set_description('half adder');
//! const spec = JSON.parse(synth.compile(source));
//! ```

use wasm_bindgen::prelude::*;

use crate::synth::SynthConfig;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(err: crate::error::NetlistError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-compatible compiler front end.
///
/// Holds the configuration between calls; every call to `compile` starts
/// from a fresh lowering context.
#[wasm_bindgen]
pub struct WasmSynthesizer {
    config: SynthConfig,
}

#[wasm_bindgen]
impl WasmSynthesizer {
    /// Create a compiler with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmSynthesizer {
        WasmSynthesizer {
            config: SynthConfig::default(),
        }
    }

    /// Set the description stored in compiled specifications.
    #[wasm_bindgen]
    pub fn set_description(&mut self, description: &str) {
        self.config.description = description.to_string();
    }

    /// Set the prefix used for generated signal names.
    #[wasm_bindgen]
    pub fn set_temporary_prefix(&mut self, prefix: &str) {
        self.config.temporary_prefix = prefix.to_string();
    }

    /// Compile source text and return the specification as JSON.
    ///
    /// # Returns
    /// The JSON string, or an error message if the source does not compile.
    #[wasm_bindgen]
    pub fn compile(&self, source: &str) -> Result<String, JsValue> {
        let spec = crate::compile_with_config(source, &self.config).map_err(to_js)?;
        spec.to_json().map_err(to_js)
    }

    /// Tokenize source text, one `line:column kind` entry per token.
    #[wasm_bindgen]
    pub fn tokens(&self, source: &str) -> Vec<String> {
        crate::dsl::tokenize(source)
            .into_iter()
            .map(|token| format!("{}:{} {}", token.line, token.column, token.kind))
            .collect()
    }
}

impl Default for WasmSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Get the specification format version.
#[wasm_bindgen]
pub fn spec_version() -> u32 {
    crate::SPEC_VERSION
}
