//! Lowering of parsed design units into a circuit specification.
//!
//! ## Lowering
//!
//! A file must contain exactly one entity and one architecture of that
//! entity. Ports become single-bit entity ports and global signals, followed
//! by the architecture's internal signals. Each body statement is then
//! flattened into primitive logic elements:
//!
//! - `Y <= A and B;` becomes one combinational `and` element driving `Y`
//! - nested operands such as `(A or B)` are lowered first and wired to the
//!   outer element through a temporary signal (`tmp_0`, `tmp_1`, ...)
//! - `Y <= A;` becomes a `connection` element with operation `none`
//! - `Y <= A when S = '1' else B;` becomes a `mux` with inputs
//!   `[A, S, B]`: branch values, distinct selectors, default
//! - inside a process, `if`/`if-else` becomes one `mux` per assigned
//!   signal; a signal not assigned on one path feeds itself back and the
//!   element is marked sequential
//!
//! Bit constants reference the `VCC` and `GND` rails, which are declared on
//! first use. Temporaries are never shared between expressions.

mod context;
mod lower;

use context::LoweringContext;

use crate::circuit::{validate_specification, Architecture, Direction, Entity, Specification};
use crate::dsl::{ArchitectureBody, EntityDeclaration, Expression, PortMode};
use crate::error::{NetlistError, Result};

/// Default specification description.
pub const DEFAULT_DESCRIPTION: &str = "Synthesis Performer";

/// Default prefix for generated signal names.
pub const DEFAULT_TEMPORARY_PREFIX: &str = "tmp_";

/// Configuration for the synthesizer.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Text stored in [`Specification::description`].
    pub description: String,
    /// Prefix of temporary signal names; a counter is appended.
    pub temporary_prefix: String,
    /// Name of the constant-1 rail.
    pub high_rail: String,
    /// Name of the constant-0 rail.
    pub low_rail: String,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            temporary_prefix: DEFAULT_TEMPORARY_PREFIX.to_string(),
            high_rail: "VCC".to_string(),
            low_rail: "GND".to_string(),
        }
    }
}

impl SynthConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the specification description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the temporary signal prefix.
    pub fn with_temporary_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temporary_prefix = prefix.into();
        self
    }

    /// Set the names of the constant rails.
    ///
    /// User signals may not take either name.
    pub fn with_rails(mut self, high: impl Into<String>, low: impl Into<String>) -> Self {
        self.high_rail = high.into();
        self.low_rail = low.into();
        self
    }
}

/// Lowers parsed files into specifications.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: SynthConfig,
}

impl Synthesizer {
    /// Create a synthesizer with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a synthesizer with a custom configuration.
    pub fn with_config(config: SynthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Lower the top-level expressions of one file.
    ///
    /// Each call uses a fresh name table, so synthesizing the same input
    /// twice gives identical results.
    pub fn synthesize(&self, expressions: &[Expression]) -> Result<Specification> {
        let (entity, architecture) = design_units(expressions)?;
        if architecture.entity_name != entity.name {
            return Err(NetlistError::EntityMismatch {
                architecture: architecture.name.clone(),
                expected: entity.name.clone(),
                found: architecture.entity_name.clone(),
            });
        }

        let mut ctx = LoweringContext::new(&self.config);

        for decl in &entity.ports {
            let direction = match decl.mode {
                PortMode::In => Direction::In,
                PortMode::Out => Direction::Out,
            };
            for name in &decl.names {
                ctx.declare_port(name, direction, &decl.type_name)?;
            }
        }

        for decl in &architecture.signals {
            for name in &decl.names {
                ctx.declare_signal(name, &decl.type_name)?;
            }
        }

        let mut logic_elements = Vec::new();
        for statement in &architecture.body {
            logic_elements.extend(lower::lower_statement(&mut ctx, statement)?);
        }

        let (ports, global_signals) = ctx.finish();
        let spec = Specification {
            version: crate::SPEC_VERSION,
            description: self.config.description.clone(),
            entity: Entity { ports },
            architecture: Architecture {
                name: architecture.name.clone(),
                global_signals,
                logic_elements,
            },
        };
        validate_specification(&spec)?;

        log::debug!(
            "synthesized {}: {} port(s), {} signal(s), {} element(s)",
            entity.name,
            spec.entity.ports.len(),
            spec.architecture.global_signals.len(),
            spec.architecture.logic_elements.len()
        );
        Ok(spec)
    }
}

/// Lower with the default configuration.
pub fn synthesize(expressions: &[Expression]) -> Result<Specification> {
    Synthesizer::new().synthesize(expressions)
}

/// Find the single entity and architecture of a file.
fn design_units(expressions: &[Expression]) -> Result<(&EntityDeclaration, &ArchitectureBody)> {
    let mut entity: Option<&EntityDeclaration> = None;
    let mut architecture: Option<&ArchitectureBody> = None;

    for expression in expressions {
        match expression {
            Expression::Library(_) | Expression::Use(_) => {}
            Expression::Entity(decl) => {
                if entity.is_some() {
                    return Err(NetlistError::DuplicateEntity { name: decl.name.clone() });
                }
                entity = Some(decl);
            }
            Expression::Architecture(body) => {
                if architecture.is_some() {
                    return Err(NetlistError::DuplicateArchitecture { name: body.name.clone() });
                }
                architecture = Some(body);
            }
            other => {
                return Err(NetlistError::invalid_statement(format!(
                    "{} outside an architecture",
                    other.describe()
                )))
            }
        }
    }

    let entity = entity.ok_or(NetlistError::MissingEntity)?;
    let architecture = architecture.ok_or(NetlistError::MissingArchitecture)?;
    Ok((entity, architecture))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{ElementKind, LogicElement, Operation, SignalRef};
    use crate::dsl::parse;
    use crate::fixtures::{with_body, AND_GATE_SOURCE, MUX_SOURCE};
    use pretty_assertions::assert_eq;

    fn compile(source: &str) -> Result<Specification> {
        synthesize(&parse(source)?)
    }

    fn element(kind: ElementKind, operation: Operation, inputs: &[&str], outputs: &[&str]) -> LogicElement {
        LogicElement {
            kind,
            operation,
            inputs: inputs.iter().map(|name| SignalRef::new(*name)).collect(),
            outputs: outputs.iter().map(|name| SignalRef::new(*name)).collect(),
        }
    }

    fn signal_names(spec: &Specification) -> Vec<&str> {
        spec.architecture
            .global_signals
            .iter()
            .map(|signal| signal.name.as_str())
            .collect()
    }

    #[test]
    fn test_and_gate() {
        let spec = compile(AND_GATE_SOURCE).unwrap();

        assert_eq!(spec.version, 1);
        assert_eq!(spec.description, DEFAULT_DESCRIPTION);
        let ports: Vec<_> = spec.entity.ports.iter().map(|p| (p.name.as_str(), p.direction)).collect();
        assert_eq!(ports, vec![("A", Direction::In), ("B", Direction::In), ("C", Direction::Out)]);
        assert!(spec.entity.ports.iter().all(|p| p.bit_width == 1));

        assert_eq!(spec.architecture.name, "ExampleArchitecture");
        assert_eq!(signal_names(&spec), vec!["A", "B", "C", "temp"]);
        assert_eq!(
            spec.architecture.logic_elements,
            vec![
                element(ElementKind::Combinational, Operation::And, &["A", "B"], &["temp"]),
                element(ElementKind::Connection, Operation::None, &["temp"], &["C"]),
            ]
        );
    }

    #[test]
    fn test_synthesis_is_idempotent() {
        let expressions = parse(MUX_SOURCE).unwrap();
        let synthesizer = Synthesizer::new();
        let first = synthesizer.synthesize(&expressions).unwrap();
        let second = synthesizer.synthesize(&expressions).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_reference_resolves() {
        let spec = compile(&with_body(
            "signal t: std_logic;",
            "t <= (A or B) and not (C xor S);\nY <= t nand '1';\nZ <= not t;",
        ))
        .unwrap();
        for element in &spec.architecture.logic_elements {
            for name in element.signal_names() {
                assert!(spec.find_signal(name).is_some(), "unresolved {}", name);
            }
        }
    }

    #[test]
    fn test_nested_expression_uses_temporaries() {
        let spec = compile(&with_body("", "Y <= (A or B) and not C;")).unwrap();
        assert_eq!(
            spec.architecture.logic_elements,
            vec![
                element(ElementKind::Combinational, Operation::Or, &["A", "B"], &["tmp_0"]),
                element(ElementKind::Combinational, Operation::Not, &["C"], &["tmp_1"]),
                element(ElementKind::Combinational, Operation::And, &["tmp_0", "tmp_1"], &["Y"]),
            ]
        );
        assert_eq!(signal_names(&spec), vec!["A", "B", "C", "S", "Y", "Z", "tmp_0", "tmp_1"]);
    }

    #[test]
    fn test_assignment_drives_only_target() {
        let spec = compile(&with_body("", "Y <= A xor (B and C);\nZ <= '0';")).unwrap();
        let elements = &spec.architecture.logic_elements;
        assert_eq!(elements[1].outputs, vec![SignalRef::new("Y")]);
        assert_eq!(
            elements[2],
            element(ElementKind::Connection, Operation::None, &["GND"], &["Z"])
        );
    }

    #[test]
    fn test_mux_selectors_are_deduplicated() {
        let spec = compile(MUX_SOURCE).unwrap();
        assert_eq!(
            spec.architecture.logic_elements,
            vec![
                element(ElementKind::Combinational, Operation::And, &["A", "C"], &["tmp_0"]),
                element(
                    ElementKind::Connection,
                    Operation::Mux,
                    &["A", "B", "tmp_0", "S", "T", "GND"],
                    &["Y"]
                ),
            ]
        );
        assert_eq!(signal_names(&spec), vec!["A", "B", "C", "S", "T", "Y", "tmp_0", "GND"]);
    }

    #[test]
    fn test_missing_design_units() {
        let err = compile("library ieee;").unwrap_err();
        assert!(matches!(err, NetlistError::MissingEntity));

        let err = compile("entity E is port( A: in std_logic ); end E;").unwrap_err();
        assert!(matches!(err, NetlistError::MissingArchitecture));

        let err = compile("architecture Rtl of E is\nbegin\nend architecture;").unwrap_err();
        assert!(matches!(err, NetlistError::MissingEntity));
    }

    #[test]
    fn test_equal_subexpressions_get_distinct_temporaries() {
        let spec = compile(&with_body("", "Y <= (A and B) or (A and B);")).unwrap();
        assert_eq!(
            spec.architecture.logic_elements,
            vec![
                element(ElementKind::Combinational, Operation::And, &["A", "B"], &["tmp_0"]),
                element(ElementKind::Combinational, Operation::And, &["A", "B"], &["tmp_1"]),
                element(ElementKind::Combinational, Operation::Or, &["tmp_0", "tmp_1"], &["Y"]),
            ]
        );
    }

    #[test]
    fn test_duplicate_entity() {
        let source = format!("{}\nentity Top is port( Q: in bit ); end;", with_body("", "Y <= A;"));
        let err = compile(&source).unwrap_err();
        assert!(matches!(err, NetlistError::DuplicateEntity { ref name } if name == "Top"));
    }

    #[test]
    fn test_architecture_must_name_entity() {
        let source = with_body("", "Y <= A;").replace("of Top", "of Other");
        let err = compile(&source).unwrap_err();
        assert!(matches!(err, NetlistError::EntityMismatch { ref found, .. } if found == "Other"));
    }

    #[test]
    fn test_relational_operator_not_implemented() {
        let err = compile(&with_body("", "Y <= A = B;")).unwrap_err();
        assert!(err.is_not_implemented());
        assert!(matches!(err, NetlistError::NotImplemented { ref operator } if operator == "="));
    }

    #[test]
    fn test_undeclared_signal() {
        let err = compile(&with_body("", "Y <= A and Q;")).unwrap_err();
        assert!(matches!(err, NetlistError::UnresolvedSignal { ref name } if name == "Q"));
    }

    #[test]
    fn test_duplicate_signal_declaration() {
        let err = compile(&with_body("signal A: std_logic;", "Y <= A;")).unwrap_err();
        assert!(matches!(err, NetlistError::DuplicateSignal { .. }));
    }

    #[test]
    fn test_unknown_port_type_is_single_bit() {
        let source = with_body("", "Y <= A;").replace("C: in std_logic", "C: in integer");
        let spec = compile(&source).unwrap();
        assert_eq!(spec.find_port("C").map(|p| p.bit_width), Some(1));
    }

    #[test]
    fn test_config_names() {
        let config = SynthConfig::new()
            .with_description("adder")
            .with_temporary_prefix("n")
            .with_rails("HI", "LO");
        let expressions = parse(&with_body("", "Y <= (A and B) or '1';")).unwrap();
        let spec = Synthesizer::with_config(config).synthesize(&expressions).unwrap();

        assert_eq!(spec.description, "adder");
        assert_eq!(
            spec.architecture.logic_elements[1],
            element(ElementKind::Combinational, Operation::Or, &["n0", "HI"], &["Y"])
        );
    }
}
