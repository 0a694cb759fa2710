//! Lowering of architecture statements into logic elements.
//!
//! Each lowering function returns the elements it produced with the root
//! element last. A caller that needs the value of a nested expression links
//! the root's output to a fresh temporary; an assignment instead makes the
//! target the root's only output.

use super::context::LoweringContext;
use crate::circuit::{ElementKind, LogicElement, Operation, SignalRef};
use crate::dsl::{BinaryOperation, Constant, Expression, LogicOp, Operator, Process, RelationalOp, WhenElse};
use crate::error::{NetlistError, Result};

fn operation(op: LogicOp) -> Operation {
    match op {
        LogicOp::And => Operation::And,
        LogicOp::Or => Operation::Or,
        LogicOp::Nand => Operation::Nand,
        LogicOp::Nor => Operation::Nor,
        LogicOp::Xor => Operation::Xor,
        LogicOp::Xnor => Operation::Xnor,
        LogicOp::Not => Operation::Not,
    }
}

/// Lower one statement of an architecture body.
pub(crate) fn lower_statement(ctx: &mut LoweringContext, statement: &Expression) -> Result<Vec<LogicElement>> {
    match statement {
        Expression::Binary(op) if op.operator.is_assignment() => lower_assignment(ctx, op),
        Expression::Binary(_) | Expression::Unary(_) => {
            // A bare logic expression drives a temporary nobody reads.
            let mut elements = lower_value(ctx, statement)?;
            link(ctx, &mut elements);
            Ok(elements)
        }
        Expression::Process(process) => lower_process(ctx, process),
        Expression::If(_) | Expression::IfElse(_) => Err(NetlistError::invalid_statement(format!(
            "{} outside a process",
            statement.describe()
        ))),
        other => Err(NetlistError::invalid_statement(format!(
            "{} in an architecture body",
            other.describe()
        ))),
    }
}

/// Replace the root element's outputs with `target`.
fn project(elements: &mut [LogicElement], target: SignalRef) {
    if let Some(root) = elements.last_mut() {
        root.outputs = vec![target];
    }
}

/// Give the root element a fresh temporary output and return it.
fn link(ctx: &mut LoweringContext, elements: &mut [LogicElement]) -> SignalRef {
    let temporary = ctx.temporary();
    if let Some(root) = elements.last_mut() {
        root.outputs.push(temporary.clone());
    }
    temporary
}

fn assignment_target(ctx: &mut LoweringContext, target: &Expression) -> Result<SignalRef> {
    match target {
        Expression::Identifier(name) => ctx.resolve(name),
        Expression::Parenthesized(inner) => assignment_target(ctx, inner),
        other => Err(NetlistError::invalid_statement(format!(
            "cannot assign to {}",
            other.describe()
        ))),
    }
}

fn lower_assignment(ctx: &mut LoweringContext, assignment: &BinaryOperation) -> Result<Vec<LogicElement>> {
    let target = assignment_target(ctx, &assignment.left)?;
    let mut elements = lower_value(ctx, &assignment.right)?;
    project(&mut elements, target);
    Ok(elements)
}

/// Lower an expression whose value is taken from the root element. The
/// root is returned without outputs.
fn lower_value(ctx: &mut LoweringContext, expression: &Expression) -> Result<Vec<LogicElement>> {
    let mut elements = Vec::new();
    let root = match expression {
        Expression::Parenthesized(inner) => return lower_value(ctx, inner),
        Expression::WhenElse(when_else) => return lower_when_else(ctx, when_else),
        Expression::Binary(op) => match op.operator {
            Operator::Logic(logic) if logic.arity() == 2 => {
                let left = resolve_operand(ctx, &op.left, &mut elements)?;
                let right = resolve_operand(ctx, &op.right, &mut elements)?;
                LogicElement::new(ElementKind::Combinational, operation(logic), vec![left, right])
            }
            Operator::Logic(logic) => {
                return Err(NetlistError::invalid_statement(format!(
                    "`{}` takes a single operand",
                    logic.as_str()
                )))
            }
            Operator::Assignment(_) => {
                return Err(NetlistError::invalid_statement("assignment used as a value"));
            }
            other => return Err(NetlistError::not_implemented(other.as_str())),
        },
        Expression::Unary(op) => match op.operator {
            Operator::Logic(logic) if logic.arity() == 1 => {
                let operand = resolve_operand(ctx, &op.operand, &mut elements)?;
                LogicElement::new(ElementKind::Combinational, operation(logic), vec![operand])
            }
            Operator::Logic(logic) => {
                return Err(NetlistError::invalid_statement(format!(
                    "`{}` needs two operands",
                    logic.as_str()
                )))
            }
            other => return Err(NetlistError::not_implemented(other.as_str())),
        },
        Expression::Identifier(_) | Expression::Constant(_) => {
            let input = resolve_operand(ctx, expression, &mut elements)?;
            LogicElement::new(ElementKind::Connection, Operation::None, vec![input])
        }
        other => {
            return Err(NetlistError::invalid_statement(format!(
                "{} used as a value",
                other.describe()
            )))
        }
    };
    elements.push(root);
    Ok(elements)
}

/// Resolve an operand to a signal, lowering compound operands into
/// `elements` behind a temporary.
fn resolve_operand(
    ctx: &mut LoweringContext,
    operand: &Expression,
    elements: &mut Vec<LogicElement>,
) -> Result<SignalRef> {
    match operand {
        Expression::Identifier(name) => ctx.resolve(name),
        Expression::Constant(Constant::Bit(value)) => Ok(ctx.rail(*value)),
        Expression::Constant(Constant::Numeral(value)) => Err(NetlistError::invalid_statement(format!(
            "numeric literal {} cannot drive a signal",
            value
        ))),
        Expression::Parenthesized(inner) => resolve_operand(ctx, inner, elements),
        Expression::Binary(_) | Expression::Unary(_) | Expression::WhenElse(_) => {
            let mut nested = lower_value(ctx, operand)?;
            let temporary = link(ctx, &mut nested);
            elements.extend(nested);
            Ok(temporary)
        }
        other => Err(NetlistError::invalid_statement(format!(
            "{} used as an operand",
            other.describe()
        ))),
    }
}

/// The signal that selects a branch. `S = '1'` selects on `S`; any other
/// condition is lowered as an operand.
fn resolve_selector(
    ctx: &mut LoweringContext,
    condition: &Expression,
    elements: &mut Vec<LogicElement>,
) -> Result<SignalRef> {
    match condition {
        Expression::Parenthesized(inner) => resolve_selector(ctx, inner, elements),
        Expression::Binary(BinaryOperation {
            left,
            operator: Operator::Relational(RelationalOp::Equal),
            right,
            ..
        }) => match (left.as_ref(), right.as_ref()) {
            (Expression::Identifier(name), Expression::Constant(_)) => ctx.resolve(name),
            _ => resolve_operand(ctx, condition, elements),
        },
        _ => resolve_operand(ctx, condition, elements),
    }
}

/// Inputs are the branch values, then the distinct selectors, then the
/// default.
fn lower_when_else(ctx: &mut LoweringContext, when_else: &WhenElse) -> Result<Vec<LogicElement>> {
    let mut elements = Vec::new();
    let mut values = Vec::with_capacity(when_else.branches.len() + 1);
    let mut selectors: Vec<SignalRef> = Vec::new();

    for branch in &when_else.branches {
        values.push(resolve_operand(ctx, &branch.value, &mut elements)?);
        let selector = resolve_selector(ctx, &branch.condition, &mut elements)?;
        if !selectors.contains(&selector) {
            selectors.push(selector);
        }
    }
    let default = resolve_operand(ctx, &when_else.default, &mut elements)?;

    let mut inputs = values;
    inputs.extend(selectors);
    inputs.push(default);
    elements.push(LogicElement::new(ElementKind::Connection, Operation::Mux, inputs));
    Ok(elements)
}

fn lower_process(ctx: &mut LoweringContext, process: &Process) -> Result<Vec<LogicElement>> {
    for name in &process.sensitivity {
        ctx.resolve(name)?;
    }

    let mut elements = Vec::new();
    for item in &process.body {
        let lowered = match item {
            Expression::If(stmt) => lower_if(ctx, &stmt.condition, &stmt.then_body, &[])?,
            Expression::IfElse(stmt) => lower_if(ctx, &stmt.condition, &stmt.then_body, &stmt.else_body)?,
            Expression::Binary(op)
                if op.operator.is_assignment() && matches!(op.right.as_ref(), Expression::WhenElse(_)) =>
            {
                lower_assignment(ctx, op)?
            }
            other => {
                return Err(NetlistError::unsupported_process(format!(
                    "{} inside a process",
                    other.describe()
                )))
            }
        };
        elements.extend(lowered);
    }
    Ok(elements)
}

/// Assignments of one branch of an if statement. A later assignment to the
/// same target replaces an earlier one.
fn branch_assignments(body: &[Expression]) -> Result<Vec<(&str, &Expression)>> {
    let mut assignments: Vec<(&str, &Expression)> = Vec::new();
    for statement in body {
        let (target, value) = match statement {
            Expression::Binary(op) if op.operator.is_assignment() => match op.left.as_ref() {
                Expression::Identifier(name) => (name.as_str(), op.right.as_ref()),
                other => {
                    return Err(NetlistError::invalid_statement(format!(
                        "cannot assign to {}",
                        other.describe()
                    )))
                }
            },
            other => {
                return Err(NetlistError::unsupported_process(format!(
                    "{} inside an if statement",
                    other.describe()
                )))
            }
        };
        match assignments.iter_mut().find(|(name, _)| *name == target) {
            Some(existing) => existing.1 = value,
            None => assignments.push((target, value)),
        }
    }
    Ok(assignments)
}

fn assigned<'a>(assignments: &[(&str, &'a Expression)], target: &str) -> Option<&'a Expression> {
    assignments
        .iter()
        .find(|(name, _)| *name == target)
        .map(|(_, value)| *value)
}

/// The value a path gives `output`, and whether the path holds the old
/// value because it never assigns it.
fn path_value(
    ctx: &mut LoweringContext,
    value: Option<&Expression>,
    output: &SignalRef,
    elements: &mut Vec<LogicElement>,
) -> Result<(SignalRef, bool)> {
    match value {
        Some(value) => Ok((resolve_operand(ctx, value, elements)?, false)),
        None => Ok((output.clone(), true)),
    }
}

/// One mux per assigned signal: `[then value, selector, else value]`. A
/// signal left unassigned on one path holds its value there, which makes
/// the element sequential.
fn lower_if(
    ctx: &mut LoweringContext,
    condition: &Expression,
    then_body: &[Expression],
    else_body: &[Expression],
) -> Result<Vec<LogicElement>> {
    let then_assignments = branch_assignments(then_body)?;
    let else_assignments = branch_assignments(else_body)?;

    let mut targets: Vec<&str> = then_assignments.iter().map(|(name, _)| *name).collect();
    for (name, _) in &else_assignments {
        if !targets.contains(name) {
            targets.push(*name);
        }
    }

    let mut elements = Vec::new();
    let selector = resolve_selector(ctx, condition, &mut elements)?;

    for target in targets {
        let output = ctx.resolve(target)?;
        let (then_value, then_holds) = path_value(ctx, assigned(&then_assignments, target), &output, &mut elements)?;
        let (else_value, else_holds) = path_value(ctx, assigned(&else_assignments, target), &output, &mut elements)?;

        let kind = if then_holds || else_holds {
            ElementKind::Sequential
        } else {
            ElementKind::Connection
        };
        let mut mux = LogicElement::new(kind, Operation::Mux, vec![then_value, selector.clone(), else_value]);
        mux.outputs.push(output);
        elements.push(mux);
    }
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use crate::circuit::{ElementKind, Operation, SignalRef, Specification};
    use crate::dsl::parse;
    use crate::error::{NetlistError, Result};
    use crate::fixtures::with_body;
    use crate::synth::synthesize;
    use pretty_assertions::assert_eq;

    fn compile(signals: &str, body: &str) -> Result<Specification> {
        synthesize(&parse(&with_body(signals, body))?)
    }

    fn names(refs: &[SignalRef]) -> Vec<&str> {
        refs.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_if_else_is_a_connection_mux() {
        let spec = compile(
            "",
            "process(A, B, S)
begin
    if S = '1' then
        Y <= A;
    else
        Y <= B;
    end if;
end process;",
        )
        .unwrap();

        let elements = &spec.architecture.logic_elements;
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind, ElementKind::Connection);
        assert_eq!(elements[0].operation, Operation::Mux);
        assert_eq!(names(&elements[0].inputs), vec!["A", "S", "B"]);
        assert_eq!(names(&elements[0].outputs), vec!["Y"]);
    }

    #[test]
    fn test_if_without_else_holds_value() {
        let spec = compile(
            "",
            "process(A, S)
begin
    if S = '1' then
        Y <= A;
        Z <= not A;
    end if;
end process;",
        )
        .unwrap();

        let elements = &spec.architecture.logic_elements;
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].kind, ElementKind::Sequential);
        assert_eq!(names(&elements[0].inputs), vec!["A", "S", "Y"]);
        assert_eq!(elements[1].operation, Operation::Not);
        assert_eq!(names(&elements[2].inputs), vec!["tmp_0", "S", "Z"]);
    }

    #[test]
    fn test_signal_assigned_on_else_path_only() {
        let spec = compile(
            "",
            "process(A, B, S)
begin
    if S = '1' then
        Y <= A;
    else
        Y <= B;
        Z <= A;
    end if;
end process;",
        )
        .unwrap();

        let z = &spec.architecture.logic_elements[1];
        assert_eq!(z.kind, ElementKind::Sequential);
        assert_eq!(names(&z.inputs), vec!["Z", "S", "A"]);
    }

    #[test]
    fn test_when_else_inside_process() {
        let spec = compile(
            "",
            "process(A, B, S)
begin
    Y <= A when S = '0' else B;
end process;",
        )
        .unwrap();
        assert_eq!(names(&spec.architecture.logic_elements[0].inputs), vec!["A", "S", "B"]);
    }

    #[test]
    fn test_plain_assignment_in_process_is_unsupported() {
        let err = compile("", "process(A)\nbegin\n    Y <= A;\nend process;").unwrap_err();
        assert!(matches!(err, NetlistError::UnsupportedProcess { .. }));
    }

    #[test]
    fn test_sensitivity_must_resolve() {
        let err = compile(
            "",
            "process(Q)\nbegin\n    Y <= A when S = '1' else B;\nend process;",
        )
        .unwrap_err();
        assert!(matches!(err, NetlistError::UnresolvedSignal { ref name } if name == "Q"));
    }

    #[test]
    fn test_if_outside_process_is_invalid() {
        let err = compile("", "if S = '1' then\n    Y <= A;\nend if;").unwrap_err();
        assert!(matches!(err, NetlistError::InvalidStatement { .. }));
    }

    #[test]
    fn test_compound_selector_is_lowered() {
        let spec = compile("", "Y <= A when (S and C) else B;").unwrap();
        let elements = &spec.architecture.logic_elements;
        assert_eq!(elements[0].operation, Operation::And);
        assert_eq!(names(&elements[1].inputs), vec!["A", "tmp_0", "B"]);
    }

    #[test]
    fn test_compound_when_else_default_goes_last() {
        let spec = compile("", "Y <= A when S = '1' else B and C;").unwrap();
        let elements = &spec.architecture.logic_elements;
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].operation, Operation::And);
        assert_eq!(names(&elements[0].inputs), vec!["B", "C"]);
        assert_eq!(names(&elements[0].outputs), vec!["tmp_0"]);
        assert_eq!(elements[1].operation, Operation::Mux);
        assert_eq!(names(&elements[1].inputs), vec!["A", "S", "tmp_0"]);
        assert_eq!(names(&elements[1].outputs), vec!["Y"]);
    }

    #[test]
    fn test_bare_expression_drives_temporary() {
        let spec = compile("", "A and B;").unwrap();
        assert_eq!(names(&spec.architecture.logic_elements[0].outputs), vec!["tmp_0"]);
    }

    #[test]
    fn test_shift_and_concatenation_not_implemented() {
        let err = compile("", "Y <= A sll B;").unwrap_err();
        assert!(err.is_not_implemented());
        let err = compile("", "Y <= A & B;").unwrap_err();
        assert!(err.is_not_implemented());
    }

    #[test]
    fn test_numeral_cannot_drive_signal() {
        let err = compile("", "Y <= 3;").unwrap_err();
        assert!(err.is_lowering_error());
    }
}
