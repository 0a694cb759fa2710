//! Parser for the VHDL subset.
//!
//! The parser holds a token slice and a cursor. Every `extract_*` method
//! takes `&self` and an offset relative to the cursor, so a production can
//! be attempted and abandoned without side effects. Only
//! [`Parser::parse`] moves the cursor, by the token count of each node it
//! accepts.

use super::ast::*;
use super::lexer::{Keyword, Operator, Paren, Punctuation, Token, TokenKind};
use crate::error::{NetlistError, Result};

/// Parser for a token sequence produced by the lexer.
pub struct Parser<'a> {
    tokens: &'a [Token],
    cursor: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser over the given tokens.
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, cursor: 0 }
    }

    /// Parse all top-level design units and clauses.
    ///
    /// Stops at the first position where nothing can be extracted. Errors
    /// from a production that started but did not match are returned.
    pub fn parse(&mut self) -> Result<Vec<Expression>> {
        let mut expressions = Vec::new();

        while let Some(expression) = self.extract_expression(0)? {
            self.cursor += expression.number_of_tokens();
            expressions.push(expression);
        }

        let trailing = self
            .tokens
            .iter()
            .skip(self.cursor)
            .filter(|token| token.kind != TokenKind::Eof)
            .count();
        if trailing > 0 {
            log::warn!(
                "ignoring {} trailing token(s) starting at line {}",
                trailing,
                self.line(0)
            );
        }

        log::debug!("parsed {} top-level expression(s)", expressions.len());
        Ok(expressions)
    }

    // ============ Token access ============

    fn token(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.cursor + offset)
    }

    fn kind(&self, offset: usize) -> Option<&'a TokenKind> {
        self.token(offset).map(|token| &token.kind)
    }

    fn line(&self, offset: usize) -> usize {
        self.token(offset)
            .or_else(|| self.tokens.last())
            .map_or(1, |token| token.line)
    }

    fn error(&self, offset: usize, production: &str, expected: &str) -> NetlistError {
        let found = self
            .kind(offset)
            .map_or_else(|| "end of input".to_string(), |kind| kind.to_string());
        NetlistError::parse(
            self.line(offset),
            format!("error parsing {}: expected {}, found {}", production, expected, found),
        )
    }

    fn is_keyword(&self, offset: usize, keyword: Keyword) -> bool {
        matches!(self.kind(offset), Some(TokenKind::Keyword(k)) if *k == keyword)
    }

    fn is_punctuation(&self, offset: usize, punctuation: Punctuation) -> bool {
        matches!(self.kind(offset), Some(TokenKind::Punctuation(p)) if *p == punctuation)
    }

    fn expect_keyword(&self, offset: usize, keyword: Keyword, production: &str) -> Result<()> {
        if self.is_keyword(offset, keyword) {
            Ok(())
        } else {
            Err(self.error(offset, production, &format!("keyword `{}`", keyword.as_str())))
        }
    }

    fn expect_punctuation(&self, offset: usize, punctuation: Punctuation, production: &str) -> Result<()> {
        if self.is_punctuation(offset, punctuation) {
            Ok(())
        } else {
            Err(self.error(offset, production, &format!("`{}`", punctuation.as_char())))
        }
    }

    fn expect_paren(&self, offset: usize, paren: Paren, production: &str) -> Result<()> {
        match self.kind(offset) {
            Some(TokenKind::Paren(p)) if *p == paren => Ok(()),
            _ => Err(self.error(offset, production, &format!("`{}`", paren.as_char()))),
        }
    }

    fn expect_identifier(&self, offset: usize, production: &str) -> Result<String> {
        match self.kind(offset) {
            Some(TokenKind::Identifier(name)) => Ok(name.clone()),
            _ => Err(self.error(offset, production, "identifier")),
        }
    }

    // ============ Expressions ============

    /// Extract the expression starting at `offset`, extended into a binary
    /// operation when an operator follows it.
    fn extract_expression(&self, offset: usize) -> Result<Option<Expression>> {
        let token = match self.token(offset) {
            Some(token) => token,
            None => return Ok(None),
        };
        match self.extract_least_complex(token, offset)? {
            Some(expression) => self.extend_into_binary(expression, offset).map(Some),
            None => Ok(None),
        }
    }

    /// Extract the smallest construct that starts with `token`.
    fn extract_least_complex(&self, token: &Token, offset: usize) -> Result<Option<Expression>> {
        match &token.kind {
            TokenKind::Keyword(keyword) => match keyword {
                Keyword::Library => self.extract_library(offset).map(Some),
                Keyword::Use => self.extract_use(offset).map(Some),
                Keyword::If => self.extract_if(offset).map(Some),
                Keyword::Entity => self.extract_entity(offset).map(Some),
                Keyword::Architecture => self.extract_architecture(offset).map(Some),
                Keyword::Process => self.extract_process(offset).map(Some),
                Keyword::Signal => self
                    .extract_signal_declaration(offset)
                    .map(|decl| Some(Expression::Signal(decl))),
                _ => Ok(None),
            },
            TokenKind::Paren(Paren::Left) => self.extract_parenthesized(offset).map(Some),
            TokenKind::Paren(Paren::Right) => Ok(None),
            TokenKind::Operator(operator) => self.extract_unary(*operator, offset).map(Some),
            TokenKind::Identifier(name) => Ok(Some(Expression::Identifier(name.clone()))),
            TokenKind::Number(value) => Ok(Some(Expression::Constant(Constant::Numeral(*value)))),
            TokenKind::Punctuation(Punctuation::Apostrophe) => self.extract_bit(offset).map(Some),
            TokenKind::Punctuation(_) | TokenKind::Eof => Ok(None),
        }
    }

    fn extend_into_binary(&self, left: Expression, offset: usize) -> Result<Expression> {
        // A node that already consumed its `;` ends the statement.
        if is_terminated(&left) {
            return Ok(left);
        }
        let operator_offset = offset + left.number_of_tokens();
        let operator = match self.kind(operator_offset) {
            Some(TokenKind::Operator(operator)) => *operator,
            _ => return Ok(left),
        };

        let right_offset = operator_offset + 1;
        let right = if operator.is_assignment() {
            self.extract_conditional(right_offset)?
        } else {
            self.extract_expression(right_offset)?
        };
        let right = right.ok_or_else(|| {
            self.error(right_offset, "binary operation", &format!("expression after `{}`", operator))
        })?;

        let terminated = self.is_punctuation(right_offset + right.number_of_tokens(), Punctuation::Semicolon);
        Ok(Expression::Binary(BinaryOperation {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            terminated,
        }))
    }

    /// Right-hand side of an assignment: an expression, optionally the first
    /// value of a `when ... else` chain.
    fn extract_conditional(&self, offset: usize) -> Result<Option<Expression>> {
        let first = match self.extract_expression(offset)? {
            Some(expression) => expression,
            None => return Ok(None),
        };
        if self.is_keyword(offset + first.number_of_tokens(), Keyword::When) {
            self.extract_when_else(first, offset).map(Some)
        } else {
            Ok(Some(first))
        }
    }

    fn extract_when_else(&self, first: Expression, offset: usize) -> Result<Expression> {
        const PRODUCTION: &str = "conditional assignment";

        let mut branches = Vec::new();
        let mut value = first;
        let mut position = offset;
        loop {
            let when_offset = position + value.number_of_tokens();
            self.expect_keyword(when_offset, Keyword::When, PRODUCTION)?;
            let condition = self
                .extract_expression(when_offset + 1)?
                .ok_or_else(|| self.error(when_offset + 1, PRODUCTION, "condition after `when`"))?;
            let else_offset = when_offset + 1 + condition.number_of_tokens();
            self.expect_keyword(else_offset, Keyword::Else, PRODUCTION)?;
            branches.push(ConditionalBranch { value, condition });

            position = else_offset + 1;
            value = self
                .extract_expression(position)?
                .ok_or_else(|| self.error(position, PRODUCTION, "value after `else`"))?;
            if !self.is_keyword(position + value.number_of_tokens(), Keyword::When) {
                break;
            }
        }

        // The statement terminator belongs to the whole chain.
        take_terminator(&mut value);
        self.expect_punctuation(position + value.number_of_tokens(), Punctuation::Semicolon, PRODUCTION)?;

        Ok(Expression::WhenElse(WhenElse {
            branches,
            default: Box::new(value),
        }))
    }

    /// A prefix operator applies to the primary that follows it.
    fn extract_unary(&self, operator: Operator, offset: usize) -> Result<Expression> {
        let operand_offset = offset + 1;
        let operand = match self.token(operand_offset) {
            Some(token) => self.extract_least_complex(token, operand_offset)?,
            None => None,
        };
        let operand = operand.ok_or_else(|| {
            self.error(operand_offset, "unary operation", &format!("operand after `{}`", operator))
        })?;

        let terminated = self.is_punctuation(operand_offset + operand.number_of_tokens(), Punctuation::Semicolon);
        Ok(Expression::Unary(UnaryOperation {
            operator,
            operand: Box::new(operand),
            terminated,
        }))
    }

    fn extract_parenthesized(&self, offset: usize) -> Result<Expression> {
        const PRODUCTION: &str = "parenthesized expression";

        self.expect_paren(offset, Paren::Left, PRODUCTION)?;
        let inner = self
            .extract_expression(offset + 1)?
            .ok_or_else(|| self.error(offset + 1, PRODUCTION, "expression"))?;
        self.expect_paren(offset + 1 + inner.number_of_tokens(), Paren::Right, PRODUCTION)?;
        Ok(Expression::Parenthesized(Box::new(inner)))
    }

    fn extract_bit(&self, offset: usize) -> Result<Expression> {
        const PRODUCTION: &str = "bit constant";

        self.expect_punctuation(offset, Punctuation::Apostrophe, PRODUCTION)?;
        let value = match self.kind(offset + 1) {
            Some(TokenKind::Number(value)) if *value == 0.0 => false,
            Some(TokenKind::Number(value)) if *value == 1.0 => true,
            _ => return Err(self.error(offset + 1, PRODUCTION, "`0` or `1`")),
        };
        self.expect_punctuation(offset + 2, Punctuation::Apostrophe, PRODUCTION)?;
        Ok(Expression::Constant(Constant::Bit(value)))
    }

    // ============ Statements ============

    /// Extract statements until a token that starts none is reached.
    fn extract_statements(&self, offset: usize) -> Result<Vec<Expression>> {
        let mut statements = Vec::new();
        let mut position = offset;
        while let Some(statement) = self.extract_expression(position)? {
            position += statement.number_of_tokens();
            statements.push(statement);
        }
        Ok(statements)
    }

    /// `if condition then statements`, returning the offset after the body.
    fn extract_if_head(&self, offset: usize, production: &str) -> Result<(Expression, Vec<Expression>, usize)> {
        self.expect_keyword(offset, Keyword::If, production)?;
        let condition = self
            .extract_expression(offset + 1)?
            .ok_or_else(|| self.error(offset + 1, production, "condition after `if`"))?;
        let then_offset = offset + 1 + condition.number_of_tokens();
        self.expect_keyword(then_offset, Keyword::Then, production)?;
        let body = self.extract_statements(then_offset + 1)?;
        let body_end = then_offset + 1 + body_tokens(&body);
        Ok((condition, body, body_end))
    }

    fn expect_end_if(&self, offset: usize, production: &str) -> Result<()> {
        self.expect_keyword(offset, Keyword::End, production)?;
        self.expect_keyword(offset + 1, Keyword::If, production)?;
        self.expect_punctuation(offset + 2, Punctuation::Semicolon, production)
    }

    /// The head and then-body are parsed once; the token after the body
    /// decides between the if-else and the plain form.
    fn extract_if(&self, offset: usize) -> Result<Expression> {
        const PRODUCTION: &str = "if statement";
        const ELSE_PRODUCTION: &str = "if-else statement";

        let (condition, then_body, body_end) = self.extract_if_head(offset, PRODUCTION)?;
        if !self.is_keyword(body_end, Keyword::Else) {
            if !self.is_keyword(body_end, Keyword::End) {
                return Err(self.error(body_end, PRODUCTION, "keyword `else` or `end`"));
            }
            self.expect_end_if(body_end, PRODUCTION)?;
            return Ok(Expression::If(IfStatement {
                condition: Box::new(condition),
                then_body,
            }));
        }

        let else_body = self.extract_statements(body_end + 1)?;
        self.expect_end_if(body_end + 1 + body_tokens(&else_body), ELSE_PRODUCTION)?;
        Ok(Expression::IfElse(IfElseStatement {
            condition: Box::new(condition),
            then_body,
            else_body,
        }))
    }

    fn extract_process(&self, offset: usize) -> Result<Expression> {
        const PRODUCTION: &str = "process";

        self.expect_keyword(offset, Keyword::Process, PRODUCTION)?;
        self.expect_paren(offset + 1, Paren::Left, PRODUCTION)?;
        let sensitivity = self.extract_identifier_list(offset + 2);
        let close = offset + 2 + list_tokens(sensitivity.len());
        self.expect_paren(close, Paren::Right, PRODUCTION)?;
        self.expect_keyword(close + 1, Keyword::Begin, PRODUCTION)?;
        let body = self.extract_statements(close + 2)?;
        let end = close + 2 + body_tokens(&body);
        self.expect_keyword(end, Keyword::End, PRODUCTION)?;
        self.expect_keyword(end + 1, Keyword::Process, PRODUCTION)?;
        self.expect_punctuation(end + 2, Punctuation::Semicolon, PRODUCTION)?;
        Ok(Expression::Process(Process { sensitivity, body }))
    }

    // ============ Declarations ============

    /// Identifiers separated by commas; may be empty.
    fn extract_identifier_list(&self, offset: usize) -> Vec<String> {
        let mut names = Vec::new();
        let mut position = offset;
        while let Some(TokenKind::Identifier(name)) = self.kind(position) {
            names.push(name.clone());
            let continues = self.is_punctuation(position + 1, Punctuation::Comma)
                && matches!(self.kind(position + 2), Some(TokenKind::Identifier(_)));
            if !continues {
                break;
            }
            position += 2;
        }
        names
    }

    fn extract_signal_declaration(&self, offset: usize) -> Result<SignalDeclaration> {
        const PRODUCTION: &str = "signal declaration";

        self.expect_keyword(offset, Keyword::Signal, PRODUCTION)?;
        let names = self.extract_identifier_list(offset + 1);
        if names.is_empty() {
            return Err(self.error(offset + 1, PRODUCTION, "signal name"));
        }
        let colon = offset + 1 + list_tokens(names.len());
        self.expect_punctuation(colon, Punctuation::Colon, PRODUCTION)?;
        let type_name = self.expect_identifier(colon + 1, PRODUCTION)?;
        self.expect_punctuation(colon + 2, Punctuation::Semicolon, PRODUCTION)?;
        Ok(SignalDeclaration { names, type_name })
    }

    /// Internal signals between `is` and `begin`. Empty only if `begin`
    /// follows directly.
    fn extract_signal_declarations(&self, offset: usize) -> Result<Vec<SignalDeclaration>> {
        if self.is_keyword(offset, Keyword::Begin) {
            return Ok(Vec::new());
        }

        let mut signals = Vec::new();
        let mut position = offset;
        loop {
            match self.extract_signal_declaration(position) {
                Ok(decl) => {
                    position += decl.number_of_tokens();
                    signals.push(decl);
                }
                Err(err) if signals.is_empty() => return Err(err),
                Err(_) => break,
            }
        }
        Ok(signals)
    }

    fn extract_port_declaration(&self, offset: usize) -> Result<PortDeclaration> {
        const PRODUCTION: &str = "port declaration";

        let names = self.extract_identifier_list(offset);
        if names.is_empty() {
            return Err(self.error(offset, PRODUCTION, "port name"));
        }
        let colon = offset + list_tokens(names.len());
        self.expect_punctuation(colon, Punctuation::Colon, PRODUCTION)?;
        let mode = match self.kind(colon + 1) {
            Some(TokenKind::Keyword(Keyword::In)) => PortMode::In,
            Some(TokenKind::Keyword(Keyword::Out)) => PortMode::Out,
            _ => return Err(self.error(colon + 1, PRODUCTION, "keyword `in` or `out`")),
        };
        let type_name = self.expect_identifier(colon + 2, PRODUCTION)?;
        Ok(PortDeclaration {
            names,
            mode,
            type_name,
        })
    }

    /// One or more port declarations separated by `;`.
    fn extract_port_declarations(&self, offset: usize) -> Result<Vec<PortDeclaration>> {
        let first = self.extract_port_declaration(offset)?;
        let mut position = offset + first.number_of_tokens();
        let mut ports = vec![first];

        while self.is_punctuation(position, Punctuation::Semicolon) {
            match self.extract_port_declaration(position + 1) {
                Ok(decl) => {
                    position += 1 + decl.number_of_tokens();
                    ports.push(decl);
                }
                Err(_) => break,
            }
        }
        Ok(ports)
    }

    /// `end [keyword] [label] ;`
    fn extract_end_clause(&self, offset: usize, keyword: Keyword, name: &str, production: &str) -> Result<EndClause> {
        self.expect_keyword(offset, Keyword::End, production)?;
        let mut position = offset + 1;

        let repeats_keyword = self.is_keyword(position, keyword);
        if repeats_keyword {
            position += 1;
        }

        let label = match self.kind(position) {
            Some(TokenKind::Identifier(label)) => {
                if label != name {
                    return Err(NetlistError::parse(
                        self.line(position),
                        format!(
                            "error parsing {}: closing label `{}` does not match `{}`",
                            production, label, name
                        ),
                    ));
                }
                position += 1;
                Some(label.clone())
            }
            _ => None,
        };

        self.expect_punctuation(position, Punctuation::Semicolon, production)?;
        Ok(EndClause { repeats_keyword, label })
    }

    fn extract_entity(&self, offset: usize) -> Result<Expression> {
        const PRODUCTION: &str = "entity";

        self.expect_keyword(offset, Keyword::Entity, PRODUCTION)?;
        let name = self.expect_identifier(offset + 1, PRODUCTION)?;
        self.expect_keyword(offset + 2, Keyword::Is, PRODUCTION)?;

        self.expect_keyword(offset + 3, Keyword::Port, PRODUCTION)?;
        self.expect_paren(offset + 4, Paren::Left, PRODUCTION)?;
        let ports = self.extract_port_declarations(offset + 5)?;
        let declarations: usize = ports.iter().map(PortDeclaration::number_of_tokens).sum();
        let close = offset + 5 + declarations + ports.len() - 1;
        self.expect_paren(close, Paren::Right, PRODUCTION)?;
        self.expect_punctuation(close + 1, Punctuation::Semicolon, PRODUCTION)?;

        let end = self.extract_end_clause(close + 2, Keyword::Entity, &name, PRODUCTION)?;
        Ok(Expression::Entity(EntityDeclaration { name, ports, end }))
    }

    fn extract_architecture(&self, offset: usize) -> Result<Expression> {
        const PRODUCTION: &str = "architecture";

        self.expect_keyword(offset, Keyword::Architecture, PRODUCTION)?;
        let name = self.expect_identifier(offset + 1, PRODUCTION)?;
        self.expect_keyword(offset + 2, Keyword::Of, PRODUCTION)?;
        let entity_name = self.expect_identifier(offset + 3, PRODUCTION)?;
        self.expect_keyword(offset + 4, Keyword::Is, PRODUCTION)?;

        let signals = self.extract_signal_declarations(offset + 5)?;
        let declared: usize = signals.iter().map(SignalDeclaration::number_of_tokens).sum();
        let begin = offset + 5 + declared;
        self.expect_keyword(begin, Keyword::Begin, PRODUCTION)?;

        let body = self.extract_statements(begin + 1)?;
        let end_offset = begin + 1 + body_tokens(&body);
        let end = self.extract_end_clause(end_offset, Keyword::Architecture, &name, PRODUCTION)?;

        Ok(Expression::Architecture(ArchitectureBody {
            name,
            entity_name,
            signals,
            body,
            end,
        }))
    }

    fn extract_library(&self, offset: usize) -> Result<Expression> {
        const PRODUCTION: &str = "library clause";

        self.expect_keyword(offset, Keyword::Library, PRODUCTION)?;
        let name = self.expect_identifier(offset + 1, PRODUCTION)?;
        self.expect_punctuation(offset + 2, Punctuation::Semicolon, PRODUCTION)?;
        Ok(Expression::Library(name))
    }

    fn extract_use(&self, offset: usize) -> Result<Expression> {
        const PRODUCTION: &str = "use clause";

        self.expect_keyword(offset, Keyword::Use, PRODUCTION)?;
        let library = self.expect_identifier(offset + 1, PRODUCTION)?;
        self.expect_punctuation(offset + 2, Punctuation::Dot, PRODUCTION)?;
        let package = self.expect_identifier(offset + 3, PRODUCTION)?;
        self.expect_punctuation(offset + 4, Punctuation::Dot, PRODUCTION)?;
        let item = self.expect_identifier(offset + 5, PRODUCTION)?;
        self.expect_punctuation(offset + 6, Punctuation::Semicolon, PRODUCTION)?;
        Ok(Expression::Use(UseClause { library, package, item }))
    }
}

/// Whether the node ends with a statement-ending `;`, its own or one held
/// by its rightmost operand.
fn is_terminated(expression: &Expression) -> bool {
    match expression {
        Expression::Binary(op) => op.terminated || is_terminated(&op.right),
        Expression::Unary(op) => op.terminated || is_terminated(&op.operand),
        Expression::WhenElse(_)
        | Expression::If(_)
        | Expression::IfElse(_)
        | Expression::Process(_)
        | Expression::Signal(_)
        | Expression::Entity(_)
        | Expression::Architecture(_)
        | Expression::Library(_)
        | Expression::Use(_) => true,
        Expression::Identifier(_) | Expression::Constant(_) | Expression::Parenthesized(_) => false,
    }
}

/// Clear the `;` attached to the rightmost operation of an expression.
fn take_terminator(expression: &mut Expression) -> bool {
    match expression {
        Expression::Binary(op) if op.terminated => {
            op.terminated = false;
            true
        }
        Expression::Binary(op) => take_terminator(&mut op.right),
        Expression::Unary(op) if op.terminated => {
            op.terminated = false;
            true
        }
        Expression::Unary(op) => take_terminator(&mut op.operand),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::lexer::{AssignmentOp, Lexer, LogicOp, RelationalOp};
    use crate::dsl::parse;
    use crate::fixtures::{with_body, AND_GATE_SOURCE, MUX_SOURCE};
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> Box<Expression> {
        Box::new(Expression::Identifier(name.to_string()))
    }

    fn binary(left: Box<Expression>, operator: Operator, right: Box<Expression>, terminated: bool) -> Box<Expression> {
        Box::new(Expression::Binary(BinaryOperation {
            left,
            operator,
            right,
            terminated,
        }))
    }

    const ASSIGN: Operator = Operator::Assignment(AssignmentOp::Signal);
    const AND: Operator = Operator::Logic(LogicOp::And);

    fn architecture_body(source: &str) -> Vec<Expression> {
        let expressions = parse(source).unwrap();
        expressions
            .into_iter()
            .find_map(|e| match e {
                Expression::Architecture(arch) => Some(arch.body),
                _ => None,
            })
            .expect("architecture")
    }

    #[test]
    fn test_parse_and_gate() {
        let expressions = parse(AND_GATE_SOURCE).unwrap();
        assert_eq!(expressions.len(), 4);
        assert!(matches!(expressions[0], Expression::Library(ref name) if name == "ieee"));
        assert_eq!(
            expressions[1],
            Expression::Use(UseClause {
                library: "ieee".to_string(),
                package: "std_logic_1164".to_string(),
                item: "all".to_string(),
            })
        );

        let tokens: usize = expressions.iter().map(Expression::number_of_tokens).sum();
        assert_eq!(tokens, 58);

        match &expressions[2] {
            Expression::Entity(entity) => {
                assert_eq!(entity.name, "ExampleEntity");
                assert_eq!(entity.ports.len(), 3);
                assert_eq!(entity.ports[2].mode, PortMode::Out);
            }
            other => panic!("expected entity, got {:?}", other),
        }

        match &expressions[3] {
            Expression::Architecture(arch) => {
                assert_eq!(arch.name, "ExampleArchitecture");
                assert_eq!(arch.entity_name, "ExampleEntity");
                assert_eq!(arch.signals[0].names, vec!["temp".to_string()]);
                assert_eq!(
                    arch.body,
                    vec![
                        *binary(ident("temp"), ASSIGN, binary(ident("A"), AND, ident("B"), true), false),
                        *binary(ident("C"), ASSIGN, ident("temp"), true),
                    ]
                );
            }
            other => panic!("expected architecture, got {:?}", other),
        }
    }

    #[test]
    fn test_extraction_does_not_move_cursor() {
        let tokens = Lexer::new("Y <= A or B;").tokenize();
        let parser = Parser::new(&tokens);
        let first = parser.extract_expression(0).unwrap();
        let second = parser.extract_expression(0).unwrap();
        assert_eq!(first, second);
        assert_eq!(parser.cursor, 0);
    }

    #[test]
    fn test_not_binds_to_primary() {
        let body = architecture_body(&with_body("", "Y <= not A and B;"));
        let not_a = Box::new(Expression::Unary(UnaryOperation {
            operator: Operator::Logic(LogicOp::Not),
            operand: ident("A"),
            terminated: false,
        }));
        assert_eq!(body, vec![*binary(ident("Y"), ASSIGN, binary(not_a, AND, ident("B"), true), false)]);
    }

    #[test]
    fn test_when_else_chain() {
        let body = architecture_body(MUX_SOURCE);
        assert_eq!(body.len(), 1);
        let when_else = match &body[0] {
            Expression::Binary(BinaryOperation { right, .. }) => match right.as_ref() {
                Expression::WhenElse(when_else) => when_else.clone(),
                other => panic!("expected when/else, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        };
        assert_eq!(when_else.branches.len(), 3);
        assert_eq!(*when_else.default, Expression::Constant(Constant::Bit(false)));
        assert!(matches!(when_else.branches[2].value, Expression::Parenthesized(_)));
        match &when_else.branches[0].condition {
            Expression::Binary(op) => {
                assert_eq!(op.operator, Operator::Relational(RelationalOp::Equal));
                assert_eq!(*op.right, Expression::Constant(Constant::Bit(true)));
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_when_else_default_may_be_compound() {
        let body = architecture_body(&with_body("", "Y <= A when S = '1' else B and C;\nZ <= A;"));
        assert_eq!(body.len(), 2);
        match &body[0] {
            Expression::Binary(BinaryOperation { right, .. }) => match right.as_ref() {
                Expression::WhenElse(when_else) => {
                    assert_eq!(*when_else.default, *binary(ident("B"), AND, ident("C"), false))
                }
                other => panic!("expected when/else, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_when_without_default_fails() {
        let err = parse(&with_body("", "Y <= A when S = '1';")).unwrap_err();
        assert!(err.is_parse_error());
        assert!(err.to_string().contains("conditional assignment"), "{}", err);
    }

    #[test]
    fn test_if_else_and_if_fallback() {
        let body = architecture_body(&with_body(
            "",
            "process(A, B, S)
begin
    if S = '1' then
        Y <= A;
    else
        Y <= B;
    end if;
    if S = '0' then
        Z <= B;
    end if;
end process;",
        ));
        match &body[0] {
            Expression::Process(process) => {
                assert_eq!(process.sensitivity, vec!["A", "B", "S"]);
                assert_eq!(process.body.len(), 2);
                assert!(matches!(process.body[0], Expression::IfElse(_)));
                match &process.body[1] {
                    Expression::If(stmt) => assert_eq!(stmt.then_body.len(), 1),
                    other => panic!("expected if, got {:?}", other),
                }
            }
            other => panic!("expected process, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_names_per_declaration() {
        let expressions = parse(MUX_SOURCE).unwrap();
        match &expressions[2] {
            Expression::Entity(entity) => {
                assert_eq!(entity.ports[0].names, vec!["A", "B"]);
                assert_eq!(entity.end, EndClause { repeats_keyword: true, label: Some("Mux".to_string()) });
            }
            other => panic!("expected entity, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_signal_list_before_begin() {
        let expressions = parse(MUX_SOURCE).unwrap();
        match &expressions[3] {
            Expression::Architecture(arch) => assert!(arch.signals.is_empty()),
            other => panic!("expected architecture, got {:?}", other),
        }
    }

    #[test]
    fn test_library_error_names_production() {
        let err = parse("library ;").unwrap_err();
        match err {
            NetlistError::ParseError { line, message } => {
                assert_eq!(line, 1);
                assert!(message.contains("library clause"), "{}", message);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_end_label_must_match() {
        let source = "entity A is port( X: in std_logic ); end B;";
        let err = parse(source).unwrap_err();
        assert!(err.to_string().contains("does not match"), "{}", err);
    }

    #[test]
    fn test_invalid_bit_constant() {
        let err = parse(&with_body("", "Y <= '2';")).unwrap_err();
        assert!(err.is_parse_error());
    }

    fn if_depth(expression: &Expression) -> usize {
        match expression {
            Expression::If(stmt) => 1 + stmt.then_body.iter().map(if_depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    #[test]
    fn test_deeply_nested_ifs() {
        const DEPTH: usize = 40;
        let body = format!(
            "process(A, S)\nbegin\n{}Y <= A;\n{}end process;",
            "if S = '1' then\n".repeat(DEPTH),
            "end if;\n".repeat(DEPTH)
        );
        let statements = architecture_body(&with_body("", &body));
        match &statements[0] {
            Expression::Process(process) => assert_eq!(if_depth(&process.body[0]), DEPTH),
            other => panic!("expected process, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_else_branch_names_if_else() {
        let body = "process(A, B, S)
begin
    if S = '1' then
        Y <= A;
    else
        Y <= B;
    end process;
end process;";
        let err = parse(&with_body("", body)).unwrap_err();
        assert!(err.to_string().contains("if-else statement"), "{}", err);
    }

    #[test]
    fn test_if_without_end_or_else() {
        let err = parse(&with_body("", "process(S)\nbegin\n    if S = '1' then\n    begin")).unwrap_err();
        assert!(err.to_string().contains("keyword `else` or `end`"), "{}", err);
    }

    #[test]
    fn test_terminated_statement_is_not_extended() {
        let body = architecture_body(&with_body("", "Y <= not B;\nnot A;"));
        assert_eq!(body.len(), 2);
        assert_eq!(
            body[1],
            Expression::Unary(UnaryOperation {
                operator: Operator::Logic(LogicOp::Not),
                operand: ident("A"),
                terminated: true,
            })
        );
    }

    #[test]
    fn test_signal_declaration_is_not_extended() {
        let body = architecture_body(&with_body("", "signal q: std_logic;\nnot A;"));
        assert_eq!(body.len(), 2);
        assert!(matches!(body[0], Expression::Signal(_)));
        assert!(matches!(body[1], Expression::Unary(_)));
    }

    #[test]
    fn test_trailing_tokens_are_ignored() {
        let expressions = parse("library ieee; ; ;").unwrap();
        assert_eq!(expressions, vec![Expression::Library("ieee".to_string())]);
    }
}
