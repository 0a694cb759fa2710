//! Abstract Syntax Tree types for the VHDL subset.
//!
//! Every node knows how many tokens it was built from
//! ([`Expression::number_of_tokens`]). The parser relies on this to move its
//! cursor past a production without scanning it a second time, so the counts
//! here must stay in step with the productions in `parser.rs`.

use super::lexer::Operator;

/// A parsed construct: a design unit, a declaration, a statement or an
/// expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A name, resolved only during lowering
    Identifier(String),
    /// A bit or numeric literal
    Constant(Constant),
    /// `( expression )`
    Parenthesized(Box<Expression>),
    /// `left operator right [;]`
    Binary(BinaryOperation),
    /// `operator operand [;]`
    Unary(UnaryOperation),
    /// `value when condition else ... default ;`
    WhenElse(WhenElse),
    /// `if condition then ... end if ;`
    If(IfStatement),
    /// `if condition then ... else ... end if ;`
    IfElse(IfElseStatement),
    /// `process ( sensitivity ) begin ... end process ;`
    Process(Process),
    /// `signal name : type ;`
    Signal(SignalDeclaration),
    /// `entity name is port ( ... ) ; end ... ;`
    Entity(EntityDeclaration),
    /// `architecture name of entity is ... begin ... end ... ;`
    Architecture(ArchitectureBody),
    /// `library name ;`
    Library(String),
    /// `use library.package.item ;`
    Use(UseClause),
}

impl Expression {
    /// Number of tokens this node was built from.
    pub fn number_of_tokens(&self) -> usize {
        match self {
            Expression::Identifier(_) => 1,
            Expression::Constant(constant) => constant.number_of_tokens(),
            Expression::Parenthesized(inner) => 2 + inner.number_of_tokens(),
            Expression::Binary(op) => op.number_of_tokens(),
            Expression::Unary(op) => op.number_of_tokens(),
            Expression::WhenElse(when_else) => when_else.number_of_tokens(),
            Expression::If(stmt) => stmt.number_of_tokens(),
            Expression::IfElse(stmt) => stmt.number_of_tokens(),
            Expression::Process(process) => process.number_of_tokens(),
            Expression::Signal(decl) => decl.number_of_tokens(),
            Expression::Entity(entity) => entity.number_of_tokens(),
            Expression::Architecture(arch) => arch.number_of_tokens(),
            Expression::Library(_) => 3,
            Expression::Use(_) => 7,
        }
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Expression::Identifier(_) => "identifier",
            Expression::Constant(_) => "constant",
            Expression::Parenthesized(_) => "parenthesized expression",
            Expression::Binary(_) => "binary operation",
            Expression::Unary(_) => "unary operation",
            Expression::WhenElse(_) => "conditional assignment",
            Expression::If(_) => "if statement",
            Expression::IfElse(_) => "if-else statement",
            Expression::Process(_) => "process",
            Expression::Signal(_) => "signal declaration",
            Expression::Entity(_) => "entity",
            Expression::Architecture(_) => "architecture",
            Expression::Library(_) => "library clause",
            Expression::Use(_) => "use clause",
        }
    }
}

/// Literal values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    /// `'0'` or `'1'`
    Bit(bool),
    /// A bare number
    Numeral(f64),
}

impl Constant {
    pub fn number_of_tokens(&self) -> usize {
        match self {
            // apostrophe, digit, apostrophe
            Constant::Bit(_) => 3,
            Constant::Numeral(_) => 1,
        }
    }
}

/// A binary operation, including signal assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperation {
    pub left: Box<Expression>,
    pub operator: Operator,
    pub right: Box<Expression>,
    /// Whether a `;` directly follows the right operand
    pub terminated: bool,
}

impl BinaryOperation {
    pub fn number_of_tokens(&self) -> usize {
        self.left.number_of_tokens() + 1 + self.right.number_of_tokens() + usize::from(self.terminated)
    }
}

/// A prefix operation such as `not A`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperation {
    pub operator: Operator,
    pub operand: Box<Expression>,
    pub terminated: bool,
}

impl UnaryOperation {
    pub fn number_of_tokens(&self) -> usize {
        1 + self.operand.number_of_tokens() + usize::from(self.terminated)
    }
}

/// One `value when condition else` arm of a conditional assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBranch {
    pub value: Expression,
    pub condition: Expression,
}

impl ConditionalBranch {
    pub fn number_of_tokens(&self) -> usize {
        // `when` and `else`
        self.value.number_of_tokens() + self.condition.number_of_tokens() + 2
    }
}

/// A conditional signal assignment right-hand side. Always has a default
/// value and always ends in `;`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhenElse {
    pub branches: Vec<ConditionalBranch>,
    pub default: Box<Expression>,
}

impl WhenElse {
    pub fn number_of_tokens(&self) -> usize {
        let branches: usize = self.branches.iter().map(ConditionalBranch::number_of_tokens).sum();
        branches + self.default.number_of_tokens() + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Box<Expression>,
    pub then_body: Vec<Expression>,
}

impl IfStatement {
    pub fn number_of_tokens(&self) -> usize {
        // if, then, end, if, ;
        5 + self.condition.number_of_tokens() + body_tokens(&self.then_body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfElseStatement {
    pub condition: Box<Expression>,
    pub then_body: Vec<Expression>,
    pub else_body: Vec<Expression>,
}

impl IfElseStatement {
    pub fn number_of_tokens(&self) -> usize {
        // if, then, else, end, if, ;
        6 + self.condition.number_of_tokens() + body_tokens(&self.then_body) + body_tokens(&self.else_body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    pub sensitivity: Vec<String>,
    pub body: Vec<Expression>,
}

impl Process {
    pub fn number_of_tokens(&self) -> usize {
        // process, (, ), begin, end, process, ;
        7 + list_tokens(self.sensitivity.len()) + body_tokens(&self.body)
    }
}

/// An internal signal declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDeclaration {
    pub names: Vec<String>,
    pub type_name: String,
}

impl SignalDeclaration {
    pub fn number_of_tokens(&self) -> usize {
        // signal, :, type, ;
        4 + list_tokens(self.names.len())
    }
}

/// Port direction keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortMode {
    In,
    Out,
}

/// A port declaration inside an entity's `port ( ... )` list.
#[derive(Debug, Clone, PartialEq)]
pub struct PortDeclaration {
    pub names: Vec<String>,
    pub mode: PortMode,
    pub type_name: String,
}

impl PortDeclaration {
    pub fn number_of_tokens(&self) -> usize {
        // :, mode, type
        3 + list_tokens(self.names.len())
    }
}

/// Closing `end [keyword] [label] ;` of an entity or architecture.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndClause {
    pub repeats_keyword: bool,
    pub label: Option<String>,
}

impl EndClause {
    pub fn number_of_tokens(&self) -> usize {
        2 + usize::from(self.repeats_keyword) + usize::from(self.label.is_some())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityDeclaration {
    pub name: String,
    pub ports: Vec<PortDeclaration>,
    pub end: EndClause,
}

impl EntityDeclaration {
    /// Tokens of `port ( ... ) ;`.
    pub fn port_clause_tokens(&self) -> usize {
        let declarations: usize = self.ports.iter().map(PortDeclaration::number_of_tokens).sum();
        // port, (, separating semicolons, ), ;
        4 + declarations + self.ports.len().saturating_sub(1)
    }

    pub fn number_of_tokens(&self) -> usize {
        // entity, name, is
        3 + self.port_clause_tokens() + self.end.number_of_tokens()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchitectureBody {
    pub name: String,
    pub entity_name: String,
    pub signals: Vec<SignalDeclaration>,
    pub body: Vec<Expression>,
    pub end: EndClause,
}

impl ArchitectureBody {
    pub fn number_of_tokens(&self) -> usize {
        let signals: usize = self.signals.iter().map(SignalDeclaration::number_of_tokens).sum();
        // architecture, name, of, entity, is, begin
        6 + signals + body_tokens(&self.body) + self.end.number_of_tokens()
    }
}

/// `use library.package.item ;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseClause {
    pub library: String,
    pub package: String,
    pub item: String,
}

/// Tokens in a comma separated list of `len` identifiers.
pub fn list_tokens(len: usize) -> usize {
    (2 * len).saturating_sub(1)
}

/// Tokens in a statement list.
pub fn body_tokens(body: &[Expression]) -> usize {
    body.iter().map(Expression::number_of_tokens).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::lexer::{AssignmentOp, LogicOp};

    fn ident(name: &str) -> Box<Expression> {
        Box::new(Expression::Identifier(name.to_string()))
    }

    #[test]
    fn test_assignment_token_count() {
        // temp <= A and B;
        let and = Expression::Binary(BinaryOperation {
            left: ident("A"),
            operator: Operator::Logic(LogicOp::And),
            right: ident("B"),
            terminated: true,
        });
        let assign = Expression::Binary(BinaryOperation {
            left: ident("temp"),
            operator: Operator::Assignment(AssignmentOp::Signal),
            right: Box::new(and),
            terminated: false,
        });
        assert_eq!(assign.number_of_tokens(), 6);
    }

    #[test]
    fn test_entity_token_count() {
        // entity E is port( A, B: in std_logic; C: out std_logic ); end E;
        let entity = EntityDeclaration {
            name: "E".to_string(),
            ports: vec![
                PortDeclaration {
                    names: vec!["A".to_string(), "B".to_string()],
                    mode: PortMode::In,
                    type_name: "std_logic".to_string(),
                },
                PortDeclaration {
                    names: vec!["C".to_string()],
                    mode: PortMode::Out,
                    type_name: "std_logic".to_string(),
                },
            ],
            end: EndClause {
                repeats_keyword: false,
                label: Some("E".to_string()),
            },
        };
        assert_eq!(entity.number_of_tokens(), 3 + 4 + 6 + 1 + 4 + 3);
    }

    #[test]
    fn test_list_tokens() {
        assert_eq!(list_tokens(0), 0);
        assert_eq!(list_tokens(1), 1);
        assert_eq!(list_tokens(3), 5);
    }
}
