//! Front end for the supported VHDL subset.
//!
//! Source text goes through the [`Lexer`] and then the [`Parser`], which
//! produces a list of [`Expression`] nodes. Lowering them into a circuit is
//! done by [`crate::synth`].
//!
//! # Grammar Overview
//!
//! ```text
//! file         = { library | use | entity | architecture }
//! library      = "library" identifier ";"
//! use          = "use" identifier "." identifier "." identifier ";"
//! entity       = "entity" identifier "is"
//!                "port" "(" port_decl { ";" port_decl } ")" ";"
//!                end_clause
//! port_decl    = identifier { "," identifier } ":" ("in" | "out") identifier
//! architecture = "architecture" identifier "of" identifier "is"
//!                { signal_decl } "begin" { statement } end_clause
//! signal_decl  = "signal" identifier { "," identifier } ":" identifier ";"
//! end_clause   = "end" [ "entity" | "architecture" ] [ identifier ] ";"
//!
//! statement    = expression [";"] | process | if | signal_decl
//! process      = "process" "(" [ identifier { "," identifier } ] ")" "begin"
//!                { statement } "end" "process" ";"
//! if           = "if" expression "then" { statement }
//!                [ "else" { statement } ] "end" "if" ";"
//!
//! expression   = primary [ operator ( expression | conditional ) ]
//! conditional  = expression "when" expression "else"
//!                { expression "when" expression "else" } expression ";"
//! primary      = identifier | number | bit | "(" expression ")"
//!              | operator primary
//! bit          = "'" ("0" | "1") "'"
//! ```
//!
//! Operators bind to the right with no precedence: `A and B or C` is
//! `A and (B or C)`. A prefix operator such as `not` applies only to the
//! primary that follows it.
//!
//! # Example
//!
//! ```text
//! library ieee;
//! use ieee.std_logic_1164.all;
//!
//! entity HalfAdder is
//!     port(
//!         A, B: in std_logic;
//!         S, C: out std_logic
//!     );
//! end HalfAdder;
//!
//! architecture Rtl of HalfAdder is
//! begin
//!     S <= A xor B;
//!     C <= A and B;
//! end architecture;
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{
    AssignmentOp, Keyword, Lexeme, Lexer, LogicOp, MiscOp, Operator, Paren, Punctuation, RelationalOp, ShiftOp,
    Token, TokenKind,
};
pub use parser::Parser;

use crate::error::Result;

/// Tokenize source text. Never fails; the last token is always
/// [`TokenKind::Eof`].
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

/// Parse source text into top-level expressions.
pub fn parse(input: &str) -> Result<Vec<Expression>> {
    let tokens = tokenize(input);
    parse_tokens(&tokens)
}

/// Parse an already tokenized source.
pub fn parse_tokens(tokens: &[Token]) -> Result<Vec<Expression>> {
    let mut parser = Parser::new(tokens);
    parser.parse()
}

/// Parse a source file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<Vec<Expression>> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::NetlistError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
