pub mod ast;
pub mod builtins;
pub mod eval;
pub mod jq_parser;
pub mod lexer;
pub mod ops;
pub mod path;

use serde_json::Value;

use crate::error::JqError;

pub use ast::Expr;
pub use eval::Outputs;
pub use ops::{batch, first, get_path, has_path, set_path};
pub use path::{PathSegment, SetMode};

/// Parse a filter string into an expression tree.
pub fn parse(query_str: &str) -> Result<Expr, JqError> {
    let mut lex = lexer::Lexer::new(query_str);
    lex.tokenize()?;
    let expr = jq_parser::Parser::new(lex.tokens).parse()?;
    log::debug!("parsed filter {query_str:?} into {expr:?}");
    Ok(expr)
}

/// Execute a filter string against a JSON value, returning every output in
/// order.
pub fn evaluate(expression: &str, input: &Value) -> Result<Vec<Value>, JqError> {
    let expr = parse(expression)?;
    batch(&expr, input)
}
