use crate::error::JqError;

use super::ast::Expr;

/// Names callable with function syntax, with their arity.
pub const BUILTINS: &[(&str, usize)] = &[("select", 1), ("not", 0), ("empty", 0)];

/// Resolve a call like `select(.a == 1)` into its expression node.
///
/// Resolution happens at parse time, so an unknown name is a syntax error
/// rather than a failure discovered halfway through a document.
pub fn resolve(name: &str, mut args: Vec<Expr>, position: usize) -> Result<Expr, JqError> {
    match (name, args.len()) {
        ("select", 1) => Ok(Expr::Select(Box::new(args.remove(0)))),
        ("not", 0) => Ok(Expr::Not),
        ("empty", 0) => Ok(Expr::Empty),
        _ => Err(JqError::Syntax {
            position,
            token: name.to_string(),
            message: format!("{}/{} is not defined", name, args.len()),
        }),
    }
}
