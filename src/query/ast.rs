use serde_json::Value;

/// AST node for filter expressions.
///
/// Trees are immutable once parsed and carry no evaluation state, so one
/// parsed filter can be evaluated against any number of inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identity: `.`
    Identity,

    /// Object member access: `.foo`, `."foo"`, `.["foo"]`, `.foo?`
    Key { name: String, optional: bool },

    /// Array position: `.[N]`, `.[-N]`, `.[N]?`
    Index { index: i64, optional: bool },

    /// Array or string slice: `.[M:N]`, `.[:N]`, `.[M:]`
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        optional: bool,
    },

    /// Wildcard: `.[]`, `[]`, `.*`, `.[]?`
    Iterate { optional: bool },

    /// Conditional selector: `select(pred)`
    Select(Box<Expr>),

    /// Pipe: `expr | expr`
    Pipe(Box<Expr>, Box<Expr>),

    /// Comma: `expr, expr`
    Comma(Box<Expr>, Box<Expr>),

    /// Comparison: `expr op expr`
    Compare(CmpOp, Box<Expr>, Box<Expr>),

    /// `expr and expr`
    And(Box<Expr>, Box<Expr>),

    /// `expr or expr`
    Or(Box<Expr>, Box<Expr>),

    /// `not`
    Not,

    /// `empty`
    Empty,

    /// Array construction: `[expr]`
    ArrayConstruct(Box<Expr>),

    /// Object construction: `{key: value, ...}`
    ObjectConstruct(Vec<(ObjectKey, Expr)>),

    /// Constant: number, string, `true`, `false`, `null`
    Literal(Value),

    /// Error suppression on an arbitrary term: `(expr)?`
    Optional(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKey {
    /// `name:` or `"name":`
    Fixed(String),
    /// `(expr):`
    Computed(Expr),
}

impl Expr {
    pub fn pipe(left: Expr, right: Expr) -> Expr {
        Expr::Pipe(Box::new(left), Box::new(right))
    }

    pub fn key(name: impl Into<String>) -> Expr {
        Expr::Key {
            name: name.into(),
            optional: false,
        }
    }

    /// Attach a path step to an already parsed term. Steps applied to `.`
    /// replace it so that `.a` parses to a bare `Key`.
    pub fn then(self, step: Expr) -> Expr {
        match self {
            Expr::Identity => step,
            other => Expr::pipe(other, step),
        }
    }

    /// A filter made only of a constant, e.g. `true` or `"abc"`.
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Expr::Literal(v) => Some(v),
            _ => None,
        }
    }
}
