use serde_json::{Number, Value};

use crate::error::JqError;

use super::ast::*;
use super::builtins;
use super::lexer::Token;

pub struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<(Token, usize)>) -> Self {
        Parser { tokens, pos: 0 }
    }

    pub fn parse(&mut self) -> Result<Expr, JqError> {
        if self.at_eof() {
            return Ok(Expr::Identity);
        }
        let expr = self.parse_pipe()?;
        if !self.at_eof() {
            return Err(self.error(format!("unexpected token {}", self.current())));
        }
        Ok(expr)
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).map(|(t, _)| t).unwrap_or(&Token::Eof)
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos + 1).map(|(t, _)| t).unwrap_or(&Token::Eof)
    }

    fn position(&self) -> usize {
        match self.tokens.get(self.pos) {
            Some((_, p)) => *p,
            None => self.tokens.last().map(|(_, p)| *p).unwrap_or(0),
        }
    }

    fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self
            .tokens
            .get(self.pos)
            .map(|(t, _)| t.clone())
            .unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<(), JqError> {
        if self.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {}, got {}", expected, self.current())))
        }
    }

    fn error(&self, message: String) -> JqError {
        JqError::Syntax {
            position: self.position(),
            token: self.current().to_string(),
            message,
        }
    }

    // ── Precedence levels (lowest to highest) ──────────────────────

    /// pipe: comma ('|' comma)*
    fn parse_pipe(&mut self) -> Result<Expr, JqError> {
        let mut expr = self.parse_comma()?;
        while matches!(self.current(), Token::Pipe) {
            self.advance();
            let right = self.parse_comma()?;
            expr = Expr::pipe(expr, right);
        }
        Ok(expr)
    }

    /// comma: or (',' or)*
    fn parse_comma(&mut self) -> Result<Expr, JqError> {
        let mut expr = self.parse_or()?;
        while matches!(self.current(), Token::Comma) {
            self.advance();
            let right = self.parse_or()?;
            expr = Expr::Comma(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    /// or: and ('or' and)*
    fn parse_or(&mut self) -> Result<Expr, JqError> {
        let mut expr = self.parse_and()?;
        while matches!(self.current(), Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            expr = Expr::Or(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    /// and: comparison ('and' comparison)*
    fn parse_and(&mut self) -> Result<Expr, JqError> {
        let mut expr = self.parse_comparison()?;
        while matches!(self.current(), Token::And) {
            self.advance();
            let right = self.parse_comparison()?;
            expr = Expr::And(Box::new(expr), Box::new(right));
        }
        Ok(expr)
    }

    /// comparison: postfix (op postfix)?, non-associative as in jq
    fn parse_comparison(&mut self) -> Result<Expr, JqError> {
        let left = self.parse_postfix()?;
        let Some(op) = self.comparison_op() else {
            return Ok(left);
        };
        self.advance();
        let right = self.parse_postfix()?;
        if self.comparison_op().is_some() {
            return Err(self.error("comparison operators are non-associative".into()));
        }
        Ok(Expr::Compare(op, Box::new(left), Box::new(right)))
    }

    fn comparison_op(&self) -> Option<CmpOp> {
        match self.current() {
            Token::Eq => Some(CmpOp::Eq),
            Token::Ne => Some(CmpOp::Ne),
            Token::Lt => Some(CmpOp::Lt),
            Token::Le => Some(CmpOp::Le),
            Token::Gt => Some(CmpOp::Gt),
            Token::Ge => Some(CmpOp::Ge),
            _ => None,
        }
    }

    /// postfix: primary ('.' name | '.*' | '[' ... ']' | '?')*
    fn parse_postfix(&mut self) -> Result<Expr, JqError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current() {
                Token::Dot => match self.peek().clone() {
                    Token::LBracket => {
                        // `.a.[0]` is the same as `.a[0]`
                        self.advance();
                    }
                    next if field_name(&next).is_some() || matches!(next, Token::Star) => {
                        self.advance(); // skip dot
                        let step = self.parse_dot_step()?;
                        expr = expr.then(step);
                    }
                    _ => {
                        return Err(self.error(format!(
                            "expected field name after '.', got {}",
                            self.peek()
                        )))
                    }
                },
                Token::LBracket => {
                    let step = self.parse_bracket()?;
                    expr = expr.then(step);
                }
                Token::Question => {
                    self.advance();
                    expr = make_optional(expr);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// The part after a dot: `name`, `"name"` or `*`.
    fn parse_dot_step(&mut self) -> Result<Expr, JqError> {
        if matches!(self.current(), Token::Star) {
            self.advance();
            return Ok(Expr::Iterate { optional: false });
        }
        match field_name(self.current()) {
            Some(name) => {
                self.advance();
                Ok(Expr::key(name))
            }
            None => Err(self.error(format!(
                "expected field name after '.', got {}",
                self.current()
            ))),
        }
    }

    /// `[]`, `["key"]`, `[N]`, `[M:N]`
    fn parse_bracket(&mut self) -> Result<Expr, JqError> {
        self.expect(&Token::LBracket)?;
        let step = match self.current().clone() {
            Token::RBracket => Expr::Iterate { optional: false },
            Token::String(name) => {
                self.advance();
                Expr::key(name)
            }
            Token::Colon => {
                self.advance();
                let end = self.parse_int()?;
                Expr::Slice {
                    start: None,
                    end: Some(end),
                    optional: false,
                }
            }
            Token::Number(_) | Token::Minus => {
                let start = self.parse_int()?;
                if matches!(self.current(), Token::Colon) {
                    self.advance();
                    let end = if matches!(self.current(), Token::RBracket) {
                        None
                    } else {
                        Some(self.parse_int()?)
                    };
                    Expr::Slice {
                        start: Some(start),
                        end,
                        optional: false,
                    }
                } else {
                    Expr::Index {
                        index: start,
                        optional: false,
                    }
                }
            }
            Token::Eof => return Err(self.error("unmatched '['".into())),
            other => {
                return Err(self.error(format!(
                    "expected index, string key, slice or ']' inside brackets, got {other}"
                )))
            }
        };
        if !matches!(self.current(), Token::RBracket) {
            return Err(self.error(format!("unmatched '[': expected ']', got {}", self.current())));
        }
        self.advance();
        Ok(step)
    }

    /// Optionally negative integer inside brackets. Fractions are floored the
    /// way jq does.
    fn parse_int(&mut self) -> Result<i64, JqError> {
        let negative = matches!(self.current(), Token::Minus);
        if negative {
            self.advance();
        }
        let Token::Number(text) = self.current().clone() else {
            return Err(self.error(format!("expected number, got {}", self.current())));
        };
        let magnitude = match text.parse::<i64>() {
            Ok(i) => i,
            Err(_) => match text.parse::<f64>() {
                Ok(f) if f.is_finite() => f.floor() as i64,
                _ => return Err(self.error(format!("invalid index: {text}"))),
            },
        };
        self.advance();
        Ok(if negative { -magnitude } else { magnitude })
    }

    /// primary: atoms and prefix constructs
    fn parse_primary(&mut self) -> Result<Expr, JqError> {
        match self.current().clone() {
            Token::Dot => {
                self.advance();
                match self.current().clone() {
                    // `.[...]` is handled as a postfix on identity
                    Token::LBracket => Ok(Expr::Identity),
                    next if field_name(&next).is_some() || matches!(next, Token::Star) => {
                        self.parse_dot_step()
                    }
                    _ => Ok(Expr::Identity),
                }
            }
            Token::Number(text) => {
                self.advance();
                number_literal(&text).ok_or_else(|| self.error(format!("invalid number: {text}")))
            }
            Token::Minus => {
                self.advance();
                match self.current().clone() {
                    Token::Number(text) => {
                        self.advance();
                        number_literal(&format!("-{text}"))
                            .ok_or_else(|| self.error(format!("invalid number: -{text}")))
                    }
                    other => Err(self.error(format!(
                        "negation is only supported on number literals, got {other}"
                    ))),
                }
            }
            Token::String(s) => {
                self.advance();
                Ok(Expr::Literal(Value::String(s)))
            }
            Token::True => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(true)))
            }
            Token::False => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(false)))
            }
            Token::Null => {
                self.advance();
                Ok(Expr::Literal(Value::Null))
            }
            Token::LParen => {
                self.advance();
                let expr = self.parse_pipe()?;
                if !matches!(self.current(), Token::RParen) {
                    return Err(self.error(format!("unmatched '(': expected ')', got {}", self.current())));
                }
                self.advance();
                Ok(expr)
            }
            Token::LBracket => {
                self.advance();
                if matches!(self.current(), Token::RBracket) {
                    self.advance();
                    return Ok(Expr::Literal(Value::Array(vec![])));
                }
                let inner = self.parse_pipe()?;
                if !matches!(self.current(), Token::RBracket) {
                    return Err(self.error(format!("unmatched '[': expected ']', got {}", self.current())));
                }
                self.advance();
                Ok(Expr::ArrayConstruct(Box::new(inner)))
            }
            Token::LBrace => self.parse_object_construct(),
            Token::Ident(name) => {
                let position = self.position();
                self.advance();
                let mut args = Vec::new();
                if matches!(self.current(), Token::LParen) {
                    self.advance();
                    args.push(self.parse_pipe()?);
                    if !matches!(self.current(), Token::RParen) {
                        return Err(self.error(format!("unmatched '(': expected ')', got {}", self.current())));
                    }
                    self.advance();
                }
                builtins::resolve(&name, args, position)
            }
            Token::Eof => Err(self.error("unexpected end of input".into())),
            other => Err(self.error(format!("unexpected token {other}"))),
        }
    }

    fn parse_object_construct(&mut self) -> Result<Expr, JqError> {
        self.advance(); // skip {
        let mut entries = Vec::new();

        while !matches!(self.current(), Token::RBrace) {
            entries.push(self.parse_object_entry()?);
            match self.current() {
                Token::Comma => {
                    self.advance();
                }
                Token::RBrace => break,
                Token::Eof => return Err(self.error("unmatched '{'".into())),
                other => {
                    return Err(self.error(format!("expected ',' or '}}' in object, got {other}")))
                }
            }
        }
        self.advance(); // skip }
        Ok(Expr::ObjectConstruct(entries))
    }

    fn parse_object_entry(&mut self) -> Result<(ObjectKey, Expr), JqError> {
        let token = self.current().clone();
        let fixed = match &token {
            Token::String(s) => Some(s.clone()),
            other => field_name(other),
        };
        if let Some(name) = fixed {
            self.advance();
            if matches!(self.current(), Token::Colon) {
                self.advance();
                let value = self.parse_object_value()?;
                return Ok((ObjectKey::Fixed(name), value));
            }
            // `{name}` is shorthand for `{name: .name}`
            return Ok((ObjectKey::Fixed(name.clone()), Expr::key(name)));
        }
        match token {
            Token::LParen => {
                self.advance();
                let key_expr = self.parse_pipe()?;
                self.expect(&Token::RParen)?;
                self.expect(&Token::Colon)?;
                let value = self.parse_object_value()?;
                Ok((ObjectKey::Computed(key_expr), value))
            }
            Token::Eof => Err(self.error("unmatched '{'".into())),
            other => Err(self.error(format!("expected object key, got {other}"))),
        }
    }

    /// Object values stop at ',' and '}', so only pipes of terms are allowed
    /// without parentheses: `{a: .x | .y}`.
    fn parse_object_value(&mut self) -> Result<Expr, JqError> {
        let mut expr = self.parse_postfix()?;
        while matches!(self.current(), Token::Pipe) {
            self.advance();
            let right = self.parse_postfix()?;
            expr = Expr::pipe(expr, right);
        }
        Ok(expr)
    }
}

/// Tokens that may follow a dot as a field name. Keywords are valid keys.
fn field_name(token: &Token) -> Option<String> {
    match token {
        Token::Ident(name) => Some(name.clone()),
        Token::String(s) => Some(s.clone()),
        Token::True => Some("true".into()),
        Token::False => Some("false".into()),
        Token::Null => Some("null".into()),
        Token::And => Some("and".into()),
        Token::Or => Some("or".into()),
        _ => None,
    }
}

fn number_literal(text: &str) -> Option<Expr> {
    text.parse::<Number>()
        .ok()
        .map(|n| Expr::Literal(Value::Number(n)))
}

/// `?` sets the flag on a lone path step and wraps anything else.
fn make_optional(expr: Expr) -> Expr {
    match expr {
        Expr::Key { name, .. } => Expr::Key {
            name,
            optional: true,
        },
        Expr::Index { index, .. } => Expr::Index {
            index,
            optional: true,
        },
        Expr::Slice { start, end, .. } => Expr::Slice {
            start,
            end,
            optional: true,
        },
        Expr::Iterate { .. } => Expr::Iterate { optional: true },
        other => Expr::Optional(Box::new(other)),
    }
}
