use std::cmp::Ordering;
use std::iter;

use serde_json::{Map, Number, Value};

use crate::error::JqError;

use super::ast::*;

/// Lazy stream of filter outputs.
///
/// Nothing past the first step is computed until the consumer pulls, and
/// each call to [`eval`] builds a fresh stream, so abandoning one never
/// affects another. Errors are items; consumers stop at the first one.
pub type Outputs<'a> = Box<dyn Iterator<Item = Result<Value, JqError>> + 'a>;

/// Evaluate a filter against an input value, producing zero or more outputs.
pub fn eval<'a>(expr: &'a Expr, input: Value) -> Outputs<'a> {
    match expr {
        Expr::Identity => one(input),

        Expr::Key { name, optional } => match input {
            Value::Object(mut map) => match map.remove(name) {
                Some(v) => one(v),
                None if *optional => none(),
                None => fail(JqError::PathNotFound(format!("key \"{name}\" not found"))),
            },
            _ if *optional => none(),
            other => fail(JqError::TypeMismatch(format!(
                "Cannot index {} with \"{}\"",
                value_type(&other),
                name
            ))),
        },

        Expr::Index { index, optional } => match input {
            Value::Array(mut arr) => match normalize_index(*index, arr.len()) {
                Some(i) => one(arr.swap_remove(i)),
                None => none(),
            },
            _ if *optional => none(),
            other => fail(JqError::TypeMismatch(format!(
                "Cannot index {} with number",
                value_type(&other)
            ))),
        },

        Expr::Slice {
            start,
            end,
            optional,
        } => match slice_value(input, *start, *end) {
            Ok(v) => one(v),
            Err(_) if *optional => none(),
            Err(e) => fail(e),
        },

        Expr::Iterate { optional } => match input {
            Value::Array(arr) => Box::new(arr.into_iter().map(Ok)),
            Value::Object(map) => Box::new(map.into_iter().map(|(_, v)| Ok(v))),
            _ if *optional => none(),
            other => fail(JqError::TypeMismatch(format!(
                "Cannot iterate over {}",
                describe(&other)
            ))),
        },

        Expr::Select(pred) => {
            let verdicts = eval(pred, input.clone());
            Box::new(verdicts.filter_map(move |r| match r {
                Ok(v) => is_truthy(&v).then(|| Ok(input.clone())),
                Err(e) => Some(Err(e)),
            }))
        }

        Expr::Pipe(left, right) => Box::new(eval(left, input).flat_map(move |r| match r {
            Ok(v) => eval(right, v),
            Err(e) => fail(e),
        })),

        Expr::Comma(left, right) => {
            let first = eval(left, input.clone());
            Box::new(first.chain(deferred(move || eval(right, input))))
        }

        Expr::Compare(op, left, right) => {
            let op = *op;
            // jq varies the left operand fastest
            Box::new(eval(right, input.clone()).flat_map(move |r| match r {
                Ok(rv) => Box::new(
                    eval(left, input.clone())
                        .map(move |l| l.map(|lv| Value::Bool(compare_with(op, &lv, &rv)))),
                ) as Outputs<'a>,
                Err(e) => fail(e),
            }))
        }

        Expr::And(left, right) => logical(left, right, input, false),

        Expr::Or(left, right) => logical(left, right, input, true),

        Expr::Not => one(Value::Bool(!is_truthy(&input))),

        Expr::Empty => none(),

        Expr::ArrayConstruct(inner) => deferred(move || {
            match eval(inner, input).collect::<Result<Vec<_>, _>>() {
                Ok(items) => one(Value::Array(items)),
                Err(e) => fail(e),
            }
        }),

        Expr::ObjectConstruct(entries) => deferred(move || {
            match construct_objects(entries, &input) {
                Ok(objects) => Box::new(objects.into_iter().map(|m| Ok(Value::Object(m)))),
                Err(e) => fail(e),
            }
        }),

        Expr::Literal(v) => one(v.clone()),

        Expr::Optional(inner) => Box::new(eval(inner, input).map_while(Result::ok).map(Ok)),
    }
}

fn one<'a>(v: Value) -> Outputs<'a> {
    Box::new(iter::once(Ok(v)))
}

fn none<'a>() -> Outputs<'a> {
    Box::new(iter::empty())
}

fn fail<'a>(e: JqError) -> Outputs<'a> {
    Box::new(iter::once(Err(e)))
}

/// Postpone building a stream until the first pull.
fn deferred<'a>(build: impl FnOnce() -> Outputs<'a> + 'a) -> Outputs<'a> {
    Box::new(iter::once_with(build).flatten())
}

/// `and` / `or`: the right side is only evaluated when the left output does
/// not already decide the result.
fn logical<'a>(left: &'a Expr, right: &'a Expr, input: Value, is_or: bool) -> Outputs<'a> {
    Box::new(eval(left, input.clone()).flat_map(move |r| match r {
        Ok(lv) if is_truthy(&lv) == is_or => one(Value::Bool(is_or)),
        Ok(_) => Box::new(
            eval(right, input.clone()).map(|rv| rv.map(|rv| Value::Bool(is_truthy(&rv)))),
        ) as Outputs<'a>,
        Err(e) => fail(e),
    }))
}

fn construct_objects(
    entries: &[(ObjectKey, Expr)],
    input: &Value,
) -> Result<Vec<Map<String, Value>>, JqError> {
    // Start with a single empty object, then for each entry expand
    let mut current = vec![Map::new()];

    for (key, val_expr) in entries {
        let keys = match key {
            ObjectKey::Fixed(name) => vec![name.clone()],
            ObjectKey::Computed(key_expr) => eval(key_expr, input.clone())
                .map(|k| match k? {
                    Value::String(s) => Ok(s),
                    other => Err(JqError::TypeMismatch(format!(
                        "Object keys must be strings, got {}",
                        describe(&other)
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        let vals = eval(val_expr, input.clone()).collect::<Result<Vec<_>, _>>()?;

        let mut next = Vec::with_capacity(current.len() * keys.len() * vals.len());
        for obj in &current {
            for k in &keys {
                for v in &vals {
                    let mut new_obj = obj.clone();
                    new_obj.insert(k.clone(), v.clone());
                    next.push(new_obj);
                }
            }
        }
        current = next;
    }

    Ok(current)
}

// ── Helpers ────────────────────────────────────────────────────

pub fn value_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Type name plus a short rendering of the value, e.g. `number (5)`.
pub fn describe(v: &Value) -> String {
    const MAX: usize = 11;
    let text = v.to_string();
    if text.chars().count() > MAX {
        let short: String = text.chars().take(MAX - 1).collect();
        format!("{} ({}...)", value_type(v), short)
    } else {
        format!("{} ({})", value_type(v), text)
    }
}

pub fn is_truthy(v: &Value) -> bool {
    !matches!(v, Value::Null | Value::Bool(false))
}

/// Resolve a possibly negative position against `len`. Out of range gives
/// `None`.
pub fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let i = if index < 0 { len + index } else { index };
    (0..len).contains(&i).then_some(i as usize)
}

/// Clamp slice bounds the way jq does: negatives count from the end and
/// anything past the ends is pulled back in.
pub fn slice_bounds(start: Option<i64>, end: Option<i64>, len: usize) -> (usize, usize) {
    let len = len as i64;
    let clamp = |i: i64| -> usize {
        let i = if i < 0 { len + i } else { i };
        i.clamp(0, len) as usize
    };
    let from = start.map(clamp).unwrap_or(0);
    let to = end.map(clamp).unwrap_or(len as usize);
    (from, to.max(from))
}

fn slice_value(val: Value, start: Option<i64>, end: Option<i64>) -> Result<Value, JqError> {
    match val {
        Value::Array(arr) => {
            let (from, to) = slice_bounds(start, end, arr.len());
            Ok(Value::Array(arr[from..to].to_vec()))
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (from, to) = slice_bounds(start, end, chars.len());
            Ok(Value::String(chars[from..to].iter().collect()))
        }
        other => Err(JqError::TypeMismatch(format!(
            "Cannot index {} with object",
            value_type(&other)
        ))),
    }
}

fn compare_with(op: CmpOp, left: &Value, right: &Value) -> bool {
    let ord = compare_values(left, right);
    match op {
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Ne => ord != Ordering::Equal,
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Le => ord != Ordering::Greater,
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Ge => ord != Ordering::Less,
    }
}

pub fn values_equal(a: &Value, b: &Value) -> bool {
    compare_values(a, b) == Ordering::Equal
}

/// jq's total order: null < false < true < numbers < strings < arrays < objects.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn type_order(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(false) => 1,
            Value::Bool(true) => 2,
            Value::Number(_) => 3,
            Value::String(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
        }
    }

    let ta = type_order(a);
    let tb = type_order(b);
    if ta != tb {
        return ta.cmp(&tb);
    }

    match (a, b) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let c = compare_values(x, y);
                if c != Ordering::Equal {
                    return c;
                }
            }
            a.len().cmp(&b.len())
        }
        (Value::Object(a), Value::Object(b)) => {
            // sorted key sets first, then values in key order
            let mut ka: Vec<&String> = a.keys().collect();
            let mut kb: Vec<&String> = b.keys().collect();
            ka.sort();
            kb.sort();
            let keys = ka.cmp(&kb);
            if keys != Ordering::Equal {
                return keys;
            }
            for k in ka {
                let c = compare_values(&a[k.as_str()], &b[k.as_str()]);
                if c != Ordering::Equal {
                    return c;
                }
            }
            Ordering::Equal
        }
        // null/null and same-valued booleans share a type_order slot
        _ => Ordering::Equal,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    let (ta, tb) = (a.to_string(), b.to_string());
    if let (Some(x), Some(y)) = (integer_digits(&ta), integer_digits(&tb)) {
        return compare_integer_text(x, y);
    }
    let x = a.as_f64().unwrap_or(f64::NAN);
    let y = b.as_f64().unwrap_or(f64::NAN);
    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
}

/// `(negative, digits)` for integer text such as `-1234`.
fn integer_digits(text: &str) -> Option<(bool, &str)> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .then_some((negative, digits.trim_start_matches('0')))
}

fn compare_integer_text(a: (bool, &str), b: (bool, &str)) -> Ordering {
    let magnitude = |x: &str, y: &str| x.len().cmp(&y.len()).then_with(|| x.cmp(y));
    match (a, b) {
        ((false, x), (false, y)) => magnitude(x, y),
        ((true, x), (true, y)) => magnitude(y, x),
        ((true, x), (false, y)) if x.is_empty() && y.is_empty() => Ordering::Equal,
        ((false, x), (true, y)) if x.is_empty() && y.is_empty() => Ordering::Equal,
        ((true, _), (false, _)) => Ordering::Less,
        ((false, _), (true, _)) => Ordering::Greater,
    }
}
