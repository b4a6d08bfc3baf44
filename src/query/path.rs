use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::error::JqError;

use super::ast::Expr;
use super::eval::{describe, eval, is_truthy, normalize_index, slice_bounds, value_type};

/// Largest array position assignment will pad up to.
pub const MAX_ARRAY_INDEX: usize = 536_870_911;

/// A single step of a concrete location inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
    /// Half-open element range `[from, to)` of an array.
    Slice(usize, usize),
}

/// How assignment treats locations that do not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetMode {
    /// Create missing object keys and pad arrays with `null`, like jq.
    #[default]
    Create,
    /// Fail with `PathNotFound` when an addressed key or index is missing.
    Strict,
}

/// Resolve every concrete location a path expression addresses in `root`,
/// in output order.
pub fn collect_paths(
    expr: &Expr,
    root: &Value,
    mode: SetMode,
) -> Result<Vec<Vec<PathSegment>>, JqError> {
    let mut out = Vec::new();
    walk(expr, Some(root), Vec::new(), mode, &mut out)?;
    Ok(out)
}

fn walk(
    expr: &Expr,
    current: Option<&Value>,
    prefix: Vec<PathSegment>,
    mode: SetMode,
    out: &mut Vec<Vec<PathSegment>>,
) -> Result<(), JqError> {
    let strict = mode == SetMode::Strict;
    match expr {
        Expr::Identity => out.push(prefix),

        Expr::Key { name, optional } => match current {
            Some(Value::Object(map)) if map.contains_key(name) || !strict => {
                out.push(extend(prefix, PathSegment::Key(name.clone())))
            }
            Some(Value::Object(_)) if *optional => {}
            Some(Value::Object(_)) => {
                return Err(JqError::PathNotFound(format!("key \"{name}\" not found")))
            }
            None | Some(Value::Null) if !strict => {
                out.push(extend(prefix, PathSegment::Key(name.clone())))
            }
            None if *optional => {}
            None => return Err(JqError::PathNotFound(format!("key \"{name}\" not found"))),
            Some(_) if *optional => {}
            Some(other) => {
                return Err(JqError::TypeMismatch(format!(
                    "Cannot index {} with \"{}\"",
                    value_type(other),
                    name
                )))
            }
        },

        Expr::Index { index, optional } => {
            let len = match current {
                Some(Value::Array(arr)) => Some(arr.len()),
                None | Some(Value::Null) if !strict => Some(0),
                None => None,
                Some(_) if *optional => return Ok(()),
                Some(other) => {
                    return Err(JqError::TypeMismatch(format!(
                        "Cannot index {} with number",
                        value_type(other)
                    )))
                }
            };
            match len.and_then(|len| normalize_index(*index, len)) {
                Some(i) => out.push(extend(prefix, PathSegment::Index(i))),
                None if *optional => {}
                None if !strict && *index > MAX_ARRAY_INDEX as i64 => {
                    return Err(too_large())
                }
                None if !strict && *index >= 0 => {
                    out.push(extend(prefix, PathSegment::Index(*index as usize)))
                }
                None if !strict => {
                    return Err(JqError::PathNotFound(format!(
                        "Out of bounds negative array index {index}"
                    )))
                }
                None => {
                    return Err(JqError::PathNotFound(format!("index {index} out of range")))
                }
            }
        }

        Expr::Slice {
            start,
            end,
            optional,
        } => {
            let len = match current {
                Some(Value::Array(arr)) => arr.len(),
                None | Some(Value::Null) if !strict => 0,
                Some(_) | None if *optional => return Ok(()),
                None => return Err(JqError::PathNotFound("slice of a missing value".into())),
                Some(other) => {
                    return Err(JqError::TypeMismatch(format!(
                        "Cannot update slice of {}",
                        value_type(other)
                    )))
                }
            };
            let (from, to) = slice_bounds(*start, *end, len);
            out.push(extend(prefix, PathSegment::Slice(from, to)));
        }

        Expr::Iterate { optional } => match current {
            Some(Value::Array(arr)) => {
                for i in 0..arr.len() {
                    out.push(extend(prefix.clone(), PathSegment::Index(i)));
                }
            }
            Some(Value::Object(map)) => {
                for k in map.keys() {
                    out.push(extend(prefix.clone(), PathSegment::Key(k.clone())));
                }
            }
            None | Some(Value::Null) if !strict => {}
            Some(_) | None if *optional => {}
            None => return Err(JqError::PathNotFound("cannot iterate a missing value".into())),
            Some(other) => {
                return Err(JqError::TypeMismatch(format!(
                    "Cannot iterate over {}",
                    describe(other)
                )))
            }
        },

        Expr::Select(pred) => {
            let value = current.cloned().unwrap_or(Value::Null);
            for verdict in eval(pred, value) {
                if is_truthy(&verdict?) {
                    out.push(prefix.clone());
                }
            }
        }

        Expr::Pipe(left, right) => {
            let base = prefix.len();
            let mut lefts = Vec::new();
            walk(left, current, prefix, mode, &mut lefts)?;
            for path in lefts {
                let sub = current.and_then(|v| get_at(v, &path[base..]));
                walk(right, sub.as_deref(), path, mode, out)?;
            }
        }

        Expr::Comma(left, right) => {
            walk(left, current, prefix.clone(), mode, out)?;
            walk(right, current, prefix, mode, out)?;
        }

        Expr::Optional(inner) => {
            // keep what was found before the first error
            let _ = walk(inner, current, prefix, mode, out);
        }

        Expr::Empty => {}

        other => {
            return Err(JqError::TypeMismatch(format!(
                "Invalid path expression: {other:?}"
            )))
        }
    }
    Ok(())
}

fn too_large() -> JqError {
    JqError::TypeMismatch("Array index too large".into())
}

fn extend(mut prefix: Vec<PathSegment>, segment: PathSegment) -> Vec<PathSegment> {
    prefix.push(segment);
    prefix
}

/// Value at `path`, or `None` when some step does not exist. A slice step
/// yields a fresh array holding the sliced elements.
pub fn get_at<'v>(value: &'v Value, path: &[PathSegment]) -> Option<Cow<'v, Value>> {
    let mut current = Cow::Borrowed(value);
    for seg in path {
        current = match current {
            Cow::Borrowed(v) => step(v, seg)?,
            Cow::Owned(v) => Cow::Owned(step(&v, seg)?.into_owned()),
        };
    }
    Some(current)
}

fn step<'v>(value: &'v Value, seg: &PathSegment) -> Option<Cow<'v, Value>> {
    match (seg, value) {
        (PathSegment::Key(k), Value::Object(map)) => map.get(k).map(Cow::Borrowed),
        (PathSegment::Index(i), Value::Array(arr)) => arr.get(*i).map(Cow::Borrowed),
        (PathSegment::Slice(from, to), Value::Array(arr)) => {
            let to = (*to).min(arr.len());
            let from = (*from).min(to);
            Some(Cow::Owned(Value::Array(arr[from..to].to_vec())))
        }
        _ => None,
    }
}

/// Replace the value at `path` with `new_val`, creating containers on the
/// way when they are missing (`null`).
pub fn set_at(val: Value, path: &[PathSegment], new_val: Value) -> Result<Value, JqError> {
    let Some((seg, rest)) = path.split_first() else {
        return Ok(new_val);
    };

    match seg {
        PathSegment::Key(k) => {
            let mut obj = match val {
                Value::Object(map) => map,
                Value::Null => Map::new(),
                other => {
                    return Err(JqError::TypeMismatch(format!(
                        "Cannot index {} with \"{}\"",
                        value_type(&other),
                        k
                    )))
                }
            };
            match obj.get_mut(k) {
                Some(slot) => {
                    let sub = std::mem::take(slot);
                    *slot = set_at(sub, rest, new_val)?;
                }
                None => {
                    let created = set_at(Value::Null, rest, new_val)?;
                    obj.insert(k.clone(), created);
                }
            }
            Ok(Value::Object(obj))
        }
        PathSegment::Index(i) => {
            let mut arr = match val {
                Value::Array(a) => a,
                Value::Null => Vec::new(),
                other => {
                    return Err(JqError::TypeMismatch(format!(
                        "Cannot index {} with number",
                        value_type(&other)
                    )))
                }
            };
            if *i > MAX_ARRAY_INDEX {
                return Err(too_large());
            }
            if arr.len() <= *i {
                arr.resize(*i + 1, Value::Null);
            }
            let sub = std::mem::take(&mut arr[*i]);
            arr[*i] = set_at(sub, rest, new_val)?;
            Ok(Value::Array(arr))
        }
        PathSegment::Slice(from, to) => {
            let mut arr = match val {
                Value::Array(a) => a,
                Value::Null => Vec::new(),
                other => {
                    return Err(JqError::TypeMismatch(format!(
                        "Cannot update slice of {}",
                        value_type(&other)
                    )))
                }
            };
            let to = (*to).min(arr.len());
            let from = (*from).min(to);
            if !rest.is_empty() {
                let current = Value::Array(arr[from..to].to_vec());
                let updated = set_at(current, rest, new_val)?;
                return set_at(Value::Array(arr), &[seg.clone()], updated);
            }
            let Value::Array(items) = new_val else {
                return Err(JqError::TypeMismatch(format!(
                    "A slice of an array can only be assigned another array, got {}",
                    describe(&new_val)
                )));
            };
            arr.splice(from..to, items);
            Ok(Value::Array(arr))
        }
    }
}
