//! Consumer-facing operations on top of the traversal engine.

use serde_json::Value;

use crate::error::JqError;

use super::ast::Expr;
use super::eval::{eval, Outputs};
use super::path::{self, SetMode};

/// Lazily evaluate `expr` against `input`.
pub fn get_path<'a>(expr: &'a Expr, input: &Value) -> Outputs<'a> {
    eval(expr, input.clone())
}

/// Collect every output, stopping at the first error.
pub fn batch(expr: &Expr, input: &Value) -> Result<Vec<Value>, JqError> {
    get_path(expr, input).collect()
}

/// Whether `expr` yields at least one value before any error.
///
/// Only the first output is computed.
pub fn has_path(expr: &Expr, input: &Value) -> bool {
    matches!(get_path(expr, input).next(), Some(Ok(_)))
}

/// First output of `expr`, or `None` when it produces nothing.
pub fn first(expr: &Expr, input: &Value) -> Result<Option<Value>, JqError> {
    get_path(expr, input).next().transpose()
}

/// Replace every location addressed by `expr` with `new_value`.
pub fn set_path(
    expr: &Expr,
    input: &Value,
    new_value: Value,
    mode: SetMode,
) -> Result<Value, JqError> {
    let locations = path::collect_paths(expr, input, mode)?;
    log::debug!("set_path: {} location(s), mode {:?}", locations.len(), mode);
    let mut out = input.clone();
    for location in &locations {
        out = path::set_at(out, location, new_value.clone())?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "user": {"name": "ada", "tags": ["a", "b"]},
            "items": [{"id": 1, "ok": true}, {"id": 2, "ok": false}]
        })
    }

    #[test]
    fn batch_collects_all_outputs() {
        let expr = parse(".items[].id").unwrap();
        assert_eq!(batch(&expr, &doc()).unwrap(), vec![json!(1), json!(2)]);
    }

    #[test]
    fn batch_stops_at_first_error() {
        let expr = parse(".items[] | .id, .missing").unwrap();
        let err = batch(&expr, &doc()).unwrap_err();
        assert!(matches!(err, JqError::PathNotFound(_)));
    }

    #[test]
    fn get_path_is_lazy() {
        // the second element would fail, but only the first is pulled
        let expr = parse(".[] | .a").unwrap();
        let input = json!([{"a": 1}, 5]);
        let mut outputs = get_path(&expr, &input);
        assert_eq!(outputs.next().unwrap().unwrap(), json!(1));
    }

    #[test]
    fn has_path_reports_existence() {
        let input = doc();
        assert!(has_path(&parse(".user.name").unwrap(), &input));
        assert!(!has_path(&parse(".user.email").unwrap(), &input));
        assert!(!has_path(&parse(".user.email?").unwrap(), &input));
        assert!(!has_path(&parse("empty").unwrap(), &input));
    }

    #[test]
    fn has_path_short_circuits_before_error() {
        let expr = parse(".user.name, .nope").unwrap();
        assert!(has_path(&expr, &doc()));
    }

    #[test]
    fn first_distinguishes_nothing_from_error() {
        let input = doc();
        assert_eq!(
            first(&parse(".user.tags[]").unwrap(), &input).unwrap(),
            Some(json!("a"))
        );
        assert_eq!(first(&parse(".user.tags[5]").unwrap(), &input).unwrap(), None);
        assert!(first(&parse(".user.name.first").unwrap(), &input).is_err());
    }

    #[test]
    fn set_path_updates_selected_items() {
        let expr = parse(".items[] | select(.ok) | .id").unwrap();
        let out = set_path(&expr, &doc(), json!(10), SetMode::Create).unwrap();
        assert_eq!(out["items"][0]["id"], json!(10));
        assert_eq!(out["items"][1]["id"], json!(2));
    }

    #[test]
    fn set_path_leaves_input_untouched() {
        let input = doc();
        let expr = parse(".user.name").unwrap();
        let out = set_path(&expr, &input, json!("grace"), SetMode::Strict).unwrap();
        assert_eq!(out["user"]["name"], json!("grace"));
        assert_eq!(input["user"]["name"], json!("ada"));
    }

    #[test]
    fn set_path_without_locations_is_noop() {
        let expr = parse(".[] | select(.x)").unwrap();
        let input = json!([{"x": false}]);
        let out = set_path(&expr, &input, json!(0), SetMode::Strict).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn set_path_create_vs_strict() {
        let expr = parse(".user.email").unwrap();
        let created = set_path(&expr, &doc(), json!("a@b"), SetMode::Create).unwrap();
        assert_eq!(created["user"]["email"], json!("a@b"));
        let err = set_path(&expr, &doc(), json!("a@b"), SetMode::Strict).unwrap_err();
        assert!(matches!(err, JqError::PathNotFound(_)));
    }

    #[test]
    fn set_path_writes_every_wildcard_location() {
        let expr = parse(".items[].id").unwrap();
        let out = set_path(&expr, &doc(), json!(0), SetMode::Create).unwrap();
        assert_eq!(out["items"][0]["id"], json!(0));
        assert_eq!(out["items"][1]["id"], json!(0));
        assert_eq!(out["items"][1]["ok"], json!(false));
    }

    #[test]
    fn set_path_over_object_keeps_key_order() {
        let input: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let out = set_path(&parse(".[]").unwrap(), &input, json!(null), SetMode::Strict).unwrap();
        assert_eq!(out.to_string(), r#"{"z":null,"a":null,"m":null}"#);
    }

    #[test]
    fn set_path_through_slice() {
        let expr = parse(".[1:3] | .[0]").unwrap();
        let input = json!([1, 2, 3, 4]);
        for mode in [SetMode::Strict, SetMode::Create] {
            let out = set_path(&expr, &input, json!(9), mode).unwrap();
            assert_eq!(out, json!([1, 9, 3, 4]));
        }
    }

    #[test]
    fn set_path_huge_index_is_error() {
        let expr = parse(".[9223372036854775807]").unwrap();
        assert!(set_path(&expr, &json!([]), json!(1), SetMode::Create).is_err());
    }

    #[test]
    fn set_path_rejects_non_path() {
        let expr = parse(".a == 1").unwrap();
        assert!(set_path(&expr, &doc(), json!(1), SetMode::Create).is_err());
    }
}
