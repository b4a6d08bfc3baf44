use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use super::color::colorize_json;
use super::OutputOptions;

/// Render one output value according to `opts`, without a trailing newline.
pub fn format_value(value: &Value, opts: &OutputOptions) -> Result<String, serde_json::Error> {
    // Raw mode: if the value is a string, output it without quotes
    if opts.raw {
        if let Value::String(s) = value {
            return Ok(s.clone());
        }
    }

    let indent = opts.indent_unit();
    if opts.color {
        return Ok(colorize_json(value, indent.as_deref()));
    }
    match indent {
        None => serde_json::to_string(value),
        Some(unit) => format_indented(value, &unit),
    }
}

fn format_indented(value: &Value, unit: &str) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(unit.as_bytes()));
    value.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Indent;
    use serde_json::json;

    fn render(value: &Value, opts: OutputOptions) -> String {
        format_value(value, &opts).unwrap()
    }

    #[test]
    fn json_pretty() {
        let val = json!({"a": 1, "b": [true]});
        let out = render(&val, OutputOptions::default());
        assert_eq!(out, "{\n  \"a\": 1,\n  \"b\": [\n    true\n  ]\n}");
    }

    #[test]
    fn json_compact() {
        let val = json!({"a": 1, "b": [1, 2]});
        let out = render(
            &val,
            OutputOptions {
                compact: true,
                ..Default::default()
            },
        );
        assert_eq!(out, r#"{"a":1,"b":[1,2]}"#);
    }

    #[test]
    fn custom_indent() {
        let val = json!([1]);
        let four = render(
            &val,
            OutputOptions {
                indent: Indent::Spaces(4),
                ..Default::default()
            },
        );
        assert_eq!(four, "[\n    1\n]");
        let tab = render(
            &val,
            OutputOptions {
                indent: Indent::Tab,
                ..Default::default()
            },
        );
        assert_eq!(tab, "[\n\t1\n]");
    }

    #[test]
    fn insertion_order_kept() {
        let val: Value = serde_json::from_str(r#"{"z":1,"a":2}"#).unwrap();
        let out = render(
            &val,
            OutputOptions {
                compact: true,
                ..Default::default()
            },
        );
        assert_eq!(out, r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn raw_string() {
        let val = json!("hello world");
        let opts = OutputOptions {
            raw: true,
            ..Default::default()
        };
        assert_eq!(render(&val, opts), "hello world");
    }

    #[test]
    fn raw_only_affects_top_level_strings() {
        let opts = OutputOptions {
            raw: true,
            compact: true,
            ..Default::default()
        };
        assert_eq!(render(&json!(42), opts.clone()), "42");
        assert_eq!(render(&json!(["x"]), opts), r#"["x"]"#);
    }

    #[test]
    fn big_number_text_preserved() {
        let val: Value = serde_json::from_str("100000000000000000000000").unwrap();
        assert_eq!(render(&val, OutputOptions::default()), "100000000000000000000000");
    }
}
