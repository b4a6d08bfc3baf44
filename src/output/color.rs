use serde_json::Value;

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD_BLUE: &str = "\x1b[1;34m";
const GREEN: &str = "\x1b[0;32m";
const CYAN: &str = "\x1b[0;36m";
const YELLOW: &str = "\x1b[0;33m";
const RED: &str = "\x1b[0;31m";
const BOLD_WHITE: &str = "\x1b[1;37m";

/// Colorize a JSON value with ANSI color codes.
///
/// `indent` is the whitespace for one nesting level; `None` renders the
/// value on a single line.
pub fn colorize_json(value: &Value, indent: Option<&str>) -> String {
    let mut buf = String::new();
    write_value(value, &mut buf, indent, 0);
    buf
}

fn write_value(value: &Value, buf: &mut String, unit: Option<&str>, depth: usize) {
    match value {
        Value::Null => paint(buf, RED, "null"),
        Value::Bool(b) => paint(buf, YELLOW, if *b { "true" } else { "false" }),
        Value::Number(n) => paint(buf, CYAN, &n.to_string()),
        Value::String(s) => paint(buf, GREEN, &quote(s)),
        Value::Array(arr) => {
            if arr.is_empty() {
                paint(buf, BOLD_WHITE, "[]");
                return;
            }
            paint(buf, BOLD_WHITE, "[");
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    buf.push(',');
                }
                newline(buf, unit, depth + 1);
                write_value(item, buf, unit, depth + 1);
            }
            newline(buf, unit, depth);
            paint(buf, BOLD_WHITE, "]");
        }
        Value::Object(map) => {
            if map.is_empty() {
                paint(buf, BOLD_WHITE, "{}");
                return;
            }
            paint(buf, BOLD_WHITE, "{");
            for (i, (key, val)) in map.iter().enumerate() {
                if i > 0 {
                    buf.push(',');
                }
                newline(buf, unit, depth + 1);
                paint(buf, BOLD_BLUE, &quote(key));
                buf.push(':');
                if unit.is_some() {
                    buf.push(' ');
                }
                write_value(val, buf, unit, depth + 1);
            }
            newline(buf, unit, depth);
            paint(buf, BOLD_WHITE, "}");
        }
    }
}

fn paint(buf: &mut String, color: &str, text: &str) {
    buf.push_str(color);
    buf.push_str(text);
    buf.push_str(RESET);
}

fn newline(buf: &mut String, unit: Option<&str>, depth: usize) {
    if let Some(unit) = unit {
        buf.push('\n');
        for _ in 0..depth {
            buf.push_str(unit);
        }
    }
}

fn quote(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 2);
    escaped.push('"');
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\x08' => escaped.push_str("\\b"),
            '\x0c' => escaped.push_str("\\f"),
            c if c < '\x20' => {
                escaped.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => escaped.push(c),
        }
    }
    escaped.push('"');
    escaped
}
