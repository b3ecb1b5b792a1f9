//! MySQL value and identifier escaping.
//!
//! Values become SQL literals following the MySQL client string-escaping
//! rules; identifiers are backtick quoted. [`format`] substitutes `?` and
//! `??` placeholders in a template with escaped values and identifiers.

use crate::models::Value;
use std::fmt::Write as _;

/// Render a value as a MySQL literal.
pub fn escape(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, false);
    out
}

fn write_value(out: &mut String, value: &Value, nested: bool) {
    match value {
        Value::Null => out.push_str("NULL"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(i) => {
            let _ = write!(out, "{i}");
        }
        Value::UInt(u) => {
            let _ = write!(out, "{u}");
        }
        // NaN and infinities have no SQL spelling
        Value::Float(f) if !f.is_finite() => out.push_str("NULL"),
        Value::Float(f) => {
            let _ = write!(out, "{f}");
        }
        Value::String(s) => write_string(out, s),
        Value::Bytes(bytes) => {
            out.push_str("X'");
            for b in bytes {
                let _ = write!(out, "{b:02x}");
            }
            out.push('\'');
        }
        Value::List(items) => {
            if nested {
                out.push('(');
            }
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, true);
            }
            if nested {
                out.push(')');
            }
        }
        Value::DateTime(dt) => {
            let _ = write!(out, "'{}'", dt.format("%Y-%m-%d %H:%M:%S"));
        }
        Value::Literal(lit) => out.push_str(lit.as_str()),
    }
}

/// Quote a string literal, escaping the characters MySQL treats specially.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    write_string(&mut out, s);
    out
}

fn write_string(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

/// Backtick-quote an identifier.
///
/// `schema.table` becomes `` `schema`.`table` `` unless `forbid_qualified`
/// is set, in which case the dot is kept inside a single quoted name.
pub fn escape_id(name: &str, forbid_qualified: bool) -> String {
    let doubled = name.replace('`', "``");
    if forbid_qualified {
        format!("`{doubled}`")
    } else {
        format!("`{}`", doubled.replace('.', "`.`"))
    }
}

/// Quote each identifier and join them with `, `.
pub fn escape_id_list<S: AsRef<str>>(names: &[S], forbid_qualified: bool) -> String {
    names
        .iter()
        .map(|n| escape_id(n.as_ref(), forbid_qualified))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_id_value(value: &Value) -> String {
    match value {
        Value::String(s) => escape_id(s, false),
        Value::List(items) => items
            .iter()
            .map(escape_id_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Literal(lit) => lit.as_str().to_string(),
        other => {
            let text = escape(other);
            escape_id(text.trim_matches('\''), false)
        }
    }
}

/// Substitute placeholders in `template`, left to right.
///
/// `?` takes the next value, `??` takes the next value as an identifier, and
/// runs of three or more `?` are copied unchanged. When the values run out
/// the remaining placeholders stay in the output; surplus values are ignored.
pub fn format(template: &str, values: &[Value]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut next = values.iter();
    let mut rest = template;

    while let Some(start) = rest.find('?') {
        let run = rest[start..].bytes().take_while(|b| *b == b'?').count();
        out.push_str(&rest[..start]);
        let marks = &rest[start..start + run];
        rest = &rest[start + run..];

        if run > 2 {
            out.push_str(marks);
            continue;
        }
        match next.next() {
            Some(value) if run == 2 => out.push_str(&escape_id_value(value)),
            Some(value) => write_value(&mut out, value, false),
            None => {
                out.push_str(marks);
                out.push_str(rest);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}
