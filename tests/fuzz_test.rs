//! Randomized tests for value escaping and statement rendering.
//!
//! Escaped literals are parsed back with a small MySQL-literal reader and
//! compared with the input; rendering is checked never to panic on hostile
//! input.

use fluent_orm::db::{Statement, StatementKind, escape, escape_id, escape_string, format};
use fluent_orm::models::Value;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;

/// Generate random string of given length
fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random string mixing plain characters with everything the escaper rewrites.
fn random_hostile_string(len: usize) -> String {
    const POOL: &[char] = &[
        'a', 'Z', '0', ' ', '\'', '"', '\\', '\0', '\n', '\r', '\t', '\u{8}', '\u{1a}', '%', '_',
        '?', '`', ';', '-', 'é', '字', '🚀',
    ];
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| *POOL.choose(&mut rng).unwrap_or(&'a'))
        .collect()
}

/// Generate various edge-case strings
fn edge_case_strings() -> Vec<String> {
    vec![
        String::new(),
        " ".to_string(),
        "\n\r\t".to_string(),
        "\0".to_string(),
        "🚀".repeat(100),
        "'OR 1=1--".to_string(),
        "'; DROP TABLE users--".to_string(),
        "\\'; DROP TABLE users--".to_string(),
        "1' UNION SELECT NULL, NULL--".to_string(),
        "a".repeat(10000),
        random_string(100),
        "\u{0000}\u{FFFF}".to_string(),
        "\x00\x01\x02".to_string(),
    ]
}

/// Read back a single-quoted MySQL string literal.
fn unescape_literal(literal: &str) -> String {
    let inner = literal
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .expect("quoted literal");
    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            assert_ne!(c, '\'', "unescaped quote inside literal: {literal}");
            out.push(c);
            continue;
        }
        match chars.next().expect("dangling backslash") {
            '0' => out.push('\0'),
            'b' => out.push('\u{8}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'Z' => out.push('\u{1a}'),
            other => out.push(other),
        }
    }
    out
}

#[test]
fn fuzz_string_escape_round_trip() {
    for _ in 0..500 {
        let len = rand::thread_rng().gen_range(0..64);
        let input = random_hostile_string(len);
        let literal = escape_string(&input);
        assert_eq!(unescape_literal(&literal), input, "literal: {literal}");
    }
    for input in edge_case_strings() {
        assert_eq!(unescape_literal(&escape_string(&input)), input);
    }
}

#[test]
fn fuzz_integer_escape_round_trip() {
    let mut rng = rand::thread_rng();
    for _ in 0..1000 {
        let n: i64 = rng.r#gen();
        assert_eq!(escape(&Value::Int(n)).parse::<i64>().unwrap(), n);
        let u: u64 = rng.r#gen();
        assert_eq!(escape(&Value::UInt(u)).parse::<u64>().unwrap(), u);
    }
    for n in [i64::MIN, -1, 0, 1, i64::MAX] {
        assert_eq!(escape(&Value::Int(n)).parse::<i64>().unwrap(), n);
    }
}

#[test]
fn fuzz_float_escape_round_trip() {
    let mut rng = rand::thread_rng();
    for _ in 0..1000 {
        let f: f64 = rng.gen_range(-1.0e12..1.0e12);
        assert_eq!(escape(&Value::Float(f)).parse::<f64>().unwrap(), f);
    }
    for f in [0.0, -0.5, 1.0e-9, f64::MAX, f64::MIN_POSITIVE] {
        assert_eq!(escape(&Value::Float(f)).parse::<f64>().unwrap(), f);
    }
}

#[test]
fn fuzz_identifier_escape_stays_quoted() {
    for _ in 0..300 {
        let len = rand::thread_rng().gen_range(1..32);
        let name = random_hostile_string(len);
        let quoted = escape_id(&name, true);
        let inner = &quoted[1..quoted.len() - 1];
        assert!(quoted.starts_with('`') && quoted.ends_with('`'));
        // Every backtick inside is doubled.
        assert_eq!(inner.replace("``", ""), name.replace('`', ""));
    }
}

#[test]
fn fuzz_where_values_cannot_break_out() {
    for input in edge_case_strings()
        .into_iter()
        .chain((0..200).map(|_| random_hostile_string(24)))
    {
        let mut stmt = Statement::new("users", StatementKind::Select);
        stmt.push_where("name = ?", vec![Value::String(input.clone())]);
        let sql = stmt.finish().unwrap().sql().to_string();

        let literal = sql
            .strip_prefix("SELECT * FROM users WHERE name = ")
            .and_then(|s| s.strip_suffix(';'))
            .expect("statement shape");
        assert_eq!(unescape_literal(literal), input);
    }
}

#[test]
fn fuzz_format_never_panics() {
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let len = rng.gen_range(0..40);
        let template = random_hostile_string(len);
        let args: Vec<Value> = (0..rng.gen_range(0..4))
            .map(|i| Value::String(format!("v{i}")))
            .collect();
        let rendered = format(&template, &args);
        if args.is_empty() {
            assert_eq!(rendered, template);
        }
    }
}
