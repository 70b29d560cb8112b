use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::flatten;

/// Format output as a table using the tabled crate.
///
/// Scalar and nested-object fields of the result go into one Field/Value
/// table with dotted paths; arrays of objects (compliance results, insights,
/// recommendations) get a table of their own.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_result_table(result, map),
            None => print_object(value),
        },
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{value}"),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Array(arr) => print_array_table(arr),
        _ => print_object(result),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nAvertissements :");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

fn print_object(value: &Value) {
    let mut rows = Vec::new();
    flatten("", value, &mut rows);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut sections = Vec::new();
    for (key, val) in rows {
        match val {
            Value::Array(items) if items.iter().any(Value::is_object) => sections.push((key, items)),
            other => builder.push_record([key, format_value(&other)]),
        }
    }
    println!("{}", Table::from(builder));

    for (title, items) in sections {
        println!("\n{title}");
        print_array_table(&items);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(first @ Value::Object(_)) = arr.first() {
        let mut header_rows = Vec::new();
        flatten("", first, &mut header_rows);
        let headers: Vec<String> = header_rows.into_iter().map(|(k, _)| k).collect();

        let mut builder = Builder::default();
        builder.push_record(headers.clone());
        for item in arr {
            let mut cells = Vec::new();
            flatten("", item, &mut cells);
            let row: Vec<String> = headers
                .iter()
                .map(|h| {
                    cells
                        .iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| format_value(v))
                        .unwrap_or_default()
                })
                .collect();
            builder.push_record(row);
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
