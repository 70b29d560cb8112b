use serde_json::Value;
use std::io;

use super::flatten;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = match value {
        Value::Object(map) => map.get("result").unwrap_or(value),
        _ => value,
    };

    match body {
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        Value::Object(_) => {
            // Two-column CSV: dotted field path, value
            let mut rows = Vec::new();
            flatten("", body, &mut rows);
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in &rows {
                let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
            }
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(body)]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(first @ Value::Object(_)) = arr.first() {
        let mut header_rows = Vec::new();
        flatten("", first, &mut header_rows);
        let headers: Vec<String> = header_rows.into_iter().map(|(k, _)| k).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            let mut cells = Vec::new();
            flatten("", item, &mut cells);
            let row: Vec<String> = headers
                .iter()
                .map(|h| {
                    cells
                        .iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| format_csv_value(v))
                        .unwrap_or_default()
                })
                .collect();
            let _ = wtr.write_record(&row);
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) if arr.iter().all(|v| !v.is_object()) => arr
            .iter()
            .map(format_csv_value)
            .collect::<Vec<_>>()
            .join("; "),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
