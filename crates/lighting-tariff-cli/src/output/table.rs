use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Fields rendered as free text below the tables rather than inside a cell.
const TEXT_BLOCK_FIELDS: [&str; 1] = ["text_content"];
/// Fields left out of table output entirely.
const SKIPPED_FIELDS: [&str; 1] = ["markdown_content"];

/// Format output as tables using the tabled crate.
///
/// Scalars of the top-level object go in one Field/Value table; each list of
/// per-level rows and each nested object gets its own titled table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => print_object(map),
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if is_scalar(val) && !is_special(key) {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
    }
    println!("{}", Table::from(builder));

    for (key, val) in map {
        if is_special(key) {
            continue;
        }
        match val {
            Value::Array(arr) if arr.iter().all(Value::is_object) && !arr.is_empty() => {
                println!("\n{}:", key);
                print_array_table(arr);
            }
            Value::Object(nested) => {
                println!("\n{}:", key);
                print_nested(nested);
            }
            _ => {}
        }
    }

    if let Some(Value::Array(alerts)) = map.get("alerts") {
        if !alerts.is_empty() {
            println!("\nAlerts:");
            for alert in alerts.iter().filter_map(Value::as_str) {
                println!("  - {}", alert);
            }
        }
    }

    for field in TEXT_BLOCK_FIELDS {
        if let Some(Value::String(text)) = map.get(field) {
            println!("\n{}", text);
        }
    }
}

fn print_nested(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn is_special(key: &str) -> bool {
    key == "alerts" || TEXT_BLOCK_FIELDS.contains(&key) || SKIPPED_FIELDS.contains(&key)
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
