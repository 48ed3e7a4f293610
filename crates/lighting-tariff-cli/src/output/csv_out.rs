use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// A calculation result becomes one row per tension level, joining the
/// energy, investment and O&M rows on `level`. Anything else is written as
/// two-column field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) if map.contains_key("energy_levels") => {
            write_level_rows(&mut wtr, map);
        }
        Value::Object(map) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in map {
                let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

const LEVEL_SECTIONS: [&str; 3] = ["energy_levels", "investment_levels", "aom_levels"];

fn write_level_rows(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    map: &serde_json::Map<String, Value>,
) {
    let mut headers: Vec<String> = vec!["level".to_string()];
    let mut rows: std::collections::BTreeMap<String, Vec<(String, String)>> =
        std::collections::BTreeMap::new();

    for section in LEVEL_SECTIONS {
        let Some(Value::Array(items)) = map.get(section) else {
            continue;
        };
        for item in items {
            let Value::Object(fields) = item else {
                continue;
            };
            let level = fields.get("level").map(format_csv_value).unwrap_or_default();
            for (key, val) in fields {
                if key == "level" {
                    continue;
                }
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
                rows.entry(level.clone())
                    .or_default()
                    .push((key.clone(), format_csv_value(val)));
            }
        }
    }

    let _ = wtr.write_record(&headers);
    for (level, cells) in &rows {
        let row: Vec<String> = headers
            .iter()
            .map(|h| {
                if h == "level" {
                    return level.clone();
                }
                cells
                    .iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default()
            })
            .collect();
        let _ = wtr.write_record(&row);
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
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
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
