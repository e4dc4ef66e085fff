use serde_json::Value;

/// Print just the key answer values from the output.
///
/// For a deal that means the two IRRs; for a rent roll, its headline counts.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Priority list of key output fields
    let priority_keys = [
        "levered_irr",
        "unlevered_irr",
        "purchase_price",
        "noi",
        "dscr",
        "cash_on_cash_return",
        "total_units",
        "occupancy_rate",
    ];

    if let Value::Object(map) = result_obj {
        let mut printed = false;
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}: {}", key, format_minimal(val));
                    printed = true;
                }
            }
        }
        if printed {
            return;
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
