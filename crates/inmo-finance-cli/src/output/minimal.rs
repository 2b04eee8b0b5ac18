use serde_json::Value;

/// Headline figures, one per analysis kind, checked in order.
const PRIORITY_KEYS: &[&str] = &[
    "irr",
    "npv",
    "payment_uva",
    "total_paid_ars",
    "gross_rental_yield",
    "cap_rate",
];

/// Print just the headline figure of a result, for piping into scripts.
pub fn print_minimal(value: &Value) {
    let result = match value.get("result") {
        Some(r) => r,
        None => value,
    };

    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            match map.get(*key) {
                Some(Value::Null) | None => continue,
                Some(v) => {
                    println!("{}", scalar(v));
                    return;
                }
            }
        }
        // No headline key applies; fall back to the first scalar field.
        if let Some((_, v)) = map.iter().find(|(_, v)| !v.is_object() && !v.is_array()) {
            println!("{}", scalar(v));
            return;
        }
    }

    println!("{}", scalar(result));
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
