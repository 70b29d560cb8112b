use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(line) = headline(result_obj) {
        println!("{line}");
        return;
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

/// Score and risk level for analyses, else the first priority ratio.
fn headline(result: &Value) -> Option<String> {
    let map = result.as_object()?;
    let score = map.get("score").unwrap_or(result);
    if let (Some(overall), Some(risk)) = (score.get("overall"), score.get("risk_level")) {
        return Some(format!("{} {}", format_minimal(overall), format_minimal(risk)));
    }

    let priority_keys = [
        "roe",
        "ratio_liquidite_generale",
        "ratio_autonomie_financiere",
        "marge_nette",
    ];
    priority_keys
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null())
        .map(format_minimal)
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headline_prefers_score() {
        let analysis = json!({"score": {"overall": 49, "risk_level": "high"}, "ratios": {"roe": "16.6"}});
        assert_eq!(headline(&analysis).as_deref(), Some("49 high"));
        let ratios = json!({"marge_nette": "12.5", "roe": "16.6"});
        assert_eq!(headline(&ratios).as_deref(), Some("16.6"));
    }
}
