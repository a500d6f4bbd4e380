//! Declared structured-output schema
//!
//! The canonical form is JSON Schema. Gemini's `responseSchema` uses an
//! OpenAPI subset with upper-case type names and no `additionalProperties`,
//! so it is derived from the canonical form rather than written twice.

use serde_json::{json, Map, Value};

fn number_object(fields: &[&str]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|f| (f.to_string(), json!({ "type": "number" })))
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": fields,
        "additionalProperties": false,
    })
}

fn string_array() -> Value {
    json!({
        "type": "array",
        "items": { "type": "string" },
    })
}

/// JSON Schema of `BudgetAdvice`
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": number_object(&["income", "total_expenses", "savings"]),
            "categories": number_object(&["needs", "wants", "savings"]),
            "alerts": string_array(),
            "suggestions": string_array(),
            "next_month_prediction": number_object(&[
                "rent",
                "food",
                "travel",
                "loans",
                "wants",
                "estimated_total",
                "estimated_savings",
            ]),
        },
        "required": [
            "summary",
            "categories",
            "alerts",
            "suggestions",
            "next_month_prediction",
        ],
        "additionalProperties": false,
    })
}

/// Convert a JSON Schema into Gemini's `responseSchema` dialect
pub fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let converted = map
                .iter()
                .filter(|(k, _)| k.as_str() != "additionalProperties")
                .map(|(k, v)| {
                    let v = match (k.as_str(), v) {
                        ("type", Value::String(t)) => Value::String(t.to_uppercase()),
                        // property names are user keys, not schema keywords
                        ("properties", Value::Object(props)) => Value::Object(
                            props
                                .iter()
                                .map(|(name, s)| (name.clone(), to_gemini_schema(s)))
                                .collect(),
                        ),
                        _ => to_gemini_schema(v),
                    };
                    (k.clone(), v)
                })
                .collect();
            Value::Object(converted)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;

    #[test]
    fn test_schema_top_level_required() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            vec![
                "summary",
                "categories",
                "alerts",
                "suggestions",
                "next_month_prediction"
            ]
        );
    }

    #[test]
    fn test_schema_matches_advice_shape() {
        let schema = response_schema();
        let advice = serde_json::to_value(MockBackend::sample_advice()).unwrap();

        let keys = |v: &Value| -> Vec<String> {
            let mut k: Vec<String> = v.as_object().unwrap().keys().cloned().collect();
            k.sort();
            k
        };

        assert_eq!(keys(&schema["properties"]), keys(&advice));
        for section in ["summary", "categories", "next_month_prediction"] {
            assert_eq!(
                keys(&schema["properties"][section]["properties"]),
                keys(&advice[section]),
                "section {}",
                section
            );
        }
    }

    #[test]
    fn test_gemini_schema_dialect() {
        let gemini = to_gemini_schema(&response_schema());
        assert_eq!(gemini["type"], "OBJECT");
        assert_eq!(gemini["properties"]["alerts"]["type"], "ARRAY");
        assert_eq!(gemini["properties"]["alerts"]["items"]["type"], "STRING");
        assert_eq!(
            gemini["properties"]["summary"]["properties"]["income"]["type"],
            "NUMBER"
        );
        assert!(gemini.get("additionalProperties").is_none());
        assert!(gemini["properties"]["summary"]
            .get("additionalProperties")
            .is_none());
        assert_eq!(
            gemini["properties"]["next_month_prediction"]["required"]
                .as_array()
                .unwrap()
                .len(),
            7
        );
    }

    #[test]
    fn test_gemini_schema_keeps_property_named_type() {
        let schema = json!({
            "type": "object",
            "properties": { "type": { "type": "string" } }
        });
        let gemini = to_gemini_schema(&schema);
        assert_eq!(gemini["properties"]["type"]["type"], "STRING");
    }
}
